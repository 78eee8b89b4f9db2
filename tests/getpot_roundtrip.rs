use camino::Utf8PathBuf;
use mooseblocks::generator::{dump, write_input_file};
use mooseblocks::model::{Block, Parameter, forest_structurally_eq};
use mooseblocks::operations::clone_exemplar;
use mooseblocks::parser::{parse, parse_file, parse_with_warnings};
use mooseblocks::schema::{FsSource, load_schema};

fn fixture(name: &str) -> String {
    let path = Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    std::fs::read_to_string(&path).expect("read fixture")
}

fn snow() -> Block {
    let catalog = load_schema(&fixture("small.yaml"), None).expect("small schema");
    clone_exemplar(catalog.block("Snow").expect("snow exemplar"))
}

#[test]
fn test_snow_default_activation() {
    let text = dump(&[snow()]);
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines[0].starts_with("[Snow]"));
    assert!(lines[0].ends_with("# A block that falls on the mesh"));
    assert_eq!(lines[1], "  Test Param 1 = Test Param 1");
    assert_eq!(lines[2], "# Test Param 2 = ");
    assert_eq!(lines[3], "[]");
}

#[test]
fn test_snow_with_anonymous_subblock_round_trips() {
    let mut block = snow();
    block.instantiate("*", Some("")).expect("instantiate flake");
    block.children[0].set_parameter_value("x", "3");

    let text = dump(std::slice::from_ref(&block));
    assert!(text.contains("\n  [./]"), "{}", text);
    assert!(text.contains("\n  [../]\n[]\n"), "{}", text);

    let parsed = parse_with_warnings(&text);
    assert!(parsed.warnings.is_empty(), "{:?}", parsed.warnings);
    assert_eq!(parsed.blocks.len(), 1);
    assert!(parsed.blocks[0].children[0].is_anonymous());
    assert!(forest_structurally_eq(&[block], &parsed.blocks));
}

#[test]
fn test_round_trip_preserves_structure() {
    let mut mesh = Block::new("Mesh");
    mesh.add_parameter(Parameter::new("type", "GeneratedMesh"))
        .expect("add type");
    mesh.add_parameter(Parameter::new("dim", "2")).expect("add dim");
    let mut nx = Parameter::new("nx", "10");
    nx.active = false;
    mesh.add_parameter(nx).expect("add nx");

    let mut kernels = Block::new("Kernels");
    let mut diff = Block::new("diff");
    diff.add_parameter(Parameter::new("variable", "u"))
        .expect("add variable");
    diff.add_parameter(Parameter::new("block", "'0 1 2'"))
        .expect("add block");
    let mut time = Block::new("time");
    time.active = false;
    time.add_parameter(Parameter::new("variable", "u"))
        .expect("add variable");
    kernels.children.push(diff);
    kernels.children.push(time);

    let mut outputs = Block::new("Outputs");
    outputs.active = false;
    outputs
        .add_parameter(Parameter::new("exodus", "true"))
        .expect("add exodus");

    let forest = vec![mesh, kernels, outputs];
    let text = dump(&forest);
    let parsed = parse_with_warnings(&text);
    assert!(parsed.warnings.is_empty(), "{:?}\n{}", parsed.warnings, text);
    assert!(forest_structurally_eq(&forest, &parsed.blocks), "{}", text);
    assert_eq!(parsed.blocks[0].block_type, "GeneratedMesh");

    // Dumping the parsed forest again is stable.
    assert_eq!(dump(&parsed.blocks), text);
}

#[test]
fn test_write_input_file_ordering() {
    let forest = vec![
        Block::new("Mesh"),
        Block::new("Variables"),
        Block::new("Kernels"),
        Block::new("Functions"),
        Block::new("Executioner"),
    ];
    let text = write_input_file(&forest);
    let headers: Vec<&str> = text.lines().filter(|l| l.starts_with('[') && *l != "[]").collect();
    assert_eq!(
        headers,
        vec!["[Variables]", "[Functions]", "[Mesh]", "[Kernels]", "[Executioner]"]
    );
}

#[test]
fn test_write_input_file_skips_inactive_blocks() {
    let mut debug = Block::new("Debug");
    debug.active = false;
    let mut kernels = Block::new("Kernels");
    kernels.children.push(Block::new("diff"));
    let mut time = Block::new("time");
    time.active = false;
    kernels.children.push(time);

    let text = write_input_file(&[Block::new("Mesh"), debug, kernels]);
    assert_eq!(text, "[Mesh]\n[]\n[Kernels]\n  [diff]\n  []\n[]\n");
}

#[test]
fn test_legacy_syntax_is_accepted() {
    let text = "\
# Diffusion test
[Mesh]
  type = GeneratedMesh # generated
  dim = 2
[]

[Variables]
  [./u]
    order = FIRST
    family = LAGRANGE
  [../]
[]

[Executioner]
  type = Steady
  petsc_options_iname = '-pc_type
                         -pc_hypre_type'
[]
";
    let parsed = parse_with_warnings(text);
    assert!(parsed.warnings.is_empty(), "{:?}", parsed.warnings);
    let blocks = parsed.blocks;
    assert_eq!(blocks.len(), 3);
    assert_eq!(blocks[0].parameter("type").expect("type").value, "GeneratedMesh");
    assert_eq!(blocks[0].parameter("type").expect("type").description, "generated");
    assert_eq!(blocks[1].children[0].name, "u");
    assert_eq!(
        blocks[2].parameter("petsc_options_iname").expect("options").value,
        "'-pc_type -pc_hypre_type'"
    );

    // The canonical form writes named children with plain brackets.
    let canonical = dump(&blocks);
    assert!(canonical.contains("\n  [u]\n"), "{}", canonical);
    assert!(forest_structurally_eq(&blocks, &parse(&canonical)));
}

#[test]
fn test_parse_warnings_report_lines() {
    let parsed = parse_with_warnings("[A]\n  x = 1\n  ???\n[]\n[]\ny = 2\n");
    let lines: Vec<usize> = parsed.warnings.iter().map(|w| w.line).collect();
    assert_eq!(lines, vec![3, 5, 6]);
    assert_eq!(parsed.blocks.len(), 1);
    assert!(parsed.warnings[0].to_string().starts_with("line 3:"));
}

#[test]
fn test_parse_file_through_source() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = Utf8PathBuf::from_path_buf(dir.path().join("input.i")).expect("utf8 path");
    std::fs::write(&path, "[Outputs]\n  exodus = true\n[]\n").expect("write input");

    let parsed = parse_file(&mut FsSource, &path).expect("parse input file");
    assert_eq!(parsed.blocks[0].name, "Outputs");
    assert!(parse_file(&mut FsSource, dir.path().join("nope.i").to_str().expect("utf8")).is_err());
}

#[test]
fn test_round_trip_values_with_apostrophes_and_hashes() {
    let mut outputs = Block::new("Outputs");
    for (name, value) in [
        ("file_base", "bob's_run"),
        ("exodus", "true"),
        ("color", "#ff0000"),
        ("tag", "run#2"),
        ("vars", "'u # v'"),
    ] {
        outputs
            .add_parameter(Parameter::new(name, value))
            .expect("add parameter");
    }
    let forest = vec![outputs];

    let text = dump(&forest);
    let parsed = parse_with_warnings(&text);
    assert!(parsed.warnings.is_empty(), "{:?}\n{}", parsed.warnings, text);
    assert!(forest_structurally_eq(&forest, &parsed.blocks), "{}", text);
    assert_eq!(parsed.blocks[0].parameters[2].description, "");
}
