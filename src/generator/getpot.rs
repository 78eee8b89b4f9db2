//! Generate GetPot input text from a [`Block`] forest.
//!
//! Layout:
//!
//! ```text
//! [Kernels]                     # comment padded to column 30
//!   [diff]
//!     type = Diffusion
//!   # block = 0
//!   []
//!   [./]
//!     type = TimeDerivative
//!   [../]
//! []
//! ```
//!
//! Named blocks open with `[name]` and close with `[]` at any depth. Blocks
//! without a name use the relative `[./]` / `[../]` pair. Inactive parameters
//! are written commented out at the indentation of their block. Inactive
//! blocks are written with every line prefixed by `#` so that they survive a
//! round trip through the parser.

use crate::model::*;

/// Columns the header comment is aligned to, tried in order.
pub const COMMENT_COLUMNS: [usize; 3] = [30, 45, 60];

/// Gap used when a header is already past the last comment column.
pub const FALLBACK_COMMENT_GAP: usize = 15;

/// Blocks written ahead of all others by [`write_input_file`]; MOOSE needs
/// functions and variables declared before they are referenced.
pub const LEADING_BLOCKS: [&str; 2] = ["Functions", "Variables"];

/// How blocks with `active == false` are written.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Inactive {
    /// Every line prefixed with `#`.
    CommentOut,
    Skip,
}

/// Generate GetPot text for every block in `blocks`, in order.
pub fn dump(blocks: &[Block]) -> String {
    let mut out = String::with_capacity(1024);
    for block in blocks {
        write_block(&mut out, block, 0, Inactive::CommentOut);
    }
    out
}

/// Generate the text of an input file for the simulation driver. Inactive
/// blocks are left out at every depth, and `Functions` / `Variables` come
/// first in the order they appear.
pub fn write_input_file(blocks: &[Block]) -> String {
    let (leading, rest): (Vec<&Block>, Vec<&Block>) = blocks
        .iter()
        .partition(|b| LEADING_BLOCKS.contains(&b.name.as_str()));
    let mut out = String::with_capacity(1024);
    for block in leading.into_iter().chain(rest) {
        write_block(&mut out, block, 0, Inactive::Skip);
    }
    out
}

fn indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str("  ");
    }
}

/// Spaces between a header and its `#` comment.
fn comment_padding(line_len: usize) -> usize {
    COMMENT_COLUMNS
        .iter()
        .find(|&&col| line_len < col)
        .map(|col| col - line_len)
        .unwrap_or(FALLBACK_COMMENT_GAP)
}

fn single_line(s: &str) -> String {
    s.replace(['\r', '\n'], " ").trim().to_string()
}

fn write_block(out: &mut String, block: &Block, level: usize, inactive: Inactive) {
    if block.active {
        write_block_body(out, block, level, inactive);
    } else if inactive == Inactive::CommentOut {
        let mut body = String::new();
        write_block_body(&mut body, block, level, inactive);
        for line in body.lines() {
            out.push('#');
            out.push_str(line);
            out.push('\n');
        }
    }
}

fn write_block_body(out: &mut String, block: &Block, level: usize, inactive: Inactive) {
    let anonymous = block.is_anonymous();
    let start = out.len();
    indent(out, level);
    if anonymous {
        out.push_str("[./]");
    } else {
        out.push_str(&format!("[{}]", block.name));
    }
    let comment = single_line(block.comment());
    if !comment.is_empty() {
        let pad = comment_padding(out.len() - start);
        out.push_str(&" ".repeat(pad));
        out.push_str("# ");
        out.push_str(&comment);
    }
    out.push('\n');

    for param in &block.parameters {
        write_parameter(out, param, level);
    }

    for child in &block.children {
        write_block(out, child, level + 1, inactive);
    }

    indent(out, level);
    out.push_str(if anonymous { "[../]\n" } else { "[]\n" });
}

fn write_parameter(out: &mut String, param: &Parameter, level: usize) {
    indent(out, level);
    out.push_str(if param.active { "  " } else { "# " });
    out.push_str(&format!("{} = {}\n", param.name, single_line(&param.value)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snow() -> Block {
        let mut block = Block::new("Snow");
        block.parameters.push(Parameter {
            name: "Test Param 1".into(),
            default_value: "Test Param 1".into(),
            value: "Test Param 1".into(),
            required: true,
            active: true,
            ..Default::default()
        });
        block.parameters.push(Parameter {
            name: "Test Param 2".into(),
            required: false,
            active: false,
            ..Default::default()
        });
        block
    }

    #[test]
    fn test_default_activation_lines() {
        let text = dump(&[snow()]);
        assert_eq!(
            text,
            "[Snow]\n  Test Param 1 = Test Param 1\n# Test Param 2 = \n[]\n"
        );
    }

    #[test]
    fn test_anonymous_child_delimiters() {
        let mut block = snow();
        let mut child = Block::new("");
        child.parameters.push(Parameter::new("x", "1"));
        block.children.push(child);
        let text = dump(&[block]);
        assert!(text.contains("\n  [./]\n    x = 1\n  [../]\n[]\n"), "{}", text);
    }

    #[test]
    fn test_named_child_delimiters() {
        let mut block = Block::new("Kernels");
        block.children.push(Block::new("diff"));
        assert_eq!(dump(&[block]), "[Kernels]\n  [diff]\n  []\n[]\n");
    }

    #[test]
    fn test_header_comment_column() {
        let mut block = Block::new("Mesh");
        block.description = "The mesh".into();
        let text = dump(&[block]);
        let header = text.lines().next().unwrap_or_default();
        assert_eq!(header.find('#'), Some(30));
        assert_eq!(header, format!("[Mesh]{}# The mesh", " ".repeat(24)));
    }

    #[test]
    fn test_long_header_uses_next_column() {
        let mut block = Block::new("A_block_name_that_is_long_enough");
        block.set_comment("c");
        let text = dump(&[block]);
        let header = text.lines().next().unwrap_or_default();
        assert_eq!(header.find('#'), Some(45));
    }

    #[test]
    fn test_explicit_empty_comment_suppresses_description() {
        let mut block = Block::new("Mesh");
        block.description = "The mesh".into();
        block.set_comment("");
        assert_eq!(dump(&[block]), "[Mesh]\n[]\n");
    }

    #[test]
    fn test_inactive_block_is_commented_out() {
        let mut block = Block::new("Outputs");
        block.active = false;
        block.parameters.push(Parameter::new("exodus", "true"));
        assert_eq!(dump(&[block]), "#[Outputs]\n#  exodus = true\n#[]\n");
    }

    #[test]
    fn test_write_input_file_orders_and_filters() {
        let mut hidden = Block::new("Debug");
        hidden.active = false;
        let blocks = vec![
            Block::new("Mesh"),
            hidden,
            Block::new("Variables"),
            Block::new("Functions"),
        ];
        assert_eq!(
            write_input_file(&blocks),
            "[Variables]\n[]\n[Functions]\n[]\n[Mesh]\n[]\n"
        );
    }
}
