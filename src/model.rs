use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ────────────────────────────────────────────────────────────────────────────
// Parameter
// ────────────────────────────────────────────────────────────────────────────

/// One `key = value` entry of a MOOSE block.
///
/// `active` decides whether the parameter is written as a live line or
/// commented out (`# key = value`). Schema parameters start out active only
/// when they are required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    /// C++ type reported by the MOOSE application (e.g. `"std::string"`).
    #[serde(default)]
    pub cpp_type: String,
    #[serde(default)]
    pub default_value: String,
    /// Current value, written by the GetPot generator.
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub group_name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub active: bool,
    /// Allowed values, when the application restricts them.
    #[serde(default)]
    pub options: Vec<String>,
}

impl Parameter {
    /// A parameter with the given value that is written as a live line.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            active: true,
            ..Default::default()
        }
    }

    /// Restore the schema state: current value equals the default and only
    /// required parameters are active.
    pub fn reset_activation(&mut self) {
        self.value = self.default_value.clone();
        self.active = self.required;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Block
// ────────────────────────────────────────────────────────────────────────────

/// Alternative shapes of a block, keyed by the value of its selector
/// parameter (always `type` for MOOSE schemas).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveVariants {
    pub selector: String,
    /// Name of the variant currently applied to the owning block.
    #[serde(default)]
    pub selected: Option<String>,
    pub variants: IndexMap<String, Block>,
}

impl AdaptiveVariants {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variants.keys().map(|k| k.as_str())
    }
}

/// A MOOSE input block.
///
/// `children` are the concrete sub-blocks of a working document.
/// `exemplars` are read-only schema templates which are cloned to create new
/// children; they are never written to GetPot files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Block name; empty for anonymous `[./]` sub-blocks.
    pub name: String,
    #[serde(rename = "type", default)]
    pub block_type: String,
    #[serde(default)]
    pub description: String,
    /// Explicit comment. When `None`, [`Block::comment`] falls back to the description.
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub children: Vec<Block>,
    #[serde(default)]
    pub exemplars: Vec<Block>,
    #[serde(default)]
    pub adaptive: Option<AdaptiveVariants>,
}

impl Block {
    /// An empty, active block.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active: true,
            ..Default::default()
        }
    }

    /// Comment written next to the block header.
    pub fn comment(&self) -> &str {
        self.comment.as_deref().unwrap_or(&self.description)
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = Some(comment.into());
    }

    /// True for sub-blocks without a name (`[./]` ... `[../]`).
    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty()
    }

    pub fn is_adaptive(&self) -> bool {
        self.adaptive.is_some()
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn parameter_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.parameters.iter_mut().find(|p| p.name == name)
    }

    /// Append a parameter, rejecting names that already exist on this block.
    pub fn add_parameter(&mut self, parameter: Parameter) -> Result<()> {
        if self.parameter(&parameter.name).is_some() {
            return Err(Error::DuplicateParameter {
                block: self.name.clone(),
                parameter: parameter.name,
            });
        }
        self.parameters.push(parameter);
        Ok(())
    }

    pub fn remove_parameter(&mut self, name: &str) -> Option<Parameter> {
        let idx = self.parameters.iter().position(|p| p.name == name)?;
        Some(self.parameters.remove(idx))
    }

    /// Set the value of an existing parameter and activate it.
    /// Returns `false` if there is no such parameter.
    pub fn set_parameter_value(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.parameter_mut(name) {
            Some(p) => {
                p.value = value.into();
                p.active = true;
                true
            }
            None => false,
        }
    }

    pub fn child(&self, name: &str) -> Option<&Block> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Block> {
        self.children.iter_mut().find(|c| c.name == name)
    }

    pub fn remove_child(&mut self, index: usize) -> Option<Block> {
        (index < self.children.len()).then(|| self.children.remove(index))
    }

    pub fn exemplar(&self, name: &str) -> Option<&Block> {
        self.exemplars.iter().find(|e| e.name == name)
    }

    /// Compare the parts of two trees that survive a GetPot round trip:
    /// names, active flags, parameter names/values/active flags, and the
    /// nesting of children. Exemplars, descriptions and comments are ignored.
    pub fn structurally_eq(&self, other: &Block) -> bool {
        self.name == other.name
            && self.active == other.active
            && self.parameters.len() == other.parameters.len()
            && self
                .parameters
                .iter()
                .zip(&other.parameters)
                .all(|(a, b)| a.name == b.name && a.active == b.active && a.value == b.value)
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|(a, b)| a.structurally_eq(b))
    }

    /// Walk this block and all its children depth-first. `path` holds the
    /// names of the ancestors of the block passed to `cb`.
    pub fn walk_blocks<F>(&self, path: &mut Vec<String>, cb: &mut F)
    where
        F: FnMut(&[String], &Block),
    {
        cb(path, self);
        path.push(self.name.clone());
        for child in &self.children {
            child.walk_blocks(path, cb);
        }
        path.pop();
    }
}

/// Structural equality for whole forests, see [`Block::structurally_eq`].
pub fn forest_structurally_eq(a: &[Block], b: &[Block]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.structurally_eq(y))
}

/// Find active, non-empty parameters of active blocks whose whole
/// `name = value` text matches `pattern`. Each hit is returned with its block
/// path (`Kernels/diff`).
pub fn find_parameters(blocks: &[Block], pattern: &str) -> Result<Vec<(String, Parameter)>> {
    let pattern = Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| Error::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;
    let mut result = Vec::new();
    let mut path = Vec::new();
    for root in blocks {
        root.walk_blocks(&mut path, &mut |p, b| {
            if !b.active {
                return;
            }
            for param in &b.parameters {
                if !param.active || param.value.is_empty() {
                    continue;
                }
                let line = format!("{} = {}", param.name, param.value);
                if pattern.is_match(&line) {
                    let mut full = p.join("/");
                    if !full.is_empty() {
                        full.push('/');
                    }
                    full.push_str(&b.name);
                    result.push((full, param.clone()));
                }
            }
        });
    }
    Ok(result)
}

// ────────────────────────────────────────────────────────────────────────────
// Catalog
// ────────────────────────────────────────────────────────────────────────────

/// Top-level exemplar blocks and action syntax produced from a MOOSE schema.
///
/// A catalog is never mutated after loading; working documents clone from it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub action_syntax: Vec<String>,
}

static GLOBAL_CATALOG: OnceCell<Catalog> = OnceCell::new();

impl Catalog {
    pub fn block(&self, name: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.name == name)
    }

    /// Indices of top-level blocks that have alternative shapes.
    pub fn adaptive_positions(&self) -> Vec<usize> {
        self.blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_adaptive())
            .map(|(i, _)| i)
            .collect()
    }

    /// Install this catalog as the process-wide catalog. Fails (returning the
    /// catalog) when one is already installed.
    pub fn install_global(self) -> std::result::Result<&'static Catalog, Catalog> {
        GLOBAL_CATALOG.try_insert(self).map_err(|(_, rejected)| rejected)
    }

    pub fn global() -> Option<&'static Catalog> {
        GLOBAL_CATALOG.get()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// CatalogDoc – binary cache of a loaded schema
// ────────────────────────────────────────────────────────────────────────────

const CACHE_MAGIC: &[u8; 11] = b"MOOSEBLOCKS";
const CACHE_VERSION: u32 = 1;

/// Wrapper used to cache a parsed [`Catalog`] on disk, so that large
/// application schemas need not be re-read from YAML on every start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDoc {
    pub catalog: Catalog,
}

impl CatalogDoc {
    /// Save the catalog to a binary file with magic bytes and versioning.
    pub fn save_to_binary<P: AsRef<std::path::Path>>(&self, path: P) -> anyhow::Result<()> {
        let file = std::fs::File::create(path)?;
        let mut writer = std::io::BufWriter::new(file);
        std::io::Write::write_all(&mut writer, CACHE_MAGIC)?;
        std::io::Write::write_all(&mut writer, &CACHE_VERSION.to_le_bytes())?;
        bincode::serde::encode_into_std_write(self, &mut writer, bincode::config::standard())?;
        std::io::Write::flush(&mut writer)?;
        Ok(())
    }

    /// Load a catalog from a binary file, checking magic bytes and version.
    pub fn load_from_binary<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path)?;
        let mut reader = std::io::BufReader::new(file);
        let mut magic = [0u8; 11];
        std::io::Read::read_exact(&mut reader, &mut magic)?;
        if &magic != CACHE_MAGIC {
            anyhow::bail!("Invalid magic bytes: expected 'MOOSEBLOCKS'");
        }
        let mut version_bytes = [0u8; 4];
        std::io::Read::read_exact(&mut reader, &mut version_bytes)?;
        let version = u32::from_le_bytes(version_bytes);
        if version != CACHE_VERSION {
            anyhow::bail!("Unsupported version: {}", version);
        }
        let doc: CatalogDoc =
            bincode::serde::decode_from_std_read(&mut reader, bincode::config::standard())?;
        Ok(doc)
    }
}
