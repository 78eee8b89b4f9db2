//! MOOSE schema loading.
//!
//! Turns the YAML block description dumped by a MOOSE application into a
//! [`Catalog`] of exemplar blocks. Sub-modules:
//!
//! - [`raw`] – serde mirror of the YAML layout
//! - [`syntax`] – action syntax listings
//! - [`source`] – file I/O abstraction

pub mod raw;
pub mod source;
pub mod syntax;

pub use source::*;
pub use syntax::load_action_syntax;

use crate::error::{Error, Result};
use crate::model::*;
use camino::Utf8Path;
use indexmap::IndexMap;
use raw::{RawBlock, RawParameter, named_entries, required_flag, scalar_text};
use tracing::{debug, warn};

/// Name of the schema group whose sub-blocks are the alternative shapes of
/// the enclosing block.
pub const TYPE_GROUP: &str = "<type>";

/// Parameter that selects among alternative shapes.
pub const TYPE_PARAMETER: &str = "type";

const YAML_START_MARKER: &str = "**START YAML DATA**";
const YAML_END_MARKER: &str = "**END YAML DATA**";

/// Load a catalog from YAML schema text and an optional action syntax listing.
pub fn load_schema(yaml: &str, action_syntax: Option<&str>) -> Result<Catalog> {
    let yaml = strip_markers(yaml);
    if yaml.trim().is_empty() {
        return Err(Error::schema("schema is empty"));
    }
    let root: serde_yaml::Value =
        serde_yaml::from_str(yaml).map_err(|e| Error::schema(format!("invalid YAML: {}", e)))?;
    if root.is_null() {
        return Err(Error::schema("schema is empty"));
    }

    let mut blocks = Vec::new();
    for raw in named_entries::<RawBlock>(root, "schema root")? {
        let mut block = convert_block(raw)?;
        block.active = true;
        blocks.push(block);
    }
    let action_syntax = action_syntax.map(load_action_syntax).unwrap_or_default();
    debug!(
        target: "mooseblocks::schema",
        "loaded {} top-level blocks, {} action syntax paths",
        blocks.len(),
        action_syntax.len()
    );
    Ok(Catalog {
        blocks,
        action_syntax,
    })
}

/// MOOSE brackets its YAML dump with marker lines when other output is mixed in.
fn strip_markers(text: &str) -> &str {
    let Some(start) = text.find(YAML_START_MARKER) else {
        return text;
    };
    let body = &text[start + YAML_START_MARKER.len()..];
    match body.find(YAML_END_MARKER) {
        Some(end) => &body[..end],
        None => body,
    }
}

fn convert_block(raw: RawBlock) -> Result<Block> {
    let full_name = raw
        .name
        .ok_or_else(|| Error::schema("block entry without a name"))?;
    let name = full_name.rsplit('/').next().unwrap_or_default().to_string();

    let mut block = Block {
        name,
        block_type: scalar_text(&raw.block_type, "type")?,
        description: scalar_text(&raw.description, "description")?,
        ..Default::default()
    };

    let params_at = format!("'parameters' of '{}'", full_name);
    for raw_param in named_entries::<RawParameter>(raw.parameters, &params_at)? {
        let param = convert_parameter(raw_param)?;
        block
            .add_parameter(param)
            .map_err(|e| Error::schema(format!("in block '{}': {}", full_name, e)))?;
    }

    let subblocks_at = format!("'subblocks' of '{}'", full_name);
    for sub in named_entries::<RawBlock>(raw.subblocks, &subblocks_at)? {
        block.exemplars.push(convert_block(sub)?);
    }

    resolve_type_group(&mut block, &full_name);
    Ok(block)
}

fn convert_parameter(raw: RawParameter) -> Result<Parameter> {
    let name = raw
        .name
        .ok_or_else(|| Error::schema("parameter entry without a name"))?;
    let default_value = scalar_text(&raw.default, "default")?;
    let required = required_flag(&raw.required, &name)?;
    let options = scalar_text(&raw.options, "options")?
        .split_whitespace()
        .map(str::to_string)
        .collect();
    Ok(Parameter {
        cpp_type: scalar_text(&raw.cpp_type, "cpp_type")?,
        value: default_value.clone(),
        default_value,
        description: scalar_text(&raw.description, "description")?,
        group_name: scalar_text(&raw.group_name, "group_name")?,
        required,
        active: required,
        options,
        name,
    })
}

/// Replace a `<type>` exemplar group with adaptive variants on `block`.
///
/// Each variant inherits the parameters and exemplars of `block` it does not
/// declare itself, appended after its own.
fn resolve_type_group(block: &mut Block, path: &str) {
    let Some(idx) = block.exemplars.iter().position(|e| e.name == TYPE_GROUP) else {
        return;
    };
    let group = block.exemplars.remove(idx);
    let mut variants: IndexMap<String, Block> = IndexMap::new();
    for mut variant in group.exemplars {
        for param in &block.parameters {
            if variant.parameter(&param.name).is_none() {
                variant.parameters.push(param.clone());
            }
        }
        for exemplar in &block.exemplars {
            if variant.exemplar(&exemplar.name).is_none() {
                variant.exemplars.push(exemplar.clone());
            }
        }
        if variants.contains_key(&variant.name) {
            warn!(
                target: "mooseblocks::schema",
                "{}: duplicate variant '{}', keeping the last one",
                path,
                variant.name
            );
        }
        variants.insert(variant.name.clone(), variant);
    }
    debug!(
        target: "mooseblocks::schema",
        "{} is adaptive with {} variants",
        path,
        variants.len()
    );
    block.adaptive = Some(AdaptiveVariants {
        selector: TYPE_PARAMETER.to_string(),
        selected: None,
        variants,
    });
}

// ────────────────────────────────────────────────────────────────────────────
// File loading
// ────────────────────────────────────────────────────────────────────────────

/// Loads schemas and action syntax through a [`ContentSource`].
pub struct SchemaLoader<S: ContentSource> {
    source: S,
}

impl<S: ContentSource> SchemaLoader<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Load `<app>.yaml` together with the sibling `<app>.syntax`, if present.
    pub fn load_schema_file(&mut self, path: impl AsRef<Utf8Path>) -> Result<Catalog> {
        let path = path.as_ref();
        let yaml = self.source.read_to_string(path)?;
        let syntax_path = path.with_extension("syntax");
        let syntax = match self.source.read_to_string(&syntax_path) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(target: "mooseblocks::schema", "skipping action syntax: {}", e);
                None
            }
        };
        load_schema(&yaml, syntax.as_deref()).map_err(|e| e.with_source_path(path))
    }

    /// Read an action syntax file. Missing paths and unreadable files yield
    /// `None` and are logged; this never fails.
    pub fn load_action_syntax_file(&mut self, path: Option<&Utf8Path>) -> Option<Vec<String>> {
        let path = match path {
            Some(p) if !p.as_str().is_empty() => p,
            _ => {
                debug!(target: "mooseblocks::schema", "no action syntax file given");
                return None;
            }
        };
        match self.source.read_to_string(path) {
            Ok(text) => Some(load_action_syntax(&text)),
            Err(e) => {
                warn!(target: "mooseblocks::schema", "{}", e);
                None
            }
        }
    }
}
