//! Editing operations on working block trees.
//!
//! Concrete blocks are only ever created by cloning an exemplar (or by the
//! GetPot parser). Exemplars themselves are never modified.

use crate::error::{Error, Result};
use crate::model::*;
use crate::schema::TYPE_PARAMETER;
use tracing::debug;

/// Shown as the only choice when no variables have been declared yet.
pub const NO_VARIABLES_PLACEHOLDER: &str = "Create a Variable";

/// Deep-copy an exemplar into a fresh concrete block.
///
/// Parameters are reset to their schema defaults, so only required
/// parameters are active. The copy keeps its own exemplars and variants so
/// that it can be extended further, but starts without children.
pub fn clone_exemplar(exemplar: &Block) -> Block {
    let mut block = exemplar.clone();
    block.active = true;
    block.children.clear();
    for param in &mut block.parameters {
        param.reset_activation();
    }
    block
}

impl Block {
    /// Clone the exemplar called `exemplar` and append it as a child,
    /// renamed to `new_name` if given. Returns the new child.
    pub fn instantiate(&mut self, exemplar: &str, new_name: Option<&str>) -> Result<&mut Block> {
        let template = self.exemplar(exemplar).ok_or_else(|| Error::UnknownExemplar {
            block: self.name.clone(),
            exemplar: exemplar.to_string(),
        })?;
        let mut child = clone_exemplar(template);
        if let Some(name) = new_name {
            child.name = name.to_string();
        }
        self.children.push(child);
        let idx = self.children.len() - 1;
        Ok(&mut self.children[idx])
    }

    /// Switch an adaptive block to the shape called `variant`.
    ///
    /// The block takes the variant's parameters (reset to their defaults) and
    /// exemplars. The `type` parameter is set to the variant name and made
    /// active; it is added in front if the variant does not declare one.
    pub fn select_variant(&mut self, variant: &str) -> Result<()> {
        let adaptive = self.adaptive.as_mut().ok_or_else(|| Error::NotAdaptive {
            block: self.name.clone(),
        })?;
        let shape = adaptive
            .variants
            .get(variant)
            .ok_or_else(|| Error::UnknownVariant {
                block: self.name.clone(),
                variant: variant.to_string(),
            })?;

        let mut parameters = shape.parameters.clone();
        let exemplars = shape.exemplars.clone();
        let selector = adaptive.selector.clone();
        adaptive.selected = Some(variant.to_string());

        for param in &mut parameters {
            param.reset_activation();
        }
        match parameters.iter_mut().find(|p| p.name == selector) {
            Some(p) => {
                p.value = variant.to_string();
                p.active = true;
            }
            None => parameters.insert(
                0,
                Parameter {
                    name: selector.clone(),
                    cpp_type: "std::string".to_string(),
                    value: variant.to_string(),
                    required: true,
                    active: true,
                    ..Default::default()
                },
            ),
        }

        self.parameters = parameters;
        self.exemplars = exemplars;
        if selector == TYPE_PARAMETER {
            self.block_type = variant.to_string();
        }
        Ok(())
    }
}

impl Catalog {
    /// Attach schema information to a forest read from a GetPot file.
    ///
    /// Top-level blocks are matched by name. Sub-blocks are matched among the
    /// exemplars of their parent's schema block: by name first, then by the
    /// value of their `type` parameter, then through the `*` exemplar.
    ///
    /// A matched block receives the exemplars and variants of its schema
    /// block, and the variant named by its `type` parameter is selected.
    /// Parameters present in the file take the schema's type, default,
    /// required flag and allowed values; schema parameters missing from the
    /// file are appended inactive with their default value.
    ///
    /// Returns the slash paths of blocks with no schema counterpart.
    pub fn bind(&self, blocks: &mut [Block]) -> Vec<String> {
        let mut unmatched = Vec::new();
        for block in blocks.iter_mut() {
            let path = block.name.clone();
            match self.block(&block.name) {
                Some(template) => bind_block(block, template, &path, &mut unmatched),
                None => unmatched.push(path),
            }
        }
        debug!(
            target: "mooseblocks::operations",
            "bound {} blocks, {} without schema counterpart",
            blocks.len(),
            unmatched.len()
        );
        unmatched
    }
}

fn bind_block(block: &mut Block, template: &Block, path: &str, unmatched: &mut Vec<String>) {
    if let Some(adaptive) = &template.adaptive {
        let mut adaptive = adaptive.clone();
        match block.parameter(&adaptive.selector).map(|p| p.value.as_str()) {
            Some(value) if adaptive.variants.contains_key(value) => {
                adaptive.selected = Some(value.to_string());
            }
            Some(value) => debug!(
                target: "mooseblocks::operations",
                "{}: '{}' is not a known variant",
                path,
                value
            ),
            None => {}
        }
        block.adaptive = Some(adaptive);
    }

    let selected = block.adaptive.as_ref().and_then(|a| a.selected.clone());
    let shape = selected
        .as_deref()
        .and_then(|name| template.adaptive.as_ref()?.variants.get(name))
        .unwrap_or(template);

    block.exemplars = shape.exemplars.clone();
    for param in &mut block.parameters {
        if let Some(schema) = shape.parameter(&param.name) {
            param.cpp_type = schema.cpp_type.clone();
            param.default_value = schema.default_value.clone();
            param.group_name = schema.group_name.clone();
            param.required = schema.required;
            param.options = schema.options.clone();
            if param.description.is_empty() {
                param.description = schema.description.clone();
            }
        }
    }
    for schema in &shape.parameters {
        if block.parameter(&schema.name).is_none() {
            let mut param = schema.clone();
            param.value = param.default_value.clone();
            param.active = false;
            block.parameters.push(param);
        }
    }

    for child in &mut block.children {
        let child_path = format!("{}/{}", path, child.name);
        let exemplar = shape
            .exemplar(&child.name)
            .or_else(|| {
                child
                    .parameter(TYPE_PARAMETER)
                    .and_then(|t| shape.exemplar(&t.value))
            })
            .or_else(|| shape.exemplar("*"));
        match exemplar {
            Some(exemplar) => bind_block(child, exemplar, &child_path, unmatched),
            None => unmatched.push(child_path),
        }
    }
}

/// Offer declared variable names as the allowed values of every `variable`
/// parameter.
///
/// Outside `Aux*` blocks the choices are the children of `Variables`, and a
/// value that is not among them is replaced by the first choice. Under
/// `AuxKernels` the choices are the children of `AuxVariables` and values are
/// left alone.
pub fn link_variable_options(blocks: &mut [Block]) {
    let names_of = |blocks: &[Block], name: &str| -> Option<Vec<String>> {
        blocks
            .iter()
            .find(|b| b.name == name)
            .map(|b| b.children.iter().map(|c| c.name.clone()).collect())
    };

    if let Some(mut vars) = names_of(blocks, "Variables") {
        if vars.is_empty() {
            vars.push(NO_VARIABLES_PLACEHOLDER.to_string());
        }
        for root in blocks.iter_mut() {
            apply_options(root, "", &mut |parent, param| {
                if parent.contains("Aux") {
                    return;
                }
                if !vars.contains(&param.value) {
                    param.value = vars[0].clone();
                }
                param.options = vars.clone();
            });
        }
    }

    if let Some(aux_vars) = names_of(blocks, "AuxVariables") {
        for root in blocks.iter_mut() {
            apply_options(root, "", &mut |parent, param| {
                if parent.contains("AuxKernels") {
                    param.options = aux_vars.clone();
                }
            });
        }
    }
}

/// Visit every `variable` parameter, passing the name of the block's parent.
fn apply_options<F>(block: &mut Block, parent: &str, f: &mut F)
where
    F: FnMut(&str, &mut Parameter),
{
    if let Some(param) = block.parameter_mut("variable") {
        f(parent, param);
    }
    let name = block.name.clone();
    for child in &mut block.children {
        apply_options(child, &name, f);
    }
}
