//! Error and warning types for schema loading, editing and GetPot parsing.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors produced while loading schemas or editing block trees.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The schema root or one of its `parameters` / `subblocks` keys has the wrong shape.
    #[error("{}", with_path("Malformed schema", .path.as_ref(), .message))]
    SchemaFormat {
        /// Schema file, when loaded from disk.
        path: Option<Utf8PathBuf>,
        /// Human-readable error message.
        message: String,
    },

    /// A schema or syntax source could not be read.
    #[error("{}", with_path("Source unavailable", .path.as_ref(), .message))]
    SourceUnavailable {
        /// Path that was requested, if any.
        path: Option<Utf8PathBuf>,
        /// Human-readable error message.
        message: String,
    },

    /// A parameter with this name already exists on the block.
    #[error("block '{block}' already has a parameter named '{parameter}'")]
    DuplicateParameter { block: String, parameter: String },

    /// The block has no exemplar with this name.
    #[error("block '{block}' has no exemplar named '{exemplar}'")]
    UnknownExemplar { block: String, exemplar: String },

    /// The adaptive block has no variant with this name.
    #[error("block '{block}' has no variant named '{variant}'")]
    UnknownVariant { block: String, variant: String },

    /// Variant selection was requested on a block without variants.
    #[error("block '{block}' is not adaptive")]
    NotAdaptive { block: String },

    /// A parameter search pattern is not a valid regular expression.
    #[error("invalid search pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

fn with_path(kind: &str, path: Option<&Utf8PathBuf>, message: &str) -> String {
    match path {
        Some(p) => format!("{kind} ({p}): {message}"),
        None => format!("{kind}: {message}"),
    }
}

impl Error {
    pub(crate) fn schema(message: impl Into<String>) -> Self {
        Self::SchemaFormat {
            path: None,
            message: message.into(),
        }
    }

    /// Attach a source path to errors that carry one and don't have it yet.
    pub fn with_source_path(self, source: &camino::Utf8Path) -> Self {
        match self {
            Self::SchemaFormat { path: None, message } => Self::SchemaFormat {
                path: Some(source.to_path_buf()),
                message,
            },
            Self::SourceUnavailable { path: None, message } => Self::SourceUnavailable {
                path: Some(source.to_path_buf()),
                message,
            },
            other => other,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// One GetPot line the parser could not use. Parsing always continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// 1-based line number.
    pub line: usize,
    /// The offending line, untrimmed.
    pub text: String,
    pub reason: String,
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {} ({})", self.line, self.reason, self.text.trim())
    }
}
