use thiserror::Error;

use crate::block::BlockKind;

/// Errors raised for recognised blocks whose `data` cannot be rendered.
///
/// Unknown block types and entries without `type`/`data` are never errors;
/// they are skipped while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("`{block}` block is missing required field `{field}`")]
    MissingField {
        block: BlockKind,
        field: &'static str,
    },
    #[error("`{block}` block has invalid field `{field}`: expected {expected}")]
    InvalidField {
        block: BlockKind,
        field: &'static str,
        expected: &'static str,
    },
}

impl RenderError {
    /// The block type the error was raised for.
    pub fn block(&self) -> BlockKind {
        match self {
            RenderError::MissingField { block, .. } | RenderError::InvalidField { block, .. } => {
                *block
            }
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            RenderError::MissingField { field, .. } | RenderError::InvalidField { field, .. } => {
                field
            }
        }
    }
}

/// Errors loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
