//! Render block-structured JSON documents (the Editor.js output format) to HTML.
//!
//! A document is an object with a `blocks` array; each entry names its `type`
//! and carries the fields for that type under `data`. Entries are decoded into
//! [`Block`] values, then each block is rendered to an HTML fragment and the
//! fragments are concatenated in document order.
//!
//! Block text is treated as trusted HTML and passed through without escaping.

mod block;
mod config;
mod error;
mod html;
mod parser;
mod stack;

pub use block::{Block, BlockKind, List, ListItem, ListStyle};
pub use config::{BlocksConfig, Config, InvalidBlockPolicy, ListConfig};
pub use error::{ConfigError, RenderError};

/// Parse a JSON document into blocks.
///
/// Returns `Ok(None)` if the text is not JSON or lacks a `blocks` array.
pub fn parse(source: &str, config: &Config) -> Result<Option<Vec<Block>>, RenderError> {
    parser::parse(source, config)
}

/// Render already decoded blocks to HTML.
pub fn blocks_to_html(blocks: &[Block]) -> String {
    html::blocks_to_html(blocks)
}

/// Convert a JSON document to HTML using the default config.
///
/// `Ok(None)` means the input is not a document and there is nothing to render.
pub fn render(source: &str) -> Result<Option<String>, RenderError> {
    render_with_config(source, &Config::compiled_default())
}

/// Convert a JSON document to HTML with custom config.
pub fn render_with_config(source: &str, config: &Config) -> Result<Option<String>, RenderError> {
    let blocks = parse(source, config)?;
    Ok(blocks.map(|blocks| blocks_to_html(&blocks)))
}
