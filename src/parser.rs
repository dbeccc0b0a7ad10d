use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::block::{Block, BlockKind, List, ListItem, ListStyle};
use crate::config::{Config, InvalidBlockPolicy};
use crate::error::RenderError;
use crate::stack;

/// Parse a JSON document into a list of blocks.
///
/// Returns `Ok(None)` when the text is not JSON or has no `blocks` array.
/// Entries without `type` or `data`, and entries of unregistered or disabled
/// types, are skipped.
pub fn parse(source: &str, config: &Config) -> Result<Option<Vec<Block>>, RenderError> {
    let Some(document) = decode_document(source) else {
        return Ok(None);
    };
    let blocks = parse_document(&document, config);
    stack::dispose(document);
    blocks
}

fn parse_document(document: &Value, config: &Config) -> Result<Option<Vec<Block>>, RenderError> {
    let Some(entries) = document.get("blocks").and_then(Value::as_array) else {
        debug!("document has no blocks array");
        return Ok(None);
    };

    let mut blocks = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let Some((kind, data)) = resolve_entry(index, entry, config) else {
            continue;
        };
        match decode_block(kind, data, config) {
            Ok(block) => blocks.push(block),
            Err(e) if config.blocks.on_invalid == InvalidBlockPolicy::Skip => {
                warn!(index, error = %e, "skipping invalid block");
            }
            Err(e) => return Err(e),
        }
    }

    Ok(Some(blocks))
}

/// Decode without serde_json's recursion limit. Nesting anywhere in the
/// document grows the stack onto the heap instead of overflowing it.
fn decode_document(source: &str) -> Option<Value> {
    let mut deserializer = serde_json::Deserializer::from_str(source);
    deserializer.disable_recursion_limit();
    let stacked = serde_stacker::Deserializer::new(&mut deserializer);
    let decoded = Value::deserialize(stacked).and_then(|value| match deserializer.end() {
        Ok(()) => Ok(value),
        Err(e) => {
            stack::dispose(value);
            Err(e)
        }
    });
    match decoded {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(error = %e, "document is not valid JSON");
            None
        }
    }
}

fn resolve_entry<'a>(
    index: usize,
    entry: &'a Value,
    config: &Config,
) -> Option<(BlockKind, &'a Value)> {
    let (Some(type_name), Some(data)) = (entry.get("type"), entry.get("data")) else {
        debug!(index, "skipping block without type or data");
        return None;
    };
    if data.is_null() {
        debug!(index, "skipping block with null data");
        return None;
    }
    let Some(kind) = type_name.as_str().and_then(BlockKind::from_name) else {
        debug!(index, block_type = %type_name, "skipping unregistered block type");
        return None;
    };
    if !config.blocks.is_enabled(kind) {
        debug!(index, block_type = kind.name(), "skipping disabled block type");
        return None;
    }
    Some((kind, data))
}

fn decode_block(kind: BlockKind, data: &Value, config: &Config) -> Result<Block, RenderError> {
    let fields = Fields::new(kind, data, "data")?;

    let block = match kind {
        BlockKind::Header => Block::Header {
            text: fields.string("text")?,
            level: fields.heading_level("level")?,
        },
        BlockKind::Paragraph => Block::Paragraph {
            text: fields.string("text")?,
        },
        BlockKind::Marker => Block::Marker {
            text: fields.string("text")?,
        },
        BlockKind::List => Block::List(List {
            style: ListStyle::from_name(&fields.string("style")?),
            items: list_items(fields.array("items")?, config)?,
        }),
        BlockKind::Table => Block::Table {
            with_headings: fields.boolean("withHeadings")?,
            rows: table_rows(fields.array("content")?)?,
        },
        BlockKind::Warning => Block::Warning {
            title: fields.string("title")?,
            message: fields.string("message")?,
        },
        BlockKind::Raw => Block::Raw {
            html: fields.string("html")?,
        },
    };

    Ok(block)
}

fn list_items(values: &[Value], config: &Config) -> Result<Vec<ListItem>, RenderError> {
    values
        .iter()
        .map(|value| -> Result<ListItem, RenderError> {
            let fields = Fields::new(BlockKind::List, value, "items")?;
            let content = fields.string("content")?;
            let nested = match fields.optional_array("items")? {
                None => None,
                Some([]) if !config.list.empty_wrapper => None,
                Some(children) => Some(stack::guarded(|| list_items(children, config))?),
            };
            Ok(ListItem { content, nested })
        })
        .collect()
}

fn table_rows(values: &[Value]) -> Result<Vec<Vec<String>>, RenderError> {
    let invalid = || RenderError::InvalidField {
        block: BlockKind::Table,
        field: "content",
        expected: "an array of rows of string cells",
    };

    values
        .iter()
        .map(|row| -> Result<Vec<String>, RenderError> {
            row.as_array()
                .ok_or_else(invalid)?
                .iter()
                .map(|cell| cell.as_str().map(str::to_owned).ok_or_else(invalid))
                .collect()
        })
        .collect()
}

/// Typed access to the named fields of one block's `data` object.
///
/// A field holding `null` counts as missing.
struct Fields<'a> {
    block: BlockKind,
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    fn new(block: BlockKind, value: &'a Value, field: &'static str) -> Result<Self, RenderError> {
        let map = value.as_object().ok_or(RenderError::InvalidField {
            block,
            field,
            expected: "an object",
        })?;
        Ok(Self { block, map })
    }

    fn optional(&self, field: &'static str) -> Option<&'a Value> {
        self.map.get(field).filter(|value| !value.is_null())
    }

    fn required(&self, field: &'static str) -> Result<&'a Value, RenderError> {
        self.optional(field).ok_or(RenderError::MissingField {
            block: self.block,
            field,
        })
    }

    fn invalid(&self, field: &'static str, expected: &'static str) -> RenderError {
        RenderError::InvalidField {
            block: self.block,
            field,
            expected,
        }
    }

    fn string(&self, field: &'static str) -> Result<String, RenderError> {
        self.required(field)?
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| self.invalid(field, "a string"))
    }

    fn boolean(&self, field: &'static str) -> Result<bool, RenderError> {
        self.required(field)?
            .as_bool()
            .ok_or_else(|| self.invalid(field, "a boolean"))
    }

    fn array(&self, field: &'static str) -> Result<&'a [Value], RenderError> {
        self.required(field)?
            .as_array()
            .map(Vec::as_slice)
            .ok_or_else(|| self.invalid(field, "an array"))
    }

    fn optional_array(&self, field: &'static str) -> Result<Option<&'a [Value]>, RenderError> {
        self.optional(field)
            .map(|value| {
                value
                    .as_array()
                    .map(Vec::as_slice)
                    .ok_or_else(|| self.invalid(field, "an array"))
            })
            .transpose()
    }

    fn heading_level(&self, field: &'static str) -> Result<u8, RenderError> {
        self.required(field)?
            .as_u64()
            .filter(|level| (1..=6).contains(level))
            .and_then(|level| u8::try_from(level).ok())
            .ok_or_else(|| self.invalid(field, "an integer from 1 to 6"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_default(source: &str) -> Result<Option<Vec<Block>>, RenderError> {
        parse(source, &Config::default())
    }

    fn skip_config() -> Config {
        let mut config = Config::default();
        config.blocks.on_invalid = InvalidBlockPolicy::Skip;
        config
    }

    #[test]
    fn invalid_json_is_no_document() {
        assert_eq!(parse_default("not json"), Ok(None));
        assert_eq!(parse_default(""), Ok(None));
        assert_eq!(parse_default(r#"{"blocks": []} trailing"#), Ok(None));
    }

    #[test]
    fn missing_blocks_is_no_document() {
        assert_eq!(parse_default("{}"), Ok(None));
        assert_eq!(parse_default(r#"{"time": 1, "version": "2.28"}"#), Ok(None));
        assert_eq!(parse_default("[]"), Ok(None));
        assert_eq!(parse_default(r#"{"blocks": {}}"#), Ok(None));
    }

    #[test]
    fn empty_blocks() {
        assert_eq!(parse_default(r#"{"blocks": []}"#), Ok(Some(vec![])));
    }

    #[test]
    fn header() {
        let blocks = parse_default(r#"{"blocks":[{"type":"header","data":{"text":"Hi","level":2}}]}"#);
        assert_eq!(
            blocks,
            Ok(Some(vec![Block::Header {
                level: 2,
                text: "Hi".to_string()
            }]))
        );
    }

    #[test]
    fn incomplete_and_unknown_entries_are_skipped() {
        let source = r#"{"blocks":[
            {"type":"paragraph"},
            {"data":{"text":"orphan"}},
            {"type":"bogus","data":{}},
            {"type":7,"data":{}},
            {"type":"paragraph","data":null},
            "not a block",
            {"type":"paragraph","data":{"text":"kept"}}
        ]}"#;
        assert_eq!(
            parse_default(source),
            Ok(Some(vec![Block::Paragraph {
                text: "kept".to_string()
            }]))
        );
    }

    #[test]
    fn extra_fields_are_ignored() {
        let source = r#"{"blocks":[{"id":"x1","type":"table","data":{"withHeadings":false,"stretched":true,"content":[["a"]]}}]}"#;
        assert_eq!(
            parse_default(source),
            Ok(Some(vec![Block::Table {
                with_headings: false,
                rows: vec![vec!["a".to_string()]]
            }]))
        );
    }

    #[test]
    fn missing_field_is_an_error() {
        let source = r#"{"blocks":[{"type":"header","data":{"text":"Hi"}}]}"#;
        assert_eq!(
            parse_default(source),
            Err(RenderError::MissingField {
                block: BlockKind::Header,
                field: "level"
            })
        );
    }

    #[test]
    fn null_field_counts_as_missing() {
        let source = r#"{"blocks":[{"type":"warning","data":{"title":"T","message":null}}]}"#;
        assert_eq!(
            parse_default(source),
            Err(RenderError::MissingField {
                block: BlockKind::Warning,
                field: "message"
            })
        );
    }

    #[test]
    fn heading_level_out_of_range() {
        for level in ["0", "7", "-1", "2.5", "\"2\""] {
            let source =
                format!(r#"{{"blocks":[{{"type":"header","data":{{"text":"x","level":{level}}}}}]}}"#);
            assert_eq!(
                parse_default(&source),
                Err(RenderError::InvalidField {
                    block: BlockKind::Header,
                    field: "level",
                    expected: "an integer from 1 to 6"
                }),
                "level {level}"
            );
        }
    }

    #[test]
    fn data_must_be_an_object() {
        let source = r#"{"blocks":[{"type":"raw","data":"<b>x</b>"}]}"#;
        assert_eq!(
            parse_default(source),
            Err(RenderError::InvalidField {
                block: BlockKind::Raw,
                field: "data",
                expected: "an object"
            })
        );
    }

    #[test]
    fn table_cells_must_be_strings() {
        let source = r#"{"blocks":[{"type":"table","data":{"withHeadings":true,"content":[["a", 1]]}}]}"#;
        assert!(matches!(
            parse_default(source),
            Err(RenderError::InvalidField {
                block: BlockKind::Table,
                field: "content",
                ..
            })
        ));
    }

    #[test]
    fn skip_policy_drops_invalid_block() {
        let source = r#"{"blocks":[
            {"type":"paragraph","data":{"text":"a"}},
            {"type":"header","data":{"text":"no level"}},
            {"type":"paragraph","data":{"text":"b"}}
        ]}"#;
        assert_eq!(
            parse(source, &skip_config()),
            Ok(Some(vec![
                Block::Paragraph {
                    text: "a".to_string()
                },
                Block::Paragraph {
                    text: "b".to_string()
                },
            ]))
        );
    }

    #[test]
    fn disabled_kind_is_skipped() {
        let mut config = Config::default();
        config.blocks.disabled = vec!["raw".to_string()];
        let source = r#"{"blocks":[{"type":"raw","data":{"html":"<hr>"}},{"type":"raw","data":{}}]}"#;
        assert_eq!(parse(source, &config), Ok(Some(vec![])));
    }

    #[test]
    fn list_items_absent_and_empty_both_have_no_children() {
        let source = r#"{"blocks":[{"type":"list","data":{"style":"unordered","items":[
            {"content":"a"},
            {"content":"b","items":[]},
            {"content":"c","items":null}
        ]}}]}"#;
        assert_eq!(
            parse_default(source),
            Ok(Some(vec![Block::List(List {
                style: ListStyle::Unordered,
                items: vec![ListItem::new("a"), ListItem::new("b"), ListItem::new("c")],
            })]))
        );
    }

    #[test]
    fn empty_wrapper_keeps_present_empty_items() {
        let mut config = Config::default();
        config.list.empty_wrapper = true;
        let source = r#"{"blocks":[{"type":"list","data":{"style":"ordered","items":[
            {"content":"a"},
            {"content":"b","items":[]}
        ]}}]}"#;
        assert_eq!(
            parse(source, &config),
            Ok(Some(vec![Block::List(List {
                style: ListStyle::Ordered,
                items: vec![ListItem::new("a"), ListItem::with_nested("b", vec![])],
            })]))
        );
    }

    #[test]
    fn nested_list_item_missing_content() {
        let source = r#"{"blocks":[{"type":"list","data":{"style":"ordered","items":[
            {"content":"a","items":[{"items":[]}]}
        ]}}]}"#;
        assert_eq!(
            parse_default(source),
            Err(RenderError::MissingField {
                block: BlockKind::List,
                field: "content"
            })
        );
    }

    #[test]
    fn deep_nesting_has_no_fixed_limit() {
        let depth = 200;
        let mut items = r#"[{"content":"leaf"}]"#.to_string();
        for level in 0..depth {
            items = format!(r#"[{{"content":"{level}","items":{items}}}]"#);
        }
        let source = format!(r#"{{"blocks":[{{"type":"list","data":{{"style":"ordered","items":{items}}}}}]}}"#);

        let blocks = parse_default(&source).unwrap().unwrap();
        let Block::List(list) = &blocks[0] else {
            panic!("expected a list");
        };
        let mut seen = 0;
        let mut current = &list.items;
        while let Some(nested) = &current[0].nested {
            seen += 1;
            current = nested;
        }
        assert_eq!(seen, depth);
        assert_eq!(current[0].content, "leaf");
    }
}
