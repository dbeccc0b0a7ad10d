use std::fmt;

/// A single list item, which can contain nested items
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub content: String,
    /// None = no child list, Some(items) = child list rendered with the parent's style
    pub nested: Option<Vec<ListItem>>,
}

impl ListItem {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            nested: None,
        }
    }

    pub fn with_nested(content: impl Into<String>, nested: Vec<ListItem>) -> Self {
        Self {
            content: content.into(),
            nested: Some(nested),
        }
    }
}

// Dropped iteratively so arbitrarily deep nesting cannot overflow the stack.
impl Drop for ListItem {
    fn drop(&mut self) {
        let mut pending = self.nested.take().unwrap_or_default();
        while let Some(mut item) = pending.pop() {
            if let Some(nested) = item.nested.take() {
                pending.extend(nested);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStyle {
    Ordered,
    Unordered,
}

impl ListStyle {
    /// Only the exact string "ordered" selects a numbered list.
    pub fn from_name(name: &str) -> Self {
        if name == "ordered" {
            ListStyle::Ordered
        } else {
            ListStyle::Unordered
        }
    }
}

/// A list (ordered or unordered)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    pub style: ListStyle,
    pub items: Vec<ListItem>,
}

/// Block-level elements decoded from a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Header {
        level: u8,
        text: String,
    },
    Paragraph {
        text: String,
    },
    /// The `text` block type, rendered like a paragraph.
    Marker {
        text: String,
    },
    List(List),
    Table {
        with_headings: bool,
        rows: Vec<Vec<String>>,
    },
    Warning {
        title: String,
        message: String,
    },
    Raw {
        html: String,
    },
}

impl Block {
    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Header { .. } => BlockKind::Header,
            Block::Paragraph { .. } => BlockKind::Paragraph,
            Block::Marker { .. } => BlockKind::Marker,
            Block::List(_) => BlockKind::List,
            Block::Table { .. } => BlockKind::Table,
            Block::Warning { .. } => BlockKind::Warning,
            Block::Raw { .. } => BlockKind::Raw,
        }
    }
}

/// The registered block types, keyed by their `type` name in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Header,
    Paragraph,
    Marker,
    List,
    Table,
    Warning,
    Raw,
}

impl BlockKind {
    pub const ALL: [BlockKind; 7] = [
        BlockKind::Header,
        BlockKind::Paragraph,
        BlockKind::Marker,
        BlockKind::List,
        BlockKind::Table,
        BlockKind::Warning,
        BlockKind::Raw,
    ];

    /// Resolve a document `type` name. Returns None for unregistered types.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            BlockKind::Header => "header",
            BlockKind::Paragraph => "paragraph",
            BlockKind::Marker => "text",
            BlockKind::List => "list",
            BlockKind::Table => "table",
            BlockKind::Warning => "warning",
            BlockKind::Raw => "raw",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
