use std::fmt::Write;

use crate::block::{Block, ListItem, ListStyle};
use crate::stack;

/// Convert blocks to HTML, concatenating each block's fragment in order.
///
/// Block text is trusted HTML and is emitted without escaping.
pub fn blocks_to_html(blocks: &[Block]) -> String {
    let mut out = String::new();
    for block in blocks {
        emit_block(block, &mut out);
    }
    out
}

fn emit_block(block: &Block, out: &mut String) {
    match block {
        Block::Header { level, text } => {
            // Writing to a String cannot fail
            let _ = write!(out, "<h{level}>{text}</h{level}>");
        }
        Block::Paragraph { text } | Block::Marker { text } => {
            out.push_str("<p>");
            out.push_str(text);
            out.push_str("</p>");
        }
        Block::List(list) => {
            list_to_html(list.style, &list.items, out);
        }
        Block::Table {
            with_headings,
            rows,
        } => {
            table_to_html(*with_headings, rows, out);
        }
        Block::Warning { title, message } => {
            out.push_str("<div role=\"alert\"><h4>");
            out.push_str(title);
            out.push_str("</h4><p>");
            out.push_str(message);
            out.push_str("</p></div>");
        }
        Block::Raw { html } => {
            out.push_str(html);
        }
    }
}

fn list_to_html(style: ListStyle, items: &[ListItem], out: &mut String) {
    let (open, close) = match style {
        ListStyle::Ordered => ("<ol>", "</ol>"),
        ListStyle::Unordered => ("<ul>", "</ul>"),
    };

    out.push_str(open);
    for item in items {
        out.push_str("<li>");
        out.push_str(&item.content);
        // Nested lists inherit the parent's style
        if let Some(nested) = &item.nested {
            stack::guarded(|| list_to_html(style, nested, out));
        }
        out.push_str("</li>");
    }
    out.push_str(close);
}

fn table_to_html(with_headings: bool, rows: &[Vec<String>], out: &mut String) {
    out.push_str("<table>");

    let body = if with_headings {
        // With no rows the heading is still emitted, just empty
        let (head, body) = match rows.split_first() {
            Some((head, body)) => (head.as_slice(), body),
            None => (&[][..], rows),
        };
        out.push_str("<thead>");
        row_to_html(head, out);
        out.push_str("</thead>");
        body
    } else {
        rows
    };

    out.push_str("<tbody>");
    for row in body {
        row_to_html(row, out);
    }
    out.push_str("</tbody></table>");
}

fn row_to_html(cells: &[String], out: &mut String) {
    out.push_str("<tr>");
    for cell in cells {
        out.push_str("<td>");
        out.push_str(cell);
        out.push_str("</td>");
    }
    out.push_str("</tr>");
}
