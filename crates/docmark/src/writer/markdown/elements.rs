//! The tag table of the Markdown writer.

use crate::tree::Attributes;

use super::MarkdownWriter;
use super::lists::ListContext;
use super::tables::TableContext;

/// What a tag writes when it opens and closes.
pub(super) struct MarkdownElement {
    pub start: String,
    pub end: End,
    pub scope: Scope,
    pub anchor: AnchorPosition,
}

/// Output of a closing tag.
#[derive(Debug)]
pub(super) enum End {
    Text(String),
    /// A newline ending the item. Only the first item close after an item
    /// opened writes it, so an item ending right after a nested list adds no
    /// blank line.
    ListItem,
    /// Folds the row width into the table.
    Row,
    /// Leaves the cell and writes the cell border.
    Cell,
    /// Fills the header separator and ends the table.
    Table,
}

/// Context installed for the element's children.
pub(super) enum Scope {
    Inherit,
    List(ListContext),
    Table(TableContext),
}

/// Where the `id` anchor goes relative to the start token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum AnchorPosition {
    Before,
    After,
}

impl MarkdownElement {
    fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: End::Text(end.into()),
            scope: Scope::Inherit,
            anchor: AnchorPosition::After,
        }
    }

    fn symmetric(delimiter: &str) -> Self {
        Self::new(delimiter, delimiter)
    }

    /// Writes nothing; children pass through.
    fn transparent() -> Self {
        Self::new("", "")
    }

    fn with_end(mut self, end: End) -> Self {
        self.end = end;
        self
    }

    fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }
}

impl MarkdownWriter {
    /// Looks up the handler for `tag`.
    pub(super) fn element_for(&mut self, tag: &str, attributes: &Attributes) -> MarkdownElement {
        match tag {
            "p" => self.paragraph(),
            "br" => MarkdownElement::new("", "  \n"),
            "ul" => self.list(false),
            "ol" => self.list(true),
            "li" => self.list_item(),
            "strong" => MarkdownElement::symmetric("**"),
            "em" => MarkdownElement::symmetric(self.options.emphasis_delimiter()),
            "ins" => MarkdownElement::new("[", "]{.ul}"),
            "a" => link(attributes),
            "img" => image(attributes),
            "table" => MarkdownElement::transparent()
                .with_end(End::Table)
                .with_scope(Scope::Table(TableContext::default())),
            "tr" => self.table_row(),
            "td" | "th" => self.table_cell(),
            _ => match heading_level(tag) {
                Some(level) => MarkdownElement::new(format!("{} ", "#".repeat(level)), "\n\n"),
                None => MarkdownElement::transparent(),
            },
        }
    }

    fn in_cell(&self) -> bool {
        self.table.as_ref().is_some_and(|table| table.in_cell)
    }

    fn paragraph(&self) -> MarkdownElement {
        // Cells cannot hold blank lines.
        if self.in_cell() {
            MarkdownElement::symmetric(" ")
        } else {
            MarkdownElement::symmetric("\n\n")
        }
    }

    fn list(&self, is_ordered: bool) -> MarkdownElement {
        let parent = self.list.as_ref();
        let (start, end) = match parent {
            Some(_) => ("\n", ""),
            None => ("", "\n"),
        };
        MarkdownElement::new(start, end)
            .with_scope(Scope::List(ListContext::nested_in(parent, is_ordered)))
    }

    fn list_item(&mut self) -> MarkdownElement {
        self.item_closed = false;
        let marker = match self.list.as_mut() {
            Some(list) => list.next_item(),
            None => ListContext::nested_in(None, false).next_item(),
        };
        MarkdownElement::new(marker, "").with_end(End::ListItem)
    }

    fn table_row(&mut self) -> MarkdownElement {
        let Some(table) = self.table.as_mut() else {
            return MarkdownElement::transparent();
        };
        table.start_row();
        if table.rows == 2 && table.separator.is_none() {
            let slot = self.reserve_separator();
            if let Some(table) = self.table.as_mut() {
                table.separator = Some(slot);
            }
        }
        MarkdownElement::new("\n|", "").with_end(End::Row)
    }

    fn table_cell(&mut self) -> MarkdownElement {
        match self.table.as_mut() {
            Some(table) => {
                table.start_cell();
                MarkdownElement::transparent().with_end(End::Cell)
            }
            None => MarkdownElement::transparent(),
        }
    }
}

fn link(attributes: &Attributes) -> MarkdownElement {
    match attributes.get("href").filter(|href| !href.is_empty()) {
        Some(href) => MarkdownElement {
            anchor: AnchorPosition::Before,
            ..MarkdownElement::new("[", format!("]({href})"))
        },
        None => MarkdownElement::transparent(),
    }
}

fn image(attributes: &Attributes) -> MarkdownElement {
    let src = attributes.get("src").map_or("", |src| src.as_str());
    let alt = attributes.get("alt").map_or("", |alt| alt.as_str());
    if src.is_empty() && alt.is_empty() {
        return MarkdownElement::transparent();
    }
    MarkdownElement::new(format!("![{alt}]({src})"), "")
}

fn heading_level(tag: &str) -> Option<usize> {
    tag.strip_prefix('h')?
        .parse()
        .ok()
        .filter(|level| (1..=6).contains(level))
}
