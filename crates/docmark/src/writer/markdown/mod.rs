//! Markdown writer implementation.
//!
//! Markdown has no closing tags, so the writer keeps a stack of pending
//! closing outputs along with the list and table the open elements belong
//! to. Each opened element pushes one frame; closing pops it, writes its end
//! output and restores the enclosing context.

mod elements;
mod escape;
mod lists;
mod tables;

pub(crate) use escape::escape_markdown_text;

use log::{debug, warn};

use self::elements::{AnchorPosition, End};
use self::lists::ListContext;
use self::tables::{TableContext, header_separator};
use crate::math;
use crate::options::MarkdownOptions;
use crate::tree::Attributes;
use crate::writer::Writer;

/// Writes the document tree as Markdown.
#[derive(Debug, Default)]
pub struct MarkdownWriter {
    options: MarkdownOptions,
    fragments: Vec<Fragment>,
    /// Widths of reserved header separators, by slot.
    separators: Vec<usize>,
    stack: Vec<Frame>,
    list: Option<ListContext>,
    table: Option<TableContext>,
    /// Set by the first list item close after an item opened.
    item_closed: bool,
}

#[derive(Debug)]
enum Fragment {
    Text(String),
    /// A header separator, resolved once its table closed.
    Separator(usize),
}

#[derive(Debug)]
struct Frame {
    end: End,
    restore: Restore,
}

/// The context to reinstate when a frame is popped.
#[derive(Debug)]
enum Restore {
    Nothing,
    List(Option<ListContext>),
    Table(Option<TableContext>),
}

impl MarkdownWriter {
    /// A writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// A writer with the given options.
    pub fn with_options(options: MarkdownOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    fn push(&mut self, text: impl Into<String>) {
        let text = text.into();
        if !text.is_empty() {
            self.fragments.push(Fragment::Text(text));
        }
    }

    fn ends_with_blank_line(&self) -> bool {
        matches!(self.fragments.last(), Some(Fragment::Text(text)) if text.ends_with("\n\n"))
    }

    fn write_anchor(&mut self, attributes: &Attributes) {
        if let Some(id) = attributes.get("id").filter(|id| !id.is_empty()) {
            self.push(format!("<a id=\"{id}\"></a>"));
        }
    }

    /// Reserves a header separator at the current position.
    fn reserve_separator(&mut self) -> usize {
        let slot = self.separators.len();
        self.separators.push(0);
        self.fragments.push(Fragment::Separator(slot));
        slot
    }

    fn finish_table(&mut self) -> String {
        let Some(table) = self.table.as_mut() else {
            return String::new();
        };
        table.finish_row();
        let (rows, columns, separator) = (table.rows, table.max_columns, table.separator);
        let slot = match separator {
            Some(slot) => slot,
            // A single row still gets its separator.
            None if rows > 0 => self.reserve_separator(),
            None => return "\n".into(),
        };
        self.separators[slot] = columns;
        "\n".into()
    }

    fn end_output(&mut self, end: End) -> String {
        match end {
            End::Text(text) => text,
            End::ListItem if self.item_closed => String::new(),
            End::ListItem => {
                self.item_closed = true;
                "\n".into()
            }
            End::Row => {
                if let Some(table) = self.table.as_mut() {
                    table.finish_row();
                }
                String::new()
            }
            End::Cell => match self.table.as_mut() {
                Some(table) => {
                    table.in_cell = false;
                    "|".into()
                }
                None => String::new(),
            },
            End::Table => self.finish_table(),
        }
    }
}

impl Writer for MarkdownWriter {
    fn open(&mut self, tag: &str, attributes: &Attributes) {
        let element = self.element_for(tag, attributes);
        let restore = match element.scope {
            elements::Scope::Inherit => Restore::Nothing,
            elements::Scope::List(list) => Restore::List(self.list.replace(list)),
            elements::Scope::Table(table) => Restore::Table(self.table.replace(table)),
        };
        self.stack.push(Frame {
            end: element.end,
            restore,
        });

        if element.anchor == AnchorPosition::Before {
            self.write_anchor(attributes);
        }
        self.push(element.start);
        if element.anchor == AnchorPosition::After {
            self.write_anchor(attributes);
        }
    }

    fn close(&mut self, tag: &str) {
        let Some(frame) = self.stack.pop() else {
            debug!("markdown writer: closing `{tag}` without an open element");
            return;
        };
        let end = self.end_output(frame.end);
        match frame.restore {
            Restore::Nothing => {}
            Restore::List(list) => self.list = list,
            Restore::Table(table) => self.table = table,
        }
        self.push(end);
    }

    fn self_closing(&mut self, tag: &str, attributes: &Attributes) {
        self.open(tag, attributes);
        self.close(tag);
    }

    fn text(&mut self, value: &str) {
        self.push(escape_markdown_text(value));
    }

    fn mathml(&mut self, value: &str) {
        match math::mathml_to_latex(value) {
            Ok(formula) if formula.inline => self.push(format!("${}$", formula.latex)),
            Ok(formula) => {
                let lead = if self.ends_with_blank_line() { "" } else { "\n\n" };
                self.push(format!("{lead}$${}$$\n\n", formula.latex));
            }
            Err(err) => {
                warn!("failed to convert formula, writing it as text: {err}");
                self.text(value);
            }
        }
    }

    fn as_string(&self) -> String {
        let mut out = String::new();
        for fragment in &self.fragments {
            match fragment {
                Fragment::Text(text) => out.push_str(text),
                Fragment::Separator(slot) => {
                    out.push_str(&header_separator(self.separators[*slot]));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> Attributes {
        pairs
            .iter()
            .map(|(key, value)| ((*key).into(), (*value).into()))
            .collect()
    }

    fn open(writer: &mut MarkdownWriter, tag: &str) {
        writer.open(tag, &Attributes::new());
    }

    fn table(writer: &mut MarkdownWriter, rows: &[&[&str]]) {
        open(writer, "table");
        for row in rows {
            open(writer, "tr");
            for cell in *row {
                open(writer, "td");
                writer.text(cell);
                writer.close("td");
            }
            writer.close("tr");
        }
        writer.close("table");
    }

    #[test]
    fn paragraphs_are_separated_by_blank_lines() {
        let mut writer = MarkdownWriter::new();
        open(&mut writer, "p");
        writer.text("Hello");
        writer.close("p");
        assert_eq!(writer.as_string(), "\n\nHello\n\n");
    }

    #[test]
    fn strong_and_emphasis_nest() {
        let mut writer = MarkdownWriter::new();
        open(&mut writer, "strong");
        open(&mut writer, "em");
        writer.text("x");
        writer.close("em");
        writer.close("strong");
        assert_eq!(writer.as_string(), "**_x_**");
    }

    #[test]
    fn emphasis_delimiter_is_configurable() {
        let mut writer = MarkdownWriter::with_options(MarkdownOptions { emphasis: '*' });
        open(&mut writer, "em");
        writer.text("x");
        writer.close("em");
        assert_eq!(writer.as_string(), "*x*");
    }

    #[test]
    fn underline_uses_span_syntax() {
        let mut writer = MarkdownWriter::new();
        open(&mut writer, "ins");
        writer.text("u");
        writer.close("ins");
        assert_eq!(writer.as_string(), "[u]{.ul}");
    }

    #[test]
    fn ordered_list_items_are_numbered() {
        let mut writer = MarkdownWriter::new();
        open(&mut writer, "ol");
        for item in ["a", "b"] {
            open(&mut writer, "li");
            writer.text(item);
            writer.close("li");
        }
        writer.close("ol");
        assert_eq!(writer.as_string(), "1. a\n2. b\n\n");
    }

    #[test]
    fn nested_lists_are_indented() {
        let mut writer = MarkdownWriter::new();
        open(&mut writer, "ul");
        open(&mut writer, "li");
        writer.text("outer");
        open(&mut writer, "ol");
        open(&mut writer, "li");
        writer.text("inner");
        writer.close("li");
        writer.close("ol");
        writer.close("li");
        open(&mut writer, "li");
        writer.text("next");
        writer.close("li");
        writer.close("ul");
        assert_eq!(writer.as_string(), "- outer\n\t1. inner\n- next\n\n");
    }

    #[test]
    fn list_item_outside_list_is_a_bullet() {
        let mut writer = MarkdownWriter::new();
        open(&mut writer, "li");
        writer.text("x");
        writer.close("li");
        assert_eq!(writer.as_string(), "- x\n");
    }

    #[test]
    fn link_writes_anchor_before_bracket() {
        let mut writer = MarkdownWriter::new();
        writer.open("a", &attrs(&[("href", "http://e.com"), ("id", "top")]));
        writer.text("site");
        writer.close("a");
        assert_eq!(writer.as_string(), "<a id=\"top\"></a>[site](http://e.com)");
    }

    #[test]
    fn link_without_href_is_plain_text() {
        let mut writer = MarkdownWriter::new();
        writer.open("a", &attrs(&[("href", "")]));
        writer.text("site");
        writer.close("a");
        assert_eq!(writer.as_string(), "site");
    }

    #[test]
    fn anchor_follows_start_of_other_elements() {
        let mut writer = MarkdownWriter::new();
        writer.open("h2", &attrs(&[("id", "intro")]));
        writer.text("Intro");
        writer.close("h2");
        assert_eq!(writer.as_string(), "## <a id=\"intro\"></a>Intro\n\n");
    }

    #[test]
    fn image_writes_alt_and_source() {
        let mut writer = MarkdownWriter::new();
        writer.self_closing("img", &attrs(&[("src", "data:image/png;base64,AA=="), ("alt", "a")]));
        writer.self_closing("img", &Attributes::new());
        assert_eq!(writer.as_string(), "![a](data:image/png;base64,AA==)");
    }

    #[test]
    fn line_break_is_two_spaces() {
        let mut writer = MarkdownWriter::new();
        writer.text("a");
        writer.self_closing("br", &Attributes::new());
        writer.text("b");
        assert_eq!(writer.as_string(), "a  \nb");
    }

    #[test]
    fn header_separator_sits_under_first_row() {
        let mut writer = MarkdownWriter::new();
        table(&mut writer, &[&["a", "b"], &["c", "d", "e"], &["f"]]);
        assert_eq!(
            writer.as_string(),
            "\n|a|b|\n|:-:|:-:|:-:|\n|c|d|e|\n|f|\n"
        );
    }

    #[test]
    fn single_row_table_gets_separator() {
        let mut writer = MarkdownWriter::new();
        table(&mut writer, &[&["a", "b"]]);
        assert_eq!(writer.as_string(), "\n|a|b|\n|:-:|:-:|\n");
    }

    #[test]
    fn paragraphs_in_cells_stay_on_one_line() {
        let mut writer = MarkdownWriter::new();
        open(&mut writer, "table");
        open(&mut writer, "tr");
        open(&mut writer, "td");
        open(&mut writer, "p");
        writer.text("x");
        writer.close("p");
        writer.close("td");
        writer.close("tr");
        writer.close("table");
        open(&mut writer, "p");
        writer.text("after");
        writer.close("p");
        assert_eq!(writer.as_string(), "\n| x |\n|:-:|\n\n\nafter\n\n");
    }

    #[test]
    fn nested_tables_keep_their_own_width() {
        let mut writer = MarkdownWriter::new();
        open(&mut writer, "table");
        open(&mut writer, "tr");
        open(&mut writer, "td");
        table(&mut writer, &[&["i"]]);
        writer.close("td");
        open(&mut writer, "td");
        writer.close("td");
        writer.close("tr");
        writer.close("table");

        let output = writer.as_string();
        assert_eq!(output.matches("\n|:-:|:-:|").count(), 1);
        assert_eq!(output.matches("\n|:-:|\n").count(), 1);
    }

    #[test]
    fn text_is_escaped() {
        let mut writer = MarkdownWriter::new();
        writer.text("*not bold*");
        assert_eq!(writer.as_string(), r"\*not bold\*");
    }

    #[test]
    fn inline_and_block_math() {
        let mut writer = MarkdownWriter::new();
        writer.mathml(r#"<math display="inline"><mi>x</mi></math>"#);
        writer.mathml("<math><mi>y</mi></math>");
        assert_eq!(writer.as_string(), "$x$\n\n$$y$$\n\n");
    }

    #[test]
    fn block_math_in_paragraph_shares_the_blank_line() {
        let mut writer = MarkdownWriter::new();
        open(&mut writer, "p");
        writer.mathml("<math><mi>y</mi></math>");
        writer.close("p");
        assert_eq!(writer.as_string(), "\n\n$$y$$\n\n\n\n");
    }

    #[test]
    fn malformed_math_falls_back_to_text() {
        let mut writer = MarkdownWriter::new();
        writer.mathml("<math><mi>x</mo></math>");
        assert_eq!(writer.as_string(), r"<math><mi>x</mo></math>");
    }

    #[test]
    fn unbalanced_close_is_ignored() {
        let mut writer = MarkdownWriter::new();
        writer.close("p");
        writer.text("x");
        assert_eq!(writer.as_string(), "x");
    }
}
