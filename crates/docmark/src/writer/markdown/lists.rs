/// The list being written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct ListContext {
    pub is_ordered: bool,
    /// Nesting depth, 0 for a top-level list.
    pub indent: usize,
    /// Items started so far.
    pub count: usize,
}

impl ListContext {
    /// A list nested in `parent`, or a top-level list.
    pub fn nested_in(parent: Option<&ListContext>, is_ordered: bool) -> Self {
        Self {
            is_ordered,
            indent: parent.map_or(0, |list| list.indent + 1),
            count: 0,
        }
    }

    /// Starts the next item and returns its marker, including indentation.
    pub fn next_item(&mut self) -> String {
        self.count += 1;
        let mut marker = "\t".repeat(self.indent);
        if self.is_ordered {
            marker.push_str(&self.count.to_string());
            marker.push('.');
        } else {
            marker.push('-');
        }
        marker.push(' ');
        marker
    }
}
