/// The table being written.
///
/// The header separator must sit directly under the first row, but its
/// width is only known once every row was seen. The writer reserves a slot
/// for it when the first row ends and fills the slot when the table closes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct TableContext {
    /// The widest row seen so far.
    pub max_columns: usize,
    /// Cells in the current row.
    pub columns: usize,
    /// Rows started so far.
    pub rows: usize,
    pub in_cell: bool,
    /// The reserved separator slot, if any.
    pub separator: Option<usize>,
}

impl TableContext {
    /// Folds the current row into the maximum and starts a new one.
    pub fn start_row(&mut self) {
        self.finish_row();
        self.columns = 0;
        self.rows += 1;
    }

    pub fn finish_row(&mut self) {
        self.max_columns = self.max_columns.max(self.columns);
    }

    pub fn start_cell(&mut self) {
        self.columns += 1;
        self.in_cell = true;
    }
}

/// The header separator row of a table with `columns` columns, with every
/// column centered.
pub(super) fn header_separator(columns: usize) -> String {
    let mut row = String::from("\n|");
    row.push_str(&":-:|".repeat(columns));
    row
}
