/// Rows revealed per step.
pub const PAGE_SIZE: usize = 50;

/// Incremental reveal over a ranked sequence.
///
/// `revealed` only grows until `reset`; it never exceeds a known `total`.
/// After `reset_unsized` the total is unknown and reveals are capped by the next `sync_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationCursor {
    page_size: usize,
    revealed: usize,
    total: usize,
    sized: bool,
}

impl Default for PaginationCursor {
    fn default() -> Self {
        Self::new(0)
    }
}

impl PaginationCursor {
    pub fn new(total: usize) -> Self {
        Self::with_page_size(PAGE_SIZE, total)
    }

    pub fn with_page_size(page_size: usize, total: usize) -> Self {
        let page_size = page_size.max(1);
        Self {
            page_size,
            revealed: page_size.min(total),
            total,
            sized: true,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn revealed(&self) -> usize {
        self.revealed
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// False between `reset_unsized` and the next `sync_total`.
    pub fn is_sized(&self) -> bool {
        self.sized
    }

    pub fn has_more(&self) -> bool {
        !self.sized || self.revealed < self.total
    }

    pub fn reveal_more(&mut self) -> usize {
        let grown = self.revealed.saturating_add(self.page_size);
        self.revealed = if self.sized { grown.min(self.total) } else { grown };
        self.revealed
    }

    pub fn reveal_all(&mut self) -> usize {
        self.revealed = if self.sized { self.total } else { usize::MAX };
        self.revealed
    }

    /// Back to the first page of a (possibly new) sequence.
    pub fn reset(&mut self, total: usize) {
        *self = Self::with_page_size(self.page_size, total);
    }

    /// Back to the first page of a sequence whose length is not known yet.
    pub fn reset_unsized(&mut self) {
        self.revealed = self.page_size;
        self.sized = false;
    }

    /// Track a new total for the same sequence without resetting progress.
    ///
    /// The first page stays revealed when rows arrive; progress is capped when rows go away.
    pub fn sync_total(&mut self, total: usize) {
        self.total = total;
        self.sized = true;
        self.revealed = self.revealed.max(self.page_size.min(total)).min(total);
    }

    /// The revealed prefix. Items keep whatever rank they carry in the full sequence.
    pub fn window<'a, T>(&self, rows: &'a [T]) -> &'a [T] {
        &rows[..self.revealed.min(rows.len())]
    }
}
