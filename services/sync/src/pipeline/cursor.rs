/// Highest upstream id seen so far; the `since` value for the next page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor(i64);

impl Cursor {
    pub fn new(start: i64) -> Self {
        Self(start)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// Moves the cursor to the largest of its current value and `ids`.
    /// Never moves backwards, whatever order the ids arrive in.
    pub fn advance<I>(&mut self, ids: I) -> i64
    where
        I: IntoIterator<Item = i64>,
    {
        self.0 = ids.into_iter().fold(self.0, i64::max);
        self.0
    }
}
