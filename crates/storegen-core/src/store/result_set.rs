use crate::{document::Document, error::StoreError, store::Cursor};

///
/// ResultSet
///
/// Typed iteration over a backend cursor. Closing is at-most-once: the
/// second `close` (including the implicit one in `one` and `all`) fails
/// with [`StoreError::ResultSetClosed`].
///

#[derive(Debug)]
pub struct ResultSet<C> {
    cursor: C,
    closed: bool,
}

impl<C: Cursor> ResultSet<C> {
    pub(crate) const fn new(cursor: C) -> Self {
        Self {
            cursor,
            closed: false,
        }
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    /// Next document, or `None` when exhausted. Loaded documents are not new.
    pub fn next<D: Document>(&mut self) -> Result<Option<D>, StoreError> {
        if self.closed {
            return Err(StoreError::ResultSetClosed);
        }

        let Some(value) = self.cursor.next().map_err(StoreError::backend)? else {
            return Ok(None);
        };

        let mut doc: D = serde_json::from_value(value)?;
        doc.set_is_new(false);

        Ok(Some(doc))
    }

    /// First document, then close.
    pub fn one<D: Document>(&mut self) -> Result<Option<D>, StoreError> {
        let doc = self.next();
        self.close()?;

        doc
    }

    /// Every remaining document, then close. The cursor is closed even
    /// when reading fails; the read error wins.
    pub fn all<D: Document>(&mut self) -> Result<Vec<D>, StoreError> {
        let mut out = Vec::new();
        let read = loop {
            match self.next() {
                Ok(Some(doc)) => out.push(doc),
                Ok(None) => break Ok(()),
                Err(err) => break Err(err),
            }
        };
        let closed = self.close();

        read?;
        closed?;

        Ok(out)
    }

    pub fn close(&mut self) -> Result<(), StoreError> {
        if self.closed {
            return Err(StoreError::ResultSetClosed);
        }
        self.closed = true;

        self.cursor.close().map_err(StoreError::backend)
    }
}
