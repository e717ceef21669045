use super::{trim_trailing_blank, Row, Sheet, SheetLayout};
use crate::constants::HEADER_ROWS;
use crate::error::{RegistryError, RegistryResult};

/// Process-local sheet.
///
/// Keeps a count of destructive and appending calls so callers can assert that an
/// operation performed no writes.
#[derive(Clone, Debug, Default)]
pub struct MemorySheet {
    name: String,
    content: Option<(SheetLayout, Vec<Row>)>,
    mutations: usize,
}

impl MemorySheet {
    /// An empty (not yet created) sheet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: None,
            mutations: 0,
        }
    }

    /// A sheet that already holds `header` and `rows`, as left by an earlier deployment.
    pub fn with_content(name: impl Into<String>, header: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            content: Some((SheetLayout::new(header, Vec::new()), rows)),
            mutations: 0,
        }
    }

    /// Number of create/append/rewrite calls so far.
    pub fn mutations(&self) -> usize {
        self.mutations
    }

    /// Current layout, if the sheet exists.
    pub fn layout(&self) -> Option<&SheetLayout> {
        self.content.as_ref().map(|(layout, _)| layout)
    }

    fn content(&self) -> RegistryResult<&(SheetLayout, Vec<Row>)> {
        self.content
            .as_ref()
            .ok_or_else(|| RegistryError::SheetMissing(self.name.clone()))
    }
}

impl Sheet for MemorySheet {
    fn name(&self) -> &str {
        &self.name
    }

    fn exists(&self) -> RegistryResult<bool> {
        Ok(self.content.is_some())
    }

    fn create(&mut self, layout: &SheetLayout) -> RegistryResult<()> {
        self.mutations += 1;
        self.content = Some((layout.clone(), Vec::new()));
        Ok(())
    }

    fn read_header(&self) -> RegistryResult<Vec<String>> {
        let (layout, _) = self.content()?;
        Ok(trim_trailing_blank(layout.header.clone()))
    }

    fn read_rows(&self) -> RegistryResult<Vec<Row>> {
        let (_, rows) = self.content()?;
        Ok(rows.clone())
    }

    fn last_row(&self) -> RegistryResult<usize> {
        Ok(match &self.content {
            Some((_, rows)) => HEADER_ROWS + rows.len(),
            None => 0,
        })
    }

    fn append_row(&mut self, mut row: Row) -> RegistryResult<()> {
        let name = self.name.clone();
        let (layout, rows) = self
            .content
            .as_mut()
            .ok_or(RegistryError::SheetMissing(name))?;
        layout.apply_text_format(&mut row);
        rows.push(row);
        self.mutations += 1;
        Ok(())
    }

    fn rewrite(&mut self, layout: &SheetLayout, mut rows: Vec<Row>) -> RegistryResult<()> {
        for row in &mut rows {
            layout.apply_text_format(row);
        }
        self.content = Some((layout.clone(), rows));
        self.mutations += 1;
        Ok(())
    }
}
