//! JSON-lines sheet file.
//!
//! ```text
//! <data_dir>/<sheet_name>.jsonl
//!   line 1:  {"header":[...],"frozen_rows":1,"text_columns":[5]}
//!   line 2+: one JSON array per data row
//! ```
//!
//! Appends open the file in append mode and write a single line; a failed append is
//! truncated back to the previous length. Rewrites go to a sibling temp file which is
//! then renamed over the sheet, so a failed rewrite leaves the previous content in place.
//!
//! A zero-byte file holds no layout line and is treated as absent.

use super::{trim_trailing_blank, Row, Sheet, SheetLayout};
use crate::constants::{HEADER_ROWS, SHEET_FILE_EXTENSION};
use crate::error::{RegistryError, RegistryResult};
use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub struct JsonLinesSheet {
    name: String,
    path: PathBuf,
}

impl JsonLinesSheet {
    /// Sheet `name` stored under `data_dir`. Nothing is touched on disk until first use.
    pub fn new(data_dir: &Path, name: impl Into<String>) -> Self {
        let name = name.into();
        let path = data_dir.join(format!("{name}.{SHEET_FILE_EXTENSION}"));
        Self { name, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension(format!("{SHEET_FILE_EXTENSION}.tmp"))
    }

    fn corrupt(&self, line: usize, source: serde_json::Error) -> RegistryError {
        RegistryError::SheetCorrupt {
            path: self.path.clone(),
            line,
            source,
        }
    }

    fn has_content(&self) -> bool {
        fs::metadata(&self.path).is_ok_and(|m| m.is_file() && m.len() > 0)
    }

    fn ensure_exists(&self) -> RegistryResult<()> {
        if self.has_content() {
            Ok(())
        } else {
            Err(RegistryError::SheetMissing(self.name.clone()))
        }
    }

    fn read_layout(&self) -> RegistryResult<SheetLayout> {
        self.ensure_exists()?;
        let file = fs::File::open(&self.path).map_err(RegistryError::SheetRead)?;
        let mut first = String::new();
        BufReader::new(file)
            .read_line(&mut first)
            .map_err(RegistryError::SheetRead)?;
        serde_json::from_str(first.trim_end()).map_err(|e| self.corrupt(1, e))
    }

    fn read_all(&self) -> RegistryResult<(SheetLayout, Vec<Row>)> {
        self.ensure_exists()?;
        let contents = fs::read_to_string(&self.path).map_err(RegistryError::SheetRead)?;
        let mut lines = contents.lines().enumerate();

        let first = lines.next().map(|(_, line)| line).unwrap_or_default();
        let layout = serde_json::from_str(first).map_err(|e| self.corrupt(1, e))?;

        let mut rows = Vec::new();
        for (index, line) in lines {
            if line.trim().is_empty() {
                continue;
            }
            let row: Row = serde_json::from_str(line).map_err(|e| self.corrupt(index + 1, e))?;
            rows.push(row);
        }

        Ok((layout, rows))
    }

    fn write_atomically(&self, layout: &SheetLayout, rows: &[Row]) -> RegistryResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(RegistryError::SheetDirCreation)?;
        }

        let mut buffer = serde_json::to_string(layout).map_err(RegistryError::Serialization)?;
        buffer.push('\n');
        for row in rows {
            buffer.push_str(&serde_json::to_string(row).map_err(RegistryError::Serialization)?);
            buffer.push('\n');
        }

        let temp = self.temp_path();
        let result = (|| {
            let mut file = fs::File::create(&temp)?;
            file.write_all(buffer.as_bytes())?;
            file.sync_all()?;
            fs::rename(&temp, &self.path)
        })();

        if let Err(e) = result {
            let _ = fs::remove_file(&temp);
            return Err(RegistryError::SheetWrite(e));
        }
        Ok(())
    }
}

/// Runs `write` against `file`, truncating it back to its previous length on failure.
fn append_or_truncate<F>(file: &mut fs::File, write: F) -> io::Result<()>
where
    F: FnOnce(&mut fs::File) -> io::Result<()>,
{
    let original_len = file.metadata()?.len();
    if let Err(e) = write(file) {
        if let Err(truncate) = file.set_len(original_len) {
            tracing::error!("failed to truncate torn append: {}", truncate);
        }
        return Err(e);
    }
    Ok(())
}

impl Sheet for JsonLinesSheet {
    fn name(&self) -> &str {
        &self.name
    }

    fn exists(&self) -> RegistryResult<bool> {
        Ok(self.has_content())
    }

    fn create(&mut self, layout: &SheetLayout) -> RegistryResult<()> {
        self.write_atomically(layout, &[])
    }

    fn read_header(&self) -> RegistryResult<Vec<String>> {
        Ok(trim_trailing_blank(self.read_layout()?.header))
    }

    fn read_rows(&self) -> RegistryResult<Vec<Row>> {
        Ok(self.read_all()?.1)
    }

    fn last_row(&self) -> RegistryResult<usize> {
        if !self.has_content() {
            return Ok(0);
        }
        Ok(HEADER_ROWS + self.read_all()?.1.len())
    }

    fn append_row(&mut self, mut row: Row) -> RegistryResult<()> {
        let layout = self.read_layout()?;
        layout.apply_text_format(&mut row);

        let mut line = serde_json::to_string(&row).map_err(RegistryError::Serialization)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(RegistryError::SheetWrite)?;
        append_or_truncate(&mut file, |f| {
            f.write_all(line.as_bytes())?;
            f.sync_data()
        })
        .map_err(RegistryError::SheetWrite)
    }

    fn rewrite(&mut self, layout: &SheetLayout, mut rows: Vec<Row>) -> RegistryResult<()> {
        for row in &mut rows {
            layout.apply_text_format(row);
        }
        self.write_atomically(layout, &rows)
    }
}
