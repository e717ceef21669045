//! Registry store adapter.
//!
//! Wraps a [`Sheet`] behind a mutex. Every registry operation runs through a
//! [`StoreHandle`], so schema reconciliation, reading the row count and appending
//! the row built from that count form one critical section. Two requests in the
//! same process can therefore never receive the same sequence number, and an
//! append can never interleave with a migration.
//!
//! Separate processes writing the same sheet are not coordinated.

use crate::error::{RegistryError, RegistryResult};
use crate::sheet::{Row, Sheet};
use std::sync::{Mutex, MutexGuard};

pub struct RegistryStore<S> {
    sheet: Mutex<S>,
}

impl<S: Sheet> RegistryStore<S> {
    pub fn new(sheet: S) -> Self {
        Self {
            sheet: Mutex::new(sheet),
        }
    }

    /// Takes exclusive access to the sheet for the duration of one operation.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::LockPoisoned` if a previous holder panicked.
    pub fn lock(&self) -> RegistryResult<StoreHandle<'_, S>> {
        let sheet = self.sheet.lock().map_err(|_| RegistryError::LockPoisoned)?;
        Ok(StoreHandle { sheet })
    }
}

/// Exclusive access to the sheet.
pub struct StoreHandle<'a, S> {
    sheet: MutexGuard<'a, S>,
}

impl<S: Sheet> StoreHandle<'_, S> {
    pub fn sheet(&self) -> &S {
        &self.sheet
    }

    pub fn sheet_mut(&mut self) -> &mut S {
        &mut self.sheet
    }

    /// Rows used so far, header included.
    pub fn current_count(&self) -> RegistryResult<usize> {
        self.sheet.last_row()
    }

    pub fn read_all_rows(&self) -> RegistryResult<Vec<Row>> {
        self.sheet.read_rows()
    }

    /// Builds a row from the current count and appends it, without releasing the lock
    /// in between.
    ///
    /// # Errors
    ///
    /// Returns whatever `build` returns, `RegistryError::RowWidth` if the row does
    /// not match the header width, or the sheet's read/write error.
    pub fn append_with<T>(
        &mut self,
        build: impl FnOnce(usize) -> RegistryResult<(Row, T)>,
    ) -> RegistryResult<T> {
        let count = self.current_count()?;
        let (row, output) = build(count)?;

        let expected = self.sheet.read_header()?.len();
        if row.len() != expected {
            return Err(RegistryError::RowWidth {
                expected,
                actual: row.len(),
            });
        }

        self.sheet.append_row(row)?;
        Ok(output)
    }
}
