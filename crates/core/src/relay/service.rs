//! Relay service implementation.

use std::sync::Arc;

use chrono::{DateTime, Local};

use super::error::{RelayError, RemoteError};
use super::types::{LogRanges, LogRow, StoredFileRef, UploadedFile};
use crate::timestamp;

/// Storage operation: persists a file into the configured folder.
///
/// Implemented by the google crate against Drive.
pub trait FileStore: Send + Sync {
    /// Create a new file and return its reference.
    ///
    /// `Ok(None)` means the file was created but no identifier came back.
    fn create_file(
        &self,
        file: &UploadedFile,
    ) -> impl std::future::Future<Output = Result<Option<StoredFileRef>, RemoteError>> + Send;
}

/// Log-append operation: appends one row to the configured spreadsheet.
///
/// Implemented by the google crate against Sheets.
pub trait SheetLog: Send + Sync {
    /// Append `values` as a single row within `range`.
    fn append_row(
        &self,
        range: &str,
        values: Vec<String>,
    ) -> impl std::future::Future<Output = Result<(), RemoteError>> + Send;
}

/// Relays uploads and messages to storage and the sheet log.
pub struct RelayService<F: FileStore, L: SheetLog> {
    store: Arc<F>,
    log: Arc<L>,
    ranges: LogRanges,
    clock: fn() -> DateTime<Local>,
}

impl<F: FileStore, L: SheetLog> RelayService<F, L> {
    /// Create a new relay service using the local wall clock.
    #[must_use]
    pub fn new(store: Arc<F>, log: Arc<L>, ranges: LogRanges) -> Self {
        Self {
            store,
            log,
            ranges,
            clock: Local::now,
        }
    }

    /// Replace the clock used for row timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> DateTime<Local>) -> Self {
        self.clock = clock;
        self
    }

    fn now(&self) -> String {
        timestamp::display(&(self.clock)())
    }

    /// Store an uploaded file, then log it.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No file was supplied (no remote call is made)
    /// - The storage call fails (no row is appended)
    /// - The append fails (the stored file is reported as orphaned)
    pub async fn upload(
        &self,
        file: Option<UploadedFile>,
    ) -> Result<Option<StoredFileRef>, RelayError> {
        let file = file.ok_or(RelayError::NoFileUploaded)?;

        let file_ref = self
            .store
            .create_file(&file)
            .await
            .map_err(RelayError::Store)?;

        let row = LogRow::Upload {
            file_name: file.name,
            file_ref: file_ref.clone(),
            timestamp: self.now(),
        };

        self.append(row)
            .await
            .map_err(|source| RelayError::Orphaned {
                file_ref: file_ref.clone(),
                source,
            })?;

        Ok(file_ref)
    }

    /// Log a text message.
    ///
    /// # Errors
    ///
    /// Returns an error if the message is absent or empty (no remote call is
    /// made), or if the append fails.
    pub async fn record_message(&self, message: Option<String>) -> Result<(), RelayError> {
        let text = message
            .filter(|m| !m.is_empty())
            .ok_or(RelayError::EmptyMessage)?;

        let row = LogRow::Message {
            text,
            timestamp: self.now(),
        };

        self.append(row).await.map_err(RelayError::Log)
    }

    async fn append(&self, row: LogRow) -> Result<(), RemoteError> {
        let range = self.ranges.for_row(&row).to_string();
        self.log.append_row(&range, row.into_values()).await
    }
}
