//! Relay domain types.

use bytes::Bytes;
use serde::Serialize;
use shareflow_shared::config::SheetsConfig;

/// Content type used when the client does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A file received from a client, held in memory for one request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Original filename as sent by the client.
    pub name: String,
    /// Declared MIME type.
    pub content_type: String,
    /// File content.
    pub data: Bytes,
}

impl UploadedFile {
    /// Creates an uploaded file, defaulting the content type when absent.
    #[must_use]
    pub fn new(name: impl Into<String>, content_type: Option<String>, data: Bytes) -> Self {
        Self {
            name: name.into(),
            content_type: content_type
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            data,
        }
    }

    /// Size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Opaque identifier of a file created by the storage service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StoredFileRef(String);

impl StoredFileRef {
    /// Wraps a remote identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StoredFileRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A row appended to the sheet log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogRow {
    /// File Name | File ID | Timestamp
    Upload {
        /// Original filename.
        file_name: String,
        /// Reference returned by storage; an empty cell when none was returned.
        file_ref: Option<StoredFileRef>,
        /// Display timestamp.
        timestamp: String,
    },
    /// Message | Timestamp
    Message {
        /// Message text.
        text: String,
        /// Display timestamp.
        timestamp: String,
    },
}

impl LogRow {
    /// Cell values in column order.
    #[must_use]
    pub fn into_values(self) -> Vec<String> {
        match self {
            Self::Upload {
                file_name,
                file_ref,
                timestamp,
            } => vec![file_name, file_ref.map(|r| r.0).unwrap_or_default(), timestamp],
            Self::Message { text, timestamp } => vec![text, timestamp],
        }
    }
}

/// Column ranges the two row shapes are appended to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRanges {
    /// A1 range for upload rows.
    pub upload: String,
    /// A1 range for message rows.
    pub message: String,
}

impl LogRanges {
    /// Returns the range a row shape belongs to.
    #[must_use]
    pub fn for_row(&self, row: &LogRow) -> &str {
        match row {
            LogRow::Upload { .. } => &self.upload,
            LogRow::Message { .. } => &self.message,
        }
    }
}

impl Default for LogRanges {
    fn default() -> Self {
        Self {
            upload: "Sheet1!A:C".to_string(),
            message: "Sheet1!D:E".to_string(),
        }
    }
}

impl From<&SheetsConfig> for LogRanges {
    fn from(config: &SheetsConfig) -> Self {
        Self {
            upload: config.upload_range.clone(),
            message: config.message_range.clone(),
        }
    }
}
