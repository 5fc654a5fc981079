//! Relay service for uploads and messages.
//!
//! Every request is a pass-through:
//! - Upload: store the file, then append an upload row
//! - Message: append a message row
//!
//! A row is only appended after its upstream call succeeded. There is no
//! compensation when the append fails after a successful store.

mod error;
mod service;
mod types;

pub use error::{RelayError, RemoteError};
pub use service::{FileStore, RelayService, SheetLog};
pub use types::{LogRanges, LogRow, StoredFileRef, UploadedFile};
