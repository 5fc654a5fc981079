//! Google Drive and Sheets clients for ShareFlow.
//!
//! This crate implements the core relay traits:
//! - [`DriveClient`] as the `FileStore`
//! - [`SheetsClient`] as the `SheetLog`
//!
//! Both share one [`ServiceAccountAuth`] token source scoped to Drive and
//! Sheets.

pub mod auth;
pub mod drive;
pub mod error;
mod response;
pub mod sheets;

use std::sync::Arc;

use shareflow_shared::ServiceAccountKey;
use shareflow_shared::config::{DriveConfig, SheetsConfig};

pub use auth::{DRIVE_SCOPE, SPREADSHEETS_SCOPE, ServiceAccountAuth};
pub use drive::DriveClient;
pub use error::ClientError;
pub use sheets::SheetsClient;

/// Client handles produced from one credential.
#[derive(Debug)]
pub struct GoogleClients {
    /// Storage client.
    pub drive: DriveClient,
    /// Log client.
    pub sheets: SheetsClient,
}

/// Builds the Drive and Sheets clients for a service account.
///
/// # Errors
///
/// Returns an error if the private key or a base URL is invalid.
pub fn connect(
    key: &ServiceAccountKey,
    drive: &DriveConfig,
    sheets: &SheetsConfig,
) -> Result<GoogleClients, ClientError> {
    let http = reqwest::Client::builder()
        .user_agent(concat!("shareflow/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ClientError::Http(e.to_string()))?;

    let auth = Arc::new(ServiceAccountAuth::new(
        key,
        &[DRIVE_SCOPE, SPREADSHEETS_SCOPE],
        http.clone(),
    )?);

    let drive = DriveClient::new(
        http.clone(),
        auth.clone(),
        response::parse_base_url(&drive.base_url)?,
        drive.folder_id.clone(),
    );
    let sheets = SheetsClient::new(
        http,
        auth,
        response::parse_base_url(&sheets.base_url)?,
        sheets.spreadsheet_id.clone(),
    );

    Ok(GoogleClients { drive, sheets })
}
