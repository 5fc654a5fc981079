//! Application configuration management.

use std::path::PathBuf;

use serde::Deserialize;

use crate::credentials::CREDENTIALS_PATH_ENV;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Google Drive target configuration.
    pub drive: DriveConfig,
    /// Google Sheets target configuration.
    pub sheets: SheetsConfig,
    /// Credential file configuration.
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum accepted request body for uploads, in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_max_upload_bytes() -> u64 {
    25 * 1024 * 1024
}

/// Google Drive configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DriveConfig {
    /// Folder every uploaded file is created in.
    pub folder_id: String,
    /// API root, overridable for tests.
    #[serde(default = "default_drive_base_url")]
    pub base_url: String,
}

fn default_drive_base_url() -> String {
    "https://www.googleapis.com".to_string()
}

/// Google Sheets configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SheetsConfig {
    /// Spreadsheet receiving the log rows.
    pub spreadsheet_id: String,
    /// A1 range for upload rows (file name, file id, timestamp).
    #[serde(default = "default_upload_range")]
    pub upload_range: String,
    /// A1 range for message rows (message, timestamp).
    #[serde(default = "default_message_range")]
    pub message_range: String,
    /// API root, overridable for tests.
    #[serde(default = "default_sheets_base_url")]
    pub base_url: String,
}

fn default_upload_range() -> String {
    "Sheet1!A:C".to_string()
}

fn default_message_range() -> String {
    "Sheet1!D:E".to_string()
}

fn default_sheets_base_url() -> String {
    "https://sheets.googleapis.com".to_string()
}

/// Credential file configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsConfig {
    /// Path of the service-account JSON file.
    #[serde(default = "default_credentials_path")]
    pub path: PathBuf,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            path: default_credentials_path(),
        }
    }
}

fn default_credentials_path() -> PathBuf {
    std::env::var(CREDENTIALS_PATH_ENV)
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map_or_else(|| PathBuf::from("credentials.json"), PathBuf::from)
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// `PORT` takes precedence over `SHAREFLOW__SERVER__PORT`.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or a required
    /// target identifier is empty.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("SHAREFLOW").separator("__"))
            .set_override_option("server.port", std::env::var("PORT").ok())?
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the fields that have no usable default.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first empty required field.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        let required = [
            ("drive.folder_id", &self.drive.folder_id),
            ("sheets.spreadsheet_id", &self.sheets.spreadsheet_id),
            ("sheets.upload_range", &self.sheets.upload_range),
            ("sheets.message_range", &self.sheets.message_range),
        ];

        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(config::ConfigError::Message(format!("{key} must not be empty")));
            }
        }

        if ranges_overlap(&self.sheets.upload_range, &self.sheets.message_range) {
            return Err(config::ConfigError::Message(
                "sheets.upload_range and sheets.message_range must not overlap".to_string(),
            ));
        }

        Ok(())
    }
}

/// Whether two A1 ranges share a column on the same sheet.
///
/// Ranges whose columns cannot be read are only compared for equality.
fn ranges_overlap(a: &str, b: &str) -> bool {
    let (a, b) = (a.trim(), b.trim());
    match (column_span(a), column_span(b)) {
        (Some((sheet_a, first_a, last_a)), Some((sheet_b, first_b, last_b))) => {
            sheet_a == sheet_b && first_a <= last_b && first_b <= last_a
        }
        _ => a == b,
    }
}

/// Splits an A1 range into its sheet name and inclusive column span.
fn column_span(range: &str) -> Option<(&str, u32, u32)> {
    let (sheet, cells) = range.rsplit_once('!').unwrap_or(("", range));
    let (start, end) = cells.split_once(':').unwrap_or((cells, cells));
    let first = column_index(start)?;
    let last = column_index(end)?;
    Some((sheet, first.min(last), first.max(last)))
}

/// 1-based column number of a cell reference such as `AB12`.
fn column_index(cell: &str) -> Option<u32> {
    let letters: Vec<char> = cell.chars().take_while(char::is_ascii_alphabetic).collect();
    if letters.is_empty() {
        return None;
    }
    letters.into_iter().try_fold(0u32, |acc, c| {
        acc.checked_mul(26)?
            .checked_add(u32::from(c.to_ascii_uppercase()) - u32::from('A') + 1)
    })
}
