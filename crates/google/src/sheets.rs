//! Google Sheets v4 row log.

use std::sync::Arc;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use shareflow_core::relay::{RemoteError, SheetLog};
use tracing::debug;

use crate::auth::ServiceAccountAuth;
use crate::response::{endpoint, json_or_error, transport_error};

/// Cells are stored as given, without formula or date parsing.
const VALUE_INPUT_OPTION: &str = "RAW";

#[derive(Debug, Serialize)]
struct ValueRange {
    values: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendResponse {
    #[serde(default)]
    updates: Option<AppendUpdates>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendUpdates {
    #[serde(default)]
    updated_range: Option<String>,
}

/// Appends rows to one spreadsheet.
#[derive(Debug)]
pub struct SheetsClient {
    http: reqwest::Client,
    auth: Arc<ServiceAccountAuth>,
    base_url: Url,
    spreadsheet_id: String,
}

impl SheetsClient {
    /// Create a new Sheets client.
    #[must_use]
    pub fn new(
        http: reqwest::Client,
        auth: Arc<ServiceAccountAuth>,
        base_url: Url,
        spreadsheet_id: impl Into<String>,
    ) -> Self {
        Self {
            http,
            auth,
            base_url,
            spreadsheet_id: spreadsheet_id.into(),
        }
    }

    /// Spreadsheet rows are appended to.
    #[must_use]
    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }
}

impl SheetLog for SheetsClient {
    async fn append_row(&self, range: &str, values: Vec<String>) -> Result<(), RemoteError> {
        let token = self.auth.access_token().await?;

        let append = format!("{range}:append");
        let url = endpoint(
            &self.base_url,
            &["v4", "spreadsheets", self.spreadsheet_id.as_str(), "values", append.as_str()],
        );

        let response = self
            .http
            .post(url)
            .query(&[("valueInputOption", VALUE_INPUT_OPTION)])
            .bearer_auth(token)
            .json(&ValueRange {
                values: vec![values],
            })
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let appended: AppendResponse = json_or_error(response).await?;

        debug!(
            spreadsheet_id = %self.spreadsheet_id,
            range = %range,
            updated_range = ?appended.updates.and_then(|u| u.updated_range),
            "Appended sheet row"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{mount_token, test_auth};
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client(server: &MockServer) -> SheetsClient {
        mount_token(server).await;
        SheetsClient::new(
            reqwest::Client::new(),
            test_auth(server),
            Url::parse(&server.uri()).unwrap(),
            "sheet-1",
        )
    }

    #[tokio::test]
    async fn test_append_row() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v4/spreadsheets/sheet-1/values/Sheet1!A:C:append"))
            .and(query_param("valueInputOption", "RAW"))
            .and(header("authorization", "Bearer test-token"))
            .and(body_json(serde_json::json!({
                "values": [["a.png", "F123", "10/18/2026, 3:04:05\u{202f}PM"]]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "spreadsheetId": "sheet-1",
                "updates": { "updatedRange": "Sheet1!A7:C7", "updatedRows": 1 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let sheets = client(&server).await;
        sheets
            .append_row(
                "Sheet1!A:C",
                vec![
                    "a.png".to_string(),
                    "F123".to_string(),
                    "10/18/2026, 3:04:05\u{202f}PM".to_string(),
                ],
            )
            .await
            .unwrap();

        assert_eq!(sheets.spreadsheet_id(), "sheet-1");
    }

    #[tokio::test]
    async fn test_permission_denied_is_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v4/spreadsheets/sheet-1/values/Sheet1!D:E:append"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "error": {
                    "code": 403,
                    "message": "The caller does not have permission",
                    "status": "PERMISSION_DENIED"
                }
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .await
            .append_row("Sheet1!D:E", vec!["hello".to_string(), "t".to_string()])
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "unauthorized");
        assert_eq!(err.to_string(), "The caller does not have permission");
    }

    #[tokio::test]
    async fn test_rate_limit_is_quota() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v4/spreadsheets/sheet-1/values/Sheet1!D:E:append"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": {
                    "code": 429,
                    "message": "Quota exceeded for quota metric 'Write requests'",
                    "status": "RESOURCE_EXHAUSTED"
                }
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .await
            .append_row("Sheet1!D:E", vec!["x".to_string()])
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "quota");
    }

    #[tokio::test]
    async fn test_token_failure_skips_append() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": "invalid_client"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v4/spreadsheets/sheet-1/values/Sheet1!D:E:append"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let sheets = SheetsClient::new(
            reqwest::Client::new(),
            test_auth(&server),
            Url::parse(&server.uri()).unwrap(),
            "sheet-1",
        );
        let err = sheets
            .append_row("Sheet1!D:E", vec!["x".to_string()])
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "auth");
        assert_eq!(err.to_string(), "invalid_client");
    }
}
