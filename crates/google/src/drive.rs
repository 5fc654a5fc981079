//! Google Drive v3 file store.

use std::sync::Arc;

use bytes::{BufMut, Bytes, BytesMut};
use reqwest::Url;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use shareflow_core::relay::{FileStore, RemoteError, StoredFileRef, UploadedFile};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::ServiceAccountAuth;
use crate::response::{endpoint, json_or_error, transport_error};

/// Metadata part of a multipart upload.
#[derive(Debug, Serialize)]
struct FileMetadata<'a> {
    name: &'a str,
    parents: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
struct CreatedFile {
    #[serde(default)]
    id: Option<String>,
}

/// Creates files inside one Drive folder.
#[derive(Debug)]
pub struct DriveClient {
    http: reqwest::Client,
    auth: Arc<ServiceAccountAuth>,
    base_url: Url,
    folder_id: String,
}

impl DriveClient {
    /// Create a new Drive client.
    #[must_use]
    pub fn new(
        http: reqwest::Client,
        auth: Arc<ServiceAccountAuth>,
        base_url: Url,
        folder_id: impl Into<String>,
    ) -> Self {
        Self {
            http,
            auth,
            base_url,
            folder_id: folder_id.into(),
        }
    }

    /// Folder new files are created in.
    #[must_use]
    pub fn folder_id(&self) -> &str {
        &self.folder_id
    }
}

impl FileStore for DriveClient {
    async fn create_file(&self, file: &UploadedFile) -> Result<Option<StoredFileRef>, RemoteError> {
        let token = self.auth.access_token().await?;

        let boundary = format!("shareflow_{}", Uuid::new_v4().simple());
        let metadata = FileMetadata {
            name: &file.name,
            parents: [self.folder_id.as_str()],
        };
        let body = multipart_related(&boundary, &metadata, file)?;
        let url = endpoint(&self.base_url, &["upload", "drive", "v3", "files"]);

        debug!(
            file_name = %file.name,
            content_type = %file.content_type,
            size = file.size(),
            folder_id = %self.folder_id,
            "Creating Drive file"
        );

        let response = self
            .http
            .post(url)
            .query(&[
                ("uploadType", "multipart"),
                ("fields", "id"),
                ("supportsAllDrives", "true"),
            ])
            .bearer_auth(token)
            .header(
                CONTENT_TYPE,
                format!("multipart/related; boundary={boundary}"),
            )
            .body(body)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let created: CreatedFile = json_or_error(response).await?;

        let file_ref = created
            .id
            .filter(|id| !id.is_empty())
            .map(StoredFileRef::new);
        if file_ref.is_none() {
            warn!(file_name = %file.name, "Drive created the file without returning an id");
        }

        Ok(file_ref)
    }
}

/// Builds a `multipart/related` body: JSON metadata, then the media.
fn multipart_related(
    boundary: &str,
    metadata: &FileMetadata<'_>,
    file: &UploadedFile,
) -> Result<Bytes, RemoteError> {
    let metadata =
        serde_json::to_vec(metadata).map_err(|e| RemoteError::decode(e.to_string()))?;

    let mut body = BytesMut::with_capacity(file.size() + metadata.len() + 256);
    body.put_slice(format!("--{boundary}\r\n").as_bytes());
    body.put_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.put_slice(&metadata);
    body.put_slice(format!("\r\n--{boundary}\r\n").as_bytes());
    body.put_slice(format!("Content-Type: {}\r\n\r\n", file.content_type).as_bytes());
    body.put_slice(&file.data);
    body.put_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Ok(body.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{mount_token, test_auth};
    use wiremock::matchers::{body_string_contains, header, header_regex, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client(server: &MockServer) -> DriveClient {
        mount_token(server).await;
        DriveClient::new(
            reqwest::Client::new(),
            test_auth(server),
            Url::parse(&server.uri()).unwrap(),
            "folder-1",
        )
    }

    fn png() -> UploadedFile {
        UploadedFile::new(
            "a.png",
            Some("image/png".to_string()),
            Bytes::from_static(b"PNGDATA"),
        )
    }

    #[test]
    fn test_multipart_body_layout() {
        let metadata = FileMetadata {
            name: "a.png",
            parents: ["folder-1"],
        };
        let body = multipart_related("xyz", &metadata, &png()).unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();

        assert_eq!(
            text,
            "--xyz\r\n\
             Content-Type: application/json; charset=UTF-8\r\n\r\n\
             {\"name\":\"a.png\",\"parents\":[\"folder-1\"]}\r\n\
             --xyz\r\n\
             Content-Type: image/png\r\n\r\n\
             PNGDATA\r\n\
             --xyz--\r\n"
        );
    }

    #[tokio::test]
    async fn test_create_file_returns_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload/drive/v3/files"))
            .and(query_param("uploadType", "multipart"))
            .and(query_param("fields", "id"))
            .and(header("authorization", "Bearer test-token"))
            .and(header_regex("content-type", "^multipart/related; boundary=shareflow_"))
            .and(body_string_contains("\"parents\":[\"folder-1\"]"))
            .and(body_string_contains("PNGDATA"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "F123"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let drive = client(&server).await;
        let file_ref = drive.create_file(&png()).await.unwrap();

        assert_eq!(file_ref, Some(StoredFileRef::new("F123")));
        assert_eq!(drive.folder_id(), "folder-1");
    }

    #[tokio::test]
    async fn test_missing_folder_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload/drive/v3/files"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": {
                    "code": 404,
                    "message": "File not found: folder-1.",
                    "errors": [{ "reason": "notFound", "message": "File not found: folder-1." }]
                }
            })))
            .mount(&server)
            .await;

        let err = client(&server).await.create_file(&png()).await.unwrap_err();

        assert_eq!(err.kind(), "not_found");
        assert_eq!(err.to_string(), "File not found: folder-1.");
    }

    #[tokio::test]
    async fn test_storage_quota_is_quota() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload/drive/v3/files"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "error": {
                    "code": 403,
                    "message": "Service Accounts do not have storage quota.",
                    "errors": [{ "reason": "storageQuotaExceeded" }]
                }
            })))
            .mount(&server)
            .await;

        let err = client(&server).await.create_file(&png()).await.unwrap_err();

        assert_eq!(err.kind(), "quota");
        assert_eq!(err.status(), Some(403));
        assert_eq!(err.to_string(), "Service Accounts do not have storage quota.");
    }

    #[tokio::test]
    async fn test_non_json_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload/drive/v3/files"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let err = client(&server).await.create_file(&png()).await.unwrap_err();

        assert_eq!(err.kind(), "api");
        assert_eq!(err.to_string(), "Request failed with status code 502");
    }

    #[tokio::test]
    async fn test_response_without_id_has_no_reference() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload/drive/v3/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let file_ref = client(&server).await.create_file(&png()).await.unwrap();

        assert_eq!(file_ref, None);
    }

    #[tokio::test]
    async fn test_unreadable_success_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload/drive/v3/files"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client(&server).await.create_file(&png()).await.unwrap_err();

        assert_eq!(err.kind(), "decode");
    }
}
