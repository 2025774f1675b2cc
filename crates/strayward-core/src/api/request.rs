//! Outbound request description.
//!
//! An `ApiRequest` is plain data so it can be dispatched more than once:
//! the client replays it after a token refresh.

use std::path::Path;

use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Serialize;

use super::ApiError;

/// Multipart field name the upload endpoint expects.
pub const UPLOAD_FIELD: &str = "file";

/// A file to be sent as a single multipart field.
#[derive(Debug, Clone, PartialEq)]
pub struct FileUpload {
    pub field: String,
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime = mime_for(&file_name).to_string();
        Self {
            field: UPLOAD_FIELD.to_string(),
            file_name,
            mime,
            bytes,
        }
    }

    /// Read a photo from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| anyhow::anyhow!("{} is not a file", path.display()))?;
        Ok(Self::new(file_name, bytes))
    }

    /// Build a fresh form; `reqwest` consumes forms on send.
    pub(crate) fn to_form(&self) -> Result<Form, ApiError> {
        let part = Part::bytes(self.bytes.clone())
            .file_name(self.file_name.clone())
            .mime_str(&self.mime)
            .map_err(|e| ApiError::InvalidRequest(format!("Invalid mime type {}: {}", self.mime, e)))?;
        Ok(Form::new().part(self.field.clone(), part))
    }
}

/// The server accepts jpg, jpeg and png; anything else is sent opaque and
/// left for the server to reject.
fn mime_for(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase());
    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    File(FileUpload),
}

/// A pending request: where it goes, what it carries, and whether it has
/// already been replayed after a token refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    /// Set once the request has been replayed; a retried request is never
    /// retried again.
    pub retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn queries(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to encode body for {}: {}", self.path, e)))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    pub fn file(mut self, upload: FileUpload) -> Self {
        self.body = RequestBody::File(upload);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_for() {
        assert_eq!(mime_for("dog.JPG"), "image/jpeg");
        assert_eq!(mime_for("dog.jpeg"), "image/jpeg");
        assert_eq!(mime_for("dog.png"), "image/png");
        assert_eq!(mime_for("dog.gif"), "application/octet-stream");
        assert_eq!(mime_for("dog"), "application/octet-stream");
    }

    #[test]
    fn test_builder() {
        let request = ApiRequest::patch("/admin/users/4/role")
            .query("is_admin", true)
            .json(&serde_json::json!({"ignored": 1}))
            .unwrap();
        assert_eq!(request.method, Method::PATCH);
        assert_eq!(request.query, vec![("is_admin".to_string(), "true".to_string())]);
        assert!(matches!(request.body, RequestBody::Json(_)));
        assert!(!request.retried);
    }

    #[test]
    fn test_file_upload_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("puppy.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let upload = FileUpload::from_path(&path).unwrap();
        assert_eq!(upload.field, UPLOAD_FIELD);
        assert_eq!(upload.file_name, "puppy.png");
        assert_eq!(upload.mime, "image/png");
        assert_eq!(upload.bytes.len(), 4);
        assert!(upload.to_form().is_ok());

        assert!(FileUpload::from_path(&dir.path().join("missing.jpg")).is_err());
    }
}
