//! Document translation
//!
//! A document goes through three steps: upload to storage through a
//! pre-signed form, server-side translation, download from a pre-signed URL.

use serde::Deserialize;
use serde_json::{json, Value};
use std::path::Path;
use tracing::info;

use crate::core::client::LaraClient;
use crate::core::errors::{LaraError, Result};
use crate::core::models::{Document, DocumentOptions, DocumentStatus};
use crate::core::polling::{poll_until_terminal, WaitOptions};
use crate::core::s3::{S3Client, UploadTarget};
use crate::resources::file_name;

#[derive(Deserialize)]
struct DownloadUrl {
    url: String,
}

/// `/documents` endpoints
#[derive(Debug, Clone)]
pub struct Documents {
    client: LaraClient,
    s3: S3Client,
}

impl Documents {
    pub fn new(client: LaraClient) -> Self {
        let s3 = S3Client::new(client.http().clone());
        Self { client, s3 }
    }

    /// Upload a file and start translating it
    pub async fn upload(
        &self,
        path: impl AsRef<Path>,
        source: Option<&str>,
        target: &str,
        options: &DocumentOptions,
    ) -> Result<Document> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        self.upload_bytes(&file_name(path), bytes, source, target, options)
            .await
    }

    pub async fn upload_bytes(
        &self,
        filename: &str,
        bytes: Vec<u8>,
        source: Option<&str>,
        target: &str,
        options: &DocumentOptions,
    ) -> Result<Document> {
        let upload: UploadTarget = self
            .client
            .get("/documents/upload-url", Some(json!({"filename": filename})))
            .await?;
        let s3key = upload
            .key()
            .ok_or_else(|| LaraError::InvalidResponse {
                message: "upload form has no storage key".to_string(),
            })?
            .to_string();

        self.s3.upload(&upload, filename, bytes).await?;

        let mut body = json!({"s3key": s3key, "target": target, "source": source});
        if let (Some(fields), Value::Object(extra)) =
            (body.as_object_mut(), serde_json::to_value(options)?)
        {
            fields.extend(extra);
        }

        let document: Document = self.client.post("/documents", Some(body)).await?;
        info!("Uploaded document {} as {}", filename, document.id);
        Ok(document)
    }

    pub async fn status(&self, id: &str) -> Result<Document> {
        self.client.get(&format!("/documents/{id}"), None).await
    }

    /// Fetch the translated file
    pub async fn download(&self, id: &str) -> Result<Vec<u8>> {
        let link: DownloadUrl = self
            .client
            .get(&format!("/documents/{id}/download-url"), None)
            .await?;
        self.s3.download(&link.url).await
    }

    /// Poll until the document is translated or failed
    pub async fn wait_for_translation(&self, document: &Document, options: WaitOptions) -> Result<Document> {
        poll_until_terminal(
            &document.id,
            options,
            |id| async move { self.status(&id).await },
            |_: &Document| {},
        )
        .await
    }

    /// Upload, wait and download in one call
    pub async fn translate(
        &self,
        path: impl AsRef<Path>,
        source: Option<&str>,
        target: &str,
        options: &DocumentOptions,
        wait: WaitOptions,
    ) -> Result<Vec<u8>> {
        let document = self.upload(path, source, target, options).await?;
        let document = self.wait_for_translation(&document, wait).await?;

        match document.status {
            DocumentStatus::Translated => self.download(&document.id).await,
            _ => Err(LaraError::DocumentFailed {
                id: document.id,
                reason: document
                    .error_reason
                    .unwrap_or_else(|| "unknown reason".to_string()),
            }),
        }
    }
}
