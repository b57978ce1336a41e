//! Transfers against pre-signed storage URLs
//!
//! Document bytes never go through the API itself: the service hands out an
//! upload form (URL plus fields) and a download URL. These requests are not
//! signed.

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

use crate::core::errors::Result;

/// Pre-signed upload form returned by the service
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadTarget {
    pub url: String,
    pub fields: HashMap<String, String>,
}

impl UploadTarget {
    /// Storage key the document is written to
    pub fn key(&self) -> Option<&str> {
        self.fields.get("key").map(String::as_str)
    }
}

/// Plain client for storage uploads and downloads
#[derive(Debug, Clone)]
pub struct S3Client {
    http: reqwest::Client,
}

impl S3Client {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// POST the form fields followed by the file part
    pub async fn upload(&self, target: &UploadTarget, filename: &str, bytes: Vec<u8>) -> Result<()> {
        let mut form = Form::new();
        for (name, value) in &target.fields {
            form = form.text(name.clone(), value.clone());
        }
        form = form.part("file", Part::bytes(bytes).file_name(filename.to_string()));

        debug!("Uploading {} to storage", filename);
        self.http
            .post(&target.url)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    pub async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.http.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}
