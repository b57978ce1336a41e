//! Glossary management

use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;
use std::path::Path;
use tracing::info;

use crate::core::client::{LaraClient, Upload};
use crate::core::errors::Result;
use crate::core::models::{Glossary, GlossaryCounts, GlossaryFormat, ImportJob};
use crate::core::polling::{self, ImportStatusLookup, WaitOptions};
use crate::resources::file_name;

/// `/glossaries` endpoints
#[derive(Debug, Clone)]
pub struct Glossaries {
    client: LaraClient,
}

impl Glossaries {
    pub fn new(client: LaraClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Glossary>> {
        self.client.get("/glossaries", None).await
    }

    pub async fn create(&self, name: &str) -> Result<Glossary> {
        let glossary: Glossary = self
            .client
            .post("/glossaries", Some(json!({"name": name})))
            .await?;
        info!("Created glossary {} ({})", glossary.name, glossary.id);
        Ok(glossary)
    }

    /// `None` when the glossary does not exist
    pub async fn get(&self, id: &str) -> Result<Option<Glossary>> {
        match self.client.get(&format!("/glossaries/{id}"), None).await {
            Ok(glossary) => Ok(Some(glossary)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn delete(&self, id: &str) -> Result<Glossary> {
        self.client.delete(&format!("/glossaries/{id}"), None).await
    }

    pub async fn update(&self, id: &str, name: &str) -> Result<Glossary> {
        self.client
            .put(&format!("/glossaries/{id}"), Some(json!({"name": name})))
            .await
    }

    pub async fn counts(&self, id: &str) -> Result<GlossaryCounts> {
        self.client
            .get(&format!("/glossaries/{id}/counts"), None)
            .await
    }

    /// Upload a CSV file; the import runs server-side
    pub async fn import_csv(
        &self,
        id: &str,
        csv: impl AsRef<Path>,
        format: GlossaryFormat,
    ) -> Result<ImportJob> {
        let csv = csv.as_ref();
        let bytes = tokio::fs::read(csv).await?;
        self.import_csv_bytes(id, &file_name(csv), &bytes, format)
            .await
    }

    pub async fn import_csv_bytes(
        &self,
        id: &str,
        filename: &str,
        csv: &[u8],
        format: GlossaryFormat,
    ) -> Result<ImportJob> {
        let upload = Upload::gzip("csv", filename, csv)?;
        let job: ImportJob = self
            .client
            .upload(
                &format!("/glossaries/{id}/import"),
                Some(json!({"compression": "gzip", "content_type": format.as_str()})),
                upload,
            )
            .await?;
        info!("Started CSV import {} into glossary {}", job.id, id);
        Ok(job)
    }

    pub async fn get_import_status(&self, id: &str) -> Result<ImportJob> {
        self.client
            .get(&format!("/glossaries/imports/{id}"), None)
            .await
    }

    /// Wait options taken from the client configuration
    pub fn wait_options(&self) -> WaitOptions {
        WaitOptions::from_config(self.client.config())
    }

    pub async fn wait_for_import(&self, job: &ImportJob, options: WaitOptions) -> Result<ImportJob> {
        polling::wait_for_import(self, job, options).await
    }

    pub async fn wait_for_import_with_progress<U>(
        &self,
        job: &ImportJob,
        options: WaitOptions,
        on_update: U,
    ) -> Result<ImportJob>
    where
        U: FnMut(&ImportJob),
    {
        polling::wait_for_import_with_progress(self, job, options, on_update).await
    }

    /// Raw CSV export. `source` selects the language column of a
    /// unidirectional table.
    pub async fn export(
        &self,
        id: &str,
        format: GlossaryFormat,
        source: Option<&str>,
    ) -> Result<Vec<u8>> {
        self.client
            .request_bytes(
                Method::GET,
                &format!("/glossaries/{id}/export"),
                Some(json!({"content_type": format.as_str(), "source": source})),
            )
            .await
    }
}

#[async_trait]
impl ImportStatusLookup for Glossaries {
    async fn get_import_status(&self, job_id: &str) -> Result<ImportJob> {
        Glossaries::get_import_status(self, job_id).await
    }
}
