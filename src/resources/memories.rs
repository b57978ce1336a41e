//! Translation memory management

use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::Path;
use tracing::info;

use crate::core::client::{LaraClient, Upload};
use crate::core::errors::{LaraError, Result};
use crate::core::models::{ImportJob, Memory, TranslationUnit};
use crate::core::polling::{self, ImportStatusLookup, WaitOptions};
use crate::resources::file_name;

/// `/memories` endpoints
#[derive(Debug, Clone)]
pub struct Memories {
    client: LaraClient,
}

impl Memories {
    pub fn new(client: LaraClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Memory>> {
        self.client.get("/memories", None).await
    }

    pub async fn create(&self, name: &str, external_id: Option<&str>) -> Result<Memory> {
        let memory: Memory = self
            .client
            .post(
                "/memories",
                Some(json!({"name": name, "external_id": external_id})),
            )
            .await?;
        info!("Created memory {} ({})", memory.name, memory.id);
        Ok(memory)
    }

    /// `None` when the memory does not exist
    pub async fn get(&self, id: &str) -> Result<Option<Memory>> {
        match self.client.get(&format!("/memories/{id}"), None).await {
            Ok(memory) => Ok(Some(memory)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn delete(&self, id: &str) -> Result<Memory> {
        self.client.delete(&format!("/memories/{id}"), None).await
    }

    pub async fn update(&self, id: &str, name: &str) -> Result<Memory> {
        self.client
            .put(&format!("/memories/{id}"), Some(json!({"name": name})))
            .await
    }

    /// Connect memories owned by another account (e.g. a MateCat one)
    pub async fn connect(&self, ids: &[String]) -> Result<Vec<Memory>> {
        self.client
            .post("/memories/connect", Some(json!({"ids": ids})))
            .await
    }

    /// Upload a TMX file; the import runs server-side
    pub async fn import_tmx(&self, id: &str, tmx: impl AsRef<Path>) -> Result<ImportJob> {
        let tmx = tmx.as_ref();
        let bytes = tokio::fs::read(tmx).await?;
        self.import_tmx_bytes(id, &file_name(tmx), &bytes).await
    }

    pub async fn import_tmx_bytes(&self, id: &str, filename: &str, tmx: &[u8]) -> Result<ImportJob> {
        let upload = Upload::gzip("tmx", filename, tmx)?;
        let job: ImportJob = self
            .client
            .upload(
                &format!("/memories/{id}/import"),
                Some(json!({"compression": "gzip"})),
                upload,
            )
            .await?;
        info!("Started TMX import {} into memory {}", job.id, id);
        Ok(job)
    }

    pub async fn add_translation(&self, id: &str, unit: &TranslationUnit) -> Result<ImportJob> {
        self.client
            .put(&format!("/memories/{id}/content"), Some(unit_body(unit, None)?))
            .await
    }

    pub async fn add_translation_to_many(
        &self,
        ids: &[String],
        unit: &TranslationUnit,
    ) -> Result<ImportJob> {
        self.client
            .put("/memories/content", Some(unit_body(unit, Some(ids))?))
            .await
    }

    pub async fn delete_translation(&self, id: &str, unit: &TranslationUnit) -> Result<ImportJob> {
        self.client
            .delete(&format!("/memories/{id}/content"), Some(unit_body(unit, None)?))
            .await
    }

    pub async fn delete_translation_from_many(
        &self,
        ids: &[String],
        unit: &TranslationUnit,
    ) -> Result<ImportJob> {
        self.client
            .delete("/memories/content", Some(unit_body(unit, Some(ids))?))
            .await
    }

    pub async fn get_import_status(&self, id: &str) -> Result<ImportJob> {
        self.client
            .get(&format!("/memories/imports/{id}"), None)
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
}

#[async_trait]
impl ImportStatusLookup for Memories {
    async fn get_import_status(&self, job_id: &str) -> Result<ImportJob> {
        Memories::get_import_status(self, job_id).await
    }
}

fn unit_body(unit: &TranslationUnit, ids: Option<&[String]>) -> Result<Value> {
    let mut body = serde_json::to_value(unit)?;

    if let Some(ids) = ids {
        if ids.is_empty() {
            return Err(LaraError::InvalidInput {
                message: "at least one memory id is required".to_string(),
            });
        }
        if let Some(fields) = body.as_object_mut() {
            fields.insert("ids".to_string(), json!(ids));
        }
    }

    Ok(body)
}
