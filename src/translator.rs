//! Entry point of the SDK

use serde_json::{json, Value};

use crate::core::client::LaraClient;
use crate::core::config::ClientConfig;
use crate::core::credentials::Credentials;
use crate::core::errors::{LaraError, Result};
use crate::core::models::{DetectResult, TextResult, TranslateInput, TranslateOptions};
use crate::resources::documents::Documents;
use crate::resources::glossaries::Glossaries;
use crate::resources::memories::Memories;

/// Lara translator: text translation plus the memory, glossary and
/// document resources, all sharing one client.
#[derive(Debug, Clone)]
pub struct Translator {
    client: LaraClient,
    memories: Memories,
    glossaries: Glossaries,
    documents: Documents,
}

impl Translator {
    pub fn new(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        Ok(Self::with_client(LaraClient::new(credentials, config)?))
    }

    /// Credentials and configuration from the environment
    pub fn from_env() -> Result<Self> {
        Ok(Self::with_client(LaraClient::from_env()?))
    }

    pub fn with_client(client: LaraClient) -> Self {
        Self {
            memories: Memories::new(client.clone()),
            glossaries: Glossaries::new(client.clone()),
            documents: Documents::new(client.clone()),
            client,
        }
    }

    pub fn client(&self) -> &LaraClient {
        &self.client
    }

    pub fn memories(&self) -> &Memories {
        &self.memories
    }

    pub fn glossaries(&self) -> &Glossaries {
        &self.glossaries
    }

    pub fn documents(&self) -> &Documents {
        &self.documents
    }

    /// Supported language codes
    pub async fn languages(&self) -> Result<Vec<String>> {
        self.client.get("/languages", None).await
    }

    pub async fn translate(
        &self,
        text: impl Into<TranslateInput>,
        target: &str,
        options: &TranslateOptions,
    ) -> Result<TextResult> {
        let body = translate_body(text.into(), target, options)?;
        self.client.post("/translate", Some(body)).await
    }

    /// Detect the language of `text`. `passlist` restricts the candidates.
    pub async fn detect(
        &self,
        text: impl Into<TranslateInput>,
        hint: Option<&str>,
        passlist: Option<&[String]>,
    ) -> Result<DetectResult> {
        let q = match text.into() {
            TranslateInput::Blocks(_) => {
                return Err(LaraError::InvalidInput {
                    message: "language detection accepts plain strings only".to_string(),
                })
            }
            other => other,
        };

        self.client
            .post(
                "/detect",
                Some(json!({"q": q, "hint": hint, "passlist": passlist})),
            )
            .await
    }
}

fn translate_body(q: TranslateInput, target: &str, options: &TranslateOptions) -> Result<Value> {
    if target.is_empty() {
        return Err(LaraError::InvalidInput {
            message: "target language is required".to_string(),
        });
    }

    let mut body = serde_json::to_value(options)?;
    if let Some(fields) = body.as_object_mut() {
        fields.insert("q".to_string(), serde_json::to_value(q)?);
        fields.insert("target".to_string(), json!(target));
    }
    Ok(body)
}
