//! Data models exchanged with the Lara API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Status of a server-side import job.
///
/// The label set belongs to the service, so unknown labels are kept in
/// [`ImportStatus::Other`] rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ImportStatus {
    Pending,
    Running,
    Done,
    Error,
    Other(String),
}

impl ImportStatus {
    /// `Done` and `Error` never transition again
    pub fn is_terminal(&self) -> bool {
        matches!(self, ImportStatus::Done | ImportStatus::Error)
    }

    pub fn as_str(&self) -> &str {
        match self {
            ImportStatus::Pending => "pending",
            ImportStatus::Running => "running",
            ImportStatus::Done => "done",
            ImportStatus::Error => "error",
            ImportStatus::Other(label) => label,
        }
    }

    /// Status implied by a progress ratio when the payload has no label
    pub fn from_progress(progress: f64) -> Self {
        if progress >= 1.0 {
            ImportStatus::Done
        } else if progress > 0.0 {
            ImportStatus::Running
        } else {
            ImportStatus::Pending
        }
    }
}

impl From<&str> for ImportStatus {
    fn from(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "pending" => ImportStatus::Pending,
            "running" => ImportStatus::Running,
            "done" => ImportStatus::Done,
            "error" => ImportStatus::Error,
            _ => ImportStatus::Other(label.to_string()),
        }
    }
}

impl fmt::Display for ImportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ImportStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ImportStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(ImportStatus::from(label.as_str()))
    }
}

/// Snapshot of a memory or glossary import job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawImportJob")]
pub struct ImportJob {
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub status: ImportStatus,
    pub begin: Option<i64>,
    pub end: Option<i64>,
    pub channel: Option<i64>,
    pub size: Option<i64>,
    pub progress: f64,
}

impl ImportJob {
    /// Local handle for a job id with nothing observed yet
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at: None,
            status: ImportStatus::Pending,
            begin: None,
            end: None,
            channel: None,
            size: None,
            progress: 0.0,
        }
    }

    pub fn with_status(mut self, status: ImportStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[derive(Deserialize)]
struct RawImportJob {
    id: String,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    status: Option<ImportStatus>,
    #[serde(default)]
    begin: Option<i64>,
    #[serde(default)]
    end: Option<i64>,
    #[serde(default)]
    channel: Option<i64>,
    #[serde(default)]
    size: Option<i64>,
    #[serde(default)]
    progress: Option<f64>,
}

impl From<RawImportJob> for ImportJob {
    fn from(raw: RawImportJob) -> Self {
        let progress = raw.progress.unwrap_or(0.0);
        let status = raw
            .status
            .unwrap_or_else(|| ImportStatus::from_progress(progress));

        Self {
            id: raw.id,
            created_at: raw.created_at,
            status,
            begin: raw.begin,
            end: raw.end,
            channel: raw.channel,
            size: raw.size,
            progress,
        }
    }
}

/// Translation memory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub collaborators_count: Option<u32>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub shared_at: Option<DateTime<Utc>>,
}

/// A single translation unit added to or removed from memories.
///
/// Without a `tuid` an add always creates a new unit, and a delete removes
/// every unit matching the remaining fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TranslationUnit {
    pub source: String,
    pub target: String,
    pub sentence: String,
    pub translation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentence_before: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentence_after: Option<String>,
}

impl TranslationUnit {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        sentence: impl Into<String>,
        translation: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            sentence: sentence.into(),
            translation: translation.into(),
            ..Default::default()
        }
    }

    pub fn with_tuid(mut self, tuid: impl Into<String>) -> Self {
        self.tuid = Some(tuid.into());
        self
    }

    pub fn with_context(
        mut self,
        sentence_before: impl Into<String>,
        sentence_after: impl Into<String>,
    ) -> Self {
        self.sentence_before = Some(sentence_before.into());
        self.sentence_after = Some(sentence_after.into());
        self
    }
}

/// Glossary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Glossary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Term counts of a glossary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlossaryCounts {
    #[serde(default)]
    pub unidirectional: HashMap<String, u64>,
    #[serde(default)]
    pub multidirectional: u64,
}

impl GlossaryCounts {
    pub fn total(&self) -> u64 {
        self.unidirectional.values().sum::<u64>() + self.multidirectional
    }
}

/// CSV layouts accepted by glossary import and export
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GlossaryFormat {
    #[default]
    #[serde(rename = "csv/table-uni")]
    TableUni,
    #[serde(rename = "csv/table-multi")]
    TableMulti,
}

impl GlossaryFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            GlossaryFormat::TableUni => "csv/table-uni",
            GlossaryFormat::TableMulti => "csv/table-multi",
        }
    }
}

/// Segment of text that may or may not be translated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    pub text: String,
    #[serde(default = "default_true")]
    pub translatable: bool,
}

fn default_true() -> bool {
    true
}

impl TextBlock {
    pub fn translatable(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            translatable: true,
        }
    }

    pub fn verbatim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            translatable: false,
        }
    }
}

/// Text to translate; the result mirrors its shape
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TranslateInput {
    Text(String),
    Texts(Vec<String>),
    Blocks(Vec<TextBlock>),
}

impl From<&str> for TranslateInput {
    fn from(text: &str) -> Self {
        TranslateInput::Text(text.to_string())
    }
}

impl From<String> for TranslateInput {
    fn from(text: String) -> Self {
        TranslateInput::Text(text)
    }
}

impl From<Vec<String>> for TranslateInput {
    fn from(texts: Vec<String>) -> Self {
        TranslateInput::Texts(texts)
    }
}

impl From<Vec<&str>> for TranslateInput {
    fn from(texts: Vec<&str>) -> Self {
        TranslateInput::Texts(texts.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<TextBlock>> for TranslateInput {
    fn from(blocks: Vec<TextBlock>) -> Self {
        TranslateInput::Blocks(blocks)
    }
}

/// Translated content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Translation {
    Text(String),
    Texts(Vec<String>),
    Blocks(Vec<TextBlock>),
}

impl Translation {
    /// Single-string translation, if that is the shape returned
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Translation::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Result of a text translation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextResult {
    pub content_type: String,
    pub source_language: String,
    pub translation: Translation,
    #[serde(default)]
    pub adapted_to: Option<Vec<String>>,
    #[serde(default)]
    pub glossaries: Option<Vec<String>>,
}

/// Result of language detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectResult {
    pub language: String,
    pub content_type: String,
}

/// Scheduling priority of a translation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslatePriority {
    Normal,
    Background,
}

/// Server-side cache policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UseCache {
    Yes,
    No,
    Overwrite,
}

impl From<bool> for UseCache {
    fn from(value: bool) -> Self {
        if value {
            UseCache::Yes
        } else {
            UseCache::No
        }
    }
}

/// Translation style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationStyle {
    Faithful,
    Fluid,
    Creative,
}

/// Options for [`crate::Translator::translate`].
///
/// `multiline` defaults to `true`; every other field is omitted from the
/// request when unset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adapt_to: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glossaries: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub multiline: bool,
    #[serde(rename = "timeout", skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TranslatePriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_cache: Option<UseCache>,
    #[serde(rename = "cache_ttl", skip_serializing_if = "Option::is_none")]
    pub cache_ttl_s: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<TranslationStyle>,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            source: None,
            source_hint: None,
            adapt_to: None,
            glossaries: None,
            instructions: None,
            content_type: None,
            multiline: true,
            timeout_ms: None,
            priority: None,
            use_cache: None,
            cache_ttl_s: None,
            style: None,
        }
    }
}

impl TranslateOptions {
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_source_hint(mut self, hint: impl Into<String>) -> Self {
        self.source_hint = Some(hint.into());
        self
    }

    pub fn with_adapt_to(mut self, memories: Vec<String>) -> Self {
        self.adapt_to = Some(memories);
        self
    }

    pub fn with_glossaries(mut self, glossaries: Vec<String>) -> Self {
        self.glossaries = Some(glossaries);
        self
    }

    pub fn with_instructions(mut self, instructions: Vec<String>) -> Self {
        self.instructions = Some(instructions);
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_multiline(mut self, multiline: bool) -> Self {
        self.multiline = multiline;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn with_priority(mut self, priority: TranslatePriority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_use_cache(mut self, use_cache: impl Into<UseCache>) -> Self {
        self.use_cache = Some(use_cache.into());
        self
    }

    pub fn with_cache_ttl_s(mut self, ttl: u64) -> Self {
        self.cache_ttl_s = Some(ttl);
        self
    }

    pub fn with_style(mut self, style: TranslationStyle) -> Self {
        self.style = Some(style);
        self
    }
}

/// Lifecycle state of a translated document
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DocumentStatus {
    Initialized,
    Analyzing,
    Paused,
    Ready,
    Translating,
    Translated,
    Error,
    Other(String),
}

impl DocumentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DocumentStatus::Translated | DocumentStatus::Error)
    }

    pub fn as_str(&self) -> &str {
        match self {
            DocumentStatus::Initialized => "initialized",
            DocumentStatus::Analyzing => "analyzing",
            DocumentStatus::Paused => "paused",
            DocumentStatus::Ready => "ready",
            DocumentStatus::Translating => "translating",
            DocumentStatus::Translated => "translated",
            DocumentStatus::Error => "error",
            DocumentStatus::Other(label) => label,
        }
    }
}

impl From<&str> for DocumentStatus {
    fn from(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "initialized" => DocumentStatus::Initialized,
            "analyzing" => DocumentStatus::Analyzing,
            "paused" => DocumentStatus::Paused,
            "ready" => DocumentStatus::Ready,
            "translating" => DocumentStatus::Translating,
            "translated" => DocumentStatus::Translated,
            "error" => DocumentStatus::Error,
            _ => DocumentStatus::Other(label.to_string()),
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DocumentStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DocumentStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(DocumentStatus::from(label.as_str()))
    }
}

/// Document translation job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub status: DocumentStatus,
    #[serde(default)]
    pub source: Option<String>,
    pub target: String,
    pub filename: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub translated_chars: Option<u64>,
    #[serde(default)]
    pub total_chars: Option<u64>,
    #[serde(default)]
    pub error_reason: Option<String>,
}

/// Options for document upload and translation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocumentOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adapt_to: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glossaries: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<TranslationStyle>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_import_status_terminality() {
        assert!(ImportStatus::Done.is_terminal());
        assert!(ImportStatus::Error.is_terminal());
        assert!(!ImportStatus::Pending.is_terminal());
        assert!(!ImportStatus::Running.is_terminal());
        assert!(!ImportStatus::Other("queued".to_string()).is_terminal());
    }

    #[test]
    fn test_import_status_keeps_unknown_labels() {
        let status: ImportStatus = serde_json::from_value(json!("Queued")).unwrap();
        assert_eq!(status, ImportStatus::Other("Queued".to_string()));
        assert_eq!(serde_json::to_value(&status).unwrap(), json!("Queued"));

        let status: ImportStatus = serde_json::from_value(json!("DONE")).unwrap();
        assert_eq!(status, ImportStatus::Done);
    }

    #[test]
    fn test_import_job_status_derived_from_progress() {
        let job: ImportJob = serde_json::from_value(json!({
            "id": "imp_1",
            "begin": 0,
            "end": 10,
            "channel": 1,
            "size": 2048,
            "progress": 0.4
        }))
        .unwrap();
        assert_eq!(job.status, ImportStatus::Running);
        assert_eq!(job.size, Some(2048));

        let job: ImportJob =
            serde_json::from_value(json!({"id": "imp_1", "progress": 1.0})).unwrap();
        assert_eq!(job.status, ImportStatus::Done);

        let job: ImportJob = serde_json::from_value(json!({"id": "imp_1"})).unwrap();
        assert_eq!(job.status, ImportStatus::Pending);
    }

    #[test]
    fn test_import_job_explicit_status_wins() {
        let job: ImportJob = serde_json::from_value(json!({
            "id": "imp_1",
            "status": "error",
            "progress": 0.3,
            "created_at": "2024-05-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(job.status, ImportStatus::Error);
        assert!(job.is_terminal());
        assert!(job.created_at.is_some());
    }

    #[test]
    fn test_translate_options_defaults() {
        let value = serde_json::to_value(TranslateOptions::default()).unwrap();
        assert_eq!(value, json!({"multiline": true}));
    }

    #[test]
    fn test_translate_options_wire_names() {
        let options = TranslateOptions::default()
            .with_source("en-US")
            .with_timeout_ms(10_000)
            .with_cache_ttl_s(60)
            .with_use_cache(true)
            .with_priority(TranslatePriority::Background)
            .with_style(TranslationStyle::Fluid);

        let value = serde_json::to_value(options).unwrap();
        assert_eq!(value["timeout"], json!(10_000));
        assert_eq!(value["cache_ttl"], json!(60));
        assert_eq!(value["use_cache"], json!("yes"));
        assert_eq!(value["priority"], json!("background"));
        assert_eq!(value["style"], json!("fluid"));
    }

    #[test]
    fn test_translation_shapes() {
        let single: Translation = serde_json::from_value(json!("Bonjour")).unwrap();
        assert_eq!(single.as_text(), Some("Bonjour"));

        let many: Translation = serde_json::from_value(json!(["Hola", "Adiós"])).unwrap();
        assert_eq!(
            many,
            Translation::Texts(vec!["Hola".to_string(), "Adiós".to_string()])
        );

        let blocks: Translation = serde_json::from_value(json!([
            {"text": "Ciao", "translatable": true},
            {"text": "<br>", "translatable": false}
        ]))
        .unwrap();
        assert_eq!(
            blocks,
            Translation::Blocks(vec![TextBlock::translatable("Ciao"), TextBlock::verbatim("<br>")])
        );
    }

    #[test]
    fn test_glossary_counts_total() {
        let counts: GlossaryCounts = serde_json::from_value(json!({
            "unidirectional": {"en-US": 12, "it-IT": 3},
            "multidirectional": 5
        }))
        .unwrap();
        assert_eq!(counts.total(), 20);
    }

    #[test]
    fn test_document_status_labels() {
        let doc: Document = serde_json::from_value(json!({
            "id": "doc_1",
            "status": "translating",
            "target": "de-DE",
            "filename": "report.docx"
        }))
        .unwrap();
        assert_eq!(doc.status, DocumentStatus::Translating);
        assert!(!doc.status.is_terminal());
        assert!(DocumentStatus::from("translated").is_terminal());
    }
}
