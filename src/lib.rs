//! Lara SDK - async Rust client for the Lara translation API
//!
//! This library wraps text translation, language detection, document
//! translation, translation memories and glossaries, and waits on
//! server-side import jobs by polling their status.

#![forbid(unsafe_code)]

pub mod cli;
pub mod core;
pub mod resources;
pub mod translator;

// Re-export key types for convenience
pub use crate::core::{
    client::LaraClient,
    config::ClientConfig,
    credentials::Credentials,
    errors::{LaraError, Result},
    models::{
        DetectResult, Document, DocumentOptions, DocumentStatus, Glossary, GlossaryCounts,
        GlossaryFormat, ImportJob, ImportStatus, Memory, TextBlock, TextResult, TranslateInput,
        TranslateOptions, TranslatePriority, Translation, TranslationStyle, TranslationUnit,
        UseCache,
    },
    polling::{wait_for_import, wait_for_import_with_progress, ImportStatusLookup, WaitOptions},
};

pub use resources::{documents::Documents, glossaries::Glossaries, memories::Memories};
pub use translator::Translator;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
