//! CLI command definitions and handlers

use clap::{Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;

use crate::core::models::{
    DocumentOptions, GlossaryFormat, ImportJob, ImportStatus, TranslateInput, TranslateOptions,
    TranslationStyle,
};
use crate::core::polling::WaitOptions;
use crate::translator::Translator;

/// Commands for the Lara CLI
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List supported languages
    Languages,

    /// Translate one or more strings
    Translate {
        /// Text to translate (repeat for several strings)
        #[arg(required = true)]
        text: Vec<String>,

        /// Target language
        #[arg(short, long)]
        target: String,

        /// Source language (auto-detect if not specified)
        #[arg(short, long)]
        source: Option<String>,

        /// Memory IDs to adapt to
        #[arg(long)]
        adapt_to: Vec<String>,

        /// Glossary IDs to apply
        #[arg(long)]
        glossary: Vec<String>,

        /// Extra instructions for the translator
        #[arg(long)]
        instruction: Vec<String>,

        /// Translation style
        #[arg(long, value_enum)]
        style: Option<StyleArg>,
    },

    /// Detect the language of a text
    Detect {
        text: String,

        /// Language hint
        #[arg(long)]
        hint: Option<String>,

        /// Restrict detection to these languages
        #[arg(long)]
        passlist: Vec<String>,
    },

    /// Manage translation memories
    Memories {
        #[command(subcommand)]
        action: MemoryAction,
    },

    /// Manage glossaries
    Glossaries {
        #[command(subcommand)]
        action: GlossaryAction,
    },

    /// Translate a document file
    Document {
        /// Input file
        #[arg(short, long)]
        file: PathBuf,

        /// Output file (default: <file>_translated)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Source language (auto-detect if not specified)
        #[arg(short, long)]
        source: Option<String>,

        /// Target language
        #[arg(short, long)]
        target: String,

        /// Memory IDs to adapt to
        #[arg(long)]
        adapt_to: Vec<String>,

        /// Glossary IDs to apply
        #[arg(long)]
        glossary: Vec<String>,

        /// Give up after this many seconds (0 waits forever)
        #[arg(long, default_value_t = 0)]
        max_wait: u64,
    },
}

/// Memory subcommands
#[derive(Subcommand, Debug)]
pub enum MemoryAction {
    /// List memories
    List,

    /// Create a memory
    Create {
        name: String,

        #[arg(long)]
        external_id: Option<String>,
    },

    /// Delete a memory
    Delete { id: String },

    /// Import a TMX file into a memory
    Import {
        id: String,

        #[arg(short, long)]
        file: PathBuf,

        /// Give up after this many seconds (0 waits forever)
        #[arg(long, default_value_t = 0)]
        max_wait: u64,

        /// Return right after the upload
        #[arg(long)]
        no_wait: bool,
    },
}

/// Glossary subcommands
#[derive(Subcommand, Debug)]
pub enum GlossaryAction {
    /// List glossaries
    List,

    /// Create a glossary
    Create { name: String },

    /// Delete a glossary
    Delete { id: String },

    /// Show term counts
    Counts { id: String },

    /// Import a CSV file into a glossary
    Import {
        id: String,

        #[arg(short, long)]
        file: PathBuf,

        /// CSV is a multidirectional table
        #[arg(long)]
        multi: bool,

        /// Give up after this many seconds (0 waits forever)
        #[arg(long, default_value_t = 0)]
        max_wait: u64,

        /// Return right after the upload
        #[arg(long)]
        no_wait: bool,
    },

    /// Export a glossary as CSV
    Export {
        id: String,

        #[arg(short, long)]
        output: PathBuf,

        /// Source language column
        #[arg(long)]
        source: Option<String>,

        /// Export as multidirectional table
        #[arg(long)]
        multi: bool,
    },
}

/// Translation style
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum StyleArg {
    Faithful,
    Fluid,
    Creative,
}

impl From<StyleArg> for TranslationStyle {
    fn from(style: StyleArg) -> Self {
        match style {
            StyleArg::Faithful => TranslationStyle::Faithful,
            StyleArg::Fluid => TranslationStyle::Fluid,
            StyleArg::Creative => TranslationStyle::Creative,
        }
    }
}

/// Dispatch a parsed command
pub async fn run(translator: &Translator, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Languages => handle_languages(translator).await,
        Commands::Translate {
            text,
            target,
            source,
            adapt_to,
            glossary,
            instruction,
            style,
        } => {
            let options = TranslateOptions {
                source,
                adapt_to: non_empty(adapt_to),
                glossaries: non_empty(glossary),
                instructions: non_empty(instruction),
                style: style.map(Into::into),
                ..Default::default()
            };
            handle_translate(translator, text, &target, &options).await
        }
        Commands::Detect {
            text,
            hint,
            passlist,
        } => handle_detect(translator, text, hint, passlist).await,
        Commands::Memories { action } => handle_memories(translator, action).await,
        Commands::Glossaries { action } => handle_glossaries(translator, action).await,
        Commands::Document {
            file,
            output,
            source,
            target,
            adapt_to,
            glossary,
            max_wait,
        } => {
            let options = DocumentOptions {
                adapt_to: non_empty(adapt_to),
                glossaries: non_empty(glossary),
                style: None,
            };
            handle_document(translator, file, output, source, target, options, max_wait).await
        }
    }
}

/// Handle languages command
pub async fn handle_languages(translator: &Translator) -> anyhow::Result<()> {
    let languages = translator.languages().await?;
    println!("{}", languages.join(", "));
    Ok(())
}

/// Handle text translation command
pub async fn handle_translate(
    translator: &Translator,
    mut text: Vec<String>,
    target: &str,
    options: &TranslateOptions,
) -> anyhow::Result<()> {
    let input = if text.len() == 1 {
        TranslateInput::Text(text.remove(0))
    } else {
        TranslateInput::Texts(text)
    };

    let result = translator.translate(input, target, options).await?;
    info!("Translated from {} to {}", result.source_language, target);

    println!("{}", serde_json::to_string_pretty(&result.translation)?);
    Ok(())
}

/// Handle language detection command
pub async fn handle_detect(
    translator: &Translator,
    text: String,
    hint: Option<String>,
    passlist: Vec<String>,
) -> anyhow::Result<()> {
    let passlist = non_empty(passlist);
    let result = translator
        .detect(text, hint.as_deref(), passlist.as_deref())
        .await?;

    println!("Language: {}", result.language);
    println!("Content type: {}", result.content_type);
    Ok(())
}

/// Handle memory commands
pub async fn handle_memories(translator: &Translator, action: MemoryAction) -> anyhow::Result<()> {
    let memories = translator.memories();

    match action {
        MemoryAction::List => {
            for memory in memories.list().await? {
                println!("{}\t{}", memory.id, memory.name);
            }
        }
        MemoryAction::Create { name, external_id } => {
            let memory = memories.create(&name, external_id.as_deref()).await?;
            println!("✅ Created memory: {} (ID: {})", memory.name, memory.id);
        }
        MemoryAction::Delete { id } => {
            let memory = memories.delete(&id).await?;
            println!("🗑️  Deleted memory: {}", memory.name);
        }
        MemoryAction::Import {
            id,
            file,
            max_wait,
            no_wait,
        } => {
            info!("Importing {} into memory {}", file.display(), id);
            let job = memories.import_tmx(&id, &file).await?;
            println!("Import started with ID: {}", job.id);

            if !no_wait {
                let options = wait_options(memories.wait_options(), max_wait);
                let pb = import_progress_bar();
                let job = memories
                    .wait_for_import_with_progress(&job, options, |job| update_progress(&pb, job))
                    .await;
                report_import(&pb, job?);
            }
        }
    }

    Ok(())
}

/// Handle glossary commands
pub async fn handle_glossaries(translator: &Translator, action: GlossaryAction) -> anyhow::Result<()> {
    let glossaries = translator.glossaries();

    match action {
        GlossaryAction::List => {
            for glossary in glossaries.list().await? {
                println!("{}\t{}", glossary.id, glossary.name);
            }
        }
        GlossaryAction::Create { name } => {
            let glossary = glossaries.create(&name).await?;
            println!("✅ Created glossary: {} (ID: {})", glossary.name, glossary.id);
        }
        GlossaryAction::Delete { id } => {
            let glossary = glossaries.delete(&id).await?;
            println!("🗑️  Deleted glossary: {}", glossary.name);
        }
        GlossaryAction::Counts { id } => {
            let counts = glossaries.counts(&id).await?;
            let mut languages: Vec<_> = counts.unidirectional.iter().collect();
            languages.sort();
            for (language, count) in languages {
                println!("   {}: {} entries", language, count);
            }
            println!("   multidirectional: {}", counts.multidirectional);
            println!("   Total entries: {}", counts.total());
        }
        GlossaryAction::Import {
            id,
            file,
            multi,
            max_wait,
            no_wait,
        } => {
            info!("Importing {} into glossary {}", file.display(), id);
            let job = glossaries.import_csv(&id, &file, glossary_format(multi)).await?;
            println!("Import started with ID: {}", job.id);

            if !no_wait {
                let options = wait_options(glossaries.wait_options(), max_wait);
                let pb = import_progress_bar();
                let job = glossaries
                    .wait_for_import_with_progress(&job, options, |job| update_progress(&pb, job))
                    .await;
                report_import(&pb, job?);
            }
        }
        GlossaryAction::Export {
            id,
            output,
            source,
            multi,
        } => {
            let data = glossaries
                .export(&id, glossary_format(multi), source.as_deref())
                .await?;
            tokio::fs::write(&output, &data).await?;
            println!("💾 Exported {} bytes to {}", data.len(), output.display());
        }
    }

    Ok(())
}

/// Handle document translation command
pub async fn handle_document(
    translator: &Translator,
    file: PathBuf,
    output: Option<PathBuf>,
    source: Option<String>,
    target: String,
    options: DocumentOptions,
    max_wait: u64,
) -> anyhow::Result<()> {
    let start_time = Instant::now();

    let output = output.unwrap_or_else(|| translated_path(&file));

    info!("Starting document translation");
    info!("Input: {}", file.display());
    info!("Output: {}", output.display());
    info!("Target language: {}", target);

    let pb = ProgressBar::new_spinner();
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(format!("Translating {}", file.display()));

    let wait = wait_options(WaitOptions::from_config(translator.client().config()), max_wait);
    let result = translator
        .documents()
        .translate(&file, source.as_deref(), &target, &options, wait)
        .await;
    pb.finish_and_clear();

    let translated = result?;
    tokio::fs::write(&output, &translated).await?;

    println!("\n✅ Document translation completed!");
    println!("   Output: {}", output.display());
    println!("   Time: {:?}", start_time.elapsed());

    Ok(())
}

fn non_empty(values: Vec<String>) -> Option<Vec<String>> {
    (!values.is_empty()).then_some(values)
}

fn glossary_format(multi: bool) -> GlossaryFormat {
    if multi {
        GlossaryFormat::TableMulti
    } else {
        GlossaryFormat::TableUni
    }
}

/// CLI `--max-wait` (seconds) overrides the configured bound when set
fn wait_options(defaults: WaitOptions, max_wait_secs: u64) -> WaitOptions {
    if max_wait_secs > 0 {
        defaults.with_max_wait_time(Duration::from_secs(max_wait_secs))
    } else {
        defaults
    }
}

fn translated_path(file: &std::path::Path) -> PathBuf {
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let name = match file.extension() {
        Some(ext) => format!("{}_translated.{}", stem, ext.to_string_lossy()),
        None => format!("{stem}_translated"),
    };
    file.with_file_name(name)
}

fn import_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(100);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% {msg}")
    {
        pb.set_style(style.progress_chars("=>-"));
    }
    pb
}

fn update_progress(pb: &ProgressBar, job: &ImportJob) {
    pb.set_position((job.progress.clamp(0.0, 1.0) * 100.0).round() as u64);
    pb.set_message(job.status.to_string());
}

fn report_import(pb: &ProgressBar, job: ImportJob) {
    match job.status {
        ImportStatus::Error => {
            pb.abandon_with_message("failed");
            eprintln!("❌ Import {} failed", job.id);
        }
        _ => {
            pb.finish_with_message("done");
            println!("✅ Import completed!");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::Path;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(subcommand)]
        command: Commands,
    }

    #[test]
    fn test_parse_memory_import() {
        let cli = TestCli::try_parse_from([
            "lara", "memories", "import", "mem_1", "--file", "memory.tmx", "--max-wait", "30",
        ])
        .unwrap();

        match cli.command {
            Commands::Memories {
                action: MemoryAction::Import { id, file, max_wait, no_wait },
            } => {
                assert_eq!(id, "mem_1");
                assert_eq!(file, PathBuf::from("memory.tmx"));
                assert_eq!(max_wait, 30);
                assert!(!no_wait);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_translate_many() {
        let cli = TestCli::try_parse_from([
            "lara", "translate", "Hello", "Goodbye", "--target", "es-ES", "--style", "fluid",
        ])
        .unwrap();

        match cli.command {
            Commands::Translate { text, target, style, .. } => {
                assert_eq!(text, vec!["Hello", "Goodbye"]);
                assert_eq!(target, "es-ES");
                assert!(matches!(style, Some(StyleArg::Fluid)));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_wait_options_override() {
        let defaults = WaitOptions::default();
        assert_eq!(wait_options(defaults, 0), defaults);
        assert_eq!(
            wait_options(defaults, 10).max_wait_time,
            Some(Duration::from_secs(10))
        );
    }

    #[test]
    fn test_translated_path() {
        assert_eq!(
            translated_path(Path::new("docs/report.docx")),
            PathBuf::from("docs/report_translated.docx")
        );
        assert_eq!(
            translated_path(Path::new("README")),
            PathBuf::from("README_translated")
        );
    }
}
