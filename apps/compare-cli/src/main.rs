//! Document comparison CLI
//!
//! Compares two PDFs (or plain-text files, pages split on form feeds) and
//! prints the result as JSON on stdout. Logs go to stderr.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use compare_ai::{compare_documents, AiConfig, AiOrchestrator, ComparisonOutcome, HttpAiBackend};
use compare_core::{parse_page_selectors, Comparator, ComparisonDocument, ComparisonDocuments};
use compare_types::{AiComparisonOptions, AiComparisonPhase, AiOperationType, ComparisonOperation, TextComparisonOptions};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod export;

use config::CliConfig;
use export::{session_report, SessionReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AiMode {
    /// Summary and categories for the whole comparison
    Analyze,
    /// Category tags per change
    Tag,
}

impl From<AiMode> for AiOperationType {
    fn from(mode: AiMode) -> Self {
        match mode {
            AiMode::Analyze => AiOperationType::Analyze,
            AiMode::Tag => AiOperationType::Tag,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "compare")]
#[command(version, about = "Compare two documents page by page and print the diff as JSON")]
struct Args {
    /// Original document (.pdf or .txt)
    original: PathBuf,

    /// Changed document (.pdf or .txt)
    changed: PathBuf,

    /// Pages of the original to compare, 0-based (e.g. "0,2-4")
    #[arg(long)]
    original_pages: Option<String>,

    /// Pages of the changed document to compare, 0-based
    #[arg(long)]
    changed_pages: Option<String>,

    /// Compare whole words instead of characters
    #[arg(long)]
    word_level: bool,

    /// Words of context around each change
    #[arg(long)]
    context_words: Option<usize>,

    /// Enrich the diff with the AI service
    #[arg(long, value_enum)]
    ai: Option<AiMode>,

    /// Categories for AI tagging, comma separated
    #[arg(long, value_delimiter = ',')]
    categories: Vec<String>,

    #[arg(long)]
    original_password: Option<String>,

    #[arg(long)]
    changed_password: Option<String>,

    /// Also print the navigable change list and highlight regions
    #[arg(long)]
    changes: bool,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Output {
    #[serde(flatten)]
    outcome: ComparisonOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    session: Option<SessionReport>,
}

fn load_document(path: &Path, password: Option<&str>, pages: Option<&str>) -> Result<ComparisonDocument> {
    let is_text = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));

    let document = if is_text {
        let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        ComparisonDocument::text(&text)
    } else {
        let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        ComparisonDocument::pdf(&bytes, password).with_context(|| format!("Failed to open {}", path.display()))?
    };

    match pages {
        Some(pages) => {
            let selectors =
                parse_page_selectors(pages).with_context(|| format!("Invalid page selection for {}", path.display()))?;
            Ok(document.with_pages(selectors))
        }
        None => Ok(document),
    }
}

fn resolve_ai_config(config: &CliConfig) -> Result<AiConfig> {
    match &config.ai {
        Some(ai) => Ok(ai.clone()),
        None => AiConfig::from_env()?.context("No AI service configured: set COMPARE_AI_URL or add an [ai] section"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // stdout carries the JSON result
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match &args.config {
        Some(path) => CliConfig::from_file(path)?,
        None => CliConfig::default(),
    };

    let text_options = TextComparisonOptions {
        word_level: args.word_level || config.text.word_level,
        number_of_context_words: args.context_words.or(config.text.number_of_context_words),
    };

    let documents = ComparisonDocuments::new(
        load_document(
            &args.original,
            args.original_password.as_deref(),
            args.original_pages.as_deref(),
        )?,
        load_document(
            &args.changed,
            args.changed_password.as_deref(),
            args.changed_pages.as_deref(),
        )?,
    );

    let comparator = Comparator::new();
    let outcome = match args.ai {
        None => ComparisonOutcome::Text {
            result: comparator.compare(&documents, &text_options).await?,
        },
        Some(mode) => {
            let ai_config = resolve_ai_config(&config)?;
            let backend = HttpAiBackend::new(&ai_config)?;
            let orchestrator = AiOrchestrator::new(Arc::new(backend));
            let options = AiComparisonOptions {
                operation_type: mode.into(),
                categories: (!args.categories.is_empty()).then(|| args.categories.clone()),
                text_options: text_options.clone(),
            };
            info!(base_url = %ai_config.base_url, ?mode, "Requesting AI comparison");
            compare_documents(&comparator, &orchestrator, &documents, &ComparisonOperation::Ai(options)).await?
        }
    };

    if let ComparisonOutcome::Ai { result: Some(result) } = &outcome {
        let data = result.data();
        if data.phase == AiComparisonPhase::Error {
            if let Some(error) = &data.error {
                warn!(message = %error.message, details = ?error.details, "AI comparison failed, text diff kept");
            }
        }
    }

    let session = match (args.changes, outcome.comparison()) {
        (true, Some(comparison)) => Some(session_report(
            comparison,
            config.highlight.clone(),
            text_options.context_words(),
        )?),
        _ => None,
    };

    let output = Output { outcome, session };
    let json = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", json);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "compare",
            "a.pdf",
            "b.pdf",
            "--original-pages",
            "0-2",
            "--ai",
            "tag",
            "--categories",
            "legal,financial",
        ])
        .unwrap();
        assert_eq!(args.ai, Some(AiMode::Tag));
        assert_eq!(args.categories, vec!["legal", "financial"]);
        assert_eq!(args.original_pages.as_deref(), Some("0-2"));
        assert!(!args.word_level);
    }

    #[test]
    fn test_text_file_pages_split_on_form_feed() {
        let dir = std::env::temp_dir().join(format!("compare-cli-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("doc.txt");
        fs::write(&path, "first page\x0csecond page").unwrap();

        let document = load_document(&path, None, Some("1")).unwrap();
        assert_eq!(document.page_count(), 2);
        assert_eq!(document.resolve_pages().unwrap(), vec![1]);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_bad_page_selection_is_rejected() {
        let dir = std::env::temp_dir().join(format!("compare-cli-bad-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("doc.txt");
        fs::write(&path, "only page").unwrap();

        assert!(load_document(&path, None, Some("x-y")).is_err());

        fs::remove_dir_all(&dir).unwrap();
    }
}
