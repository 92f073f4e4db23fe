//! Async comparison pipeline
//!
//! The [`Comparator`] extracts both documents in parallel, diffs the page
//! pairs one at a time on the blocking pool and caches both stages. Every
//! call to [`Comparator::compare`] supersedes the previous one: a comparison
//! that finishes after a newer one started reports `None` instead of a
//! result.

use crate::compare::{compare_page_pair, pair_pages};
use crate::diff::DiffEngine;
use crate::document::{DocumentSource, InMemoryDocument};
use crate::error::CompareError;
use crate::extract::{ExtractedText, TextExtractor};
use crate::pdf::PdfDocument;
use crate::selector::resolve_page_indexes;
use compare_types::{DocumentComparisonResult, PageSelector, TextComparisonOptions};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, instrument};

/// One side of a comparison: a document plus its page selection
#[derive(Clone)]
pub struct ComparisonDocument {
    source: Arc<dyn DocumentSource>,
    pages: Option<Vec<PageSelector>>,
}

impl ComparisonDocument {
    pub fn new(source: Arc<dyn DocumentSource>) -> Self {
        Self {
            source,
            pages: None,
        }
    }

    /// Load PDF bytes, unlocking them with `password` when encrypted
    pub fn pdf(bytes: &[u8], password: Option<&str>) -> Result<Self, CompareError> {
        Ok(Self::new(Arc::new(PdfDocument::load(bytes, password)?)))
    }

    /// Plain text, pages separated by form feeds
    pub fn text(text: &str) -> Self {
        Self::new(Arc::new(InMemoryDocument::from_text(text)))
    }

    /// Restrict the comparison to the selected pages
    pub fn with_pages(mut self, pages: Vec<PageSelector>) -> Self {
        self.pages = Some(pages);
        self
    }

    pub fn page_count(&self) -> u32 {
        self.source.page_count()
    }

    pub fn resolve_pages(&self) -> Result<Vec<u32>, CompareError> {
        resolve_page_indexes(self.pages.as_deref(), self.source.page_count())
    }
}

#[derive(Clone)]
pub struct ComparisonDocuments {
    pub original: ComparisonDocument,
    pub changed: ComparisonDocument,
}

impl ComparisonDocuments {
    pub fn new(original: ComparisonDocument, changed: ComparisonDocument) -> Self {
        Self { original, changed }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ExtractionKey {
    fingerprint: String,
    pages: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DiffKey {
    original: ExtractionKey,
    changed: ExtractionKey,
    options: TextComparisonOptions,
}

#[derive(Default)]
pub struct Comparator {
    extractor: TextExtractor,
    generation: AtomicU64,
    extractions: Mutex<HashMap<ExtractionKey, Arc<ExtractedText>>>,
    diffs: Mutex<HashMap<DiffKey, Arc<DocumentComparisonResult>>>,
}

impl Comparator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generation of the most recently started comparison
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Retire the running comparison without starting a new one
    pub fn supersede(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation() == generation
    }

    /// Compare two documents
    ///
    /// Page selectors are validated before any extraction starts. Returns
    /// `Ok(None)` when a newer comparison started before this one finished.
    #[instrument(skip_all, fields(word_level = options.word_level))]
    pub async fn compare(
        &self,
        documents: &ComparisonDocuments,
        options: &TextComparisonOptions,
    ) -> Result<Option<DocumentComparisonResult>, CompareError> {
        let generation = self.supersede();

        let original_key = ExtractionKey {
            fingerprint: documents.original.source.fingerprint(),
            pages: documents.original.resolve_pages()?,
        };
        let changed_key = ExtractionKey {
            fingerprint: documents.changed.source.fingerprint(),
            pages: documents.changed.resolve_pages()?,
        };
        let diff_key = DiffKey {
            original: original_key.clone(),
            changed: changed_key.clone(),
            options: options.clone(),
        };

        if let Some(cached) = lock(&self.diffs).get(&diff_key) {
            debug!("Diff cache hit");
            return Ok(Some(cached.as_ref().clone()));
        }

        let (original, changed) = tokio::try_join!(
            self.extract(&documents.original, original_key),
            self.extract(&documents.changed, changed_key),
        )?;
        if !self.is_current(generation) {
            debug!(generation, "Comparison superseded after extraction");
            return Ok(None);
        }

        let engine = DiffEngine::from_options(options);
        engine.check_unit(original.unit)?;
        engine.check_unit(changed.unit)?;

        let pairs = pair_pages(&original.page_indexes(), &changed.page_indexes());
        let mut document_comparison_results = Vec::with_capacity(pairs.len());
        for (original_index, changed_index) in pairs {
            let original = Arc::clone(&original);
            let changed = Arc::clone(&changed);
            let page = tokio::task::spawn_blocking(move || {
                compare_page_pair(
                    &engine,
                    original_index.and_then(|i| original.page(i)),
                    changed_index.and_then(|i| changed.page(i)),
                )
            })
            .await
            .map_err(|e| CompareError::TaskFailed(e.to_string()))?;
            document_comparison_results.push(page);

            if !self.is_current(generation) {
                debug!(generation, "Comparison superseded while diffing");
                return Ok(None);
            }
            tokio::task::yield_now().await;
        }

        let result = DocumentComparisonResult {
            document_comparison_results,
        };
        info!(
            pages = result.document_comparison_results.len(),
            insertions = result.insertion_count(),
            deletions = result.deletion_count(),
            "Comparison complete"
        );
        lock(&self.diffs).insert(diff_key, Arc::new(result.clone()));
        Ok(Some(result))
    }

    async fn extract(
        &self,
        document: &ComparisonDocument,
        key: ExtractionKey,
    ) -> Result<Arc<ExtractedText>, CompareError> {
        if let Some(cached) = lock(&self.extractions).get(&key) {
            debug!(fingerprint = %key.fingerprint, "Extraction cache hit");
            return Ok(Arc::clone(cached));
        }

        let source = Arc::clone(&document.source);
        let extractor = self.extractor;
        let pages = key.pages.clone();
        let extracted = tokio::task::spawn_blocking(move || {
            extractor.extract_indexes(source.as_ref(), &pages)
        })
        .await
        .map_err(|e| CompareError::TaskFailed(e.to_string()))??;

        let extracted = Arc::new(extracted);
        lock(&self.extractions).insert(key, Arc::clone(&extracted));
        Ok(extracted)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
