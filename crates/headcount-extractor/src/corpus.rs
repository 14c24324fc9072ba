//! Input corpus loading

use crate::error::ExtractorError;
use headcount_domain::Document;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Extension of corpus documents
pub const DOCUMENT_EXTENSION: &str = "txt";

/// The set of documents to extract from, sorted by filename
#[derive(Debug, Clone)]
pub struct Corpus {
    documents: Vec<Document>,
}

impl Corpus {
    /// Load every `.txt` file in `dir`
    ///
    /// Files that cannot be read as UTF-8 are logged and skipped.
    ///
    /// # Errors
    ///
    /// `CorpusNotFound` when `dir` is not a directory; `Io` when it cannot be
    /// listed.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ExtractorError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(ExtractorError::CorpusNotFound(dir.to_path_buf()));
        }

        let mut documents = Vec::new();
        for path in list_documents(dir)? {
            let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
                warn!("Skipping non UTF-8 file name: {}", path.display());
                continue;
            };
            match fs::read_to_string(&path) {
                Ok(text) => documents.push(Document::new(filename, text)),
                Err(e) => warn!("Skipping unreadable document {}: {}", filename, e),
            }
        }

        info!("Loaded {} documents from {}", documents.len(), dir.display());
        Ok(Self { documents })
    }

    /// Build a corpus from documents already in memory
    pub fn from_documents(mut documents: Vec<Document>) -> Self {
        documents.sort_by(|a, b| a.filename.cmp(&b.filename));
        Self { documents }
    }

    /// Documents in processing order
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Number of documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the corpus has no documents
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Paths of `.txt` files directly inside `dir`, sorted by file name
pub fn list_documents(dir: &Path) -> Result<Vec<PathBuf>, ExtractorError> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_document = path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(DOCUMENT_EXTENSION));
        if is_document {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}
