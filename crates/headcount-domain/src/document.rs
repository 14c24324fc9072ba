//! Document module - one outing narrative from the input corpus

/// A single outing description from the corpus
///
/// Documents are immutable once loaded. The filename is the join key used by
/// every later stage (predictions, ground truth, evaluation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// File name within the corpus directory (unique key)
    pub filename: String,

    /// Full UTF-8 text of the document
    pub raw_text: String,
}

impl Document {
    /// Create a new document
    ///
    /// # Examples
    ///
    /// ```
    /// use headcount_domain::Document;
    ///
    /// let doc = Document::new("a.txt", "We were four on the ridge.");
    /// assert_eq!(doc.filename, "a.txt");
    /// ```
    pub fn new(filename: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            raw_text: raw_text.into(),
        }
    }

    /// Length of the text in characters (not bytes)
    pub fn char_len(&self) -> usize {
        self.raw_text.chars().count()
    }
}
