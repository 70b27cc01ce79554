// ── Search filter ──
//
// A single free-text query matched case-insensitively as a substring of
// each record's key. Surrounding whitespace is ignored; a blank query
// matches everything.

/// The live search query applied to both panels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    needle: String,
}

impl SearchFilter {
    pub fn new(query: impl Into<String>) -> Self {
        let needle = query.into().trim().to_lowercase();
        Self { needle }
    }

    /// Returns `true` if the filter lets every record through.
    pub fn is_blank(&self) -> bool {
        self.needle.is_empty()
    }

    pub fn matches(&self, key: &str) -> bool {
        self.is_blank() || key.to_lowercase().contains(&self.needle)
    }
}
