pub const DEFAULT_CORRUPTION_MARKER: &str = "corrupt";

/// Content predicate applied to every fetched block before it is staged.
#[derive(Clone, Debug)]
pub struct Validator {
    marker: String,
}

impl Validator {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    /// An empty marker accepts everything.
    pub fn is_valid(&self, content: &str) -> bool {
        self.marker.is_empty() || !content.contains(&self.marker)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(DEFAULT_CORRUPTION_MARKER)
    }
}
