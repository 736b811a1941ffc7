//! Finalizer bookkeeping for HttpCheck resources

/// Finalizer the operator puts on every HttpCheck it manages.
///
/// Deletion of the resource is held back until the Pingdom check is gone.
pub const HTTP_CHECK_FINALIZER: &str = "finalizer.pingdom.fbsb.io";

/// Ordered, duplicate-free list of finalizer tokens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinalizerSet {
    tokens: Vec<String>,
}

impl FinalizerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `metadata.finalizers`, dropping duplicates but keeping order
    pub fn from_slice(tokens: &[String]) -> Self {
        let mut set = Self::new();
        for token in tokens {
            set.add(token);
        }
        set
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Append `token` unless present; returns whether the set changed
    pub fn add(&mut self, token: &str) -> bool {
        if self.contains(token) {
            return false;
        }
        self.tokens.push(token.to_string());
        true
    }

    /// Remove `token`; returns whether the set changed
    pub fn remove(&mut self, token: &str) -> bool {
        let before = self.tokens.len();
        self.tokens.retain(|t| t != token);
        self.tokens.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.tokens
    }

    pub fn into_vec(self) -> Vec<String> {
        self.tokens
    }
}
