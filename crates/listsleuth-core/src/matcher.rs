/// Case-insensitive substring targets.
///
/// Targets are lowercased once when the request is built; each line is
/// lowercased once per test. Empty terms are dropped so they can never act
/// as a wildcard.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Targets {
    terms: Vec<String>,
}

impl Targets {
    pub fn new(password: Option<&str>, username: Option<&str>) -> Self {
        let terms = [password, username]
            .into_iter()
            .flatten()
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
            .collect();
        Self { terms }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True if any target occurs in `line`, ignoring case.
    pub fn matches(&self, line: &str) -> bool {
        if self.terms.is_empty() {
            return false;
        }
        let lower = line.to_lowercase();
        self.terms.iter().any(|t| lower.contains(t.as_str()))
    }
}
