/// The input of a search run, supplied by the frontend.
use crate::error::ValidationError;
use crate::matcher::Targets;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    /// Base URL the relative list paths are resolved against.
    pub base_url: String,
    /// Relative list paths, searched in this order. Duplicates are allowed.
    pub files: Vec<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub username: Option<String>,
}

impl SearchRequest {
    pub fn new(base_url: impl Into<String>, files: Vec<String>) -> Self {
        Self {
            base_url: base_url.into(),
            files,
            password: None,
            username: None,
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Check that the request can be run, naming the first missing field.
    ///
    /// Order matches what a user fills in: base URL, search terms, lists.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.base_url.trim().is_empty() {
            return Err(ValidationError::MissingBaseUrl);
        }
        if self.targets().is_empty() {
            return Err(ValidationError::MissingSearchTerm);
        }
        if self.files.is_empty() {
            return Err(ValidationError::NoFiles);
        }
        Ok(())
    }

    /// The lowercased, non-empty search terms of this request.
    pub fn targets(&self) -> Targets {
        Targets::new(self.password.as_deref(), self.username.as_deref())
    }

    /// Short description for log output. The password is never included.
    pub fn describe(&self) -> String {
        let password = match self.password.as_deref() {
            Some(p) if !p.is_empty() => "[hidden]",
            _ => "",
        };
        format!(
            "password=\"{}\" username=\"{}\" in {} list(s)",
            password,
            self.username.as_deref().unwrap_or(""),
            self.files.len()
        )
    }
}
