use thiserror::Error;
use wasm_bindgen::JsValue;

/// Failures that can stop the page from booting.
///
/// Missing optional sections are not errors; they are skipped with a debug
/// log so one absent block never takes the rest of the page down with it.
#[derive(Debug, Error)]
pub enum SiteError {
    #[error("no global `window` available")]
    MissingWindow,
    #[error("window has no document")]
    MissingDocument,
    #[error("javascript error: {0}")]
    Js(String),
    #[error("invalid site config: {0}")]
    Config(#[from] serde_json::Error),
}

impl SiteError {
    /// Capture a thrown JS value as text so it can travel through `?`.
    pub fn js(value: JsValue) -> Self {
        Self::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<SiteError> for JsValue {
    fn from(err: SiteError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RateLimitError {
    #[error("rate limit interval must be at least 1ms")]
    ZeroInterval,
}
