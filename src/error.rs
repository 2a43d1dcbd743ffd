//! Error type shared by the controller and its entry points.

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("no window")]
    NoWindow,
    #[error("no document")]
    NoDocument,
    #[error("document has no body")]
    NoBody,
    #[error("page controller already started")]
    AlreadyStarted,
    /// A nav link `href` that does not resolve to any element.
    #[error("no element matches link target '{href}'")]
    MissingTarget { href: String },
    /// Fewer nav links than sections; the selected section has no link.
    #[error("no nav link at index {index} (only {links} links)")]
    MissingNavLink { index: usize, links: usize },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[cfg(feature = "serde_json")]
    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),
    #[error("js error: {0}")]
    Js(String),
}

impl From<JsValue> for PageError {
    fn from(value: JsValue) -> Self {
        PageError::Js(
            value
                .as_string()
                .unwrap_or_else(|| format!("{value:?}")),
        )
    }
}

impl From<PageError> for JsValue {
    fn from(err: PageError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

pub type Result<T, E = PageError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failing_input() {
        let err = PageError::MissingTarget { href: "#about".into() };
        assert_eq!(err.to_string(), "no element matches link target '#about'");
        let err = PageError::MissingNavLink { index: 3, links: 2 };
        assert_eq!(err.to_string(), "no nav link at index 3 (only 2 links)");
    }
}
