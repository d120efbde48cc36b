use crate::error::{CrawlError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use url::Url;

/// Tag names from below the document body down to a control
pub type DomPath = Vec<String>;

/// Non-blank segments of a link's target path
pub type ActionPath = Vec<String>;

/// Query and form parameters of a link, keyed by name
pub type ParamSet = IndexMap<String, String>;

/// Whether a control navigates (anchor) or submits (form)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkKind {
    Navigate,
    Submit,
}

/// One observed control instance on a page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConcreteLink {
    /// Anchor or form
    pub kind: LinkKind,

    /// HTTP method the control uses
    #[serde(default = "default_method")]
    pub method: String,

    /// Concrete target URL
    pub url: String,

    #[serde(default)]
    pub dom_path: DomPath,

    #[serde(default)]
    pub action_path: ActionPath,

    /// Query parameters merged with form fields
    #[serde(default)]
    pub params: ParamSet,

    /// Position of the element among the page's anchors and forms.
    /// Only meaningful to the driver that reported it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_index: Option<usize>,
}

fn default_method() -> String {
    "GET".to_string()
}

impl ConcreteLink {
    /// Create a new anchor link pointing at `url`
    pub fn navigate(url: impl Into<String>) -> Self {
        Self {
            kind: LinkKind::Navigate,
            method: default_method(),
            url: url.into(),
            dom_path: Vec::new(),
            action_path: Vec::new(),
            params: ParamSet::new(),
            element_index: None,
        }
    }

    /// Create a new form link submitting to `url` with `method`
    pub fn submit(url: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            kind: LinkKind::Submit,
            method: method.into().to_uppercase(),
            ..Self::navigate(url)
        }
    }

    /// Build a link whose action path and params are derived from `url`
    pub fn from_url(kind: LinkKind, url: &str) -> Result<Self> {
        let parsed =
            Url::parse(url).map_err(|e| CrawlError::LinkExtractionFailed(format!("Invalid link URL {}: {}", url, e)))?;

        let mut link = match kind {
            LinkKind::Navigate => Self::navigate(url),
            LinkKind::Submit => Self::submit(url, "GET"),
        };
        link.action_path = split_action(parsed.path());
        for (key, value) in parsed.query_pairs() {
            link.params.insert(key.into_owned(), value.into_owned());
        }
        Ok(link)
    }

    /// Builder method: set the DOM path
    pub fn with_dom_path<I, S>(mut self, dom_path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dom_path = dom_path.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method: set the action path
    pub fn with_action_path<I, S>(mut self, action_path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.action_path = action_path.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method: add a parameter
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Builder method: set the element index
    pub fn with_element_index(mut self, index: usize) -> Self {
        self.element_index = Some(index);
        self
    }

    /// Names of the link's parameters, in insertion order
    pub fn param_keys(&self) -> Vec<String> {
        self.params.keys().cloned().collect()
    }

    pub fn is_form(&self) -> bool {
        self.kind == LinkKind::Submit
    }
}

/// Split a URL path into its non-blank segments
pub fn split_action(path: &str) -> ActionPath {
    path.split('/').filter(|s| !s.trim().is_empty()).map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_url_splits_path_and_query() {
        let link = ConcreteLink::from_url(LinkKind::Navigate, "https://shop.test/items//view/?id=7&tab=info").unwrap();

        assert_eq!(link.action_path, vec!["items", "view"]);
        assert_eq!(link.params.get("id").map(String::as_str), Some("7"));
        assert_eq!(link.param_keys(), vec!["id", "tab"]);
        assert_eq!(link.method, "GET");
    }

    #[test]
    fn test_from_url_rejects_garbage() {
        let result = ConcreteLink::from_url(LinkKind::Navigate, "not a url");
        assert!(matches!(result, Err(CrawlError::LinkExtractionFailed(_))));
    }

    #[test]
    fn test_submit_uppercases_method() {
        let link = ConcreteLink::submit("https://shop.test/cart", "post");
        assert_eq!(link.method, "POST");
        assert!(link.is_form());
    }

    #[test]
    fn test_deserialize_wire_shape() {
        let json = serde_json::json!({
            "kind": "SUBMIT",
            "method": "POST",
            "url": "https://shop.test/login",
            "domPath": ["DIV", "FORM"],
            "actionPath": ["login"],
            "params": {"user": "", "csrf": "abc"}
        });

        let link: ConcreteLink = serde_json::from_value(json).unwrap();
        assert_eq!(link.kind, LinkKind::Submit);
        assert_eq!(link.dom_path, vec!["DIV", "FORM"]);
        assert_eq!(link.params.len(), 2);
        assert!(link.element_index.is_none());
    }

    #[test]
    fn test_split_action_ignores_blank_segments() {
        assert!(split_action("/").is_empty());
        assert_eq!(split_action("/a/ /b/"), vec!["a", "b"]);
    }
}
