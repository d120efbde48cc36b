use super::CrawlOutcome;
use crate::classifier::PageClassifier;
use crate::error::CrawlError;
use crate::registry::Registry;
use serde::Serialize;

/// State of one abstract link at the end of a crawl
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkSummary {
    /// URL of the first concrete instance seen
    pub url: String,
    pub method: String,
    pub visited: bool,
    pub visitable: bool,
    pub visit_count: u32,
}

/// Summary of a crawl session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrawlReport {
    pub outcome: CrawlOutcome,
    pub pages: usize,
    pub classifier_nodes: usize,
    pub visits: usize,
    pub follows: usize,
    pub visited: usize,
    pub unvisitable: usize,
    pub links: Vec<LinkSummary>,
    /// Why the crawl was aborted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CrawlReport {
    pub fn new(outcome: CrawlOutcome, registry: &Registry, classifier: &PageClassifier, follows: usize) -> Self {
        let links: Vec<LinkSummary> = registry
            .links()
            .iter()
            .map(|link| LinkSummary {
                url: link.prototype.url.clone(),
                method: link.prototype.method.clone(),
                visited: link.visited,
                visitable: link.visitable,
                visit_count: link.visit_count,
            })
            .collect();

        Self {
            outcome,
            pages: registry.pages().len(),
            classifier_nodes: classifier.len(),
            visits: registry.history().len(),
            follows,
            visited: links.iter().filter(|l| l.visited).count(),
            unvisitable: links.iter().filter(|l| !l.visitable).count(),
            links,
            error: None,
        }
    }

    /// Report of a crawl that stopped on `error`, with the state reached so far
    pub fn aborted(registry: &Registry, classifier: &PageClassifier, follows: usize, error: &CrawlError) -> Self {
        Self { error: Some(error.to_string()), ..Self::new(CrawlOutcome::Aborted, registry, classifier, follows) }
    }

    /// Pretty JSON rendering
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
