use crate::error::{CrawlError, Result};
use crate::registry::GiveUpBudget;
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Options consumed by the crawl engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Accept a link leading somewhere new instead of disabling it
    pub dynamic_links: bool,

    /// Skips tolerated before a directly selected link is given up
    pub direct_give_up: u32,

    /// Abandoned routes tolerated before the last edge of a route is given up
    pub path_give_up: u32,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        let budget = GiveUpBudget::default();
        Self { dynamic_links: false, direct_give_up: budget.direct, path_give_up: budget.path }
    }
}

impl CrawlConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set dynamic links mode
    pub fn dynamic_links(mut self, dynamic_links: bool) -> Self {
        self.dynamic_links = dynamic_links;
        self
    }

    /// Builder method: set the direct give-up budget
    pub fn direct_give_up(mut self, budget: u32) -> Self {
        self.direct_give_up = budget;
        self
    }

    /// Builder method: set the path give-up budget
    pub fn path_give_up(mut self, budget: u32) -> Self {
        self.path_give_up = budget;
        self
    }

    pub fn budget(&self) -> GiveUpBudget {
        GiveUpBudget { direct: self.direct_give_up, path: self.path_give_up }
    }

    pub fn validate(&self) -> Result<()> {
        if self.direct_give_up == 0 || self.path_give_up == 0 {
            return Err(CrawlError::InvalidConfig("Give-up budgets must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Description of the site to crawl
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Page the crawl starts from and returns to
    pub home_page_url: String,

    /// Extra origins links may lead to besides the current one
    #[serde(default)]
    pub include_domains: Vec<String>,

    /// URLs never followed (sign-out and the like)
    #[serde(default)]
    pub exclude_urls: Vec<String>,

    #[serde(default)]
    pub crawl: CrawlConfig,
}

impl SiteConfig {
    pub fn new(home_page_url: impl Into<String>) -> Self {
        Self {
            home_page_url: home_page_url.into(),
            include_domains: Vec::new(),
            exclude_urls: Vec::new(),
            crawl: CrawlConfig::default(),
        }
    }

    /// Load and validate a JSON site description
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| CrawlError::InvalidConfig(format!("Failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| CrawlError::InvalidConfig(format!("Failed to parse {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.home_page_url.trim().is_empty() {
            return Err(CrawlError::InvalidConfig("Home page URL is empty".to_string()));
        }
        Url::parse(&self.home_page_url)
            .map_err(|e| CrawlError::InvalidConfig(format!("Invalid home page URL {}: {}", self.home_page_url, e)))?;
        for url in self.include_domains.iter().chain(&self.exclude_urls) {
            Url::parse(url).map_err(|e| CrawlError::InvalidConfig(format!("Invalid URL {}: {}", url, e)))?;
        }
        self.crawl.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crawl_config_builder() {
        let config = CrawlConfig::new().dynamic_links(true).direct_give_up(5).path_give_up(1);

        assert!(config.dynamic_links);
        assert_eq!(config.budget(), GiveUpBudget { direct: 5, path: 1 });
    }

    #[test]
    fn test_crawl_config_defaults() {
        let config = CrawlConfig::default();
        assert!(!config.dynamic_links);
        assert!(config.validate().is_ok());
        assert!(CrawlConfig::new().direct_give_up(0).validate().is_err());
    }

    #[test]
    fn test_site_config_minimal_json() {
        let json = serde_json::json!({ "home_page_url": "https://app.test/home" });
        let config: SiteConfig = serde_json::from_value(json).unwrap();

        assert!(config.include_domains.is_empty());
        assert_eq!(config.crawl, CrawlConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_site_config_partial_crawl_section() {
        let json = serde_json::json!({
            "home_page_url": "https://app.test/home",
            "exclude_urls": ["https://app.test/signout"],
            "crawl": { "dynamic_links": true }
        });
        let config: SiteConfig = serde_json::from_value(json).unwrap();

        assert!(config.crawl.dynamic_links);
        assert_eq!(config.crawl.direct_give_up, 3);
        assert_eq!(config.exclude_urls.len(), 1);
    }

    #[test]
    fn test_site_config_rejects_bad_urls() {
        assert!(SiteConfig::new("").validate().is_err());
        assert!(SiteConfig::new("home").validate().is_err());

        let mut config = SiteConfig::new("https://app.test/");
        config.exclude_urls.push("nope".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_missing() {
        let result = SiteConfig::from_file("/definitely/not/here.json");
        assert!(matches!(result, Err(CrawlError::InvalidConfig(_))));
    }
}
