use crate::config::SiteConfig;
use crate::link::ConcreteLink;
use url::Url;

/// Decides which reported links a driver hands to the engine
#[derive(Debug, Clone, Default)]
pub struct NavigationScope {
    include_domains: Vec<Url>,
    exclude_urls: Vec<Url>,
}

impl NavigationScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope described by a site configuration. Unparseable entries are dropped.
    pub fn from_site(site: &SiteConfig) -> Self {
        let parse = |list: &[String]| {
            list.iter()
                .filter_map(|s| match Url::parse(s) {
                    Ok(url) => Some(url),
                    Err(e) => {
                        log::warn!("Ignoring scope entry {}: {}", s, e);
                        None
                    }
                })
                .collect::<Vec<Url>>()
        };

        Self { include_domains: parse(&site.include_domains), exclude_urls: parse(&site.exclude_urls) }
    }

    /// Builder method: allow links to another origin
    pub fn include_domain(mut self, url: Url) -> Self {
        self.include_domains.push(url);
        self
    }

    /// Builder method: never follow `url`
    pub fn exclude_url(mut self, url: Url) -> Self {
        self.exclude_urls.push(url);
        self
    }

    /// Whether a link to `target` may be followed from `location`
    pub fn allows(&self, target: &str, location: &str) -> bool {
        let Ok(target) = Url::parse(target) else {
            return false;
        };

        if self.exclude_urls.iter().any(|excluded| same_url(&target, excluded)) {
            return false;
        }

        self.include_domains.iter().any(|domain| same_origin(&target, domain))
            || Url::parse(location).is_ok_and(|location| same_origin(&target, &location))
    }

    /// Keep the links `allows` accepts
    pub fn filter(&self, links: Vec<ConcreteLink>, location: &str) -> Vec<ConcreteLink> {
        let total = links.len();
        let kept: Vec<ConcreteLink> = links.into_iter().filter(|link| self.allows(&link.url, location)).collect();
        if kept.len() < total {
            log::debug!("Scope dropped {} of {} links on {}", total - kept.len(), total, location);
        }
        kept
    }
}

/// Same scheme, host and port
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme() && a.host_str() == b.host_str() && a.port_or_known_default() == b.port_or_known_default()
}

/// Same origin and path, with every query pair of `a` present in `b`
pub fn same_url(a: &Url, b: &Url) -> bool {
    same_origin(a, b) && a.path() == b.path() && a.query_pairs().all(|pair| b.query_pairs().any(|other| other == pair))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_same_origin() {
        assert!(same_origin(&url("https://app.test/a"), &url("https://app.test:443/b")));
        assert!(!same_origin(&url("https://app.test/a"), &url("http://app.test/a")));
        assert!(!same_origin(&url("https://app.test/a"), &url("https://cdn.app.test/a")));
    }

    #[test]
    fn test_same_url_query_subset() {
        assert!(same_url(&url("https://app.test/signout"), &url("https://app.test/signout?x=1")));
        assert!(!same_url(&url("https://app.test/signout?x=1"), &url("https://app.test/signout")));
        assert!(!same_url(&url("https://app.test/signout"), &url("https://app.test/signin")));
    }

    #[test]
    fn test_allows_current_origin_only_by_default() {
        let scope = NavigationScope::new();
        assert!(scope.allows("https://app.test/a", "https://app.test/home"));
        assert!(!scope.allows("https://other.test/a", "https://app.test/home"));
        assert!(!scope.allows("javascript:void(0)", "https://app.test/home"));
    }

    #[test]
    fn test_include_and_exclude() {
        let scope = NavigationScope::new()
            .include_domain(url("https://auth.app.test/"))
            .exclude_url(url("https://app.test/signout"));

        assert!(scope.allows("https://auth.app.test/profile", "https://app.test/home"));
        assert!(!scope.allows("https://app.test/signout", "https://app.test/home"));
        // Extra query pairs on the link make it a different URL
        assert!(scope.allows("https://app.test/signout?next=%2F", "https://app.test/home"));
    }

    #[test]
    fn test_from_site_and_filter() {
        let mut site = SiteConfig::new("https://app.test/home");
        site.exclude_urls.push("https://app.test/signout".to_string());
        let scope = NavigationScope::from_site(&site);

        let links = vec![
            ConcreteLink::navigate("https://app.test/a"),
            ConcreteLink::navigate("https://app.test/signout"),
            ConcreteLink::navigate("https://elsewhere.test/"),
        ];
        let kept = scope.filter(links, "https://app.test/home");
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].url, "https://app.test/a");
    }
}
