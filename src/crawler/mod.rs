//! The crawl engine
//!
//! [`Crawler`] runs two nested loops against a [`Boundary`]:
//!
//! - the page cycle asks for the current page, classifies it and books the
//!   outcome of the previously followed link;
//! - link selection picks what to follow next (cached route, then an unvisited
//!   link on the page, then a route computed by the pathfinder), resolves it to a
//!   concrete link on the page and interprets the boundary's reply.
//!
//! The crawl ends when no abstract link is both visitable and unvisited, when the
//! boundary asks to terminate, or with an error when no progress is possible.

pub mod report;

pub use report::{CrawlReport, LinkSummary};

use crate::boundary::{Boundary, Reply};
use crate::classifier::{PageClassifier, classify};
use crate::config::CrawlConfig;
use crate::error::{CrawlError, Result};
use crate::pathfinder::find_route;
use crate::registry::{LinkId, PageId, Registry, Visit};
use serde::Serialize;
use std::collections::VecDeque;

/// How a crawl ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlOutcome {
    /// Every discoverable link was visited or given up
    Exhausted,
    /// The boundary asked to stop
    Terminated,
    /// The crawl stopped on an error. Only used for reports, [`Crawler::run`]
    /// returns the error itself.
    Aborted,
}

/// Result of one page cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cycle {
    Continue,
    Finished(CrawlOutcome),
}

/// Single-session crawler over a [`Boundary`]
pub struct Crawler<B: Boundary> {
    boundary: B,
    config: CrawlConfig,
    classifier: PageClassifier,
    registry: Registry,

    /// Remaining edges of the route being followed
    route: VecDeque<LinkId>,
    /// Last edge of that route, charged when the route is abandoned
    route_tail: Option<LinkId>,
    /// Links skipped during the current page pass
    skipped: Vec<LinkId>,
    /// Page and link of the last successful follow
    last: Option<(PageId, LinkId)>,
    follows: usize,
}

impl<B: Boundary> Crawler<B> {
    pub fn new(boundary: B, config: CrawlConfig) -> Self {
        Self {
            boundary,
            config,
            classifier: PageClassifier::new(),
            registry: Registry::new(),
            route: VecDeque::new(),
            route_tail: None,
            skipped: Vec::new(),
            last: None,
            follows: 0,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn classifier(&self) -> &PageClassifier {
        &self.classifier
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    pub fn boundary(&self) -> &B {
        &self.boundary
    }

    pub fn into_boundary(self) -> B {
        self.boundary
    }

    /// Number of follow requests sent so far
    pub fn follows(&self) -> usize {
        self.follows
    }

    /// Summary of the crawl state
    pub fn report(&self, outcome: CrawlOutcome) -> CrawlReport {
        CrawlReport::new(outcome, &self.registry, &self.classifier, self.follows)
    }

    /// Summary of the state reached before `error` stopped the crawl
    pub fn aborted_report(&self, error: &CrawlError) -> CrawlReport {
        CrawlReport::aborted(&self.registry, &self.classifier, self.follows, error)
    }

    /// Crawl until nothing is left to visit.
    ///
    /// The boundary is told to terminate on every exit except when it asked to
    /// stop itself.
    pub fn run(&mut self) -> Result<CrawlOutcome> {
        let result = self.crawl();

        if !matches!(result, Ok(CrawlOutcome::Terminated)) {
            if let Err(e) = self.boundary.terminate() {
                log::warn!("Failed to terminate the boundary session: {}", e);
            }
        }

        match &result {
            Ok(outcome) => log::info!(
                "Crawl finished ({:?}): {} pages, {} links, {} follows",
                outcome,
                self.registry.pages().len(),
                self.registry.links().len(),
                self.follows
            ),
            Err(e) => log::error!("Crawl aborted: {}", e),
        }

        result
    }

    fn crawl(&mut self) -> Result<CrawlOutcome> {
        loop {
            if let Cycle::Finished(outcome) = self.page_cycle()? {
                return Ok(outcome);
            }
        }
    }

    fn page_cycle(&mut self) -> Result<Cycle> {
        let report = self.boundary.page()?;
        let (page, _) = classify(&mut self.classifier, &mut self.registry, &report.links, self.last, self.config.budget());
        self.skipped.clear();

        let had_context = self.last.is_some();
        if let Some((source, link)) = self.last.take() {
            if !self.record_arrival(source, link, page) {
                return self.go_home();
            }
        }

        if !self.registry.has_unvisited() {
            return Ok(Cycle::Finished(CrawlOutcome::Exhausted));
        }

        loop {
            let Some(link) = self.select_link(page) else {
                self.clear_route();
                if !self.registry.has_unvisited() {
                    return Ok(Cycle::Finished(CrawlOutcome::Exhausted));
                }
                if !had_context && self.skipped.is_empty() {
                    return Err(CrawlError::Stranded { remaining: self.registry.unvisited_count() });
                }
                log::debug!("Nothing to follow from {:?}, returning home", page);
                return self.go_home();
            };

            let Some(concrete) = report.links.iter().find(|c| self.registry.link(link).matches(c)) else {
                log::warn!("Broken navigation: link {:?} is not on {}", link, report.url);
                if self.route_tail.is_some() {
                    self.abandon_route();
                } else if self.registry.spend_direct(link) {
                    log::info!("Giving up on {:?}, it keeps missing from its page", link);
                }
                return self.go_home();
            };

            log::debug!("Following {:?} {} {}", link, concrete.method, concrete.url);
            self.follows += 1;

            match self.boundary.follow(concrete)? {
                Reply::Done => {
                    self.last = Some((page, link));
                    if self.route.is_empty() {
                        self.route_tail = None;
                    }
                    return Ok(Cycle::Continue);
                }
                Reply::Skip => {
                    self.abandon_route();
                    if self.registry.spend_direct(link) {
                        log::info!("Giving up on {:?} after repeated skips", link);
                    }
                    self.skipped.push(link);
                }
                Reply::Mark => {
                    self.registry.mark_unvisitable(link);
                    self.abandon_route();
                }
                Reply::Terminate => {
                    log::info!("Boundary asked to terminate");
                    return Ok(Cycle::Finished(CrawlOutcome::Terminated));
                }
            }
        }
    }

    /// Book the arrival on `page` after following `link` from `source`.
    /// Returns false when the link was disabled for leading somewhere unexpected.
    fn record_arrival(&mut self, source: PageId, link: LinkId, page: PageId) -> bool {
        self.registry.record_visit(Visit { source, link, destination: page });

        let state = self.registry.link_mut(link);
        state.visit_count += 1;

        let current = state.destination;
        let expected = match current {
            None => {
                state.destination = Some(page);
                state.visited = true;
                return true;
            }
            Some(expected) if expected == page => return true,
            Some(expected) => expected,
        };

        if self.config.dynamic_links {
            state.destination = Some(page);
        }
        log::warn!("Unexpected navigation: {:?} led to {:?} instead of {:?}", link, page, expected);
        self.clear_route();

        if self.config.dynamic_links {
            true
        } else {
            self.registry.mark_unvisitable(link);
            false
        }
    }

    fn select_link(&mut self, page: PageId) -> Option<LinkId> {
        if let Some(edge) = self.route.pop_front() {
            if self.registry.link(edge).visitable {
                log::debug!("Next route edge {:?}", edge);
                return Some(edge);
            }
            self.clear_route();
        }

        let registry = &self.registry;
        let direct = registry
            .page(page)
            .links
            .iter()
            .copied()
            .find(|&id| registry.link(id).is_unvisited() && !self.skipped.contains(&id));
        if direct.is_some() {
            return direct;
        }

        let route = find_route(&self.registry, page, &self.skipped)?;
        log::debug!("Routing to {:?} over {} edges", route.target, route.edges.len());

        self.route_tail = route.edges.last().copied();
        self.route = route.edges.into();
        self.route.pop_front()
    }

    fn go_home(&mut self) -> Result<Cycle> {
        self.last = None;
        self.clear_route();

        match self.boundary.home()? {
            Reply::Done => Ok(Cycle::Continue),
            Reply::Terminate => Ok(Cycle::Finished(CrawlOutcome::Terminated)),
            other => Err(CrawlError::ProtocolViolation(format!("Unexpected reply to home: {:?}", other))),
        }
    }

    /// Drop the cached route without penalty
    fn clear_route(&mut self) {
        self.route.clear();
        self.route_tail = None;
    }

    /// Drop the cached route and charge its last edge
    fn abandon_route(&mut self) {
        self.route.clear();
        if let Some(tail) = self.route_tail.take() {
            if self.registry.spend_path(tail) {
                log::info!("Giving up on reaching {:?} through routes", tail);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::PageReport;
    use crate::link::ConcreteLink;

    /// Boundary replaying canned answers and recording requests
    #[derive(Default)]
    struct Scripted {
        pages: VecDeque<PageReport>,
        follows: VecDeque<Reply>,
        homes: VecDeque<Reply>,
        requests: Vec<String>,
    }

    impl Boundary for Scripted {
        fn page(&mut self) -> Result<PageReport> {
            self.requests.push("page".to_string());
            self.pages.pop_front().ok_or_else(|| CrawlError::ProtocolViolation("script exhausted".to_string()))
        }

        fn follow(&mut self, link: &ConcreteLink) -> Result<Reply> {
            self.requests.push(format!("follow {}", link.url));
            self.follows.pop_front().ok_or_else(|| CrawlError::ProtocolViolation("script exhausted".to_string()))
        }

        fn home(&mut self) -> Result<Reply> {
            self.requests.push("home".to_string());
            Ok(self.homes.pop_front().unwrap_or(Reply::Done))
        }

        fn terminate(&mut self) -> Result<()> {
            self.requests.push("terminate".to_string());
            Ok(())
        }
    }

    fn link(name: &str, dom: &str) -> ConcreteLink {
        ConcreteLink::navigate(format!("https://app.test/{}", name)).with_dom_path([dom, "A"]).with_action_path([name])
    }

    fn page(links: Vec<ConcreteLink>) -> PageReport {
        PageReport { links, url: "https://app.test/".to_string() }
    }

    #[test]
    fn test_empty_home_page_is_exhausted() {
        let mut boundary = Scripted::default();
        boundary.pages.push_back(page(vec![]));

        let mut crawler = Crawler::new(&mut boundary, CrawlConfig::default());
        assert_eq!(crawler.run().unwrap(), CrawlOutcome::Exhausted);
        assert_eq!(boundary.requests, vec!["page", "terminate"]);
    }

    #[test]
    fn test_terminate_reply_stops_without_terminate_request() {
        let mut boundary = Scripted::default();
        boundary.pages.push_back(page(vec![link("a", "NAV")]));
        boundary.follows.push_back(Reply::Terminate);

        let mut crawler = Crawler::new(&mut boundary, CrawlConfig::default());
        assert_eq!(crawler.run().unwrap(), CrawlOutcome::Terminated);
        assert_eq!(boundary.requests, vec!["page", "follow https://app.test/a"]);
    }

    #[test]
    fn test_bad_home_reply_is_protocol_violation() {
        let mut boundary = Scripted::default();
        boundary.pages.push_back(page(vec![link("a", "NAV")]));
        boundary.follows.push_back(Reply::Skip);
        boundary.homes.push_back(Reply::Mark);

        let mut crawler = Crawler::new(&mut boundary, CrawlConfig::default());
        assert!(matches!(crawler.run(), Err(CrawlError::ProtocolViolation(_))));
        assert_eq!(boundary.requests, vec!["page", "follow https://app.test/a", "home", "terminate"]);
    }

    #[test]
    fn test_terminate_reply_to_home_ends_gracefully() {
        let mut boundary = Scripted::default();
        boundary.pages.push_back(page(vec![link("a", "NAV")]));
        boundary.follows.push_back(Reply::Skip);
        boundary.homes.push_back(Reply::Terminate);

        let mut crawler = Crawler::new(&mut boundary, CrawlConfig::default());
        assert_eq!(crawler.run().unwrap(), CrawlOutcome::Terminated);
        assert_eq!(boundary.requests.last().map(String::as_str), Some("home"));
    }

    #[test]
    fn test_stranded_when_home_cannot_reach_unvisited_links() {
        let a = link("a", "NAV");
        let b = link("b", "MAIN");
        let e = link("e", "MAIN");
        let x = link("x", "FOOTER");

        let mut boundary = Scripted::default();
        boundary.pages.extend([
            page(vec![a.clone()]),
            page(vec![b.clone(), e.clone()]),
            page(vec![a.clone()]),
            // `a` now leads somewhere else and gets disabled
            page(vec![x.clone()]),
            page(vec![a.clone()]),
        ]);
        boundary.follows.extend([Reply::Done, Reply::Done, Reply::Done]);

        let mut crawler = Crawler::new(&mut boundary, CrawlConfig::default());
        let result = crawler.run();

        assert!(matches!(result, Err(CrawlError::Stranded { remaining: 2 })));
        let a_id = crawler.registry().find_link(&a).unwrap();
        assert!(!crawler.registry().link(a_id).visitable);
        assert_eq!(boundary.requests.last().map(String::as_str), Some("terminate"));
    }

    #[test]
    fn test_dynamic_links_accept_drift() {
        let a = link("a", "NAV");
        let b = link("b", "MAIN");
        let e = link("e", "MAIN");
        let x = link("x", "FOOTER");

        let mut boundary = Scripted::default();
        boundary.pages.extend([
            page(vec![a.clone()]),
            page(vec![b.clone(), e.clone()]),
            page(vec![a.clone()]),
            page(vec![x.clone()]),
        ]);
        boundary.follows.extend([Reply::Done, Reply::Done, Reply::Done, Reply::Terminate]);

        let mut crawler = Crawler::new(&mut boundary, CrawlConfig::new().dynamic_links(true));
        let outcome = crawler.run().unwrap();

        let a_id = crawler.registry().find_link(&a).unwrap();
        let x_id = crawler.registry().find_link(&x).unwrap();
        let state = crawler.registry().link(a_id);
        assert!(state.visitable);
        assert_eq!(state.visit_count, 2);
        assert_eq!(state.destination, crawler.registry().page_ids().last());
        assert_eq!(outcome, CrawlOutcome::Terminated);
        assert!(!crawler.registry().link(x_id).visited);
        assert_eq!(boundary.requests.last().map(String::as_str), Some("follow https://app.test/x"));
    }

    #[test]
    fn test_missing_direct_link_spends_its_budget() {
        let mut boundary = Scripted::default();
        boundary.pages.push_back(page(vec![link("x", "NAV"), link("y", "FOOTER")]));
        // Same class, but neither control matches `y` any more
        for _ in 0..4 {
            boundary.pages.push_back(page(vec![link("y", "NAV"), link("x", "FOOTER")]));
        }
        boundary.follows.push_back(Reply::Done);

        let mut crawler = Crawler::new(&mut boundary, CrawlConfig::new().direct_give_up(3));
        assert_eq!(crawler.run().unwrap(), CrawlOutcome::Exhausted);

        let y = crawler.registry().find_link(&link("y", "FOOTER")).unwrap();
        let state = crawler.registry().link(y);
        assert!(!state.visitable);
        assert_eq!(state.direct_give_up, 0);
        assert_eq!(crawler.follows(), 1);
        assert_eq!(boundary.requests.iter().filter(|r| *r == "home").count(), 3);
        assert_eq!(boundary.requests.last().map(String::as_str), Some("terminate"));
    }
}
