use super::{Boundary, NavigationScope, PageReport, Reply};
use crate::browser::{BrowserSession, LinkActivation};
use crate::config::SiteConfig;
use crate::error::Result;
use crate::link::ConcreteLink;
use rand::{Rng, distributions::Alphanumeric};

/// Boundary backed by a real Chrome/Chromium session.
///
/// The session is expected to be authenticated already (e.g. through a
/// persistent profile directory).
pub struct ChromeBoundary {
    session: BrowserSession,
    home_url: String,
    scope: NavigationScope,
}

impl ChromeBoundary {
    pub fn new(session: BrowserSession, site: &SiteConfig) -> Self {
        Self { session, home_url: site.home_page_url.clone(), scope: NavigationScope::from_site(site) }
    }

    pub fn session(&self) -> &BrowserSession {
        &self.session
    }

    fn fill_value() -> String {
        rand::thread_rng().sample_iter(&Alphanumeric).take(10).map(char::from).collect()
    }
}

impl Boundary for ChromeBoundary {
    fn page(&mut self) -> Result<PageReport> {
        let report = self.session.extract_links()?;
        let links = self.scope.filter(report.links, &report.url);
        Ok(PageReport { links, url: report.url })
    }

    fn follow(&mut self, link: &ConcreteLink) -> Result<Reply> {
        let activation = match link.element_index {
            Some(index) => self.session.activate_link(index, &Self::fill_value()).unwrap_or_else(|e| {
                log::warn!("Could not activate {}: {}", link.url, e);
                LinkActivation::Missing
            }),
            None => LinkActivation::Missing,
        };

        match activation {
            // Anchors can still be reached by loading their URL
            LinkActivation::Missing if !link.is_form() => {
                log::debug!("Loading {} directly", link.url);
                self.session.navigate(&link.url)?;
            }
            LinkActivation::Missing => return Ok(Reply::Skip),
            LinkActivation::Unfillable => return Ok(Reply::Mark),
            LinkActivation::Clicked | LinkActivation::Submitted => {}
        }

        // Script-handled anchors may not navigate at all
        if let Err(e) = self.session.wait_for_navigation() {
            log::debug!("No navigation after following {}: {}", link.url, e);
        }
        Ok(Reply::Done)
    }

    fn home(&mut self) -> Result<Reply> {
        self.session.navigate(&self.home_url)?;
        self.session.wait_for_navigation()?;
        Ok(Reply::Done)
    }

    fn terminate(&mut self) -> Result<()> {
        self.session.close()
    }
}
