//! # browser-crawler
//!
//! A Rust library that explores an authenticated web application through a
//! browser and collapses its recurring page templates into a finite graph.
//!
//! ## Features
//!
//! - **Page Classification**: Pages are grouped by the structure of their links
//!   (DOM paths, action paths, parameter names and values), never by URL
//! - **Link Registry**: One abstract link per structural slot, with visit state and
//!   give-up budgets
//! - **Pathfinding**: Cheapest route to the nearest page with unvisited links,
//!   preferring links taken rarely
//! - **Boundaries**: The engine drives a real Chrome session or an external
//!   driver speaking JSON lines
//!
//! ## Crawling With Chrome
//!
//! ```rust,no_run
//! use browser_crawler::{BrowserSession, ChromeBoundary, Crawler, LaunchOptions, SiteConfig};
//!
//! # fn main() -> browser_crawler::Result<()> {
//! let site = SiteConfig::new("https://app.example.com/home");
//! let session = BrowserSession::launch(LaunchOptions::new().user_data_dir("/tmp/profile"))?;
//! session.navigate(&site.home_page_url)?;
//!
//! let mut crawler = Crawler::new(ChromeBoundary::new(session, &site), site.crawl.clone());
//! let outcome = crawler.run()?;
//! println!("{}", crawler.report(outcome).to_json()?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom Boundaries
//!
//! Anything implementing [`Boundary`] can be crawled. The boundary reports the
//! links of the current page and performs the navigation the engine asks for:
//!
//! ```rust
//! use browser_crawler::{Boundary, ConcreteLink, PageReport, Reply, Result};
//!
//! struct SinglePage;
//!
//! impl Boundary for SinglePage {
//!     fn page(&mut self) -> Result<PageReport> {
//!         Ok(PageReport { links: vec![], url: "https://app.example.com/".to_string() })
//!     }
//!     fn follow(&mut self, _link: &ConcreteLink) -> Result<Reply> {
//!         Ok(Reply::Done)
//!     }
//!     fn home(&mut self) -> Result<Reply> {
//!         Ok(Reply::Done)
//!     }
//!     fn terminate(&mut self) -> Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! let mut crawler = browser_crawler::Crawler::new(SinglePage, Default::default());
//! assert_eq!(crawler.run().unwrap(), browser_crawler::CrawlOutcome::Exhausted);
//! ```
//!
//! ## Module Overview
//!
//! - [`link`]: Concrete links and structural equivalence
//! - [`classifier`]: Abstract page tree and page classification
//! - [`registry`]: Abstract links, abstract pages and visit history
//! - [`pathfinder`]: Route search over the link graph
//! - [`crawler`]: The crawl engine and its report
//! - [`boundary`]: The boundary protocol and its drivers
//! - [`browser`]: Chrome session management and configuration
//! - [`config`]: Crawl and site configuration
//! - [`error`]: Error types and result aliases

pub mod boundary;
pub mod browser;
pub mod classifier;
pub mod config;
pub mod crawler;
pub mod error;
pub mod link;
pub mod pathfinder;
pub mod registry;

pub use boundary::{Boundary, ChromeBoundary, JsonLinesBoundary, NavigationScope, PageReport, Reply};
pub use browser::{BrowserSession, ConnectionOptions, LaunchOptions};
pub use classifier::{PageClassifier, classify};
pub use config::{CrawlConfig, SiteConfig};
pub use crawler::{CrawlOutcome, CrawlReport, Crawler};
pub use error::{CrawlError, Result};
pub use link::{ConcreteLink, LinkKind};
pub use pathfinder::{Route, find_route};
pub use registry::{GiveUpBudget, LinkId, PageId, Registry};
