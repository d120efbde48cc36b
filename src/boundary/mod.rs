//! The browser boundary
//!
//! The crawl engine never touches a browser itself. It talks to a [`Boundary`]
//! that answers three kinds of request, one at a time:
//!
//! | Request     | Reply                                  |
//! |-------------|----------------------------------------|
//! | `page`      | the current page's links and URL       |
//! | `follow`    | `done`, `skip`, `mark` or `terminate`  |
//! | `home`      | `done`                                 |
//! | `terminate` | none, the session ends                 |
//!
//! Implementations:
//! - [`chrome::ChromeBoundary`]: drives Chrome/Chromium through the DevTools protocol
//! - [`json::JsonLinesBoundary`]: forwards requests to an external driver as JSON lines

pub mod chrome;
pub mod json;
pub mod scope;

pub use chrome::ChromeBoundary;
pub use json::JsonLinesBoundary;
pub use scope::NavigationScope;

use crate::error::Result;
use crate::link::ConcreteLink;
use serde::{Deserialize, Serialize};

/// Answer to a `page` request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageReport {
    #[serde(default)]
    pub links: Vec<ConcreteLink>,
    /// Location of the page the links were taken from
    #[serde(default)]
    pub url: String,
}

/// Answer to a `follow` or `home` request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reply {
    /// The request was carried out
    Done,
    /// The link could not be followed this time
    Skip,
    /// The link can never be followed (e.g. a form the driver cannot fill)
    Mark,
    /// Stop the crawl
    Terminate,
}

/// Wire form of a request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "request", rename_all = "lowercase")]
pub enum Request<'a> {
    Page,
    Follow { link: &'a ConcreteLink },
    Home,
    Terminate,
}

/// Wire form of a follow/home reply: `{"reply": "done"}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyMessage {
    pub reply: Reply,
}

/// Something that can report links, follow them and return home
pub trait Boundary {
    /// Report the links of the current page
    fn page(&mut self) -> Result<PageReport>;

    /// Follow one of the links reported by the last `page` call
    fn follow(&mut self, link: &ConcreteLink) -> Result<Reply>;

    /// Go back to the home page
    fn home(&mut self) -> Result<Reply>;

    /// End the session
    fn terminate(&mut self) -> Result<()>;
}

impl<B: Boundary + ?Sized> Boundary for &mut B {
    fn page(&mut self) -> Result<PageReport> {
        (**self).page()
    }

    fn follow(&mut self, link: &ConcreteLink) -> Result<Reply> {
        (**self).follow(link)
    }

    fn home(&mut self) -> Result<Reply> {
        (**self).home()
    }

    fn terminate(&mut self) -> Result<()> {
        (**self).terminate()
    }
}
