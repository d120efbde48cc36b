//! Browser session management
//!
//! A thin layer over `headless_chrome` that knows how to enumerate a page's
//! anchors and forms as [`ConcreteLink`](crate::link::ConcreteLink)s and how to
//! activate one of them again.

pub mod config;
pub mod session;

pub use config::{ConnectionOptions, LaunchOptions};
pub use session::{BrowserSession, LinkActivation};
