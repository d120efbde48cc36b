//! Browser crawler command line
//!
//! Crawls a site either through a Chrome session or through an external driver
//! speaking JSON lines on stdin/stdout, then prints a crawl report.

use anyhow::Context;
use browser_crawler::{
    Boundary, BrowserSession, ChromeBoundary, ConnectionOptions, Crawler, JsonLinesBoundary, LaunchOptions, SiteConfig,
};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Driver {
    /// Drive a Chrome/Chromium session (default)
    Chrome,
    /// Let an external driver answer over stdin/stdout
    Stdio,
}

#[derive(Parser)]
#[command(name = "browser-crawler")]
#[command(version)]
#[command(about = "Explore a web application and map its page templates", long_about = None)]
struct Cli {
    /// JSON site configuration file
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,

    /// Home page URL (overrides the configuration file)
    #[arg(long, value_name = "URL")]
    home_url: Option<String>,

    /// Who performs the navigation
    #[arg(long, short = 'd', value_enum, default_value = "chrome")]
    driver: Driver,

    /// Launch browser in headed mode (default: headless)
    #[arg(long, short = 'H')]
    headed: bool,

    /// Path to custom browser executable
    #[arg(long, value_name = "PATH")]
    chrome_path: Option<PathBuf>,

    /// Persistent browser profile directory holding the session
    #[arg(long, value_name = "DIR")]
    user_data_dir: Option<PathBuf>,

    /// WebSocket endpoint URL of an already running browser
    #[arg(long, value_name = "URL")]
    ws_endpoint: Option<String>,

    /// Extra origin links may lead to (repeatable)
    #[arg(long, value_name = "URL")]
    include_domain: Vec<String>,

    /// URL never to follow (repeatable)
    #[arg(long, value_name = "URL")]
    exclude_url: Vec<String>,

    /// Rebind links that lead somewhere new instead of disabling them
    #[arg(long)]
    dynamic_links: bool,

    /// Skips tolerated per link
    #[arg(long, value_name = "N")]
    direct_give_up: Option<u32>,

    /// Abandoned routes tolerated per route tail
    #[arg(long, value_name = "N")]
    path_give_up: Option<u32>,
}

impl Cli {
    fn site_config(&self) -> anyhow::Result<SiteConfig> {
        let mut site = match (&self.config, &self.home_url) {
            (Some(path), _) => SiteConfig::from_file(path)?,
            (None, Some(url)) => SiteConfig::new(url.clone()),
            (None, None) => anyhow::bail!("Either --config or --home-url is required"),
        };

        if let Some(url) = &self.home_url {
            site.home_page_url = url.clone();
        }
        site.include_domains.extend(self.include_domain.iter().cloned());
        site.exclude_urls.extend(self.exclude_url.iter().cloned());
        if self.dynamic_links {
            site.crawl.dynamic_links = true;
        }
        if let Some(budget) = self.direct_give_up {
            site.crawl.direct_give_up = budget;
        }
        if let Some(budget) = self.path_give_up {
            site.crawl.path_give_up = budget;
        }

        site.validate()?;
        Ok(site)
    }

    fn browser_session(&self) -> anyhow::Result<BrowserSession> {
        if let Some(endpoint) = &self.ws_endpoint {
            log::info!("Connecting to browser at {}", endpoint);
            return BrowserSession::connect(ConnectionOptions::new(endpoint.clone()))
                .context("Failed to connect to the browser");
        }

        let mut options = LaunchOptions::new().headless(!self.headed);
        if let Some(path) = &self.chrome_path {
            options = options.chrome_path(path.clone());
        }
        if let Some(dir) = &self.user_data_dir {
            options = options.user_data_dir(dir.clone());
        }

        log::info!("Launching browser ({})", if options.headless { "headless" } else { "headed" });
        BrowserSession::launch(options).context("Failed to launch the browser")
    }
}

/// Run the crawl and print its report, the partial one when the crawl fails
fn crawl<B: Boundary>(crawler: &mut Crawler<B>, print: impl Fn(&str)) -> anyhow::Result<()> {
    match crawler.run() {
        Ok(outcome) => {
            print(&crawler.report(outcome).to_json()?);
            Ok(())
        }
        Err(e) => {
            print(&crawler.aborted_report(&e).to_json()?);
            Err(e.into())
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let site = cli.site_config()?;
    log::info!("Crawling from {}", site.home_page_url);

    match cli.driver {
        Driver::Chrome => {
            let session = cli.browser_session()?;
            session.navigate(&site.home_page_url)?;
            session.wait_for_navigation()?;

            let mut crawler = Crawler::new(ChromeBoundary::new(session, &site), site.crawl.clone());
            crawl(&mut crawler, |report| println!("{}", report))?;
        }
        Driver::Stdio => {
            // stdout carries the protocol, so the report goes to stderr
            let mut crawler = Crawler::new(JsonLinesBoundary::stdio(), site.crawl.clone());
            crawl(&mut crawler, |report| eprintln!("{}", report))?;
        }
    }

    Ok(())
}
