use super::{Boundary, PageReport, Reply, ReplyMessage, Request};
use crate::error::{CrawlError, Result};
use crate::link::ConcreteLink;
use serde::de::DeserializeOwned;
use std::io::{BufRead, Stdout, StdinLock, Write};

/// Boundary that forwards every request to an external driver, one JSON object
/// per line in each direction
pub struct JsonLinesBoundary<R, W> {
    reader: R,
    writer: W,
    line: String,
}

impl JsonLinesBoundary<StdinLock<'static>, Stdout> {
    /// Talk to a driver over the process's stdin/stdout
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> JsonLinesBoundary<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer, line: String::new() }
    }

    /// Give back the underlying reader and writer
    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }

    fn send(&mut self, request: &Request<'_>) -> Result<()> {
        serde_json::to_writer(&mut self.writer, request)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    fn receive<T: DeserializeOwned>(&mut self, what: &str) -> Result<T> {
        self.line.clear();
        if self.reader.read_line(&mut self.line)? == 0 {
            return Err(CrawlError::ProtocolViolation(format!("Driver closed the channel while a {} reply was due", what)));
        }

        let line = self.line.trim();
        serde_json::from_str(line)
            .map_err(|e| CrawlError::ProtocolViolation(format!("Unexpected {} reply {}: {}", what, line, e)))
    }
}

impl<R: BufRead, W: Write> Boundary for JsonLinesBoundary<R, W> {
    fn page(&mut self) -> Result<PageReport> {
        self.send(&Request::Page)?;
        self.receive("page")
    }

    fn follow(&mut self, link: &ConcreteLink) -> Result<Reply> {
        self.send(&Request::Follow { link })?;
        Ok(self.receive::<ReplyMessage>("follow")?.reply)
    }

    fn home(&mut self) -> Result<Reply> {
        self.send(&Request::Home)?;
        Ok(self.receive::<ReplyMessage>("home")?.reply)
    }

    fn terminate(&mut self) -> Result<()> {
        self.send(&Request::Terminate)
    }
}
