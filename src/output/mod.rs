//! Output module for crawl results
//!
//! This module handles:
//! - Printing a summary of a finished crawl
//! - Writing the full crawl response as JSON

mod summary;

pub use summary::{print_summary, summarize, CrawlSummary};

use crate::crawler::CrawlResponse;
use crate::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes the crawl response as pretty-printed JSON
///
/// # Arguments
///
/// * `response` - The finished crawl
/// * `path` - File to create or overwrite
pub fn write_json(response: &CrawlResponse, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, response)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    tracing::info!("Wrote {} page results to {}", response.results.len(), path.display());
    Ok(())
}
