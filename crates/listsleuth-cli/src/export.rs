/// CSV export of per-list results.
use anyhow::{Context, Result};
use listsleuth_core::controller::{FileOutcome, FileResult};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Serialize)]
struct Row<'a> {
    file: &'a str,
    status: &'static str,
    line: Option<u64>,
    position: Option<String>,
    matched_text: Option<&'a str>,
    bytes_read: Option<u64>,
    total_bytes: Option<u64>,
    message: Option<&'a str>,
    timestamp: String,
}

impl<'a> From<&'a FileResult> for Row<'a> {
    fn from(r: &'a FileResult) -> Self {
        let mut row = Row {
            file: &r.file,
            status: "",
            line: None,
            position: None,
            matched_text: None,
            bytes_read: None,
            total_bytes: None,
            message: None,
            timestamp: r.at.format("%Y-%m-%d %H:%M:%S").to_string(),
        };
        match &r.outcome {
            FileOutcome::Found {
                line_number,
                position,
                matched_text,
                bytes_read,
                total_bytes,
            } => {
                row.status = "found";
                row.line = Some(*line_number);
                row.position = Some(position.to_string());
                row.matched_text = Some(matched_text.as_str());
                row.bytes_read = Some(*bytes_read);
                row.total_bytes = *total_bytes;
            }
            FileOutcome::NotFound { message } => {
                row.status = "notfound";
                row.message = Some(message.as_str());
            }
            FileOutcome::Error { message } => {
                row.status = "error";
                row.message = Some(message.as_str());
            }
        }
        row
    }
}

pub fn write_results<W: Write>(out: W, results: &[FileResult]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for r in results {
        writer.serialize(Row::from(r))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_results_to(path: &Path, results: &[FileResult]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create export file: {}", path.display()))?;
    write_results(file, results)
        .with_context(|| format!("Failed to write export file: {}", path.display()))
}
