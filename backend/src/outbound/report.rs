//! CSV report writer.
//!
//! Renders a [`ReportSnapshot`] into two comma-separated sheets, the summary
//! and the member-by-month details, and replaces the previous files
//! atomically via a temp-file rename so a concurrent download never sees a
//! half-written artefact.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::period::month_name;
use crate::domain::report::{DETAILS_FILE, ReportSnapshot, SUMMARY_FILE};
use crate::domain::ports::{ReportWriter, ReportWriterError};

/// Writes report sheets as CSV files under one directory.
pub struct CsvReportWriter {
    dir: PathBuf,
}

impl CsvReportWriter {
    /// Create a writer targeting `dir`. The directory is created on first
    /// write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

fn map_csv_error(error: csv::Error) -> ReportWriterError {
    ReportWriterError::io(error.to_string())
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, ReportWriterError> {
    writer
        .into_inner()
        .map_err(|e| ReportWriterError::io(e.to_string()))
}

fn summary_bytes(snapshot: &ReportSnapshot) -> Result<Vec<u8>, ReportWriterError> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    writer
        .write_record(["Hostel Fee Report", &snapshot.year.to_string()])
        .map_err(map_csv_error)?;
    writer
        .write_record(["Generated", &snapshot.generated_at.to_rfc3339()])
        .map_err(map_csv_error)?;
    writer.write_record([""]).map_err(map_csv_error)?;

    let summary = &snapshot.summary;
    for (label, value) in [
        ("Total students", summary.total_students),
        ("Paid members", summary.paid_members),
        ("Due members", summary.due_members),
        ("Total collection", summary.total_collection),
        ("Due amount", summary.due_amount),
    ] {
        writer
            .write_record([label, &value.to_string()])
            .map_err(map_csv_error)?;
    }
    writer.write_record([""]).map_err(map_csv_error)?;

    writer
        .write_record(["Month", "Paid", "Due", "Collection"])
        .map_err(map_csv_error)?;
    for row in &snapshot.monthly {
        writer
            .write_record([
                month_name(row.month),
                &row.paid_count.to_string(),
                &row.due_count.to_string(),
                &row.collection.to_string(),
            ])
            .map_err(map_csv_error)?;
    }

    finish(writer)
}

fn details_bytes(snapshot: &ReportSnapshot) -> Result<Vec<u8>, ReportWriterError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record([
            "Username",
            "Full name",
            "Room",
            "Month",
            "Year",
            "Amount",
            "Status",
            "Paid at",
        ])
        .map_err(map_csv_error)?;
    for row in &snapshot.details {
        writer
            .write_record([
                row.username.as_str(),
                row.full_name.as_str(),
                row.room_number.as_str(),
                month_name(row.month),
                &row.year.to_string(),
                &row.amount.to_string(),
                if row.paid { "Paid" } else { "Due" },
                &row.paid_at.map(|t| t.to_rfc3339()).unwrap_or_else(|| "-".into()),
            ])
            .map_err(map_csv_error)?;
    }

    finish(writer)
}

async fn replace_file(dir: &Path, name: &str, bytes: &[u8]) -> Result<(), ReportWriterError> {
    let target = dir.join(name);
    let temp = dir.join(format!("{name}.tmp"));
    tokio::fs::write(&temp, bytes)
        .await
        .map_err(|e| ReportWriterError::io(e.to_string()))?;
    tokio::fs::rename(&temp, &target)
        .await
        .map_err(|e| ReportWriterError::io(e.to_string()))
}

#[async_trait]
impl ReportWriter for CsvReportWriter {
    async fn write(&self, snapshot: &ReportSnapshot) -> Result<(), ReportWriterError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ReportWriterError::io(e.to_string()))?;

        let summary = summary_bytes(snapshot)?;
        let details = details_bytes(snapshot)?;
        replace_file(&self.dir, SUMMARY_FILE, &summary).await?;
        replace_file(&self.dir, DETAILS_FILE, &details).await
    }
}
