//! # fieldreport
//!
//! Turns field-service form submissions into paginated PDF reports.
//!
//! A submission is a flat record of fields: dates, job details, free text,
//! multi-select answers, a signature, photos. The record plus a title go in;
//! a styled PDF named `{jobNumber}-{jobName}.pdf` comes out and is saved to
//! disk or handed to an email relay.
//!
//! Layout is flow-based. A single cursor walks down the page, each section
//! is measured before it is placed, and a section that no longer fits moves
//! whole to the next page. Photos go on trailing gallery pages, two to a
//! page, decoded concurrently while the rest of the report waits.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON record + title)
//!       ↓
//!   [model]    - ReportRecord, FieldValue, ReportKind → body sections
//!       ↓
//!   [layout]   - FlowLayout: header, grids, boxed text, page breaks
//!       ↓        (photos: concurrent decode → gallery pages)
//!   [pdf]      - Serialize to PDF bytes
//!       ↓
//!   [sink]     - LocalSave | EmailRelay
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod font;
pub mod image_loader;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod photos;
pub mod report;
pub mod sink;
pub mod style;
pub mod text;

pub use config::{Config, LayoutConfig};
pub use error::ReportError;
pub use model::{FieldValue, PhotoBlob, ReportKind, ReportRecord};
pub use report::{RenderedDocument, ReportEngine};
pub use sink::{ArtifactSink, EmailRelay, LocalSave};

/// Render a report with the default configuration and deliver it to `sink`.
///
/// Returns the filename once the document has been handed off. Missing
/// fields never fail a render.
pub async fn render_report<S: ArtifactSink>(
    record: &ReportRecord,
    title: &str,
    sink: &S,
) -> Result<String, ReportError> {
    ReportEngine::default().render_report(record, title, sink).await
}

/// Render a report described as JSON to PDF bytes with the default
/// configuration.
pub async fn render_json(json: &str, title: &str) -> Result<Vec<u8>, ReportError> {
    let record = ReportRecord::from_json(json)?;
    Ok(ReportEngine::default().render(&record, title).await?.bytes)
}
