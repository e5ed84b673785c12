//! Where finished reports go.
//!
//! A rendered document is handed to exactly one [`ArtifactSink`]. Two are
//! provided: [`LocalSave`] writes the PDF into a directory, and
//! [`EmailRelay`] uploads it to the relay service that emails it on. Relay
//! failures are reported, never retried.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::ReportError;
use crate::report::RenderedDocument;

#[allow(async_fn_in_trait)]
pub trait ArtifactSink {
    async fn deliver(&self, document: &RenderedDocument) -> Result<(), ReportError>;
}

/// Save into a local directory under the document's filename.
#[derive(Debug, Clone)]
pub struct LocalSave {
    dir: PathBuf,
}

impl LocalSave {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where `document` is written. The filename is reduced to a single
    /// path component first, see [`local_file_name`].
    pub fn path_for(&self, document: &RenderedDocument) -> PathBuf {
        self.dir.join(local_file_name(&document.filename))
    }
}

/// Make a report filename safe to use as one file inside the output
/// directory. Separators and control characters become `_` and `..` never
/// survives. The `.pdf` extension is kept.
pub fn local_file_name(filename: &str) -> String {
    let (stem, ext) = match filename.strip_suffix(".pdf") {
        Some(stem) => (stem, ".pdf"),
        None => (filename, ""),
    };
    let mut stem: String = stem
        .chars()
        .map(|c| if c == '/' || c == '\\' || c.is_control() { '_' } else { c })
        .collect();
    while stem.contains("..") {
        stem = stem.replace("..", "_");
    }
    if stem.is_empty() {
        stem.push('_');
    }
    format!("{}{}", stem, ext)
}

impl ArtifactSink for LocalSave {
    async fn deliver(&self, document: &RenderedDocument) -> Result<(), ReportError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ReportError::io(&self.dir, e))?;
        let path = self.path_for(document);
        tokio::fs::write(&path, &document.bytes)
            .await
            .map_err(|e| ReportError::io(&path, e))?;
        info!(path = %path.display(), bytes = document.bytes.len(), "report saved");
        Ok(())
    }
}

/// Upload to the email relay as a multipart form with `pdf`, `subject` and
/// `emailTo` parts.
#[derive(Debug, Clone)]
pub struct EmailRelay {
    client: reqwest::Client,
    url: String,
    email_to: String,
    subject: String,
}

impl EmailRelay {
    pub fn new(
        url: impl Into<String>,
        email_to: impl Into<String>,
        subject: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ReportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            email_to: email_to.into(),
            subject: subject.into(),
        })
    }

    fn form(&self, document: &RenderedDocument) -> Result<Form, ReportError> {
        let pdf = Part::bytes(document.bytes.clone())
            .file_name(format!("{}.pdf", self.subject))
            .mime_str("application/pdf")?;
        Ok(Form::new()
            .part("pdf", pdf)
            .text("subject", self.subject.clone())
            .text("emailTo", self.email_to.clone()))
    }
}

impl ArtifactSink for EmailRelay {
    async fn deliver(&self, document: &RenderedDocument) -> Result<(), ReportError> {
        let response = self
            .client
            .post(&self.url)
            .multipart(self.form(document)?)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        match interpret_response(status, &body) {
            Ok(()) => {
                info!(to = %self.email_to, subject = %self.subject, "report emailed");
                Ok(())
            }
            Err(e) => {
                warn!(status, to = %self.email_to, error = %e, "email relay rejected report");
                Err(e)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct RelayResponse {
    #[serde(default)]
    success: bool,
    error: Option<String>,
}

/// Decide whether a relay response means the email went out. Only a 2xx
/// with `{"success": true}` does.
pub fn interpret_response(status: u16, body: &str) -> Result<(), ReportError> {
    let parsed: Option<RelayResponse> = serde_json::from_str(body).ok();
    let ok_status = (200..300).contains(&status);

    match parsed {
        Some(RelayResponse { success: true, .. }) if ok_status => Ok(()),
        Some(RelayResponse {
            error: Some(message),
            ..
        }) => Err(ReportError::Relay {
            status: Some(status),
            message,
        }),
        _ => {
            let snippet: String = body.chars().take(200).collect();
            Err(ReportError::Relay {
                status: Some(status),
                message: if snippet.trim().is_empty() {
                    "unexpected empty response".to_string()
                } else {
                    format!("unexpected response: {}", snippet)
                },
            })
        }
    }
}
