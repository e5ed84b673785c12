//! # Report Records
//!
//! A submission arrives as a flat JSON object. Field names are not fixed:
//! every report kind reads the fields it knows about and anything missing
//! reads as an empty string. Insertion order is preserved so that generic
//! reports list their sections in the order the form sent them.

pub mod kind;

pub use kind::{BodySection, ReportKind, SignatureBlock};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::ReportError;

/// One value in a report record.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    Empty,
    Text(String),
    Number(f64),
    Flag(bool),
    /// Uploaded images. Must come before `List` so an array of objects is
    /// not mistaken for strings; an empty array lands here too.
    Photos(Vec<PhotoBlob>),
    /// Multi-select answers such as the equipment picked on a form.
    List(Vec<String>),
    /// Per-item notes keyed by item name, e.g. a repair summary per
    /// piece of equipment.
    Entries(IndexMap<String, String>),
}

impl FieldValue {
    /// The value as block text. Lists go one item per line.
    pub fn text(&self) -> String {
        match self {
            FieldValue::Empty | FieldValue::Photos(_) => String::new(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) => format_number(*n),
            FieldValue::Flag(b) => if *b { "Yes" } else { "No" }.to_string(),
            FieldValue::List(items) => items.join("\n"),
            FieldValue::Entries(map) => map
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// The value on a single line, for grid boxes.
    pub fn inline_text(&self) -> String {
        match self {
            FieldValue::List(items) => items.join(", "),
            FieldValue::Entries(map) => map
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v))
                .collect::<Vec<_>>()
                .join("; "),
            other => other.text().replace('\n', " "),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// An uploaded image file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PhotoBlob {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "data")]
    pub source: PhotoSource,
}

/// Where a photo's bytes come from. Decoding is deferred to the photo phase
/// so a bad upload only costs its own slot in the gallery.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PhotoSource {
    /// A `data:image/...;base64,` URL or bare base64.
    Encoded(String),
    /// Raw file bytes.
    Bytes(Vec<u8>),
}

impl PhotoBlob {
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            source: PhotoSource::Bytes(bytes),
        }
    }
}

/// One label/value pair in a field grid.
#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub label: String,
    pub value: String,
    /// Dark fill with white text.
    pub dark: bool,
}

impl FormField {
    pub fn light(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            dark: false,
        }
    }

    pub fn dark(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            dark: true,
        }
    }
}

/// A submitted form: field name to value, in submission order.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ReportRecord {
    fields: IndexMap<String, FieldValue>,
}

impl ReportRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, ReportError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        self.fields.insert(key.into(), value);
    }

    /// Builder-style text insert, handy for tests and the CLI.
    pub fn with_text(mut self, key: &str, value: &str) -> Self {
        self.insert(key, FieldValue::Text(value.to_string()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Block text for `key`; missing fields are empty.
    pub fn text(&self, key: &str) -> String {
        self.get(key).map(FieldValue::text).unwrap_or_default()
    }

    /// Single-line text for `key`; missing fields are empty.
    pub fn inline_text(&self, key: &str) -> String {
        self.get(key).map(FieldValue::inline_text).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn photos(&self) -> &[PhotoBlob] {
        match self.get("photos") {
            Some(FieldValue::Photos(p)) => p,
            _ => &[],
        }
    }

    /// Append photos, creating the `photos` field if needed.
    pub fn push_photos(&mut self, blobs: impl IntoIterator<Item = PhotoBlob>) {
        let mut photos = self.photos().to_vec();
        photos.extend(blobs);
        self.insert("photos", FieldValue::Photos(photos));
    }

    /// `{jobNumber|report}-{jobName|document}.pdf`
    pub fn filename(&self) -> String {
        let or = |key: &str, fallback: &str| {
            let v = self.inline_text(key);
            if v.is_empty() {
                fallback.to_string()
            } else {
                v
            }
        };
        format!("{}-{}.pdf", or("jobNumber", "report"), or("jobName", "document"))
    }

    /// Date, job and the person who did the work.
    pub fn identity_fields(&self) -> Vec<FormField> {
        let installer = self.inline_text("installerName");
        let (label, person) = if installer.is_empty() {
            ("Technician", self.inline_text("technicianName"))
        } else {
            ("Installer", installer)
        };
        vec![
            FormField::light("Date", self.inline_text("date")),
            FormField::dark("Job Name", self.inline_text("jobName")),
            FormField::dark("Job Number", self.inline_text("jobNumber")),
            FormField::dark(label, person),
        ]
    }
}
