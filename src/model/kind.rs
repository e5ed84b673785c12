//! Report kinds and the body sections each one renders.
//!
//! Every kind shares the header and identity grid; what differs is the body.
//! A kind picks its fields out of the shared record by name, so a field the
//! kind doesn't know about is simply not rendered (except by [`ReportKind::Generic`],
//! which renders everything it finds).

use super::{FieldValue, FormField, ReportRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    MaterialTurnover,
    MaterialDelivery,
    JobsiteProgress,
    Training,
    Repair,
    Maintenance,
    Incident,
    PhotoUpload,
    Generic,
}

/// One body section, resolved against a record.
#[derive(Debug, Clone, PartialEq)]
pub enum BodySection {
    /// Bold heading over a boxed text block.
    Boxed { heading: String, text: String },
    /// A label/value grid.
    Grid(Vec<FormField>),
}

/// What follows the body sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureBlock {
    None,
    /// Signature box only.
    SignatureOnly,
    /// Recipient heading, name/type grid, disclaimer and signature box.
    WithRecipient,
}

/// Fields the header and identity grid already cover.
const IDENTITY_FIELDS: &[&str] = &[
    "date",
    "jobName",
    "jobNumber",
    "installerName",
    "technicianName",
    "signature",
    "photos",
    "recipientName",
    "recipientType",
];

impl ReportKind {
    /// Resolve a kind from a report title. Matching ignores case, spacing
    /// and punctuation, and a trailing "Report" is optional.
    pub fn from_title(title: &str) -> Self {
        let key: String = title
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();
        let key = key.strip_suffix("report").unwrap_or(&key);
        match key {
            "materialturnover" => ReportKind::MaterialTurnover,
            "materialdelivery" => ReportKind::MaterialDelivery,
            "jobsiteprogress" => ReportKind::JobsiteProgress,
            "training" => ReportKind::Training,
            "repair" => ReportKind::Repair,
            "maintenance" => ReportKind::Maintenance,
            "incident" => ReportKind::Incident,
            "photoupload" | "photos" => ReportKind::PhotoUpload,
            _ => ReportKind::Generic,
        }
    }

    pub fn signature_block(&self) -> SignatureBlock {
        match self {
            ReportKind::MaterialTurnover => SignatureBlock::WithRecipient,
            ReportKind::Training => SignatureBlock::SignatureOnly,
            _ => SignatureBlock::None,
        }
    }

    /// Body sections for this kind, in render order. Sections are listed
    /// even when their field is empty so every report of a kind has the
    /// same shape.
    pub fn sections(&self, record: &ReportRecord) -> Vec<BodySection> {
        let boxed = |heading: &str, key: &str| BodySection::Boxed {
            heading: format!("{}:", heading),
            text: record.text(key),
        };
        let field = |label: &str, key: &str| FormField::light(label, record.inline_text(key));

        match self {
            ReportKind::MaterialTurnover => vec![boxed("Turnover Items", "turnoverItems")],
            ReportKind::MaterialDelivery => vec![
                boxed("Delivered Items", "deliveredItems"),
                boxed("Storage Location", "storageLocation"),
            ],
            ReportKind::JobsiteProgress => vec![
                boxed("Equipment", "equipment"),
                boxed("Notes", "notes"),
                BodySection::Grid(vec![field("Estimated Completion", "estimatedCompletionDate")]),
            ],
            ReportKind::Training => vec![
                boxed("Attendance List", "attendanceList"),
                boxed("Equipment Trained", "selectedEquipment"),
                boxed("Equipment Turnover", "equipmentTurnover"),
                boxed("Notes", "notes"),
            ],
            ReportKind::Repair => vec![
                boxed("Equipment Repaired", "selectedEquipment"),
                boxed("Repair Summary", "repairSummaries"),
                boxed("Parts Needed", "partsNeeded"),
                boxed("Equipment Turnover", "equipmentTurnover"),
                boxed("Other Notes", "otherNotes"),
            ],
            ReportKind::Maintenance => vec![
                boxed("Equipment Serviced", "selectedEquipment"),
                boxed("Completed Checklist", "completedChecklist"),
                boxed("Outdoor Bleacher Inspection", "outdoorBleacherAnswers"),
                boxed("Additional Repairs", "additionalRepairs"),
                boxed("Equipment Turnover", "equipmentTurnover"),
                boxed("Other Notes", "otherNotes"),
            ],
            ReportKind::Incident => {
                let mut incident_type = record.inline_text("incidentType");
                let other = record.inline_text("otherIncidentType");
                if incident_type.eq_ignore_ascii_case("other") && !other.is_empty() {
                    incident_type = other;
                }
                vec![
                    BodySection::Grid(vec![
                        field("Incident Date", "incidentDate"),
                        field("Incident Time", "incidentTime"),
                        field("Location", "location"),
                        FormField::light("Incident Type", incident_type),
                    ]),
                    boxed("People Involved", "peopleInvolved"),
                    boxed("Witness", "witness"),
                    boxed("Description", "description"),
                    boxed("Cause", "cause"),
                    boxed("Injuries", "injuries"),
                    boxed("Treatment", "treatment"),
                    boxed("Property Damage", "propertyDamage"),
                    boxed("Immediate Actions", "immediateActions"),
                    boxed("Future Prevention Steps", "futurePreventionSteps"),
                    BodySection::Grid(vec![
                        field("Reported To", "reportedTo"),
                        field("Reported Date", "reportedDate"),
                    ]),
                    boxed("Other Notes", "otherNotes"),
                ]
            }
            ReportKind::PhotoUpload => Vec::new(),
            ReportKind::Generic => record
                .iter()
                .filter(|(key, value)| {
                    !IDENTITY_FIELDS.contains(key) && !matches!(value, FieldValue::Photos(_))
                })
                .map(|(key, value)| BodySection::Boxed {
                    heading: format!("{}:", humanize(key)),
                    text: value.text(),
                })
                .collect(),
        }
    }
}

/// `otherNotes` -> `Other Notes`, `storage_location` -> `Storage Location`.
fn humanize(key: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for ch in key.chars() {
        if ch == '_' || ch == '-' || ch == ' ' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        current.push(ch);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
        .iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
