//! # Report Engine
//!
//! One render pass walks a fixed sequence of phases:
//!
//! ```text
//! Header -> BasicFields -> Body -> [Signature] -> [Photos] -> Save
//! ```
//!
//! Everything up to the gallery is laid out synchronously. The photo phase
//! decodes every photo concurrently and waits for all of them before the
//! gallery pages are drawn. Save serializes the pages and hands the document
//! to a sink.

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::ReportError;
use crate::image_loader::{load_image, LoadedImage};
use crate::layout::gallery::add_photos;
use crate::layout::grid::render_form_fields;
use crate::layout::{FlowLayout, LayoutPage, SectionContent, SectionOptions};
use crate::model::{BodySection, FormField, ReportKind, ReportRecord, SignatureBlock};
use crate::pdf::{Metadata, PdfWriter};
use crate::photos::decode_photos;
use crate::sink::ArtifactSink;
use crate::style::{FontStyle, TextStyle};

/// Space after the identity grid.
const AFTER_IDENTITY: f64 = 10.0;
/// Space after the recipient grid.
const AFTER_RECIPIENT: f64 = 5.0;
/// Gap between logo and contact lines.
const LOGO_GAP: f64 = 5.0;
const BODY_SPACING: f64 = 10.0;
const DISCLAIMER_SPACING: f64 = 15.0;
/// Signature image inset inside its box.
const SIGNATURE_INSET_X: f64 = 20.0;
const SIGNATURE_INSET_Y: f64 = 10.0;
const SIGNATURE_IMAGE_HEIGHT: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Header,
    BasicFields,
    Body,
    Signature,
    Photos,
    Save,
}

/// A finished report, ready for exactly one sink.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub filename: String,
    pub title: String,
    pub pages: Vec<LayoutPage>,
    pub bytes: Vec<u8>,
}

impl RenderedDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

pub struct ReportEngine {
    config: Config,
}

impl Default for ReportEngine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl ReportEngine {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Render and deliver. Returns the filename the report was delivered as.
    pub async fn render_report<S: ArtifactSink>(
        &self,
        record: &ReportRecord,
        title: &str,
        sink: &S,
    ) -> Result<String, ReportError> {
        let document = self.render(record, title).await?;
        sink.deliver(&document).await?;
        info!(filename = %document.filename, pages = document.page_count(), "report delivered");
        Ok(document.filename)
    }

    /// Lay out and serialize a report without delivering it.
    pub async fn render(&self, record: &ReportRecord, title: &str) -> Result<RenderedDocument, ReportError> {
        let kind = ReportKind::from_title(title);
        let filename = record.filename();
        info!(title, kind = ?kind, filename = %filename, "rendering report");

        let layout = &self.config.layout;
        let mut flow = FlowLayout::new(layout);

        enter(Phase::Header, &flow);
        self.add_header(&mut flow, title);

        enter(Phase::BasicFields, &flow);
        flow.add_section(
            None,
            SectionContent::Draw(render_form_fields(record.identity_fields(), layout)),
            &SectionOptions::default(),
        );
        flow.advance(AFTER_IDENTITY);

        enter(Phase::Body, &flow);
        for section in kind.sections(record) {
            match section {
                BodySection::Boxed { heading, text } => {
                    flow.add_section(
                        Some(&heading),
                        SectionContent::Text(text),
                        &SectionOptions::boxed().spacing(BODY_SPACING),
                    );
                }
                BodySection::Grid(fields) => {
                    flow.add_section(
                        None,
                        SectionContent::Draw(render_form_fields(fields, layout)),
                        &SectionOptions::default(),
                    );
                }
            }
        }

        let block = kind.signature_block();
        if block != SignatureBlock::None {
            enter(Phase::Signature, &flow);
            if block == SignatureBlock::WithRecipient {
                self.add_recipient(&mut flow, record);
            }
            add_signature(&mut flow, record);
        }

        let photos = record.photos();
        if !photos.is_empty() {
            enter(Phase::Photos, &flow);
            let entries = decode_photos(photos, self.config.photos.decode_timeout()).await;
            add_photos(&mut flow, entries);
        }

        enter(Phase::Save, &flow);
        let pages = flow.finish();
        let metadata = Metadata {
            title: Some(format!("{} Report", title)),
            subject: Some(filename.trim_end_matches(".pdf").to_string()),
        };
        let bytes = PdfWriter::new().write(&pages, &metadata)?;
        debug!(pages = pages.len(), bytes = bytes.len(), "report serialized");

        Ok(RenderedDocument {
            filename,
            title: title.to_string(),
            pages,
            bytes,
        })
    }

    /// Logo, company contact lines, report title and a rule underneath.
    fn add_header(&self, flow: &mut FlowLayout<'_>, title: &str) {
        let branding = &self.config.branding;
        let layout = &self.config.layout;

        if !branding.logo_path.is_empty() {
            match load_image(&branding.logo_path) {
                Ok(logo) => {
                    let x = (layout.page_width - branding.logo_width) / 2.0;
                    let y = flow.y();
                    flow.canvas_mut()
                        .image_fit(x, y, branding.logo_width, branding.logo_height, logo);
                    flow.advance(branding.logo_height + LOGO_GAP);
                }
                Err(e) => warn!(path = %branding.logo_path, error = %e, "logo skipped"),
            }
        }

        let contact = TextStyle::new(FontStyle::Normal, layout.contact_font_size).with_color(layout.muted_text);
        for line in &branding.contact_lines {
            flow.center_text(line, contact, 0.0);
        }

        flow.center_text(
            &format!("{} Report", title),
            TextStyle::new(FontStyle::Bold, layout.title_font_size),
            5.0,
        );
        flow.divider(5.0);
        flow.advance(15.0);
    }

    /// Recipient heading, name/type grid and the signer's disclaimer.
    fn add_recipient(&self, flow: &mut FlowLayout<'_>, record: &ReportRecord) {
        let layout = &self.config.layout;
        flow.add_section(
            Some("Recipient Information:"),
            SectionContent::Empty,
            &SectionOptions::default().spacing(BODY_SPACING),
        );
        let fields = vec![
            FormField::dark("Name", record.inline_text("recipientName")),
            FormField::dark("Type", record.inline_text("recipientType")),
        ];
        flow.add_section(
            None,
            SectionContent::Draw(render_form_fields(fields, layout)),
            &SectionOptions::default(),
        );
        flow.advance(AFTER_RECIPIENT);
        flow.add_section(
            None,
            SectionContent::Text(self.config.branding.legal_disclaimer()),
            &SectionOptions::boxed()
                .font(FontStyle::Italic, layout.disclaimer_font_size)
                .spacing(DISCLAIMER_SPACING),
        );
    }
}

/// Signature box, with the signature drawn inside when the record has a
/// usable one.
fn add_signature(flow: &mut FlowLayout<'_>, record: &ReportRecord) {
    let signature = load_signature(record);
    let layout = flow.config().clone();
    flow.add_section(
        None,
        SectionContent::draw(move |canvas, frame| {
            canvas.rounded_rect(
                frame.x,
                frame.y,
                frame.width,
                layout.signature_height,
                layout.corner_radius,
                layout.light_fill,
                layout.box_border,
            );
            if let Some(image) = signature {
                canvas.image_fit(
                    frame.x + SIGNATURE_INSET_X,
                    frame.y + SIGNATURE_INSET_Y,
                    frame.width - 2.0 * SIGNATURE_INSET_X,
                    SIGNATURE_IMAGE_HEIGHT,
                    image,
                );
            }
            frame.y + layout.signature_height + frame.spacing
        }),
        &SectionOptions::default(),
    );
}

fn load_signature(record: &ReportRecord) -> Option<LoadedImage> {
    let raw = record.text("signature");
    if raw.is_empty() {
        return None;
    }
    match load_image(&raw) {
        Ok(image) => Some(image),
        Err(e) => {
            warn!(error = %e, "signature skipped");
            None
        }
    }
}

fn enter(phase: Phase, flow: &FlowLayout<'_>) {
    debug!(phase = ?phase, page = flow.page_count(), y = flow.y(), "render phase");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Branding;
    use crate::image_loader::tests::png_bytes;
    use crate::layout::DrawCommand;
    use crate::model::{FieldValue, PhotoBlob};

    fn engine() -> ReportEngine {
        let mut config = Config::default();
        config.branding.logo_path = String::new();
        ReportEngine::new(config)
    }

    fn signature_url() -> String {
        use base64::Engine;
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(png_bytes(8, 4, [0, 0, 0, 255]))
        )
    }

    #[tokio::test]
    async fn header_and_identity_on_first_page() {
        let record = ReportRecord::new()
            .with_text("date", "2024-05-01")
            .with_text("jobName", "Lincoln HS")
            .with_text("jobNumber", "1234");
        let doc = engine().render(&record, "Repair").await.unwrap();
        let first = &doc.pages[0];
        assert!(first.contains_text("Repair Report"));
        assert!(first.contains_text("Website: www.example.com"));
        assert!(first.contains_text("Job Name:"));
        assert!(first.contains_text("Lincoln HS"));
        assert!(first.contains_text("Technician:"));
        assert_eq!(doc.filename, "1234-Lincoln HS.pdf");
    }

    #[tokio::test]
    async fn missing_logo_is_skipped() {
        let mut config = Config::default();
        config.branding = Branding {
            logo_path: "./does/not/exist.png".into(),
            ..Branding::default()
        };
        let doc = ReportEngine::new(config)
            .render(&ReportRecord::new(), "Repair")
            .await
            .unwrap();
        assert_eq!(doc.pages[0].image_count(), 0);
        // contact lines start at the top margin when there is no logo
        assert_eq!(doc.pages[0].text_y("Website: www.example.com"), Some(20.0));
    }

    #[tokio::test]
    async fn logo_is_drawn_centered() {
        let tmp = tempfile::tempdir().unwrap();
        let logo = tmp.path().join("logo.png");
        std::fs::write(&logo, png_bytes(10, 10, [0, 0, 0, 255])).unwrap();
        let mut config = Config::default();
        config.branding.logo_path = logo.to_string_lossy().into_owned();
        let doc = ReportEngine::new(config)
            .render(&ReportRecord::new(), "Repair")
            .await
            .unwrap();
        let image = doc.pages[0].commands.iter().find_map(|c| match c {
            DrawCommand::Image { x, y, width, .. } => Some((*x, *y, *width)),
            _ => None,
        });
        assert_eq!(image, Some((85.0, 20.0, 40.0)));
        assert_eq!(doc.pages[0].text_y("Website: www.example.com"), Some(65.0));
    }

    #[tokio::test]
    async fn turnover_has_recipient_block_and_signature() {
        let record = ReportRecord::new()
            .with_text("turnoverItems", "2 keys")
            .with_text("recipientName", "Dana")
            .with_text("recipientType", "Athletic Director")
            .with_text("signature", &signature_url());
        let doc = engine().render(&record, "Material Turnover").await.unwrap();
        let all: Vec<&str> = doc.pages.iter().flat_map(|p| p.text_lines()).collect();
        for expected in ["Turnover Items:", "2 keys", "Recipient Information:", "Name:", "Dana", "Type:"] {
            assert!(all.contains(&expected), "missing {:?}", expected);
        }
        assert!(all.iter().any(|l| l.starts_with("Signer assumes responsibility")));
        let images: usize = doc.pages.iter().map(|p| p.image_count()).sum();
        assert_eq!(images, 1);
    }

    #[tokio::test]
    async fn bad_signature_keeps_the_box() {
        let record = ReportRecord::new().with_text("signature", "data:image/png;base64,!!!");
        let doc = engine().render(&record, "Training").await.unwrap();
        let boxes = doc
            .pages
            .iter()
            .flat_map(|p| &p.commands)
            .filter(|c| matches!(c, DrawCommand::Rect { height, .. } if *height == 60.0))
            .count();
        assert_eq!(boxes, 1);
        assert!(doc.pages.iter().all(|p| p.image_count() == 0));
        assert!(!doc.pages.iter().any(|p| p.contains_text("Recipient Information:")));
    }

    #[tokio::test]
    async fn photos_follow_on_new_pages() {
        let mut record = ReportRecord::new();
        record.push_photos((0..3).map(|i| PhotoBlob::from_bytes(format!("p{}.png", i), png_bytes(4, 4, [9, 9, 9, 255]))));
        let doc = engine().render(&record, "Photo Upload").await.unwrap();
        assert_eq!(doc.page_count(), 3);
        assert!(doc.pages[1].contains_text("Photos"));
        assert!(doc.bytes.starts_with(b"%PDF-1.7"));
    }

    #[tokio::test]
    async fn generic_kind_renders_unknown_fields() {
        let mut record = ReportRecord::new().with_text("hoursWorked", "8");
        record.insert("breaks", FieldValue::List(vec!["10:00".into(), "12:30".into()]));
        let doc = engine().render(&record, "Time Sheets").await.unwrap();
        let page = &doc.pages[0];
        assert!(page.contains_text("Hours Worked:"));
        assert!(page.contains_text("Breaks:"));
        assert!(page.contains_text("12:30"));
    }
}
