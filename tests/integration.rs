//! Integration tests for the report pipeline.
//!
//! These tests exercise the full path from a JSON record to PDF output.
//! They verify:
//! - Records with missing fields still render and get a filename
//! - Sections move to a new page as a whole, at most once
//! - The photo gallery puts two photos per page, in order
//! - A photo that fails to decode leaves a placeholder
//! - Reports are delivered to a local directory

use fieldreport::config::Config;
use fieldreport::layout::grid::render_form_fields;
use fieldreport::layout::{FlowLayout, SectionContent, SectionOptions};
use fieldreport::model::{FormField, PhotoBlob, PhotoSource};
use fieldreport::{LocalSave, ReportEngine, ReportRecord};

// ─── Helpers ────────────────────────────────────────────────────

fn test_config() -> Config {
    let mut config = Config::default();
    config.branding.logo_path = String::new();
    config
}

fn engine() -> ReportEngine {
    ReportEngine::new(test_config())
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([120, 80, 40, 255]));
    let mut buf = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut buf);
    image::ImageEncoder::write_image(encoder, img.as_raw(), width, height, image::ColorType::Rgba8)
        .unwrap();
    buf
}

fn photo(name: &str) -> PhotoBlob {
    PhotoBlob::from_bytes(name, png(16, 12))
}

fn broken_photo(name: &str) -> PhotoBlob {
    PhotoBlob {
        name: name.to_string(),
        source: PhotoSource::Encoded("data:image/jpeg;base64,bm90IGFuIGltYWdl".into()),
    }
}

fn long_text(lines: usize) -> String {
    (0..lines)
        .map(|i| format!("Line {} of the technician notes", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 50, "PDF too small to be valid");
    assert!(bytes.starts_with(b"%PDF-1.7"), "Missing PDF header");
    assert!(
        bytes.windows(5).any(|w| w == b"%%EOF"),
        "Missing %%EOF marker"
    );
    assert!(
        bytes.windows(4).any(|w| w == b"xref"),
        "Missing xref table"
    );
    assert!(
        bytes.windows(7).any(|w| w == b"trailer"),
        "Missing trailer"
    );
}

// ─── Basic Pipeline Tests ───────────────────────────────────────

#[tokio::test]
async fn test_empty_record_renders() {
    let doc = engine().render(&ReportRecord::new(), "Photo Upload").await.unwrap();
    assert_eq!(doc.filename, "report-document.pdf");
    assert_eq!(doc.page_count(), 1);
    assert_valid_pdf(&doc.bytes);
}

#[tokio::test]
async fn test_json_record_renders() {
    let record = ReportRecord::from_json(
        r#"{
            "date": "2024-05-01",
            "jobName": "Lincoln HS",
            "jobNumber": 1234,
            "technicianName": "Sam",
            "selectedEquipment": ["Bleachers", "Scoreboard"],
            "repairSummaries": {"Bleachers": "Replaced rail", "Scoreboard": "New controller"},
            "photos": []
        }"#,
    )
    .unwrap();
    let doc = engine().render(&record, "Repair").await.unwrap();
    assert_eq!(doc.filename, "1234-Lincoln HS.pdf");
    assert!(doc.pages[0].contains_text("Sam"));
    assert!(doc.pages.iter().any(|p| p.contains_text("Bleachers: Replaced rail")));
    assert_valid_pdf(&doc.bytes);
}

#[tokio::test]
async fn test_title_in_metadata() {
    let doc = engine().render(&ReportRecord::new(), "Incident").await.unwrap();
    let text = String::from_utf8_lossy(&doc.bytes);
    assert!(text.contains("/Title"));
    assert!(text.contains("/Producer (fieldreport)"));
}

// ─── Page Break Tests ───────────────────────────────────────────

#[test]
fn test_tall_section_moves_whole_to_next_page() {
    let config = test_config();
    let mut flow = FlowLayout::new(&config.layout);
    flow.set_y(200.0);
    flow.add_section(
        Some("Notes:"),
        SectionContent::text(long_text(20)),
        &SectionOptions::boxed(),
    );
    let pages = flow.finish();
    assert_eq!(pages.len(), 2);
    assert!(!pages[0].contains_text("Notes:"));
    assert_eq!(pages[1].text_y("Notes:"), Some(config.layout.margin));
}

#[test]
fn test_section_past_threshold_breaks() {
    let config = test_config();
    let mut flow = FlowLayout::new(&config.layout);
    flow.set_y(255.0);
    let fields = vec![FormField::light("Date", "2024-05-01")];
    flow.add_section(
        None,
        SectionContent::Draw(render_form_fields(fields, &config.layout)),
        &SectionOptions::default(),
    );
    let pages = flow.finish();
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[1].text_y("Date:"), Some(config.layout.margin + 5.0));
}

#[test]
fn test_oversized_section_breaks_only_once() {
    let config = test_config();
    let mut flow = FlowLayout::new(&config.layout);
    flow.set_y(120.0);
    flow.add_section(
        Some("Notes:"),
        SectionContent::text(long_text(80)),
        &SectionOptions::boxed(),
    );
    let pages = flow.finish();
    // too tall for any page: it moves once, then overflows the bottom
    assert_eq!(pages.len(), 2);
    assert!(pages[1].contains_text("Line 80 of the technician notes"));
}

#[test]
fn test_section_at_top_never_breaks() {
    let config = test_config();
    let mut flow = FlowLayout::new(&config.layout);
    flow.add_section(
        Some("Notes:"),
        SectionContent::text(long_text(80)),
        &SectionOptions::boxed(),
    );
    assert_eq!(flow.page_count(), 1);
}

#[test]
fn test_split_boxed_text_continues() {
    let mut config = test_config();
    config.layout.split_boxed_text = true;
    let mut flow = FlowLayout::new(&config.layout);
    flow.add_section(
        Some("Notes:"),
        SectionContent::text(long_text(80)),
        &SectionOptions::boxed(),
    );
    let pages = flow.finish();
    assert!(pages.len() >= 2);
    assert!(pages[0].contains_text("Line 1 of the technician notes"));
    assert!(pages.last().unwrap().contains_text("Line 80 of the technician notes"));
}

// ─── Grid Tests ─────────────────────────────────────────────────

#[test]
fn test_grid_layout_is_repeatable() {
    let config = test_config();
    let fields = || {
        vec![
            FormField::light("Date", "2024-05-01"),
            FormField::dark("Job Name", "Lincoln HS"),
            FormField::dark("Job Number", "1234"),
        ]
    };
    let run = || {
        let mut flow = FlowLayout::new(&config.layout);
        let y = flow.add_section(
            None,
            SectionContent::Draw(render_form_fields(fields(), &config.layout)),
            &SectionOptions::default(),
        );
        let pages = flow.finish();
        let texts: Vec<(String, Option<f64>)> = pages[0]
            .text_lines()
            .map(|t| (t.to_string(), pages[0].text_y(t)))
            .collect();
        (y, texts)
    };
    assert_eq!(run(), run());
}

// ─── Gallery Tests ──────────────────────────────────────────────

#[tokio::test]
async fn test_five_photos_make_three_gallery_pages() {
    let mut record = ReportRecord::new();
    record.push_photos((0..5).map(|i| photo(&format!("site{}.png", i))));
    let doc = engine().render(&record, "Photo Upload").await.unwrap();

    let first_gallery = doc
        .pages
        .iter()
        .position(|p| p.contains_text("Photos"))
        .expect("gallery page");
    assert_eq!(doc.page_count() - first_gallery, 3);

    for i in 0..5 {
        let caption = format!("Photo {}: site{}.png", i + 1, i);
        let page = first_gallery + i / 2;
        assert!(
            doc.pages[page].contains_text(&caption),
            "{} not on page {}",
            caption,
            page
        );
    }
    let images: usize = doc.pages[first_gallery..].iter().map(|p| p.image_count()).sum();
    assert_eq!(images, 5);
    assert_valid_pdf(&doc.bytes);
}

#[tokio::test]
async fn test_broken_photo_gets_placeholder() {
    let mut record = ReportRecord::new();
    record.push_photos(vec![photo("ok.png"), broken_photo("bad.jpg"), photo("also-ok.png")]);
    let doc = engine().render(&record, "Photo Upload").await.unwrap();

    let gallery: Vec<_> = doc
        .pages
        .iter()
        .skip_while(|p| !p.contains_text("Photos"))
        .collect();
    assert_eq!(gallery.len(), 2);
    assert!(gallery[0].contains_text("Photo 2: bad.jpg"));
    assert!(gallery[0].contains_text("Error adding photo 2"));
    assert!(gallery[1].contains_text("Photo 3: also-ok.png"));
    assert_eq!(gallery[0].image_count(), 1);
    assert_eq!(gallery[1].image_count(), 1);
}

// ─── Delivery Tests ─────────────────────────────────────────────

#[tokio::test]
async fn test_turnover_saved_locally() {
    let tmp = tempfile::tempdir().unwrap();
    let sink = LocalSave::new(tmp.path());
    let record = ReportRecord::from_json(
        r#"{
            "date": "2024-05-01",
            "jobName": "Lincoln HS",
            "jobNumber": "1234",
            "installerName": "Pat",
            "turnoverItems": "2 keys",
            "recipientName": "Dana",
            "recipientType": "Athletic Director",
            "signature": "",
            "photos": []
        }"#,
    )
    .unwrap();

    let filename = engine()
        .render_report(&record, "Material Turnover", &sink)
        .await
        .unwrap();
    assert_eq!(filename, "1234-Lincoln HS.pdf");

    let bytes = std::fs::read(tmp.path().join(&filename)).unwrap();
    assert_valid_pdf(&bytes);

    let doc = engine().render(&record, "Material Turnover").await.unwrap();
    let all: Vec<&str> = doc.pages.iter().flat_map(|p| p.text_lines()).collect();
    for expected in ["Date:", "Job Name:", "Job Number:", "Installer:", "Turnover Items:", "2 keys"] {
        assert!(all.contains(&expected), "missing {:?}", expected);
    }
    assert!(!doc.pages.iter().any(|p| p.contains_text("Photos")));
}

#[tokio::test]
async fn test_render_json_convenience() {
    let bytes = fieldreport::render_json(r#"{"jobNumber": "7"}"#, "Service")
        .await
        .unwrap();
    assert_valid_pdf(&bytes);
}

#[tokio::test]
async fn test_invalid_json_is_parse_error() {
    let err = fieldreport::render_json("{not json", "Repair").await.unwrap_err();
    assert!(matches!(err, fieldreport::ReportError::Parse { .. }));
}
