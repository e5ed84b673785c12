//! Report configuration.
//!
//! Everything that shapes a report's look lives in [`LayoutConfig`]; the rest
//! of [`Config`] wires up photos, output, the email relay and logging. Every
//! section and every key has a default, so an empty `fieldreport.toml` is a
//! valid config.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ReportError;
use crate::style::Color;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub branding: Branding,
    #[serde(default)]
    pub photos: Photos,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub relay: Relay,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ReportError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ReportError::io(path, e))?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ReportError> {
        let cfg: Config = toml::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ReportError> {
        let l = &self.layout;
        if l.page_width <= 2.0 * l.margin {
            return Err(ReportError::Config(format!(
                "layout.margin {} leaves no usable width on a {} mm page",
                l.margin, l.page_width
            )));
        }
        if l.break_threshold <= l.margin || l.break_threshold >= l.page_height {
            return Err(ReportError::Config(format!(
                "layout.break_threshold must lie between the top margin and the page height, got {}",
                l.break_threshold
            )));
        }
        if l.photos_per_page == 0 {
            return Err(ReportError::Config(
                "layout.photos_per_page must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Page geometry, type sizes and colors. Lengths are millimetres, font sizes
/// are points.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub page_width: f64,
    pub page_height: f64,
    pub margin: f64,
    /// Space kept free at the page bottom when checking whether a section fits.
    pub bottom_margin: f64,
    /// A section starting below this y always goes to a new page.
    pub break_threshold: f64,
    pub line_height_factor: f64,
    pub body_font_size: f64,
    pub section_spacing: f64,
    /// Split boxed text taller than a page across pages instead of letting it
    /// run off the bottom.
    pub split_boxed_text: bool,

    pub title_font_size: f64,
    pub contact_font_size: f64,
    pub contact_line_gap: f64,
    pub divider_width: f64,

    pub label_width: f64,
    pub row_height: f64,
    pub column_gap: f64,
    pub corner_radius: f64,

    pub signature_height: f64,
    pub disclaimer_font_size: f64,

    pub photo_title_font_size: f64,
    pub photo_box_height: f64,
    pub photo_inset: f64,
    pub photos_per_page: usize,
    pub photo_start_y: f64,

    pub light_fill: Color,
    pub dark_fill: Color,
    pub box_border: Color,
    pub text_box_border: Color,
    pub photo_fill: Color,
    pub muted_text: Color,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_width: 210.0,
            page_height: 297.0,
            margin: 20.0,
            bottom_margin: 20.0,
            break_threshold: 250.0,
            line_height_factor: 1.15,
            body_font_size: 12.0,
            section_spacing: 5.0,
            split_boxed_text: false,

            title_font_size: 20.0,
            contact_font_size: 10.0,
            contact_line_gap: 7.0,
            divider_width: 0.5,

            label_width: 45.0,
            row_height: 20.0,
            column_gap: 10.0,
            corner_radius: 2.0,

            signature_height: 60.0,
            disclaimer_font_size: 10.0,

            photo_title_font_size: 16.0,
            photo_box_height: 95.0,
            photo_inset: 5.0,
            photos_per_page: 2,
            photo_start_y: 40.0,

            light_fill: Color(248, 248, 248),
            dark_fill: Color(70, 70, 70),
            box_border: Color(200, 200, 200),
            text_box_border: Color(220, 220, 220),
            photo_fill: Color(250, 250, 250),
            muted_text: Color(100, 100, 100),
        }
    }
}

impl LayoutConfig {
    /// Usable width between the side margins.
    pub fn content_width(&self) -> f64 {
        self.page_width - 2.0 * self.margin
    }

    /// Lowest y a section may reach before the bottom margin.
    pub fn content_bottom(&self) -> f64 {
        self.page_height - self.bottom_margin
    }
}

/// Company identity printed in every report header.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Branding {
    pub logo_path: String,
    pub logo_width: f64,
    pub logo_height: f64,
    pub contact_lines: Vec<String>,
    pub company_name: String,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            logo_path: "images/logo.png".into(),
            logo_width: 40.0,
            logo_height: 40.0,
            contact_lines: vec![
                "Website: www.example.com".into(),
                "Address: 100 Main Street, Springfield".into(),
                "Phone: 555-0100".into(),
            ],
            company_name: "the Company".into(),
        }
    }
}

impl Branding {
    /// Disclaimer printed above the recipient's signature.
    pub fn legal_disclaimer(&self) -> String {
        format!(
            "Signer assumes responsibility and ownership of listed equipment from this day forth and {} will no longer be liable or obligated to provide listed equipment.",
            self.company_name
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Photos {
    /// Per-photo decode limit in milliseconds. 0 disables the limit.
    pub decode_timeout_ms: u64,
}

impl Default for Photos {
    fn default() -> Self {
        Self {
            decode_timeout_ms: 30_000,
        }
    }
}

impl Photos {
    pub fn decode_timeout(&self) -> Option<std::time::Duration> {
        (self.decode_timeout_ms > 0).then(|| std::time::Duration::from_millis(self.decode_timeout_ms))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Output {
    pub dir: String,
}

impl Default for Output {
    fn default() -> Self {
        Self { dir: "out".into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Relay {
    pub url: String,
    pub timeout_seconds: u64,
}

impl Default for Relay {
    fn default() -> Self {
        Self {
            url: "http://localhost:3000/api/send-email".into(),
            timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub json: bool,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let cfg = Config::from_toml_str("").unwrap();
        assert_eq!(cfg.layout.page_width, 210.0);
        assert_eq!(cfg.layout.break_threshold, 250.0);
        assert_eq!(cfg.photos.decode_timeout_ms, 30_000);
        assert_eq!(cfg.output.dir, "out");
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let cfg = Config::from_toml_str(
            "[layout]\nsplit_boxed_text = true\ndark_fill = [10, 20, 30]\n",
        )
        .unwrap();
        assert!(cfg.layout.split_boxed_text);
        assert_eq!(cfg.layout.dark_fill, Color(10, 20, 30));
        assert_eq!(cfg.layout.row_height, 20.0);
    }

    #[test]
    fn zero_timeout_disables_limit() {
        let cfg = Config::from_toml_str("[photos]\ndecode_timeout_ms = 0\n").unwrap();
        assert!(cfg.photos.decode_timeout().is_none());
        assert_eq!(
            Photos::default().decode_timeout(),
            Some(std::time::Duration::from_millis(30_000))
        );
    }

    #[test]
    fn rejects_unusable_geometry() {
        let err = Config::from_toml_str("[layout]\nmargin = 120.0\n").unwrap_err();
        assert!(matches!(err, ReportError::Config(_)));
        let err = Config::from_toml_str("[layout]\nphotos_per_page = 0\n").unwrap_err();
        assert!(err.to_string().contains("photos_per_page"));
    }

    #[test]
    fn bad_toml_is_config_error() {
        let err = Config::from_toml_str("[layout\n").unwrap_err();
        assert!(matches!(err, ReportError::Config(_)));
    }

    #[test]
    fn disclaimer_names_company() {
        let branding = Branding {
            company_name: "Acme Gym Supply".into(),
            ..Branding::default()
        };
        assert!(branding.legal_disclaimer().contains("Acme Gym Supply will no longer"));
    }
}
