use fieldreport::config::Config;

#[test]
fn parse_example_config() {
    let raw = include_str!("../fieldreport.example.toml");
    let cfg = Config::from_toml_str(raw).expect("parse TOML");
    assert!(cfg.layout.photos_per_page >= 1);
    assert!(!cfg.output.dir.is_empty());
    assert_eq!(cfg.layout.content_width(), 170.0);
    assert_eq!(cfg.branding.contact_lines.len(), 3);
}

#[test]
fn example_matches_defaults() {
    let raw = include_str!("../fieldreport.example.toml");
    let parsed: Config = toml::from_str(raw).expect("parse TOML");
    let defaults = Config::default();
    assert_eq!(
        toml::to_string(&parsed).unwrap(),
        toml::to_string(&defaults).unwrap()
    );
}
