use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;

use mask_witness::config::{DashboardConfig, CONFIG_ENV};
use mask_witness::{ChannelOrder, ClassCounts, Color, FrameAnnotator};

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        CONFIG_ENV,
        "MASK_WITNESS_CONFIDENCE",
        "MASK_WITNESS_CHANNEL_ORDER",
        "MASK_WITNESS_FONT_PATH",
        "MASK_WITNESS_VIOLATION_LABEL",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn defaults_without_file_or_env() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let cfg = DashboardConfig::load().expect("load defaults");
    assert_eq!(cfg, DashboardConfig::default());
    assert_eq!(cfg.confidence_threshold, 0.5);
    assert_eq!(
        cfg.classes,
        vec!["with_mask", "without_mask", "mask_weared_incorrect"]
    );
    assert_eq!(cfg.channel_order, ChannelOrder::Rgb);
    assert_eq!(cfg.violation.label, "without_mask");
    assert_eq!(cfg.violation.event, "No Mask");
    assert_eq!(cfg.palette().color_for("without_mask"), Color::new(255, 0, 0));
}

#[test]
fn loads_json_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let json = r#"{
        "confidence_threshold": 0.4,
        "classes": ["with_mask", "without_mask", "helmet"],
        "colors": { "helmet": [10, 20, 30], "with_mask": [0, 128, 0] },
        "channel_order": "bgr",
        "violation": { "label": "without_mask", "event": "Unmasked" },
        "info_panel": { "safe_label": "with_mask" }
    }"#;
    file.write_all(json.as_bytes()).expect("write config");

    std::env::set_var(CONFIG_ENV, file.path());
    std::env::set_var("MASK_WITNESS_CONFIDENCE", "0.65");
    std::env::set_var("MASK_WITNESS_CHANNEL_ORDER", "rgb");

    let cfg = DashboardConfig::load().expect("load config");
    assert_eq!(cfg.confidence_threshold, 0.65);
    assert_eq!(cfg.classes, vec!["with_mask", "without_mask", "helmet"]);
    assert_eq!(cfg.channel_order, ChannelOrder::Rgb);
    assert_eq!(cfg.violation.event, "Unmasked");
    assert_eq!(cfg.risk_label, "without_mask");
    assert_eq!(
        cfg.colors,
        BTreeMap::from([
            ("helmet".to_string(), Color::new(10, 20, 30)),
            ("with_mask".to_string(), Color::new(0, 128, 0)),
        ])
    );

    let palette = cfg.palette();
    assert_eq!(palette.color_for("helmet"), Color::new(10, 20, 30));
    assert_eq!(palette.color_for("with_mask"), Color::new(0, 128, 0));
    assert_eq!(palette.color_for("without_mask"), Color::new(255, 0, 0));
    assert_eq!(palette.color_for("mask_weared_incorrect"), Color::WHITE);
    assert_eq!(cfg.detection_filter().min_confidence, 0.65);

    clear_env();
}

#[test]
fn loads_toml_file_by_extension() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("temp config");
    let toml = r#"
confidence_threshold = 0.3
channel_order = "bgr"

[violation]
label = "mask_weared_incorrect"
event = "Worn Incorrectly"

[info_panel]
risk_label = "mask_weared_incorrect"
"#;
    file.write_all(toml.as_bytes()).expect("write config");

    let cfg = DashboardConfig::load_from(Some(file.path())).expect("load config");
    assert_eq!(cfg.confidence_threshold, 0.3);
    assert_eq!(cfg.channel_order, ChannelOrder::Bgr);
    assert_eq!(cfg.violation.label, "mask_weared_incorrect");
    assert_eq!(cfg.info_panel().risk_label, "mask_weared_incorrect");
    assert_eq!(cfg.info_panel().safe_label, "with_mask");
}

#[test]
fn rejects_invalid_values() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("MASK_WITNESS_CONFIDENCE", "1.5");
    let err = DashboardConfig::load().unwrap_err();
    assert!(err.to_string().contains("confidence_threshold"));

    std::env::set_var("MASK_WITNESS_CONFIDENCE", "high");
    assert!(DashboardConfig::load().is_err());
    clear_env();

    std::env::set_var("MASK_WITNESS_CHANNEL_ORDER", "yuv");
    assert!(DashboardConfig::load().is_err());
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    file.write_all(br#"{ "classes": ["  "] }"#).expect("write config");
    let err = DashboardConfig::load_from(Some(file.path())).unwrap_err();
    assert!(err.to_string().contains("classes"));

    let mut file = NamedTempFile::new().expect("temp config");
    file.write_all(br#"{ "threshold": 0.5 }"#).expect("write config");
    let err = DashboardConfig::load_from(Some(file.path())).unwrap_err();
    assert!(err.to_string().contains("invalid config file"));

    clear_env();
}

#[test]
fn missing_config_file_is_an_error() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var(CONFIG_ENV, "/nonexistent/mask_witness.json");
    let err = DashboardConfig::load().unwrap_err();
    assert!(err.to_string().contains("failed to read config file"));

    clear_env();
}

#[test]
fn violation_label_env_moves_the_risk_count() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("MASK_WITNESS_VIOLATION_LABEL", " mask_weared_incorrect ");
    let cfg = DashboardConfig::load_from(None).expect("load config");
    assert_eq!(cfg.violation.label, "mask_weared_incorrect");
    assert_eq!(cfg.violation.event, "No Mask");
    assert_eq!(cfg.risk_label, cfg.violation.label);

    let annotator = FrameAnnotator::from_config(&cfg).expect("annotator");
    let counts: ClassCounts = [("mask_weared_incorrect", 3), ("without_mask", 1)]
        .into_iter()
        .collect();
    assert_eq!(
        annotator.info_text(10.0, &counts),
        "FPS: 10.0 | Safe: 0 | Risk: 3"
    );

    clear_env();
}

#[test]
fn explicit_risk_label_survives_violation_label_env() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    file.write_all(br#"{ "info_panel": { "risk_label": "without_mask" } }"#)
        .expect("write config");
    std::env::set_var("MASK_WITNESS_VIOLATION_LABEL", "mask_weared_incorrect");

    let cfg = DashboardConfig::load_from(Some(file.path())).expect("load config");
    assert_eq!(cfg.violation.label, "mask_weared_incorrect");
    assert_eq!(cfg.risk_label, "without_mask");

    clear_env();
}

fn bundled_font() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/DejaVuSans.ttf")
}

#[test]
fn font_path_env_overrides_file_and_feeds_the_annotator() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    file.write_all(br#"{ "font_path": "/nonexistent/from_file.ttf" }"#)
        .expect("write config");
    std::env::set_var("MASK_WITNESS_FONT_PATH", bundled_font());

    let cfg = DashboardConfig::load_from(Some(file.path())).expect("load config");
    assert_eq!(cfg.font_path.as_deref(), Some(bundled_font().as_path()));
    assert!(FrameAnnotator::from_config(&cfg).is_ok());

    std::env::set_var("MASK_WITNESS_FONT_PATH", "   ");
    let cfg = DashboardConfig::load_from(Some(file.path())).expect("load config");
    assert_eq!(
        cfg.font_path.as_deref(),
        Some(Path::new("/nonexistent/from_file.ttf"))
    );

    clear_env();
}

#[test]
fn unreadable_font_path_fails_annotator_construction() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("MASK_WITNESS_FONT_PATH", "/nonexistent/label_font.ttf");
    let cfg = DashboardConfig::load().expect("font is not opened while loading");
    let err = FrameAnnotator::from_config(&cfg).unwrap_err();
    assert!(format!("{err:#}").contains("font"));

    let mut not_a_font = NamedTempFile::new().expect("temp font");
    not_a_font.write_all(b"not a font").expect("write font");
    let cfg = DashboardConfig {
        font_path: Some(not_a_font.path().to_path_buf()),
        ..DashboardConfig::default()
    };
    assert!(FrameAnnotator::from_config(&cfg).is_err());

    clear_env();
}
