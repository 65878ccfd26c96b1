use tempfile::tempdir;

use super::*;
use crate::logic::config::EngineConfig;
use crate::logic::engine::{AssessmentRequest, DisasterEngine, RegionRequest};
use crate::logic::geo::{GeoBox, GeoPoint};

fn engine() -> DisasterEngine {
    DisasterEngine::new(EngineConfig::seeded(42).with_training_budget(120, 10)).unwrap()
}

fn assessment() -> Assessment {
    let request = AssessmentRequest::new(GeoPoint::new(35.0, 140.0).unwrap())
        .rainfall(75.0)
        .magnitude(7.0);
    engine().assess(&request).unwrap()
}

#[test]
fn test_write_assessment_report() {
    let dir = tempdir().unwrap();
    let writer = ReportWriter::from_path(dir.path().join("reports"));

    let files = writer.write_assessment(Some("japan"), &assessment()).unwrap();
    assert!(files.data.ends_with("japan_data.json"));
    let summary = files.summary.unwrap();
    assert!(summary.ends_with("japan_summary.txt"));

    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&files.data).unwrap()).unwrap();
    assert_eq!(json["location"]["latitude"], 35.0);
    assert!(json["seismic"]["risk_level"].is_string());
    assert!(json["summary"]["primary_threat"].is_string());

    let text = std::fs::read_to_string(summary).unwrap();
    assert!(text.contains("Japan (ring_of_fire)"));
    assert!(text.contains("Cascade:"));

    assert_eq!(writer.list().unwrap(), vec![files.data]);
}

#[test]
fn test_default_name_and_rejected_names() {
    let dir = tempdir().unwrap();
    let writer = ReportWriter::from_path(dir.path().to_path_buf());

    let path = writer.write_data(None, &serde_json::json!({"ok": true})).unwrap();
    let name = path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("dispre_report_") && name.ends_with("_data.json"));

    assert!(writer.write_data(Some("../escape"), &1).is_err());
    assert!(writer.write_data(Some(".hidden"), &1).is_err());
}

#[test]
fn test_list_missing_dir_is_empty() {
    let dir = tempdir().unwrap();
    let writer = ReportWriter::from_path(dir.path().join("nope"));
    assert!(writer.list().unwrap().is_empty());
}

#[test]
fn test_render_region() {
    let mut request = RegionRequest::new(GeoBox::new((30.0, 40.0), (135.0, 145.0)));
    request.resolution = Some(3);
    let map = engine().predict_region(&request).unwrap();

    let text = render_region(&map);
    assert!(text.contains("3x3 cells"));
    assert!(text.contains("tsunami_wave_height"));
}
