use super::*;
use crate::logic::model::{AnomalyDetector, AnomalyModel, Prediction};
use chrono::{Duration, TimeZone, Utc};
use std::fs;
use tempfile::tempdir;

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap()
}

#[test]
fn test_parse_timestamp_formats() {
    let expected = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

    assert_eq!(parse_timestamp("2024-03-01T12:00:00Z").unwrap(), expected);
    assert_eq!(parse_timestamp("2024-03-01T14:00:00+02:00").unwrap(), expected);
    assert_eq!(parse_timestamp("2024-03-01T12:00:00").unwrap(), expected);
    assert_eq!(parse_timestamp("2024-03-01 12:00:00").unwrap(), expected);

    let fractional = parse_timestamp("2024-03-01T12:00:00.250000").unwrap();
    assert_eq!(fractional - expected, Duration::milliseconds(250));

    assert!(matches!(parse_timestamp("yesterday"), Err(DatasetError::Timestamp(_))));
}

#[test]
fn test_record_defaults_and_vector() {
    let json = r#"{
        "activation_time": "2024-03-01T00:00:00",
        "return_timestamp": "2024-03-02T12:00:00",
        "return_attempts": 2
    }"#;
    let record: TrainingRecord = serde_json::from_str(json).unwrap();

    assert_eq!(record.label_match_score, 1.0);
    assert!(record.product_id.is_none());

    let vector = record.to_vector();
    assert_eq!(vector.hours_since_activation(), 36.0);
    assert_eq!(vector.return_attempts(), 2.0);
    assert_eq!(vector.label_match_score(), 1.0);
}

#[test]
fn test_load_json_array_and_jsonl() {
    let dir = tempdir().unwrap();
    let mut records: Vec<TrainingRecord> = (0..4)
        .map(|i| TrainingRecord::new(now() - Duration::hours(30 * i + 2), now(), i as u32, 0.25 * i as f64))
        .collect();
    records[1].product_id = Some("PROD0001".to_string());
    records[2].is_legitimate = Some(false);

    let array_path = dir.path().join("returns.json");
    save_records(&records, &array_path).unwrap();
    assert_eq!(load_records(&array_path).unwrap(), records);

    let lines: Vec<String> = records.iter().map(|r| serde_json::to_string(r).unwrap()).collect();
    let jsonl_path = dir.path().join("returns.jsonl");
    fs::write(&jsonl_path, lines.join("\n\n") + "\n").unwrap();
    assert_eq!(load_records(&jsonl_path).unwrap(), records);
}

#[test]
fn test_load_reports_bad_line() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.jsonl");
    fs::write(
        &path,
        "{\"activation_time\":\"2024-03-01T00:00:00Z\",\"return_timestamp\":\"2024-03-02T00:00:00Z\",\"return_attempts\":0}\n{oops}\n",
    )
    .unwrap();

    match load_records(&path) {
        Err(DatasetError::Record { line, .. }) => assert_eq!(line, 2),
        other => panic!("Expected Record error, got {:?}", other),
    }

    assert!(matches!(load_records(&dir.path().join("missing.json")), Err(DatasetError::Io(_))));
}

#[test]
fn test_synthetic_generator_is_seeded() {
    let a = SyntheticGenerator::new(50).with_seed(42).generate_returns(now());
    let b = SyntheticGenerator::new(50).with_seed(42).generate_returns(now());
    assert_eq!(a, b);
    assert_eq!(a.len(), 50);
}

#[test]
fn test_synthetic_patterns() {
    let records = SyntheticGenerator::new(500).with_seed(7).generate_returns(now());

    let suspicious = records.iter().filter(|r| r.is_legitimate == Some(false)).count();
    assert!((50..=150).contains(&suspicious), "suspicious = {}", suspicious);

    for record in &records {
        let hours = record.to_vector().hours_since_activation();
        if record.is_legitimate == Some(true) {
            assert!((120.0..=696.0).contains(&hours));
            assert!(record.return_attempts <= 1);
            assert!((0.8..1.0).contains(&record.label_match_score));
        } else {
            assert!((1.0..=23.0).contains(&hours));
            assert!((2..=4).contains(&record.return_attempts));
            assert!((0.3..0.7).contains(&record.label_match_score));
        }
    }
}

#[test]
fn test_model_trained_on_synthetic_flags_suspicious_pattern() {
    let records = SyntheticGenerator::new(1000).with_seed(42).generate_returns(now());
    let mut model = AnomalyModel::new();
    model.train(&to_vectors(&records));

    let ordinary = TrainingRecord::new(now() - Duration::days(14), now(), 0, 0.95);
    assert_eq!(model.predict(&ordinary.to_vector()).unwrap(), Prediction::Normal);

    let extreme = TrainingRecord::new(now() - Duration::minutes(5), now(), 9, 0.05);
    assert_eq!(model.predict(&extreme.to_vector()).unwrap(), Prediction::Anomalous);
}

#[test]
fn test_synthetic_label_positions() {
    let generator = SyntheticGenerator::new(200).with_seed(3);
    let positions = generator.generate_label_positions(1000, 500);
    assert_eq!(positions, generator.generate_label_positions(1000, 500));
    assert_eq!(positions.len(), 200);
    assert_eq!(positions[7].0, "PROD0007");

    for (_, region) in &positions {
        assert!(!region.is_empty());
        assert!((0.0..800.0).contains(&region.x), "x = {}", region.x);
        assert!((0.0..450.0).contains(&region.y), "y = {}", region.y);
        assert!((180.0..220.0).contains(&region.width));
        assert!((45.0..55.0).contains(&region.height));
    }
}
