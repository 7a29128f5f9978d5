use std::collections::HashMap;
use std::fs;

use assert_cmd::Command;
use fm_classify::classify::{DATA_F, RESULT_F, TARGET_F};
use fm_classify::featmat::FeatureMatrix;
use ndarray::array;
use tempfile::tempdir;

fn write_feature_matrix(root: &std::path::Path) {
    let objects = vec!["p1".to_string(), "p2".to_string()];
    let mut fm = FeatureMatrix::new();
    fm.set_object_ids(objects.clone()).unwrap();
    fm.add_features(vec!["len".to_string()], array![[120.0], [340.0]], None)
        .unwrap();
    let labels = objects.into_iter().zip([0, 1]).collect::<HashMap<String, usize>>();
    fm.add_labels("loc", &labels, vec!["cyto".to_string(), "nucl".to_string()])
        .unwrap();
    fm.save(root).unwrap();
}

#[test]
fn classifies_feature_matrix_dir() {
    let tmp = tempdir().unwrap();
    let fm_dir = tmp.path().join("fm");
    let cl_dir = tmp.path().join("cl");
    write_feature_matrix(&fm_dir);

    let output = Command::cargo_bin("fm-classify")
        .unwrap()
        .arg("-f")
        .arg(&fm_dir)
        .arg("-c")
        .arg(&cl_dir)
        .output()
        .expect("run fm-classify");

    assert!(output.status.success());
    assert!(cl_dir.join(DATA_F).exists());
    assert!(cl_dir.join(RESULT_F).exists());
    assert_eq!(fs::read_to_string(cl_dir.join(TARGET_F)).unwrap(), "0\n0\n");
}

#[test]
fn missing_required_flag_exits_with_usage() {
    let tmp = tempdir().unwrap();
    let fm_dir = tmp.path().join("fm");
    write_feature_matrix(&fm_dir);

    let output = Command::cargo_bin("fm-classify")
        .unwrap()
        .arg("-f")
        .arg(&fm_dir)
        .output()
        .expect("run fm-classify");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--cl_dir"));
    assert!(stderr.contains("Usage"));
}

#[test]
fn classifier_failure_exits_non_zero() {
    let tmp = tempdir().unwrap();
    let missing = tmp.path().join("absent");
    let cl_dir = tmp.path().join("cl");

    let output = Command::cargo_bin("fm-classify")
        .unwrap()
        .args(["--fm_dir", missing.to_str().unwrap()])
        .args(["--cl_dir", cl_dir.to_str().unwrap()])
        .output()
        .expect("run fm-classify");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not a directory"));
    assert!(stderr.contains("absent"));
    assert!(!cl_dir.exists());
}
