mod common;

use assert_cmd::Command;
use common::{calibration_frames, write_assets, PAD_H, PAD_W};
use image::RgbImage;
use kbm_track::{CalibrationReport, KbmTrackConfig};
use predicates::prelude::*;

fn kbm_track() -> Command {
    Command::cargo_bin("kbm-track").expect("binary")
}

fn write_frames(dir: &std::path::Path, frames: &[RgbImage]) -> Vec<std::path::PathBuf> {
    frames
        .iter()
        .enumerate()
        .map(|(i, frame)| {
            let path = dir.join(format!("frame_{i}.png"));
            frame.save(&path).expect("write frame");
            path
        })
        .collect()
}

#[test]
fn init_config_writes_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("kbm.json");

    kbm_track()
        .arg("init-config")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("wrote default config"));

    let cfg = KbmTrackConfig::load_json(&path).expect("config");
    assert_eq!(cfg, KbmTrackConfig::default());
}

#[test]
fn log_level_is_parsed_case_insensitively() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("kbm.json");

    kbm_track()
        .args(["--log-level", "DEBUG", "init-config"])
        .arg(&path)
        .assert()
        .success();

    kbm_track()
        .args(["--log-level", "chatty", "init-config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--log-level"));
}

#[test]
fn calibrate_writes_report_and_rectified_frame() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (cfg_path, _) = write_assets(dir.path());
    let frames = write_frames(dir.path(), &calibration_frames());
    let report_path = dir.path().join("report.json");
    let rectified_path = dir.path().join("rectified.png");

    kbm_track()
        .args(["--log-level", "warn", "calibrate", "--config"])
        .arg(&cfg_path)
        .args(&frames)
        .arg("--rectified")
        .arg(&rectified_path)
        .arg("--overlay")
        .arg("--report")
        .arg(&report_path)
        .assert()
        .success();

    let report = CalibrationReport::load_json(&report_path).expect("report");
    assert!(report.is_calibrated(), "{:?}", report.error);
    assert_eq!(report.error, None);
    assert_eq!(report.frame_paths.len(), 5);
    assert_eq!((report.template_width, report.template_height), (PAD_W, PAD_H));
    assert_eq!(report.region_count, 10);
    assert_eq!(report.regions_per_row, [2; 5]);

    let rectified = image::open(&rectified_path).expect("rectified").to_rgb8();
    assert_eq!(rectified.dimensions(), (PAD_W, PAD_H));
}

#[test]
fn detection_failure_is_reported_not_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (cfg_path, _) = write_assets(dir.path());
    let frames = write_frames(dir.path(), &vec![RgbImage::new(320, 240); 3]);

    kbm_track()
        .arg("calibrate")
        .arg("--config")
        .arg(&cfg_path)
        .args(&frames)
        .assert()
        .success()
        .stdout(predicate::str::contains("no frame in the batch produced a template mask"))
        .stdout(predicate::str::contains("\"corners\": null"));
}

#[test]
fn missing_template_is_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg_path = dir.path().join("kbm.json");
    let cfg = KbmTrackConfig {
        template_path: dir.path().join("absent.png").to_string_lossy().into_owned(),
        keymap_path: None,
        ..KbmTrackConfig::default()
    };
    cfg.write_json(&cfg_path).expect("config");

    kbm_track()
        .arg("regions")
        .arg("--config")
        .arg(&cfg_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.png"));
}

#[test]
fn regions_lists_rows_and_writes_overlay() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (cfg_path, _) = write_assets(dir.path());
    let overlay = dir.path().join("regions.png");

    kbm_track()
        .arg("regions")
        .arg("--config")
        .arg(&cfg_path)
        .arg("--output")
        .arg(&overlay)
        .assert()
        .success()
        .stdout(predicate::str::contains("row A: 2 regions"))
        .stdout(predicate::str::contains("row E: 2 regions"))
        .stdout(predicate::str::contains("total: 10 regions"));

    let img = image::open(&overlay).expect("overlay").to_rgb8();
    assert_eq!(img.dimensions(), (PAD_W, PAD_H));
}
