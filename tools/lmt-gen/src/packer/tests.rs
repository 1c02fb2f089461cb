// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::expect_used)]

use super::*;
use std::fs;
use tempfile::TempDir;

const COAP: &str = r#"{
    "SERVER_HOSTNAME": "coap.example.net",
    "SERVER_PORT": 5683,
    "COAP_TX_RESOURCE": "data",
    "COAP_TX_FILE_RESOURCE": "file",
    "COAP_TX_FW_RESOURCE": "fw"
}"#;

fn config_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    for (name, content) in files {
        fs::write(dir.path().join(name), content).expect("write fixture");
    }
    dir
}

#[test]
fn mandatory_only_packs_in_document_order() {
    let dir = config_dir(&[("COAP.json", COAP)]);
    let report = JsonPacker::with_defaults(1024)
        .pack(dir.path())
        .expect("pack failed");

    let expected: &[u8] = b"SERVER_HOSTNAME\0coap.example.net\0\
SERVER_PORT\05683\0\
COAP_TX_RESOURCE\0data\0\
COAP_TX_FILE_RESOURCE\0file\0\
COAP_TX_FW_RESOURCE\0fw\0\0";
    assert_eq!(report.blob.as_bytes(), expected);
    assert_eq!(report.files, vec!["COAP.json"]);
    assert_eq!(report.unique_keys, 5);
}

#[test]
fn optional_files_follow_fixed_order() {
    let dir = config_dir(&[
        ("Application.json", r#"{"APP_MODE": "eco"}"#),
        ("COAP.json", COAP),
        ("Settings.json", r#"{"LOG_LEVEL": 3, "DEBUG": false}"#),
    ]);
    let report = JsonPacker::with_defaults(1024)
        .pack(dir.path())
        .expect("pack failed");

    let keys: Vec<String> = report.blob.entries().into_iter().map(|(k, _)| k).collect();
    assert_eq!(&keys[5..], &["LOG_LEVEL", "DEBUG", "APP_MODE"]);
    assert_eq!(
        &report.blob.entries()[6],
        &("DEBUG".to_string(), "False".to_string())
    );
    assert_eq!(
        report.files,
        vec!["COAP.json", "Settings.json", "Application.json"]
    );
    assert_eq!(report.unique_keys, 8);
}

#[test]
fn missing_mandatory_file_is_fatal() {
    let dir = config_dir(&[("Settings.json", r#"{"A": "b"}"#)]);
    let err = JsonPacker::with_defaults(1024)
        .pack(dir.path())
        .expect_err("must fail");
    assert!(matches!(err, PackError::MandatoryFileMissing { ref file, .. } if file == "COAP.json"));
}

#[test]
fn duplicate_in_mandatory_aborts_before_parsing() {
    // Not valid JSON either; the duplicate scan must win.
    let raw = "{\"SERVER_PORT\": 5683, \"SERVER_PORT\": 5684,,,";
    let dir = config_dir(&[("COAP.json", raw)]);
    let err = JsonPacker::with_defaults(1024)
        .pack(dir.path())
        .expect_err("must fail");

    match err {
        PackError::DuplicateKeys { keys, .. } => assert_eq!(keys, vec!["SERVER_PORT"]),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn invalid_mandatory_json_is_fatal() {
    let dir = config_dir(&[("COAP.json", "{\"SERVER_PORT\": ")]);
    let err = JsonPacker::with_defaults(1024)
        .pack(dir.path())
        .expect_err("must fail");
    assert!(matches!(err, PackError::InvalidJson { .. }));
}

#[test]
fn non_object_mandatory_is_invalid_json() {
    let dir = config_dir(&[("COAP.json", "[1, 2]")]);
    let err = JsonPacker::with_defaults(1024)
        .pack(dir.path())
        .expect_err("must fail");
    assert!(err.to_string().contains("not an object"));
}

#[test]
fn invalid_optional_json_is_skipped() {
    let dir = config_dir(&[
        ("COAP.json", COAP),
        ("Settings.json", "{ not json"),
        ("Application.json", r#"{"APP": "1"}"#),
    ]);
    let report = JsonPacker::with_defaults(1024)
        .pack(dir.path())
        .expect("pack failed");
    assert_eq!(report.files, vec!["COAP.json", "Application.json"]);
    assert_eq!(report.blob.pairs(), 6);
}

#[test]
fn missing_field_is_named() {
    let coap = COAP.replace("\"COAP_TX_RESOURCE\": \"data\",", "");
    let dir = config_dir(&[("COAP.json", coap.as_str())]);
    let err = JsonPacker::with_defaults(1024)
        .pack(dir.path())
        .expect_err("must fail");

    assert!(matches!(err, PackError::MissingFields { .. }));
    let msg = err.to_string();
    assert!(msg.contains("COAP_TX_RESOURCE"));
    assert!(!msg.contains("COAP_TX_FILE_RESOURCE"));
}

#[test]
fn port_validation() {
    for bad in ["0", "65536", "\"coap\""] {
        let coap = COAP.replace("5683", bad);
        let dir = config_dir(&[("COAP.json", coap.as_str())]);
        let err = JsonPacker::with_defaults(1024)
            .pack(dir.path())
            .expect_err("bad port accepted");
        assert!(
            matches!(err, PackError::InvalidFields { ref issues, .. } if issues[0].field == "SERVER_PORT"),
            "port {bad}: {err}"
        );
    }

    let coap = COAP.replace("5683", "\"5683\"");
    let dir = config_dir(&[("COAP.json", coap.as_str())]);
    let report = JsonPacker::with_defaults(1024)
        .pack(dir.path())
        .expect("string port rejected");
    assert_eq!(
        report.blob.entries()[1],
        ("SERVER_PORT".to_string(), "5683".to_string())
    );
}

#[test]
fn cross_file_duplicates_list_every_collision() {
    let dir = config_dir(&[
        ("COAP.json", COAP),
        ("Settings.json", r#"{"SERVER_PORT": 1, "X": "a"}"#),
        ("Application.json", r#"{"X": "b", "SERVER_HOSTNAME": "h"}"#),
    ]);
    let err = JsonPacker::with_defaults(4096)
        .pack(dir.path())
        .expect_err("must fail");

    match err {
        PackError::KeyCollisions { collisions } => {
            let rendered: Vec<String> = collisions.iter().map(ToString::to_string).collect();
            assert_eq!(
                rendered,
                vec![
                    "'SERVER_PORT' found in both COAP.json and Settings.json",
                    "'X' found in both Settings.json and Application.json",
                    "'SERVER_HOSTNAME' found in both COAP.json and Application.json",
                ]
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn size_ceiling_is_enforced() {
    let dir = config_dir(&[("COAP.json", COAP)]);
    let full = JsonPacker::with_defaults(1024)
        .pack(dir.path())
        .expect("pack failed")
        .blob
        .len();

    assert!(JsonPacker::with_defaults(full).pack(dir.path()).is_ok());

    let err = JsonPacker::with_defaults(full - 1)
        .pack(dir.path())
        .expect_err("must fail");
    assert!(
        matches!(err, PackError::PairExceedsLimit { ref key, .. } if key == "COAP_TX_FW_RESOURCE")
    );

    let err = JsonPacker::with_defaults(10)
        .pack(dir.path())
        .expect_err("must fail");
    assert!(
        matches!(err, PackError::PairExceedsLimit { ref key, .. } if key == "SERVER_HOSTNAME")
    );
}

#[test]
fn pack_to_file_writes_nothing_on_failure() {
    let dir = config_dir(&[("COAP.json", COAP)]);
    let out = dir.path().join("config.bin");

    assert!(JsonPacker::with_defaults(8)
        .pack_to_file(dir.path(), &out)
        .is_err());
    assert!(!out.exists());

    let report = JsonPacker::with_defaults(1024)
        .pack_to_file(dir.path(), &out)
        .expect("pack failed");
    assert_eq!(fs::read(&out).expect("read"), report.blob.as_bytes());
}

#[test]
fn custom_required_fields() {
    let config = PackerConfig {
        required_fields: vec!["APN".to_string()],
        ..Default::default()
    };
    let dir = config_dir(&[("COAP.json", COAP)]);
    let err = JsonPacker::new(config, 1024)
        .pack(dir.path())
        .expect_err("must fail");
    assert!(err.to_string().contains("APN"));
}

#[test]
fn repeated_key_in_optional_file_keeps_first_position_last_value() {
    let dir = config_dir(&[
        ("COAP.json", COAP),
        ("Settings.json", r#"{"D": 1, "D": 2, "E": 3}"#),
    ]);
    let report = JsonPacker::with_defaults(1024)
        .pack(dir.path())
        .expect("repeat inside one optional file must not collide");

    assert_eq!(
        &report.blob.entries()[5..],
        &[
            ("D".to_string(), "2".to_string()),
            ("E".to_string(), "3".to_string()),
        ]
    );
    assert_eq!(report.unique_keys, 7);
}

#[test]
fn values_keep_their_literal_form() {
    let dir = config_dir(&[
        ("COAP.json", COAP),
        (
            "Settings.json",
            r#"{"BIG": 123456789012345678901234, "LIST": [1, "a"]}"#,
        ),
    ]);
    let report = JsonPacker::with_defaults(1024)
        .pack(dir.path())
        .expect("pack failed");

    let entries = report.blob.entries();
    assert_eq!(
        entries[5],
        ("BIG".to_string(), "123456789012345678901234".to_string())
    );
    assert_eq!(entries[6], ("LIST".to_string(), "[1, 'a']".to_string()));
}
