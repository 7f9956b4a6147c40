//! Integration tests for the `plistedit` CLI binary.
//!
//! These run the actual binary through `assert_cmd`, covering stdin/stdout
//! piping, file I/O, path edits, profiles and error exits.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;

fn manifest_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/manifest.plist")
}

fn pkginfo_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/pkginfo.plist")
}

fn plistedit() -> Command {
    Command::cargo_bin("plistedit").unwrap()
}

/// Run a subcommand on a fixture and return stdout.
fn stdout_of(args: &[&str]) -> String {
    let output = plistedit().args(args).output().unwrap();
    assert!(
        output.status.success(),
        "plistedit {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// fmt
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn fmt_stdin_to_stdout() {
    let xml = "<plist><dict><key>name</key><string>Firefox</string></dict></plist>";
    plistedit()
        .arg("fmt")
        .write_stdin(xml)
        .assert()
        .success()
        .stdout(predicate::str::contains("  <dict>\n"))
        .stdout(predicate::str::contains("    <string>Firefox</string>\n"))
        .stdout(predicate::str::ends_with("</plist>\n"));
}

#[test]
fn fmt_is_idempotent() {
    let once = stdout_of(&["fmt", "-i", pkginfo_path()]);
    plistedit()
        .arg("fmt")
        .write_stdin(once.clone())
        .assert()
        .success()
        .stdout(once);
}

#[test]
fn fmt_compact_is_one_line_body() {
    plistedit()
        .args(["fmt", "--compact", "-i", manifest_path()])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "<plist version=\"1.0\"><dict><key>catalogs</key><array><string>testing</string>",
        ));
}

#[test]
fn fmt_file_to_file() {
    let output_path = "/tmp/plistedit-test-fmt-output.plist";
    let _ = std::fs::remove_file(output_path);

    plistedit()
        .args(["fmt", "-i", manifest_path(), "-o", output_path])
        .assert()
        .success()
        .stdout("");

    let content = std::fs::read_to_string(output_path).expect("output file must exist");
    assert!(content.contains("<string>site_default</string>"));

    let _ = std::fs::remove_file(output_path);
}

#[test]
fn fmt_rejects_malformed_xml() {
    plistedit()
        .arg("fmt")
        .write_stdin("<plist><dict><key>a</key></plist>")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse plist"));
}

#[test]
fn fmt_missing_input_file() {
    plistedit()
        .args(["fmt", "-i", "/tmp/plistedit-does-not-exist.plist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

// ─────────────────────────────────────────────────────────────────────────────
// JSON conversion
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn to_json_preserves_order_and_formats_dates() {
    let out = stdout_of(&["to-json", "-i", pkginfo_path()]);
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "catalogs": ["testing"],
            "force_install_after_date": "2016-05-01T17:00:00Z",
            "installed_size": 96752,
            "installs": [{"path": "/Applications/Firefox.app", "type": "application"}],
            "name": "Firefox",
            "unattended_install": true,
            "version": "45.0"
        })
    );
    let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
    assert_eq!(keys[0], "catalogs");
    assert_eq!(keys[6], "version");
}

#[test]
fn from_json_stdin() {
    plistedit()
        .args(["from-json", "--compact"])
        .write_stdin(r#"{"name":"Firefox","size":3,"ratio":0.5}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "<dict><key>name</key><string>Firefox</string><key>size</key><integer>3</integer><key>ratio</key><real>0.5</real></dict>",
        ));
}

#[test]
fn from_json_rejects_invalid_json() {
    plistedit()
        .arg("from-json")
        .write_stdin("{not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse JSON input"));
}

#[test]
fn json_roundtrip_matches_fmt() {
    let json = stdout_of(&["to-json", "-i", manifest_path()]);
    let formatted = stdout_of(&["fmt", "-i", manifest_path()]);
    plistedit()
        .arg("from-json")
        .write_stdin(json)
        .assert()
        .success()
        .stdout(formatted);
}

// ─────────────────────────────────────────────────────────────────────────────
// get / set / rm
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn get_nested_value() {
    plistedit()
        .args(["get", "installs.0.path", "-i", pkginfo_path()])
        .assert()
        .success()
        .stdout("\"/Applications/Firefox.app\"\n");
}

#[test]
fn get_container_prints_json() {
    let out = stdout_of(&["get", "catalogs", "-i", manifest_path()]);
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json, serde_json::json!(["testing", "bogus"]));
}

#[test]
fn get_missing_path_fails() {
    plistedit()
        .args(["get", "installs.3.path", "-i", pkginfo_path()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No value at path"));
}

#[test]
fn set_replaces_a_leaf() {
    plistedit()
        .args(["set", "unattended_install", "false", "-i", pkginfo_path()])
        .assert()
        .success()
        .stdout(predicate::str::contains("<false/>"))
        .stdout(predicate::str::contains("<true/>").not());
}

#[test]
fn set_one_past_the_end_appends() {
    let out = stdout_of(&[
        "set",
        "catalogs.1",
        "\"production\"",
        "--compact",
        "-i",
        pkginfo_path(),
    ]);
    assert!(out.contains(
        "<key>catalogs</key><array><string>testing</string><string>production</string></array>"
    ));
}

#[test]
fn set_non_json_text_is_a_string() {
    let out = stdout_of(&["set", "notes", "lab machines", "-i", manifest_path()]);
    assert!(out.contains("<string>lab machines</string>"));
}

#[test]
fn set_adds_new_dict_key_at_the_end() {
    let out = stdout_of(&[
        "set",
        "installs.0.CFBundleShortVersionString",
        "\"45.0\"",
        "--compact",
        "-i",
        pkginfo_path(),
    ]);
    assert!(out.contains(
        "<key>type</key><string>application</string><key>CFBundleShortVersionString</key><string>45.0</string></dict>"
    ));
}

#[test]
fn set_out_of_bounds_index_fails() {
    plistedit()
        .args(["set", "catalogs.5", "\"x\"", "-i", pkginfo_path()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to set"));
}

#[test]
fn rm_removes_a_key() {
    plistedit()
        .args(["rm", "installs", "-i", pkginfo_path()])
        .assert()
        .success()
        .stdout(predicate::str::contains("<key>installs</key>").not())
        .stdout(predicate::str::contains("<key>name</key>"));
}

#[test]
fn rm_root_fails() {
    plistedit()
        .args(["rm", "", "-i", pkginfo_path()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("root path"));
}

// ─────────────────────────────────────────────────────────────────────────────
// outline / suggest-keys
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn outline_without_profile_shows_every_key() {
    plistedit()
        .args(["outline", "-i", manifest_path()])
        .assert()
        .success()
        .stdout(predicate::str::contains("catalogs: <array>\n  [0]: \"testing\"\n"))
        .stdout(predicate::str::contains("notes: \"lab machines\"\n"))
        .stdout(predicate::str::ends_with("+ add entry\n"));
}

#[test]
fn outline_with_basics_profile_and_known_catalogs() {
    plistedit()
        .args([
            "outline",
            "--profile",
            "manifest-basics",
            "--allow",
            "catalogs=testing, production",
            "-i",
            manifest_path(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Catalogs (catalogs): <array>\n"))
        .stdout(predicate::str::contains("  [0]: \"testing\"\n"))
        .stdout(predicate::str::contains("  [1]: \"bogus\"  !danger\n"))
        .stdout(predicate::str::contains("notes").not())
        .stdout(predicate::str::contains("+ add entry").not());
}

#[test]
fn outline_with_toml_profile() {
    let profile_path = "/tmp/plistedit-test-profile.toml";
    std::fs::write(
        profile_path,
        "[restricted_keys]\nname = \"Name\"\nversion = \"Version\"\n",
    )
    .unwrap();

    plistedit()
        .args(["outline", "--profile", profile_path, "-i", pkginfo_path()])
        .assert()
        .success()
        .stdout("Name (name): \"Firefox\"\nVersion (version): \"45.0\"\n");

    let _ = std::fs::remove_file(profile_path);
}

#[test]
fn outline_unknown_profile_fails() {
    plistedit()
        .args(["outline", "--profile", "catalog", "-i", manifest_path()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown profile: 'catalog'"))
        .stderr(predicate::str::contains("manifest-basics"));
}

#[test]
fn outline_bad_allow_fails() {
    plistedit()
        .args(["outline", "--allow", "catalogs", "-i", manifest_path()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Expected KEY=NAMES"));
}

#[test]
fn suggest_keys_for_manifest() {
    plistedit()
        .args(["suggest-keys", "--profile", "manifest", "-i", manifest_path()])
        .assert()
        .success()
        .stdout("conditional_items\nmanaged_uninstalls\nmanaged_updates\noptional_installs\n");
}

#[test]
fn suggest_keys_defaults_to_pkginfo() {
    let out = stdout_of(&["suggest-keys", "-i", pkginfo_path()]);
    let keys: Vec<&str> = out.lines().collect();
    assert_eq!(keys[0], "apple_item");
    assert!(keys.contains(&"postinstall_script"));
    assert!(!keys.contains(&"name"));
    assert!(!keys.contains(&"installs"));
}
