//! CLI integration tests for binman
//!
//! Each test gets its own database and config file so nothing touches the
//! user's real data directory.

use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// An isolated database plus config for one test
struct Bins {
    dir: TempDir,
}

impl Bins {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.toml"), "").unwrap();
        Self { dir }
    }

    fn with_config(config: &str) -> Self {
        let bins = Self::new();
        fs::write(bins.dir.path().join("config.toml"), config).unwrap();
        bins
    }

    fn db(&self) -> PathBuf {
        self.dir.path().join("binman.db")
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Get a command instance for the binman binary bound to this database
    fn cmd(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("binman"));
        cmd.env("BINMAN_DB", self.db())
            .env("BINMAN_CONFIG", self.dir.path().join("config.toml"))
            .env_remove("RUST_LOG");
        cmd
    }

    fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self.cmd().args(args).args(["--format", "json"]).assert().success();
        let stdout = String::from_utf8_lossy(&output.get_output().stdout);
        serde_json::from_str(stdout.trim()).unwrap()
    }

    fn add_container(&self, id: &str, name: &str) {
        self.cmd()
            .args(["container", "add", id, "--name", name])
            .assert()
            .success();
    }

    /// Adds an item and returns its ID
    fn add_item(&self, container: &str, description: &str, tags: &str) -> String {
        let json = self.json(&["item", "add", container, description, "--tags", tags]);
        json["id"].as_str().unwrap().to_string()
    }
}

// =============================================================================
// Status Tests
// =============================================================================

#[test]
fn test_status_on_fresh_database() {
    let bins = Bins::new();

    bins.cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Containers: 0 total"))
        .stdout(predicate::str::contains("Items: 0"));

    assert!(bins.db().is_file());
}

#[test]
fn test_status_json_counts() {
    let bins = Bins::new();
    bins.add_container("BIN-001", "Tools");
    bins.add_item("BIN-001", "Hammer", "tools");

    let json = bins.json(&["status"]);
    assert_eq!(json["containers"]["total"], 1);
    assert_eq!(json["items"], 1);
}

// =============================================================================
// Container Tests
// =============================================================================

#[test]
fn test_container_add_and_list() {
    let bins = Bins::new();

    bins.cmd()
        .args(["container", "add", "BIN-001", "--name", "Tools", "--location", "Garage"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created container: BIN-001 - Tools"));

    bins.cmd()
        .args(["container", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BIN-001"))
        .stdout(predicate::str::contains("Garage"));
}

#[test]
fn test_container_add_duplicate_fails() {
    let bins = Bins::new();
    bins.add_container("BIN-001", "Tools");

    bins.cmd()
        .args(["container", "add", "BIN-001"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_container_edit_keeps_other_fields() {
    let bins = Bins::new();
    bins.cmd()
        .args(["container", "add", "BIN-001", "--name", "Tools", "--location", "Garage"])
        .assert()
        .success();

    bins.cmd()
        .args(["container", "edit", "BIN-001", "--location", "Basement"])
        .assert()
        .success();

    let json = bins.json(&["container", "show", "BIN-001"]);
    assert_eq!(json["container"]["name"], "Tools");
    assert_eq!(json["container"]["location"], "Basement");
}

#[test]
fn test_container_generate_continues_sequence() {
    let bins = Bins::new();
    bins.add_container("BIN-001", "");
    bins.add_container("BIN-003", "");

    let json = bins.json(&["container", "generate", "2"]);
    assert_eq!(json, serde_json::json!(["BIN-004", "BIN-005"]));

    bins.cmd()
        .args(["container", "generate", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BIN-006"));
}

#[test]
fn test_container_generate_never_overwrites_existing() {
    let bins = Bins::new();
    bins.add_container("BIN-4294967295", "Keep me");

    let json = bins.json(&["container", "generate", "2"]);
    assert_eq!(json, serde_json::json!(["BIN-4294967296", "BIN-4294967297"]));

    let json = bins.json(&["container", "show", "BIN-4294967295"]);
    assert_eq!(json["container"]["name"], "Keep me");
}

#[test]
fn test_container_generate_fails_when_sequence_runs_out() {
    let bins = Bins::new();
    bins.add_container("BIN-18446744073709551615", "Last");

    bins.cmd()
        .args(["container", "generate", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No sequence numbers left"));
}

#[test]
fn test_container_generate_uses_configured_prefix() {
    let bins = Bins::with_config("[ids]\nprefix = \"BOX\"\nwidth = 2\n");

    let json = bins.json(&["container", "generate", "1"]);
    assert_eq!(json, serde_json::json!(["BOX-01"]));
}

#[test]
fn test_container_archive_hides_from_list() {
    let bins = Bins::new();
    bins.add_container("BIN-001", "Tools");
    bins.add_container("BIN-002", "Winter clothes");

    bins.cmd()
        .args(["container", "archive", "BIN-002"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Archived container: BIN-002"));

    bins.cmd()
        .args(["container", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BIN-001"))
        .stdout(predicate::str::contains("BIN-002").not());

    bins.cmd()
        .args(["container", "list", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(archived)"));

    // Archiving again restores it
    bins.cmd()
        .args(["container", "archive", "BIN-002"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Restored container"));
}

#[test]
fn test_container_show_sorts_items() {
    let bins = Bins::new();
    bins.add_container("BIN-001", "Tools");
    bins.add_item("BIN-001", "Wrench", "");
    bins.add_item("BIN-001", "Allen keys", "");
    bins.add_item("BIN-001", "Hammer", "");

    let json = bins.json(&["container", "show", "BIN-001", "--sort", "az"]);
    let names: Vec<&str> = json["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["description"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Allen keys", "Hammer", "Wrench"]);
    assert_eq!(json["sort"], "az");
}

#[test]
fn test_container_delete_cascades() {
    let bins = Bins::new();
    bins.add_container("BIN-001", "Tools");
    let hammer = bins.add_item("BIN-001", "Hammer", "");
    bins.add_item("BIN-001", "Saw", "");

    bins.cmd()
        .args(["container", "delete", "BIN-001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted container BIN-001 and 2 items"));

    bins.cmd()
        .args(["item", "show", &hammer])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Item not found"));

    bins.cmd()
        .args(["container", "delete", "BIN-001"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Container not found"));
}

// =============================================================================
// Item Tests
// =============================================================================

#[test]
fn test_item_add_requires_container() {
    let bins = Bins::new();

    bins.cmd()
        .args(["item", "add", "BIN-404", "Hammer"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Container not found: BIN-404"));
}

#[test]
fn test_item_add_normalizes_tags() {
    let bins = Bins::new();
    bins.add_container("BIN-001", "Cables");

    let json = bins.json(&["item", "add", "BIN-001", "USB cable", "--tags", "USB, cables,usb"]);
    assert_eq!(json["containerId"], "BIN-001");
    assert_eq!(json["tags"], serde_json::json!(["usb", "cables"]));
}

#[test]
fn test_item_edit_and_photo() {
    let bins = Bins::new();
    bins.add_container("BIN-001", "Tools");
    let id = bins.add_item("BIN-001", "Hamer", "tools");

    let photo = bins.path("hammer.jpg");
    fs::write(&photo, [0xFF, 0xD8, 0xFF]).unwrap();

    bins.cmd()
        .args(["item", "edit", &id, "--description", "Hammer"])
        .arg("--photo")
        .arg(&photo)
        .assert()
        .success();

    let json = bins.json(&["item", "show", &id]);
    assert_eq!(json["item"]["description"], "Hammer");
    assert_eq!(json["item"]["tags"], serde_json::json!(["tools"]));
    assert_eq!(json["item"]["photo"], "data:image/jpeg;base64,/9j/");
    assert_eq!(json["container"]["id"], "BIN-001");

    bins.cmd()
        .args(["item", "edit", &id, "--clear-photo"])
        .assert()
        .success();

    let json = bins.json(&["item", "show", &id]);
    assert!(json["item"]["photo"].is_null());
}

#[test]
fn test_item_edit_needs_a_change() {
    let bins = Bins::new();
    bins.add_container("BIN-001", "Tools");
    let id = bins.add_item("BIN-001", "Hammer", "");

    bins.cmd()
        .args(["item", "edit", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to change"));
}

#[test]
fn test_item_delete() {
    let bins = Bins::new();
    bins.add_container("BIN-001", "Tools");
    let id = bins.add_item("BIN-001", "Hammer", "");

    bins.cmd()
        .args(["item", "delete", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted item"));

    bins.cmd()
        .args(["item", "delete", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Item not found"));
}

// =============================================================================
// Search and Scan Tests
// =============================================================================

#[test]
fn test_search_finds_items_by_tag() {
    let bins = Bins::new();
    bins.add_container("BIN-001", "Cables");
    bins.add_item("BIN-001", "HDMI cable", "electronics");

    let hits = bins.json(&["search", "electronics"]);
    let hits = hits.as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["kind"], "item");
    assert_eq!(hits[0]["name"], "HDMI cable");
    assert_eq!(hits[0]["containerId"], "BIN-001");
}

#[test]
fn test_search_tolerates_typos() {
    let bins = Bins::new();
    bins.add_container("BIN-001", "Tools");
    bins.add_item("BIN-001", "Hammer", "");

    let hits = bins.json(&["search", "hammre"]);
    let hits = hits.as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["name"], "Hammer");
}

#[test]
fn test_search_without_query_lists_containers() {
    let bins = Bins::new();
    bins.add_container("BIN-002", "Paint");
    bins.add_container("BIN-001", "Tools");

    let hits = bins.json(&["search"]);
    let ids: Vec<&str> = hits
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["BIN-001", "BIN-002"]);
}

#[test]
fn test_search_hides_archived_unless_asked() {
    let bins = Bins::new();
    bins.add_container("BIN-001", "Winter clothes");
    bins.add_item("BIN-001", "Wool scarf", "");
    bins.cmd().args(["container", "archive", "BIN-001"]).assert().success();

    bins.cmd()
        .args(["search", "scarf"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No matches"));

    bins.cmd()
        .args(["search", "scarf", "--archived"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wool scarf"));
}

#[test]
fn test_scan_known_and_unknown_labels() {
    let bins = Bins::new();
    bins.add_container("BIN-001", "Tools");
    bins.add_item("BIN-001", "Hammer", "");

    bins.cmd()
        .args(["scan", "  BIN-001 "])
        .assert()
        .success()
        .stdout(predicate::str::contains("Container: BIN-001"))
        .stdout(predicate::str::contains("Hammer"));

    bins.cmd()
        .args(["scan", "BIN-777"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No container with ID BIN-777"));

    let json = bins.json(&["scan", "BIN-777"]);
    assert_eq!(json["exists"], false);
}

#[test]
fn test_scan_rejects_oversized_text() {
    let bins = Bins::new();
    let long = "X".repeat(201);

    bins.cmd()
        .args(["scan", &long])
        .assert()
        .failure()
        .stderr(predicate::str::contains("too long"));
}

// =============================================================================
// Export and Import Tests
// =============================================================================

#[test]
fn test_export_import_round_trip() {
    let source = Bins::new();
    source.add_container("BIN-001", "Tools");
    source.add_item("BIN-001", "Hammer", "tools");
    let export = source.path("backup.json");

    source
        .cmd()
        .arg("export")
        .arg("--output")
        .arg(&export)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 containers and 1 items"));

    let target = Bins::new();
    target
        .cmd()
        .arg("import")
        .arg(&export)
        .args(["--mode", "replace-all", "--yes"])
        .assert()
        .success();

    let before = source.json(&["container", "show", "BIN-001"]);
    let after = target.json(&["container", "show", "BIN-001"]);
    assert_eq!(before, after);
}

#[test]
fn test_export_to_stdout_is_a_document() {
    let bins = Bins::new();
    bins.add_container("BIN-001", "Tools");

    let output = bins.cmd().arg("export").assert().success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let doc: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    assert_eq!(doc["containers"][0]["id"], "BIN-001");
    assert!(doc["items"].as_array().unwrap().is_empty());
    assert!(doc["exportedAt"].is_string());
}

#[test]
fn test_import_replace_all_requires_confirmation() {
    let bins = Bins::new();
    let file = bins.path("import.json");
    fs::write(&file, r#"{"containers": [{"id": "BIN-009"}]}"#).unwrap();

    bins.cmd()
        .arg("import")
        .arg(&file)
        .args(["--mode", "replace-all"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));
}

#[test]
fn test_import_rejects_invalid_document() {
    let bins = Bins::new();
    bins.add_container("BIN-001", "Tools");
    let file = bins.path("bad.json");
    fs::write(&file, r#"{"foo": 1}"#).unwrap();

    bins.cmd()
        .arg("import")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid import document"));

    let json = bins.json(&["status"]);
    assert_eq!(json["containers"]["total"], 1);
    assert_eq!(json["items"], 0);
}

#[test]
fn test_import_merge_modes() {
    let bins = Bins::new();
    bins.add_container("BIN-001", "A");
    let file = bins.path("incoming.json");
    fs::write(&file, r#"{"containers": [{"id": "BIN-001", "name": "B"}]}"#).unwrap();

    let report = bins.json(&["import", file.to_str().unwrap()]);
    assert_eq!(report["mode"], "merge-keep-existing");
    assert_eq!(report["containersSkipped"], 1);
    let json = bins.json(&["container", "show", "BIN-001"]);
    assert_eq!(json["container"]["name"], "A");

    bins.cmd()
        .arg("import")
        .arg(&file)
        .args(["--mode", "merge-overwrite"])
        .assert()
        .success();
    let json = bins.json(&["container", "show", "BIN-001"]);
    assert_eq!(json["container"]["name"], "B");
}

#[test]
fn test_import_warns_about_orphans() {
    let bins = Bins::new();
    let file = bins.path("orphans.json");
    fs::write(
        &file,
        r#"{"items": [{"id": "i-1", "containerId": "BIN-404", "description": "Lost glove"}]}"#,
    )
    .unwrap();

    bins.cmd()
        .arg("import")
        .arg(&file)
        .assert()
        .success()
        .stderr(predicate::str::contains("reference containers that do not exist"));
}

// =============================================================================
// Global Flag Tests
// =============================================================================

#[test]
fn test_verbose_flag() {
    let bins = Bins::new();

    bins.cmd()
        .args(["--verbose", "status"])
        .assert()
        .success()
        .stderr(predicate::str::contains("[verbose"));
}

#[test]
fn test_config_default_format() {
    let bins = Bins::with_config("default_format = \"json\"\n");

    let output = bins.cmd().arg("status").assert().success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let json: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(json["items"], 0);
}

#[test]
fn test_invalid_config_is_reported() {
    let bins = Bins::with_config("[ids]\nwidth = 0\n");

    bins.cmd()
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("ids.width"));
}

#[test]
fn test_unopenable_database_is_reported() {
    let bins = Bins::new();

    bins.cmd()
        .env("BINMAN_DB", bins.dir.path())
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Storage unavailable"))
        .stderr(predicate::str::contains("try again"));
}
