use std::path::{Path, PathBuf};

use peekdown_core::fingerprint::Fingerprint;
use peekdown_core::state::{RegistrationState, StateStore};
use uuid::Uuid;

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("{prefix}-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn sample_state(root: &Path) -> RegistrationState {
    RegistrationState::new(
        root.join("Applications").join("Peekdown.app"),
        "1.2.3".to_string(),
        root.join("Applications").join("Peekdown Helper.app"),
        Fingerprint::from_digests("aa", "bb"),
    )
}

#[test]
fn load_returns_none_when_absent() {
    let root = unique_temp_dir("peekdown-state-absent");
    let _cleanup = CleanupDir(root.clone());

    let store = StateStore::new(root.join("registration-state.json"));
    assert!(store.load().is_none());
}

#[test]
fn save_creates_parent_dir_and_load_reads_it_back() {
    let root = unique_temp_dir("peekdown-state-save");
    let _cleanup = CleanupDir(root.clone());

    let path = root
        .join("Library")
        .join("Application Support")
        .join("Peekdown")
        .join("registration-state.json");
    let store = StateStore::new(&path);
    let state = sample_state(&root);
    store.save(&state).expect("save");

    assert!(path.exists(), "state file should exist: {}", path.display());
    assert_eq!(store.load().expect("load"), state);
    assert!(
        !path.with_extension("json.tmp").exists(),
        "temporary file should be renamed away"
    );
}

#[test]
fn corrupt_state_is_treated_as_never_registered() {
    let root = unique_temp_dir("peekdown-state-corrupt");
    let _cleanup = CleanupDir(root.clone());

    let path = root.join("registration-state.json");
    std::fs::write(&path, b"{ this is not json").expect("write");
    assert!(StateStore::new(&path).load().is_none());

    std::fs::write(&path, b"").expect("write empty");
    assert!(StateStore::new(&path).load().is_none());
}

#[test]
fn renamed_or_missing_fields_are_treated_as_never_registered() {
    let root = unique_temp_dir("peekdown-state-renamed");
    let _cleanup = CleanupDir(root.clone());

    let path = root.join("registration-state.json");
    std::fs::write(
        &path,
        r#"{ "registeredAt": "2026-01-01T00:00:00Z", "hostPath": "/Applications/Peekdown.app" }"#,
    )
    .expect("write");
    assert!(StateStore::new(&path).load().is_none());
}

#[test]
fn missing_fingerprint_field_loads_as_none() {
    let root = unique_temp_dir("peekdown-state-nofp");
    let _cleanup = CleanupDir(root.clone());

    let path = root.join("registration-state.json");
    std::fs::write(
        &path,
        r#"{
  "registered_at": "2026-01-01T00:00:00Z",
  "host_path": "/Applications/Peekdown.app",
  "host_version": "1.0.0",
  "helper_path": "/Applications/Peekdown Helper.app"
}"#,
    )
    .expect("write");
    let state = StateStore::new(&path).load().expect("load");
    assert!(state.helper_fingerprint.is_none());
    assert!(state.state_id.is_nil());
}

#[test]
fn save_fully_overwrites_previous_record() {
    let root = unique_temp_dir("peekdown-state-overwrite");
    let _cleanup = CleanupDir(root.clone());

    let path = root.join("registration-state.json");
    std::fs::write(
        &path,
        r#"{ "legacy_field": "should disappear", "host_version": "0.0.1" }"#,
    )
    .expect("write");

    let store = StateStore::new(&path);
    store.save(&sample_state(&root)).expect("save");
    let text = std::fs::read_to_string(&path).expect("read");
    assert!(!text.contains("legacy_field"), "state: {text}");
    assert!(text.contains("\"host_version\": \"1.2.3\""), "state: {text}");
}

#[test]
fn clear_removes_file_and_tolerates_absence() {
    let root = unique_temp_dir("peekdown-state-clear");
    let _cleanup = CleanupDir(root.clone());

    let store = StateStore::new(root.join("registration-state.json"));
    store.save(&sample_state(&root)).expect("save");
    store.clear().expect("clear");
    assert!(store.load().is_none());
    store.clear().expect("clear again");
}

struct CleanupDir(PathBuf);

impl Drop for CleanupDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}
