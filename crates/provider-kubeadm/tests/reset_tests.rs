//! Reset event handling against a temporary cluster root.

#![cfg(unix)]

use std::fs;

use provider_kubeadm::plugin::{handle_event, Event, EventPayload, EVENT_CLUSTER_RESET};
use provider_kubeadm::SystemProbe;
use tempfile::TempDir;

fn root_with_reset_script(body: &str) -> TempDir {
    let root = TempDir::new().unwrap();
    let scripts = root.path().join("opt/kubeadm/scripts");
    fs::create_dir_all(&scripts).unwrap();
    fs::write(scripts.join("kube-reset.sh"), body).unwrap();
    root
}

fn reset_event(root: &TempDir) -> Event {
    let config = format!(
        "cluster:\n  role: worker\n  control_plane_host: 10.0.0.1\n  cluster_token: abcdef.1234567890123456\n  provider_options:\n    cluster_root_path: {}\n",
        root.path().display()
    );
    Event {
        name: EVENT_CLUSTER_RESET.into(),
        data: serde_json::to_string(&EventPayload { config }).unwrap(),
        ..Event::default()
    }
}

#[test]
fn test_successful_reset() {
    let root = root_with_reset_script("echo \"resetting $1\"\nexit 0\n");

    let response = handle_event(&reset_event(&root), &SystemProbe).unwrap();
    assert!(response.error.is_empty(), "unexpected error: {}", response.error);
    assert!(response.logs.contains("resetting"));
    assert!(response.data.is_empty());
}

#[test]
fn test_failed_reset_reports_output() {
    let root = root_with_reset_script("echo boom >&2\nexit 1\n");

    let response = handle_event(&reset_event(&root), &SystemProbe).unwrap();
    assert!(response.error.contains("boom"), "error was: {}", response.error);
}

#[test]
fn test_missing_script_is_reported() {
    let root = TempDir::new().unwrap();

    let response = handle_event(&reset_event(&root), &SystemProbe).unwrap();
    assert!(!response.error.is_empty());
}
