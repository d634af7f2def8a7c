// tests/queue_test.rs
use release_train::domain::conventions::{branch_name_from_version, tag_from_branch, version_from_tag};
use release_train::domain::{build_queue, TrainState, Version, HOTFIX_PREFIX, RELEASE_PREFIX};
use release_train::ReleaseTrainError;

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// Naming conventions
// ============================================================================

#[test]
fn test_version_text_round_trips() {
    for text in ["0.0.0", "1.2.3", "10.20.30"] {
        assert_eq!(Version::parse(text).unwrap().to_string(), text);
    }
}

#[test]
fn test_increments_touch_one_component() {
    let v = Version::new(1, 3, 2);
    assert_eq!(v.inc_minor().unwrap(), Version::new(1, 4, 2));
    assert_eq!(v.inc_patch().unwrap(), Version::new(1, 3, 3));
    assert_eq!(v.inc_major().unwrap(), Version::new(2, 3, 2));
}

#[test]
fn test_tag_requires_leading_v() {
    assert_eq!(version_from_tag("v1.2.3").unwrap(), Version::new(1, 2, 3));
    assert!(matches!(
        version_from_tag("1.2.3").unwrap_err(),
        ReleaseTrainError::Format(_)
    ));
    assert!(version_from_tag("v1x2x3").is_err());
}

#[test]
fn test_branch_and_tag_agree() {
    let candidate = Version::new(1, 3, 0).inc_minor().unwrap();
    let branch = branch_name_from_version(&candidate, RELEASE_PREFIX);
    assert_eq!(branch, "release-1.4.0");
    assert_eq!(tag_from_branch(&branch).unwrap(), "v1.4.0");

    let hotfix = branch_name_from_version(&Version::new(1, 3, 0).inc_patch().unwrap(), HOTFIX_PREFIX);
    assert_eq!(tag_from_branch(&hotfix).unwrap(), "v1.3.1");
}

#[test]
fn test_tag_from_other_branch_fails() {
    assert!(tag_from_branch("develop").is_err());
    assert!(tag_from_branch("releases-1.0.0").is_err());
}

// ============================================================================
// Queue construction
// ============================================================================

#[test]
fn test_full_train_queue() {
    let branches = names(&["release-1.4.0", "hotfix-1.3.1", "develop", "master"]);
    let queue = build_queue(&Version::new(1, 3, 0), &branches).unwrap();

    assert_eq!(queue.entries(), names(&["hotfix-1.3.1", "release-1.4.0"]).as_slice());
    assert_eq!(queue.state(), TrainState::HotfixAndReleasePending);
}

#[test]
fn test_already_released_branch_is_idle() {
    let branches = names(&["release-1.3.0", "master"]);
    let queue = build_queue(&Version::new(1, 3, 0), &branches).unwrap();

    assert!(queue.is_empty());
    assert_eq!(queue.head(), None);
    assert_eq!(queue.state(), TrainState::Idle);
}

#[test]
fn test_queue_after_hotfix_release() {
    // once hotfix-1.3.1 is tagged, the hotfix leaves the queue and the release stays
    let branches = names(&["release-1.4.0", "hotfix-1.3.1"]);
    let queue = build_queue(&Version::new(1, 3, 1), &branches).unwrap();

    assert_eq!(queue.head(), Some("release-1.4.0"));
    assert_eq!(queue.len(), 1);
    assert_eq!(queue.state(), TrainState::ReleasePending);
}

#[test]
fn test_two_pending_hotfixes_is_workflow_error() {
    let branches = names(&["hotfix-1.3.1", "hotfix-1.3.2", "master"]);
    let err = build_queue(&Version::new(1, 3, 0), &branches).unwrap_err();

    assert!(matches!(err, ReleaseTrainError::Workflow(_)));
    let message = err.to_string();
    assert!(message.contains("hotfix-1.3.1") && message.contains("hotfix-1.3.2"));
}

#[test]
fn test_hotfix_only_queue() {
    let branches = names(&["hotfix-1.3.1", "release-1.3.0"]);
    let queue = build_queue(&Version::new(1, 3, 0), &branches).unwrap();

    assert_eq!(queue.state(), TrainState::HotfixPending);
    assert_eq!(queue.next(), None);
    assert!(queue.contains("hotfix-1.3.1"));
    assert!(!queue.contains("release-1.3.0"));
}
