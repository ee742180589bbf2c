//! Real Device-Twin Enforcement Scenarios
//!
//! These tests exercise the enforcement engine the way the platform does:
//! 1. A device owner with a root grant and a deeper revoke
//! 2. A support technician scoped to a single feature subtree
//! 3. Visibility of container resources through partial grants
//! 4. Collecting the effective subject partition for the search index

use policy_enforcement::*;
use std::collections::BTreeMap;

fn path(pointer: &str) -> ResourcePath {
    ResourcePath::from_pointer(pointer).unwrap()
}

fn perms(names: &[&str]) -> PermissionSet {
    names.iter().map(|n| (*n).into()).collect()
}

fn entry(label: &str, subject: &str, resources: Vec<(&str, EffectedPermissions)>) -> PolicyEntry {
    let resources = resources
        .into_iter()
        .map(|(pointer, effected)| (path(pointer), effected))
        .collect::<BTreeMap<_, _>>();
    PolicyEntry::new(label, [subject], resources)
}

// ============================================================================
// SCENARIO 1: Owner With a Deeper Revoke
// ============================================================================

#[test]
fn scenario_owner_with_deeper_revoke() {
    println!("\nSCENARIO 1: owner grant at /, WRITE revoked below /features");

    let policy = Policy::new(vec![
        entry(
            "e1",
            "google:alice",
            vec![("/", EffectedPermissions::granted(["READ", "WRITE"]))],
        ),
        entry(
            "e2",
            "google:alice",
            vec![("/features", EffectedPermissions::revoked(["WRITE"]))],
        ),
    ]);
    let enforcer = PolicyEnforcer::new(&policy).unwrap();
    let alice = AuthorizationContext::new(["google:alice"]);
    let target = path("/features/temp");

    let read_write = enforcer
        .has_unrestricted_permissions(&target, &alice, &perms(&["READ", "WRITE"]))
        .unwrap();
    println!("  READ+WRITE at /features/temp: {read_write}");
    assert!(!read_write, "the deeper WRITE revoke must win");

    let read = enforcer
        .has_unrestricted_permissions(&target, &alice, &perms(&["READ"]))
        .unwrap();
    println!("  READ at /features/temp: {read}");
    assert!(read, "READ is untouched by the WRITE revoke");

    let subjects = enforcer
        .effective_subjects(&target, &perms(&["WRITE"]))
        .unwrap();
    println!(
        "  effective WRITE subjects: granted={:?} revoked={:?}",
        subjects.granted, subjects.revoked
    );
    assert!(subjects.granted.is_empty());
    let expected_revoked: std::collections::BTreeSet<SubjectId> =
        [SubjectId::new("google:alice")].into_iter().collect();
    assert_eq!(subjects.revoked, expected_revoked);
}

// ============================================================================
// SCENARIO 2: Support Technician Scoped to One Feature
// ============================================================================

#[test]
fn scenario_support_technician_scoped_to_firmware() {
    println!("\nSCENARIO 2: technician may only touch /features/firmware");

    let policy = Policy::new(vec![
        entry(
            "owner",
            "google:alice",
            vec![("/", EffectedPermissions::granted(["READ", "WRITE"]))],
        ),
        entry(
            "support",
            "support:tech-7",
            vec![(
                "/features/firmware",
                EffectedPermissions::granted(["READ", "WRITE"]),
            )],
        ),
    ]);
    let enforcer = PolicyEnforcer::new(&policy).unwrap();
    let tech = AuthorizationContext::new(["support:tech-7"]);

    assert!(enforcer
        .has_unrestricted_permissions(
            &path("/features/firmware/version"),
            &tech,
            &perms(&["WRITE"])
        )
        .unwrap());
    assert!(!enforcer
        .has_unrestricted_permissions(&path("/features/temp"), &tech, &perms(&["READ"]))
        .unwrap());
    assert!(!enforcer
        .has_unrestricted_permissions(&path("/attributes"), &tech, &perms(&["READ"]))
        .unwrap());
}

// ============================================================================
// SCENARIO 3: Container Visibility Through Partial Grants
// ============================================================================

#[test]
fn scenario_container_visibility_through_partial_grants() {
    println!("\nSCENARIO 3: a nested grant makes the container partially visible");

    let policy = Policy::new(vec![entry(
        "metering",
        "integration:meter",
        vec![(
            "/features/consumption/properties",
            EffectedPermissions::granted(["READ"]),
        )],
    )]);
    let enforcer = PolicyEnforcer::new(&policy).unwrap();
    let meter = AuthorizationContext::new(["integration:meter"]);
    let read = perms(&["READ"]);

    // No direct grant at the container itself...
    assert!(!enforcer
        .has_unrestricted_permissions(&path("/features"), &meter, &read)
        .unwrap());
    // ...but the partial check sees the nested grant, so the container can
    // still be shown as an (otherwise empty) object.
    assert!(enforcer
        .has_partial_permissions(&path("/features"), &meter, &read)
        .unwrap());
    assert!(enforcer
        .has_partial_permissions(&path("/"), &meter, &read)
        .unwrap());

    let partial = enforcer
        .partially_granted_subjects(&path("/features"), &read)
        .unwrap();
    assert!(partial.contains(&SubjectId::new("integration:meter")));

    let full = enforcer.effective_subjects(&path("/features"), &read).unwrap();
    assert!(full.granted.is_empty());
}

// ============================================================================
// SCENARIO 4: Subject Partition Feeding the Search Index
// ============================================================================

#[test]
fn scenario_subject_partition_is_disjoint_and_complete() {
    println!("\nSCENARIO 4: granted/revoked partition over many subjects");

    let policy = Policy::new(vec![
        entry(
            "owner",
            "google:alice",
            vec![("/", EffectedPermissions::granted(["READ"]))],
        ),
        entry(
            "banned",
            "google:bob",
            vec![("/", EffectedPermissions::revoked(["READ"]))],
        ),
        entry(
            "unrelated",
            "google:carol",
            vec![("/attributes", EffectedPermissions::granted(["READ"]))],
        ),
    ]);
    let enforcer = PolicyEnforcer::new(&policy).unwrap();
    let subjects = enforcer
        .effective_subjects(&path("/features/temp"), &perms(&["READ"]))
        .unwrap();

    println!(
        "  granted={:?} revoked={:?}",
        subjects.granted, subjects.revoked
    );
    assert!(subjects.granted.contains(&SubjectId::new("google:alice")));
    assert!(subjects.revoked.contains(&SubjectId::new("google:bob")));
    // carol's rules live on a diverged branch: undefined here, in neither set
    assert!(!subjects.granted.contains(&SubjectId::new("google:carol")));
    assert!(!subjects.revoked.contains(&SubjectId::new("google:carol")));
    assert!(subjects
        .granted
        .intersection(&subjects.revoked)
        .next()
        .is_none());
}

// ============================================================================
// SCENARIO 5: Policy Loaded From Its JSON Document Form
// ============================================================================

#[test]
fn scenario_policy_loaded_from_json() {
    let policy = Policy::from_json(
        r#"{
            "revision": 12,
            "entries": [
                {
                    "label": "owner",
                    "subjects": ["google:alice"],
                    "resources": {
                        "/": { "grant": ["READ", "WRITE"] }
                    }
                },
                {
                    "label": "restricted",
                    "subjects": ["google:alice"],
                    "resources": {
                        "/features": { "revoke": ["WRITE"] }
                    }
                }
            ]
        }"#,
    )
    .unwrap();

    let enforcer = PolicyEnforcer::new(&policy).unwrap();
    assert_eq!(enforcer.revision(), Some(12));

    let alice = AuthorizationContext::new(["google:alice"]);
    assert!(!enforcer
        .has_unrestricted_permissions(
            &path("/features/temp"),
            &alice,
            &perms(&["READ", "WRITE"])
        )
        .unwrap());
    assert!(enforcer
        .has_unrestricted_permissions(&path("/features/temp"), &alice, &perms(&["READ"]))
        .unwrap());
}
