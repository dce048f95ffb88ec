//! License store contract: default records, merge semantics, idempotent
//! replays, bounded audit log.

mod common;
use common::*;

use prompt_qa_server::db::queries;
use prompt_qa_server::models::{
    CreateAuditEvent, LicensePatch, LicenseRecord, LicenseSource, Plan,
};

fn audit_input(event_name: &str) -> CreateAuditEvent {
    CreateAuditEvent {
        event_type: "lemonsqueezy".to_string(),
        event_name: event_name.to_string(),
        user_id: Some("pqc_1".to_string()),
        email: None,
        variant_id: None,
        test_mode: false,
    }
}

#[test]
fn unknown_user_gets_the_default_record() {
    let (_dir, state) = test_state();
    let conn = state.db.get().unwrap();

    let record = queries::get_license(&conn, "never-seen").unwrap();
    assert_eq!(record, LicenseRecord::default_for("never-seen"));
    assert_eq!(record.plan, Plan::Free);
    assert!(!record.is_active);
    assert_eq!(record.source, LicenseSource::None);
    assert_eq!(record.updated_at, None);
}

#[test]
fn upsert_creates_and_get_reads_back() {
    let (_dir, state) = test_state();
    let mut conn = state.db.get().unwrap();

    let patch = LicensePatch {
        plan: Some(Plan::Pro),
        is_active: Some(true),
        source: Some(LicenseSource::Manual),
        ..Default::default()
    };
    let written = queries::upsert_license(&mut conn, "pqc_1", &patch).unwrap();
    assert_eq!(written.user_id, "pqc_1");
    assert!(written.is_active);
    assert!(written.updated_at.is_some());

    let read = queries::get_license(&conn, "pqc_1").unwrap();
    assert_eq!(read, written);
}

#[test]
fn partial_patch_preserves_untouched_fields() {
    let (_dir, state) = test_state();
    let mut conn = state.db.get().unwrap();

    // Webhook-style patch first: sets diagnostics.
    let webhook_patch = LicensePatch {
        plan: Some(Plan::Pro),
        is_active: Some(true),
        source: Some(LicenseSource::Lemonsqueezy),
        ls_status: Some(Some("active".to_string())),
        ls_variant_id: Some(Some("12345".to_string())),
    };
    queries::upsert_license(&mut conn, "pqc_1", &webhook_patch).unwrap();

    // Manual override afterwards: does not touch the diagnostic fields.
    let manual_patch = LicensePatch {
        is_active: Some(false),
        source: Some(LicenseSource::Manual),
        ..Default::default()
    };
    let record = queries::upsert_license(&mut conn, "pqc_1", &manual_patch).unwrap();

    assert!(!record.is_active);
    assert_eq!(record.source, LicenseSource::Manual);
    assert_eq!(record.plan, Plan::Pro);
    assert_eq!(record.ls_status.as_deref(), Some("active"));
    assert_eq!(record.ls_variant_id.as_deref(), Some("12345"));
}

#[test]
fn patch_can_set_diagnostics_to_explicit_null() {
    let (_dir, state) = test_state();
    let mut conn = state.db.get().unwrap();

    queries::upsert_license(
        &mut conn,
        "pqc_1",
        &LicensePatch {
            ls_status: Some(Some("active".to_string())),
            ls_variant_id: Some(Some("12345".to_string())),
            ..Default::default()
        },
    )
    .unwrap();

    let record = queries::upsert_license(
        &mut conn,
        "pqc_1",
        &LicensePatch {
            ls_status: Some(None),
            ls_variant_id: Some(None),
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(record.ls_status, None);
    assert_eq!(record.ls_variant_id, None);
}

#[test]
fn replaying_the_same_patch_is_idempotent() {
    let (_dir, state) = test_state();
    let mut conn = state.db.get().unwrap();

    let patch = LicensePatch {
        plan: Some(Plan::Pro),
        is_active: Some(true),
        source: Some(LicenseSource::Lemonsqueezy),
        ls_status: Some(Some("active".to_string())),
        ls_variant_id: Some(Some("12345".to_string())),
    };

    let mut first = queries::upsert_license(&mut conn, "pqc_1", &patch).unwrap();
    let mut second = queries::upsert_license(&mut conn, "pqc_1", &patch).unwrap();

    first.updated_at = None;
    second.updated_at = None;
    assert_eq!(first, second);
}

#[test]
fn upserts_force_user_id_and_updated_at() {
    let (_dir, state) = test_state();
    let mut conn = state.db.get().unwrap();

    let record = queries::upsert_license(&mut conn, "pqc_forced", &LicensePatch::default()).unwrap();
    assert_eq!(record.user_id, "pqc_forced");
    assert!(record.updated_at.is_some());
}

#[test]
fn audit_log_is_truncated_to_the_retention_bound() {
    let (_dir, state) = test_state();
    let conn = state.db.get().unwrap();

    for i in 0..25 {
        queries::add_event(&conn, &audit_input(&format!("event_{i}")), 10).unwrap();
    }

    let events = queries::recent_events(&conn, 100).unwrap();
    assert_eq!(events.len(), 10);
    // Newest first; the oldest fifteen were evicted.
    assert_eq!(events[0].event_name, "event_24");
    assert_eq!(events[9].event_name, "event_15");
}

#[test]
fn recent_events_are_newest_first_and_respect_limit() {
    let (_dir, state) = test_state();
    let conn = state.db.get().unwrap();

    for i in 0..5 {
        queries::add_event(&conn, &audit_input(&format!("event_{i}")), 200).unwrap();
    }

    let events = queries::recent_events(&conn, 3).unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].event_name, "event_4");
    assert_eq!(events[2].event_name, "event_2");
}

#[test]
fn audit_events_keep_null_user_ids() {
    let (_dir, state) = test_state();
    let conn = state.db.get().unwrap();

    let mut input = audit_input("order_created");
    input.user_id = None;
    let written = queries::add_event(&conn, &input, 200).unwrap();
    assert_eq!(written.user_id, None);

    let events = queries::recent_events(&conn, 10).unwrap();
    assert_eq!(events[0].user_id, None);
    assert_eq!(events[0].event_name, "order_created");
}
