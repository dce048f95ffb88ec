use std::str::FromStr;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    AuditEvent, CreateAuditEvent, LicensePatch, LicenseRecord, LicenseSource, Plan,
};

fn now() -> i64 {
    Utc::now().timestamp()
}

fn gen_id() -> String {
    Uuid::new_v4().to_string()
}

const LICENSE_COLS: &str = "user_id, plan, is_active, source, ls_status, ls_variant_id, updated_at";

fn license_from_row(row: &Row) -> rusqlite::Result<LicenseRecord> {
    let plan: String = row.get("plan")?;
    let source: String = row.get("source")?;
    Ok(LicenseRecord {
        user_id: row.get("user_id")?,
        plan: Plan::from_str(&plan).unwrap_or_default(),
        is_active: row.get("is_active")?,
        source: LicenseSource::from_str(&source).unwrap_or_default(),
        ls_status: row.get("ls_status")?,
        ls_variant_id: row.get("ls_variant_id")?,
        updated_at: row.get("updated_at")?,
    })
}

/// Fetch the license for a user. Missing rows resolve to the default
/// free/inactive record; this never returns "not found".
pub fn get_license(conn: &Connection, user_id: &str) -> Result<LicenseRecord> {
    let record = conn
        .query_row(
            &format!("SELECT {LICENSE_COLS} FROM licenses WHERE user_id = ?1"),
            params![user_id],
            license_from_row,
        )
        .optional()?;
    Ok(record.unwrap_or_else(|| LicenseRecord::default_for(user_id)))
}

/// Read-modify-write a license record.
///
/// Runs inside an IMMEDIATE transaction: SQLite's single-writer lock
/// serializes the whole cycle against every other writer sharing the
/// database file, so concurrent upserts for the same key cannot interleave
/// regardless of how many server processes are running. `user_id` and
/// `updated_at` are force-set on every write.
pub fn upsert_license(
    conn: &mut Connection,
    user_id: &str,
    patch: &LicensePatch,
) -> Result<LicenseRecord> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let current = tx
        .query_row(
            &format!("SELECT {LICENSE_COLS} FROM licenses WHERE user_id = ?1"),
            params![user_id],
            license_from_row,
        )
        .optional()?
        .unwrap_or_else(|| LicenseRecord::default_for(user_id));

    let mut next = current.apply(patch);
    next.user_id = user_id.to_string();
    next.updated_at = Some(now());

    tx.execute(
        "INSERT INTO licenses (user_id, plan, is_active, source, ls_status, ls_variant_id, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(user_id) DO UPDATE SET
             plan = excluded.plan,
             is_active = excluded.is_active,
             source = excluded.source,
             ls_status = excluded.ls_status,
             ls_variant_id = excluded.ls_variant_id,
             updated_at = excluded.updated_at",
        params![
            next.user_id,
            next.plan.to_string(),
            next.is_active,
            next.source.to_string(),
            next.ls_status,
            next.ls_variant_id,
            next.updated_at,
        ],
    )?;

    tx.commit()?;
    Ok(next)
}

/// Append to the audit log, then truncate to the newest `retain` entries.
/// Entries are never mutated after insertion.
pub fn add_event(conn: &Connection, input: &CreateAuditEvent, retain: usize) -> Result<AuditEvent> {
    let event = AuditEvent {
        id: gen_id(),
        event_type: input.event_type.clone(),
        event_name: input.event_name.clone(),
        user_id: input.user_id.clone(),
        email: input.email.clone(),
        variant_id: input.variant_id.clone(),
        test_mode: input.test_mode,
        received_at: now(),
    };

    conn.execute(
        "INSERT INTO audit_events (id, event_type, event_name, user_id, email, variant_id, test_mode, received_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            event.id,
            event.event_type,
            event.event_name,
            event.user_id,
            event.email,
            event.variant_id,
            event.test_mode,
            event.received_at,
        ],
    )?;

    conn.execute(
        "DELETE FROM audit_events
         WHERE seq NOT IN (SELECT seq FROM audit_events ORDER BY seq DESC LIMIT ?1)",
        params![retain as i64],
    )?;

    Ok(event)
}

/// Newest-first view of the audit log for the admin surface.
pub fn recent_events(conn: &Connection, limit: usize) -> Result<Vec<AuditEvent>> {
    let mut stmt = conn.prepare(
        "SELECT id, event_type, event_name, user_id, email, variant_id, test_mode, received_at
         FROM audit_events ORDER BY seq DESC LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit as i64], |row| {
        Ok(AuditEvent {
            id: row.get("id")?,
            event_type: row.get("event_type")?,
            event_name: row.get("event_name")?,
            user_id: row.get("user_id")?,
            email: row.get("email")?,
            variant_id: row.get("variant_id")?,
            test_mode: row.get("test_mode")?,
            received_at: row.get("received_at")?,
        })
    })?;

    let mut events = Vec::new();
    for row in rows {
        events.push(row?);
    }
    Ok(events)
}
