use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Pro,
}

/// Provenance of the last license mutation.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LicenseSource {
    #[default]
    None,
    Manual,
    Lemonsqueezy,
}

/// Durable entitlement state for one user identifier.
///
/// `is_active` is the sole authorization gate; `plan` is informational.
/// `ls_status` and `ls_variant_id` mirror the last upstream values for
/// diagnostics only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseRecord {
    pub user_id: String,
    pub plan: Plan,
    pub is_active: bool,
    pub source: LicenseSource,
    pub ls_status: Option<String>,
    pub ls_variant_id: Option<String>,
    pub updated_at: Option<i64>,
}

impl LicenseRecord {
    /// The record every unknown user resolves to. The store never answers
    /// "not found" for a license query.
    pub fn default_for(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            plan: Plan::Free,
            is_active: false,
            source: LicenseSource::None,
            ls_status: None,
            ls_variant_id: None,
            updated_at: None,
        }
    }

    /// Field-wise merge of a patch over this record. `user_id` and
    /// `updated_at` are the store's to force on write, not the patch's.
    pub fn apply(&self, patch: &LicensePatch) -> Self {
        let mut next = self.clone();
        if let Some(plan) = patch.plan {
            next.plan = plan;
        }
        if let Some(is_active) = patch.is_active {
            next.is_active = is_active;
        }
        if let Some(source) = patch.source {
            next.source = source;
        }
        if let Some(ls_status) = &patch.ls_status {
            next.ls_status = ls_status.clone();
        }
        if let Some(ls_variant_id) = &patch.ls_variant_id {
            next.ls_variant_id = ls_variant_id.clone();
        }
        next
    }
}

/// Partial license update. The outer `Option` means "leave untouched";
/// for the diagnostic fields the inner `Option` lets a patch set an
/// explicit null.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LicensePatch {
    pub plan: Option<Plan>,
    pub is_active: Option<bool>,
    pub source: Option<LicenseSource>,
    pub ls_status: Option<Option<String>>,
    pub ls_variant_id: Option<Option<String>>,
}

/// Append-only audit record for one received webhook delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub event_name: String,
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub variant_id: Option<String>,
    pub test_mode: bool,
    pub received_at: i64,
}

/// Input for appending to the audit log; id and timestamp are assigned by
/// the store.
#[derive(Debug, Clone)]
pub struct CreateAuditEvent {
    pub event_type: String,
    pub event_name: String,
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub variant_id: Option<String>,
    pub test_mode: bool,
}
