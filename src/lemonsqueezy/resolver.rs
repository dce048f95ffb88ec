use super::WebhookEvent;
use crate::models::{LicensePatch, LicenseSource, Plan};

const ACTIVATION_EVENTS: &[&str] = &[
    "subscription_created",
    "subscription_resumed",
    "order_created",
];

const DEACTIVATION_EVENTS: &[&str] = &[
    "subscription_cancelled",
    "subscription_expired",
    "subscription_paused",
];

/// Upstream statuses that keep a subscription entitled. `past_due` stays
/// active: the provider is still retrying payment.
const ACTIVE_STATUSES: &[&str] = &["active", "on_trial", "past_due"];

/// Whether a purchased variant entitles the user to the pro tier.
///
/// An EMPTY allow-list is fail-open: every paid variant counts as pro, so a
/// deployment that forgot to configure its SKUs cannot lock out paying
/// customers. Documented in README; changing it changes licensing behavior.
pub fn is_pro_variant(variant_id: Option<&str>, pro_variant_ids: &[String]) -> bool {
    let Some(variant_id) = variant_id.map(str::trim).filter(|v| !v.is_empty()) else {
        return false;
    };
    if pro_variant_ids.is_empty() {
        return true;
    }
    pro_variant_ids.iter().any(|id| id == variant_id)
}

/// Map a parsed webhook event onto a license patch.
///
/// Pure function of the event and the configured allow-list, which is what
/// makes webhook replay idempotent: the same payload always produces the
/// same patch.
///
/// Activation events are variant-gated so a purchase of an unrelated product
/// never grants pro access. Deactivation events are unconditional: a
/// cancelled subscription loses access even when variant metadata is missing
/// or malformed. Events outside the known classes return `None`.
pub fn resolve_license_patch(
    event: &WebhookEvent,
    pro_variant_ids: &[String],
) -> Option<LicensePatch> {
    let name = event.event_name.as_str();
    let variant = event.variant_id.as_deref();

    if ACTIVATION_EVENTS.contains(&name) {
        let pro = is_pro_variant(variant, pro_variant_ids);
        let ls_status = event.status.clone().or_else(|| Some("active".to_string()));
        return Some(patch(pro, ls_status, event.variant_id.clone()));
    }

    if DEACTIVATION_EVENTS.contains(&name) {
        let ls_status = event
            .status
            .clone()
            .or_else(|| Some("inactive".to_string()));
        return Some(patch(false, ls_status, event.variant_id.clone()));
    }

    if name == "subscription_updated" {
        let status_active = event
            .status
            .as_deref()
            .map(|s| {
                let s = s.to_lowercase();
                ACTIVE_STATUSES.contains(&s.as_str())
            })
            .unwrap_or(false);
        let pro = status_active && is_pro_variant(variant, pro_variant_ids);
        return Some(patch(pro, event.status.clone(), event.variant_id.clone()));
    }

    None
}

fn patch(active: bool, ls_status: Option<String>, ls_variant_id: Option<String>) -> LicensePatch {
    LicensePatch {
        plan: Some(if active { Plan::Pro } else { Plan::Free }),
        is_active: Some(active),
        source: Some(LicenseSource::Lemonsqueezy),
        ls_status: Some(ls_status),
        ls_variant_id: Some(ls_variant_id),
    }
}
