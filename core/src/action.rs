//! Severity → recommended action.

pub const ESCALATE_IMMEDIATELY: &str = "Escalate immediately";
pub const INVESTIGATE_WITHIN_30_MINUTES: &str = "Investigate within 30 minutes";
pub const NO_ACTION_REQUIRED: &str = "No action required";

/// Map a classifier severity label to the action recorded with the incident.
///
/// Matching is case-sensitive and every input maps to exactly one action;
/// unknown and empty labels fall through to [`NO_ACTION_REQUIRED`].
#[must_use]
pub fn derive_action(severity: &str) -> &'static str {
    match severity {
        "critical" => ESCALATE_IMMEDIATELY,
        "high" => INVESTIGATE_WITHIN_30_MINUTES,
        _ => NO_ACTION_REQUIRED,
    }
}
