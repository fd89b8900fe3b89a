//! Fault classification
//!
//! Maps heterogeneous remote faults into the fixed `ErrorCategory` set.
//!
//! Structured signals (HTTP status, transport kind) are consulted first. When
//! they say nothing, the lowercased fault description is matched against an
//! ordered `(pattern, category)` table, top-down, first match wins.

use crate::error::{ErrorCategory, FaultKind, FlowError, FlowHalt, RemoteFault, Step};

/// One row of a text classification table
#[derive(Debug, Clone, Copy)]
pub struct Rule<C> {
    pub pattern: &'static str,
    pub category: C,
}

const fn rule<C>(pattern: &'static str, category: C) -> Rule<C> {
    Rule { pattern, category }
}

/// Generation endpoint faults
pub const GENERATION_RULES: &[Rule<ErrorCategory>] = &[
    rule("quota", ErrorCategory::QuotaExceeded),
    rule("429", ErrorCategory::QuotaExceeded),
    rule("api_key", ErrorCategory::PermissionDenied),
    rule("403", ErrorCategory::PermissionDenied),
    rule("permission", ErrorCategory::PermissionDenied),
    rule("timeout", ErrorCategory::Timeout),
    rule("deadline", ErrorCategory::Timeout),
    rule("safety", ErrorCategory::SafetyBlocked),
    rule("blocked", ErrorCategory::SafetyBlocked),
];

/// Spreadsheet service faults
pub const SPREADSHEET_RULES: &[Rule<ErrorCategory>] = &[
    rule("quota", ErrorCategory::QuotaExceeded),
    rule("429", ErrorCategory::QuotaExceeded),
    rule("permission", ErrorCategory::PermissionDenied),
    rule("403", ErrorCategory::PermissionDenied),
    rule("not found", ErrorCategory::NotFound),
    rule("404", ErrorCategory::NotFound),
    rule("transport", ErrorCategory::NetworkFailure),
    rule("ssl", ErrorCategory::NetworkFailure),
    rule("connect", ErrorCategory::NetworkFailure),
];

/// Messages reaching the flow without structure
pub const FLOW_RULES: &[Rule<FlowHalt>] = &[
    rule("quota", FlowHalt::Quota),
    rule("429", FlowHalt::Quota),
    rule("permission", FlowHalt::Permission),
    rule("403", FlowHalt::Permission),
    rule("timeout", FlowHalt::Timeout),
    rule("spreadsheet", FlowHalt::Spreadsheet),
];

/// First rule whose pattern occurs in the lowercased text
pub fn match_rules<C: Copy>(text: &str, rules: &[Rule<C>]) -> Option<C> {
    let lowered = text.to_lowercase();
    rules
        .iter()
        .find(|r| lowered.contains(r.pattern))
        .map(|r| r.category)
}

/// Classify a generation endpoint fault
pub fn classify_generation(fault: &RemoteFault) -> ErrorCategory {
    let structured = match (fault.status, fault.kind) {
        (Some(429), _) => Some(ErrorCategory::QuotaExceeded),
        (Some(401 | 403), _) => Some(ErrorCategory::PermissionDenied),
        (_, FaultKind::Timeout) => Some(ErrorCategory::Timeout),
        (_, FaultKind::Blocked) => Some(ErrorCategory::SafetyBlocked),
        _ => None,
    };
    structured
        .or_else(|| match_rules(&fault.description, GENERATION_RULES))
        .unwrap_or(ErrorCategory::UnknownSystemFailure)
}

/// Classify a spreadsheet service fault
pub fn classify_spreadsheet(fault: &RemoteFault) -> ErrorCategory {
    let structured = match (fault.status, fault.kind) {
        (Some(429), _) => Some(ErrorCategory::QuotaExceeded),
        (Some(401 | 403), _) => Some(ErrorCategory::PermissionDenied),
        (Some(404), _) => Some(ErrorCategory::NotFound),
        (_, FaultKind::Timeout | FaultKind::Connect) => Some(ErrorCategory::NetworkFailure),
        _ => None,
    };
    structured
        .or_else(|| match_rules(&fault.description, SPREADSHEET_RULES))
        .unwrap_or(ErrorCategory::UnknownSystemFailure)
}

/// Second, coarser classification applied by the flow
pub fn classify_flow(err: &FlowError) -> FlowHalt {
    match err {
        FlowError::Step(step_err) => match step_err.category() {
            ErrorCategory::QuotaExceeded => FlowHalt::Quota,
            ErrorCategory::PermissionDenied => FlowHalt::Permission,
            ErrorCategory::Timeout => FlowHalt::Timeout,
            _ if step_err.step() == Step::Append => FlowHalt::Spreadsheet,
            _ => FlowHalt::Unexpected,
        },
        other => classify_flow_message(&other.to_string()),
    }
}

/// Text-only flow classification
pub fn classify_flow_message(message: &str) -> FlowHalt {
    match_rules(message, FLOW_RULES).unwrap_or(FlowHalt::Unexpected)
}
