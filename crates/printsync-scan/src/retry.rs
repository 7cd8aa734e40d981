// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Retry policy for SNMP queries.
//
// Classifies query failures into Transient (retry) and Permanent (give up).
// Only SNMP traffic is retried; inventory HTTP calls never are.

use std::time::Duration;

use tracing::debug;

/// Per-query timeout and retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one.
    pub retries: u32,
    /// Time to wait for each response.
    pub timeout: Duration,
    /// Pause before the first retry; doubled for each further one.
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 1,
            timeout: Duration::from_secs(2),
            base_delay: Duration::from_millis(50),
            max_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn new(retries: u32, timeout: Duration) -> Self {
        Self {
            retries,
            timeout,
            ..Self::default()
        }
    }
}

/// Whether a failure is worth another attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Lost datagram, timeout, momentary socket error.
    Transient,
    /// The agent answered and said no, or the request itself is bad.
    Permanent,
}

/// Result of evaluating whether to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    RetryAfter(Duration),
    GiveUp,
    Exhausted,
}

/// Classify an SNMP failure detail string.
pub fn classify_snmp_detail(detail: &str) -> ErrorClass {
    let lower = detail.to_ascii_lowercase();

    if lower.contains("timed out")
        || lower.contains("timeout")
        || lower.contains("would block")
        || lower.contains("connection refused")
        || lower.contains("send")
        || lower.contains("receive")
    {
        return ErrorClass::Transient;
    }

    // The agent decoded the request and refused it.
    if lower.contains("community")
        || lower.contains("nosuchname")
        || lower.contains("error status")
        || lower.contains("asn")
        || lower.contains("invalid oid")
    {
        return ErrorClass::Permanent;
    }

    ErrorClass::Transient
}

/// Decide whether attempt number `attempt` (0-based) should be followed by
/// another one.
pub fn should_retry(detail: &str, attempt: u32, policy: &RetryPolicy) -> RetryDecision {
    match classify_snmp_detail(detail) {
        ErrorClass::Permanent => RetryDecision::GiveUp,
        ErrorClass::Transient if attempt >= policy.retries => RetryDecision::Exhausted,
        ErrorClass::Transient => {
            let delay = compute_delay(attempt, policy);
            debug!(attempt, delay_ms = delay.as_millis() as u64, "retrying SNMP query");
            RetryDecision::RetryAfter(delay)
        }
    }
}

/// delay = min(base * 2^attempt, max_delay)
fn compute_delay(attempt: u32, policy: &RetryPolicy) -> Duration {
    let base_ms = policy.base_delay.as_millis() as u64;
    let exp_ms = base_ms.saturating_mul(1u64 << attempt.min(10));
    Duration::from_millis(exp_ms.min(policy.max_delay.as_millis() as u64))
}
