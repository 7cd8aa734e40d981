// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// SNMP v1 transport.
//
// `SnmpTransport` is the seam between the prober and the network. The real
// implementation drives `snmp2`'s blocking session on the blocking thread
// pool; `ScriptedAgent` answers from an in-memory MIB for tests.

use std::fmt;
use std::net::{Ipv4Addr, SocketAddrV4};

use async_trait::async_trait;
use snmp2::{Oid, SyncSession, Value};
use tracing::{debug, instrument, trace};

use printsync_core::error::{PrintsyncError, Result};

use crate::retry::{RetryDecision, RetryPolicy, should_retry};

/// Standard SNMP agent port.
pub const SNMP_PORT: u16 = 161;

/// v1 error-status for an unknown OID, also returned at the end of the MIB.
const NO_SUCH_NAME: u32 = 2;

/// Owned copy of a varbind value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnmpValue {
    Integer(i64),
    Text(String),
    /// Counter32, Gauge32/Unsigned32, TimeTicks and Counter64.
    Counter(u64),
    /// Any other syntax, kept in debug form.
    Other(String),
}

impl SnmpValue {
    /// Numeric view. Text is accepted when it parses as an integer, since some
    /// agents report counters as strings.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            Self::Counter(n) => i64::try_from(*n).ok(),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Other(_) => None,
        }
    }
}

impl fmt::Display for SnmpValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Counter(n) => write!(f, "{n}"),
            Self::Text(s) | Self::Other(s) => f.write_str(s),
        }
    }
}

/// Community-authenticated GET and GETNEXT-walk against one agent.
#[async_trait]
pub trait SnmpTransport: Send + Sync + 'static {
    /// Fetch one OID. `Ok(None)` means the agent answered but has no value.
    async fn get(&self, ip: Ipv4Addr, oid: &[u64]) -> Result<Option<SnmpValue>>;

    /// Walk the subtree under `base`, returning at most `max_rows`
    /// (full OID, value) rows in agent order.
    async fn walk(
        &self,
        ip: Ipv4Addr,
        base: &[u64],
        max_rows: usize,
    ) -> Result<Vec<(Vec<u64>, SnmpValue)>>;
}

/// `SnmpTransport` over UDP using `snmp2`.
#[derive(Debug, Clone)]
pub struct Snmp2Transport {
    community: Vec<u8>,
    policy: RetryPolicy,
}

impl Snmp2Transport {
    pub fn new(community: impl Into<String>, policy: RetryPolicy) -> Self {
        Self {
            community: community.into().into_bytes(),
            policy,
        }
    }

    fn session(&self, ip: Ipv4Addr) -> Result<SyncSession> {
        let addr = SocketAddrV4::new(ip, SNMP_PORT);
        SyncSession::new_v1(addr, &self.community, Some(self.policy.timeout), 0)
            .map_err(|e| PrintsyncError::Snmp(format!("cannot open session to {addr}: {e}")))
    }
}

#[async_trait]
impl SnmpTransport for Snmp2Transport {
    #[instrument(skip(self, oid), fields(oid = %dotted(oid)))]
    async fn get(&self, ip: Ipv4Addr, oid: &[u64]) -> Result<Option<SnmpValue>> {
        let this = self.clone();
        let oid = oid.to_vec();
        tokio::task::spawn_blocking(move || {
            let mut session = this.session(ip)?;
            with_retry(&this.policy, || get_once(&mut session, &oid))
        })
        .await
        .map_err(|e| PrintsyncError::Snmp(format!("query task failed: {e}")))?
    }

    #[instrument(skip(self, base), fields(base = %dotted(base)))]
    async fn walk(
        &self,
        ip: Ipv4Addr,
        base: &[u64],
        max_rows: usize,
    ) -> Result<Vec<(Vec<u64>, SnmpValue)>> {
        let this = self.clone();
        let base = base.to_vec();
        tokio::task::spawn_blocking(move || {
            let mut session = this.session(ip)?;
            let mut rows = Vec::new();
            let mut cursor = base.clone();
            while rows.len() < max_rows {
                let step = with_retry(&this.policy, || getnext_once(&mut session, &cursor))?;
                let Some((next, value)) = step else { break };
                if !next.starts_with(&base) || next <= cursor {
                    break;
                }
                if let Some(value) = value {
                    rows.push((next.clone(), value));
                }
                cursor = next;
            }
            debug!(rows = rows.len(), "walk finished");
            Ok(rows)
        })
        .await
        .map_err(|e| PrintsyncError::Snmp(format!("walk task failed: {e}")))?
    }
}

/// Run `op` until it succeeds or the policy says stop.
fn with_retry<T>(
    policy: &RetryPolicy,
    mut op: impl FnMut() -> std::result::Result<T, String>,
) -> Result<T> {
    let mut attempt = 0;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(detail) => match should_retry(&detail, attempt, policy) {
                RetryDecision::RetryAfter(delay) => {
                    std::thread::sleep(delay);
                    attempt += 1;
                }
                RetryDecision::GiveUp | RetryDecision::Exhausted => {
                    return Err(PrintsyncError::Snmp(detail));
                }
            },
        }
    }
}

fn get_once(
    session: &mut SyncSession,
    oid: &[u64],
) -> std::result::Result<Option<SnmpValue>, String> {
    let request = to_oid(oid)?;
    let pdu = session.get(&request).map_err(|e| format!("{e:?}"))?;
    if pdu.error_status == NO_SUCH_NAME {
        return Ok(None);
    }
    if pdu.error_status != 0 {
        return Err(format!("agent returned error status {}", pdu.error_status));
    }
    Ok(pdu.varbinds.into_iter().next().and_then(|(_, v)| convert(v)))
}

/// One GETNEXT step. `None` marks the end of the agent's MIB.
#[allow(clippy::type_complexity)]
fn getnext_once(
    session: &mut SyncSession,
    oid: &[u64],
) -> std::result::Result<Option<(Vec<u64>, Option<SnmpValue>)>, String> {
    let request = to_oid(oid)?;
    let pdu = session.getnext(&request).map_err(|e| format!("{e:?}"))?;
    if pdu.error_status == NO_SUCH_NAME {
        return Ok(None);
    }
    if pdu.error_status != 0 {
        return Err(format!("agent returned error status {}", pdu.error_status));
    }
    let Some((next, value)) = pdu.varbinds.into_iter().next() else {
        return Ok(None);
    };
    if matches!(value, Value::EndOfMibView) {
        return Ok(None);
    }
    let next = parse_dotted(&next.to_string())
        .ok_or_else(|| format!("invalid OID in response: {next}"))?;
    trace!(oid = %dotted(&next), "walk step");
    Ok(Some((next, convert(value))))
}

fn to_oid(components: &[u64]) -> std::result::Result<Oid<'static>, String> {
    Oid::from(components).map_err(|e| format!("invalid OID {}: {e:?}", dotted(components)))
}

/// Copy a borrowed varbind value out of the session buffer. Exception values
/// (noSuchObject, noSuchInstance, endOfMibView) and NULL are absent.
fn convert(value: Value<'_>) -> Option<SnmpValue> {
    match value {
        Value::Integer(n) => Some(SnmpValue::Integer(n)),
        Value::OctetString(bytes) => Some(SnmpValue::Text(
            String::from_utf8_lossy(bytes)
                .trim_end_matches('\0')
                .trim()
                .to_string(),
        )),
        Value::Counter32(n) | Value::Unsigned32(n) | Value::Timeticks(n) => {
            Some(SnmpValue::Counter(u64::from(n)))
        }
        Value::Counter64(n) => Some(SnmpValue::Counter(n)),
        Value::Null | Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView => None,
        other => Some(SnmpValue::Other(format!("{other:?}"))),
    }
}

/// `[1, 3, 6]` → `"1.3.6"`.
pub fn dotted(oid: &[u64]) -> String {
    oid.iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

/// `"1.3.6"` (optionally with a leading dot) → `[1, 3, 6]`.
pub fn parse_dotted(text: &str) -> Option<Vec<u64>> {
    let text = text.trim().trim_start_matches('.');
    if text.is_empty() {
        return None;
    }
    text.split('.').map(|part| part.parse().ok()).collect()
}

#[cfg(any(test, feature = "testing"))]
pub use scripted::ScriptedAgent;

#[cfg(any(test, feature = "testing"))]
mod scripted {
    use std::collections::{BTreeMap, HashMap, HashSet};
    use std::net::Ipv4Addr;
    use std::ops::Bound;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use printsync_core::error::{PrintsyncError, Result};

    use super::{SnmpTransport, SnmpValue};

    /// In-memory SNMP agents keyed by address. Unknown or failing addresses
    /// behave like hosts that never answer.
    #[derive(Debug, Default)]
    pub struct ScriptedAgent {
        mibs: HashMap<Ipv4Addr, BTreeMap<Vec<u64>, SnmpValue>>,
        silent: HashSet<Ipv4Addr>,
        latency: Duration,
        queries: AtomicUsize,
    }

    impl ScriptedAgent {
        pub fn new() -> Self {
            Self::default()
        }

        /// Delay every answer, to keep probes in flight.
        pub fn with_latency(mut self, latency: Duration) -> Self {
            self.latency = latency;
            self
        }

        pub fn with_value(mut self, ip: Ipv4Addr, oid: &[u64], value: SnmpValue) -> Self {
            self.insert(ip, oid, value);
            self
        }

        pub fn insert(&mut self, ip: Ipv4Addr, oid: &[u64], value: SnmpValue) {
            self.mibs.entry(ip).or_default().insert(oid.to_vec(), value);
        }

        /// Make `ip` time out on every query even if it has values.
        pub fn silence(&mut self, ip: Ipv4Addr) {
            self.silent.insert(ip);
        }

        pub fn query_count(&self) -> usize {
            self.queries.load(Ordering::SeqCst)
        }

        async fn mib(&self, ip: Ipv4Addr) -> Result<&BTreeMap<Vec<u64>, SnmpValue>> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            if self.silent.contains(&ip) {
                return Err(PrintsyncError::Snmp("Receive: timed out".into()));
            }
            self.mibs
                .get(&ip)
                .ok_or_else(|| PrintsyncError::Snmp("Receive: timed out".into()))
        }
    }

    #[async_trait]
    impl SnmpTransport for ScriptedAgent {
        async fn get(&self, ip: Ipv4Addr, oid: &[u64]) -> Result<Option<SnmpValue>> {
            Ok(self.mib(ip).await?.get(oid).cloned())
        }

        async fn walk(
            &self,
            ip: Ipv4Addr,
            base: &[u64],
            max_rows: usize,
        ) -> Result<Vec<(Vec<u64>, SnmpValue)>> {
            let mib = self.mib(ip).await?;
            Ok(mib
                .range::<Vec<u64>, _>((Bound::Excluded(base.to_vec()), Bound::Unbounded))
                .take_while(|(oid, _)| oid.starts_with(base))
                .take(max_rows)
                .map(|(oid, value)| (oid.clone(), value.clone()))
                .collect())
        }
    }
}
