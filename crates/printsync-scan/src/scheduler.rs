// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bounded fan-out of probes over a set of addresses.

use std::future::Future;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, instrument, warn};

use printsync_core::types::DeviceRecord;

use crate::prober::DeviceProber;
use crate::snmp::SnmpTransport;

/// Runs probes with at most `concurrency` in flight.
#[derive(Debug, Clone)]
pub struct NetworkScanner {
    concurrency: usize,
}

impl NetworkScanner {
    /// A ceiling of zero is raised to one.
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Probe every address and return the printers found, in completion
    /// order.
    pub async fn scan<T: SnmpTransport>(
        &self,
        prober: &DeviceProber<T>,
        addresses: Vec<Ipv4Addr>,
    ) -> Vec<DeviceRecord> {
        let prober = prober.clone();
        self.scan_with(addresses, move |ip| {
            let prober = prober.clone();
            async move { prober.probe(ip).await }
        })
        .await
    }

    /// Run `probe` for every address under the concurrency ceiling and
    /// keep the positive results. Every probe runs to completion; a
    /// panicking probe counts as no result.
    #[instrument(skip_all, fields(addresses = addresses.len(), concurrency = self.concurrency))]
    pub async fn scan_with<F, Fut, R>(&self, addresses: Vec<Ipv4Addr>, probe: F) -> Vec<R>
    where
        F: Fn(Ipv4Addr) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<R>> + Send + 'static,
        R: Send + 'static,
    {
        let started = Instant::now();
        let total = addresses.len();
        let permits = Arc::new(Semaphore::new(self.concurrency));
        let probe = Arc::new(probe);
        let mut tasks = JoinSet::new();

        for ip in addresses {
            let permits = Arc::clone(&permits);
            let probe = Arc::clone(&probe);
            tasks.spawn(async move {
                // The semaphore is never closed, so acquisition only fails
                // if that changes; treat it as a skipped probe.
                let _permit = permits.acquire_owned().await.ok()?;
                (*probe)(ip).await
            });
        }

        let mut found = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(result)) => found.push(result),
                Ok(None) => {}
                Err(e) => warn!(error = %e, "probe task failed"),
            }
        }

        info!(
            scanned = total,
            found = found.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "scan complete"
        );
        found
    }
}
