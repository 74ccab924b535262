//! Summary of one scan run, as printed by the CLI.

use super::outcome::{ProbeOutcome, ProbeStatus};
use crate::types::AddressFamilyPolicy;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A finished scan with timing and counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// When the scan was started.
    pub started_at: DateTime<Utc>,
    /// When the scan completed.
    pub completed_at: DateTime<Utc>,
    /// Address family policy in effect.
    pub policy: AddressFamilyPolicy,
    /// Number of distinct hosts requested.
    pub hosts_requested: usize,
    /// Number of addresses probed.
    pub addresses_probed: usize,
    pub alive: usize,
    pub unreachable: usize,
    /// Total scan duration in milliseconds.
    pub duration_ms: u64,
    pub outcomes: Vec<ProbeOutcome>,
}

impl ScanReport {
    /// Start a report for `hosts`. Repeated names count once.
    pub fn new<T: AsRef<str>>(policy: AddressFamilyPolicy, hosts: &[T]) -> Self {
        let hosts_requested = hosts.iter().map(T::as_ref).collect::<HashSet<&str>>().len();
        let now = Utc::now();
        Self {
            started_at: now,
            completed_at: now,
            policy,
            hosts_requested,
            addresses_probed: 0,
            alive: 0,
            unreachable: 0,
            duration_ms: 0,
            outcomes: Vec::new(),
        }
    }

    /// Finalize the report with the scan's outcomes.
    pub fn finalize(mut self, outcomes: Vec<ProbeOutcome>) -> Self {
        self.completed_at = Utc::now();
        self.duration_ms = (self.completed_at - self.started_at)
            .num_milliseconds()
            .max(0) as u64;
        self.addresses_probed = outcomes.len();
        self.alive = outcomes
            .iter()
            .filter(|o| o.status == ProbeStatus::Alive)
            .count();
        self.unreachable = self.addresses_probed - self.alive;
        self.outcomes = outcomes;
        self
    }

    /// Hosts with at least one probed address.
    pub fn hosts_probed(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| o.hostname.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Hosts skipped because nothing resolved under the policy.
    pub fn hosts_skipped(&self) -> usize {
        self.hosts_requested.saturating_sub(self.hosts_probed())
    }

    /// Get a short summary of the scan.
    pub fn summary(&self) -> String {
        format!(
            "{} hosts, {} addresses: {} alive, {} unreachable, {} skipped [{:.2}s]",
            self.hosts_requested,
            self.addresses_probed,
            self.alive,
            self.unreachable,
            self.hosts_skipped(),
            self.duration_ms as f64 / 1000.0
        )
    }
}
