//! history.rs — bounded in-memory log of past analyses for the "previous feedback" panel.
//! Owned by the HTTP layer; the pipeline itself keeps no state between calls.

use serde::Serialize;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::analyze::{Analysis, ResponseMode};
use crate::config::PlanTier;

const MAX_CAP: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub ts_unix: u64,
    pub product: String,
    pub plan: PlanTier,
    pub mode: ResponseMode,
    pub issue_count: usize,
}

#[derive(Debug)]
pub struct History {
    inner: Mutex<Vec<HistoryEntry>>,
    cap: usize,
}

impl History {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            inner: Mutex::new(Vec::with_capacity(cap.min(MAX_CAP))),
            cap: cap.min(MAX_CAP),
        }
    }

    pub fn push(&self, a: &Analysis) {
        let entry = HistoryEntry {
            ts_unix: now_unix(),
            product: a.product.clone(),
            plan: a.plan,
            mode: a.mode,
            issue_count: a.issues.len(),
        };

        // A poisoned lock only means another push panicked; the Vec is still usable.
        let mut v = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        v.push(entry);
        if v.len() > self.cap {
            let excess = v.len() - self.cap;
            v.drain(0..excess);
        }
    }

    /// Most recent `n` entries, oldest first.
    pub fn snapshot_last_n(&self, n: usize) -> Vec<HistoryEntry> {
        let v = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let start = v.len().saturating_sub(n);
        v[start..].to_vec()
    }
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
