//! Aggregate claim statistics for the scoring service.

use crate::types::prediction::{round_to, DecisionTier, ScoredClaim};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::info;

/// Recent claims kept for the dashboard feed
pub const RECENT_CLAIMS_CAP: usize = 20;

/// One entry in the recent claims feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentClaim {
    pub id: String,
    pub city: String,
    pub amount: i64,
    pub decision: DecisionTier,
    pub score: u8,
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total_claims: u64,
    pub fraudulent: u64,
    pub approved: u64,
    pub manual_review: u64,
    /// Percent of claims flagged, one decimal
    pub fraud_rate: f64,
    /// Sum of flagged claim amounts
    pub amount_saved: i64,
    /// Newest first
    pub recent_claims: Vec<RecentClaim>,
}

#[derive(Debug, Default)]
struct StatsState {
    total_claims: u64,
    fraudulent: u64,
    approved: u64,
    manual_review: u64,
    amount_saved: i64,
    recent: VecDeque<RecentClaim>,
}

/// Shared counters behind a single mutex.
///
/// Every update happens under one guard, so a snapshot never observes a
/// claim counted in the totals but missing from its tier.
pub struct ClaimStatsStore {
    state: Mutex<StatsState>,
    start_time: Instant,
}

impl ClaimStatsStore {
    /// Create a zeroed store
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StatsState::default()),
            start_time: Instant::now(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StatsState> {
        // counters stay consistent even if a holder panicked
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record a successfully scored claim
    pub fn record(&self, claim: &ScoredClaim, amount: i64) {
        let decision = claim.result.decision;
        let mut state = self.lock();

        state.total_claims += 1;
        match decision {
            DecisionTier::Flagged => {
                state.fraudulent += 1;
                state.amount_saved = state.amount_saved.saturating_add(amount);
            }
            DecisionTier::Review => state.manual_review += 1,
            DecisionTier::Approved => state.approved += 1,
        }

        state.recent.push_front(RecentClaim {
            id: claim.claim_id.clone(),
            city: claim.city.clone(),
            amount,
            decision,
            score: claim.result.fraud_score,
        });
        state.recent.truncate(RECENT_CLAIMS_CAP);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let state = self.lock();
        StatsSnapshot {
            total_claims: state.total_claims,
            fraudulent: state.fraudulent,
            approved: state.approved,
            manual_review: state.manual_review,
            fraud_rate: fraud_rate(state.fraudulent, state.total_claims),
            amount_saved: state.amount_saved,
            recent_claims: state.recent.iter().cloned().collect(),
        }
    }

    /// Claims scored per second since the store was created
    pub fn throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.lock().total_claims as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Log a summary of the counters
    pub fn log_summary(&self) {
        let snapshot = self.snapshot();
        info!(
            total = snapshot.total_claims,
            flagged = snapshot.fraudulent,
            review = snapshot.manual_review,
            approved = snapshot.approved,
            fraud_rate = snapshot.fraud_rate,
            amount_saved = snapshot.amount_saved,
            throughput = round_to(self.throughput(), 2),
            "Claim stats summary"
        );
    }
}

impl Default for ClaimStatsStore {
    fn default() -> Self {
        Self::new()
    }
}

/// `fraudulent / max(total, 1) * 100`, rounded to one decimal
pub fn fraud_rate(fraudulent: u64, total: u64) -> f64 {
    round_to(fraudulent as f64 / total.max(1) as f64 * 100.0, 1)
}

/// Periodically logs a stats summary
pub struct MetricsReporter {
    stats: Arc<ClaimStatsStore>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(stats: Arc<ClaimStatsStore>, interval_secs: u64) -> Self {
        Self {
            stats,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs.max(1)));
        // first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            self.stats.log_summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::prediction::PredictionResult;
    use proptest::prelude::*;

    fn scored(probability: f64, city: &str) -> ScoredClaim {
        ScoredClaim::new(PredictionResult::new(probability, Vec::new(), 1.0), city)
    }

    #[test]
    fn test_store_starts_zeroed() {
        let snapshot = ClaimStatsStore::new().snapshot();
        assert_eq!(snapshot, StatsSnapshot::default());
        assert_eq!(snapshot.fraud_rate, 0.0);
    }

    #[test]
    fn test_record_updates_tier_counters() {
        let store = ClaimStatsStore::new();
        store.record(&scored(0.9, "Columbus"), 80_000);
        store.record(&scored(0.5, "Arlington"), 12_000);
        store.record(&scored(0.1, "Riverwood"), 5_000);
        store.record(&scored(0.95, "Hillsdale"), 20_000);

        let snapshot = store.snapshot();
        assert_eq!(snapshot.total_claims, 4);
        assert_eq!(snapshot.fraudulent, 2);
        assert_eq!(snapshot.manual_review, 1);
        assert_eq!(snapshot.approved, 1);
        assert_eq!(snapshot.amount_saved, 100_000);
        assert_eq!(snapshot.fraud_rate, 50.0);
        assert_eq!(snapshot.recent_claims[0].city, "Hillsdale");
        assert_eq!(snapshot.recent_claims[0].decision, DecisionTier::Flagged);
        assert_eq!(snapshot.recent_claims[3].city, "Columbus");
    }

    #[test]
    fn test_fraud_rate() {
        assert_eq!(fraud_rate(0, 0), 0.0);
        assert_eq!(fraud_rate(1, 3), 33.3);
        assert_eq!(fraud_rate(2, 3), 66.7);
        assert_eq!(fraud_rate(5, 5), 100.0);
    }

    #[test]
    fn test_snapshot_serializes_recent_claims() {
        let store = ClaimStatsStore::new();
        store.record(&scored(0.9, "Columbus"), 61_000);

        let json = serde_json::to_value(store.snapshot()).unwrap();
        assert_eq!(json["recent_claims"][0]["decision"], "FLAGGED");
        assert_eq!(json["recent_claims"][0]["amount"], 61_000);
        assert_eq!(json["recent_claims"][0]["score"], 90);
    }

    #[test]
    fn test_concurrent_recording() {
        let store = Arc::new(ClaimStatsStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        store.record(&scored(0.2, "Columbus"), 1_000);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = store.snapshot();
        assert_eq!(snapshot.total_claims, 400);
        assert_eq!(snapshot.approved, 400);
        assert_eq!(snapshot.recent_claims.len(), RECENT_CLAIMS_CAP);
    }

    proptest! {
        #[test]
        fn prop_recent_claims_capped_newest_first(count in 0usize..60) {
            let store = ClaimStatsStore::new();
            let mut ids = Vec::new();
            for _ in 0..count {
                let claim = scored(0.4, "Springfield");
                ids.push(claim.claim_id.clone());
                store.record(&claim, 100);
            }

            let recent = store.snapshot().recent_claims;
            prop_assert_eq!(recent.len(), count.min(RECENT_CLAIMS_CAP));
            if let Some(last) = ids.last() {
                prop_assert_eq!(&recent[0].id, last);
            }
            let expected: Vec<&String> = ids.iter().rev().take(RECENT_CLAIMS_CAP).collect();
            let actual: Vec<&String> = recent.iter().map(|c| &c.id).collect();
            prop_assert_eq!(actual, expected);
        }
    }
}
