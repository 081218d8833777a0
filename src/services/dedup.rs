use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DedupKey {
    student_id: String,
    amount: Decimal,
}

impl DedupKey {
    fn new(student_id: &str, amount: Decimal) -> Self {
        DedupKey {
            student_id: student_id.to_string(),
            amount: amount.round_dp(2).normalize(),
        }
    }
}

pub struct DuplicateFilter {
    window: Duration,
    accepted: DashMap<DedupKey, DateTime<Utc>>,
}

impl DuplicateFilter {
    pub fn new(window: std::time::Duration) -> Self {
        DuplicateFilter {
            window: Duration::from_std(window).unwrap_or_else(|_| Duration::days(36_500)),
            accepted: DashMap::new(),
        }
    }

    pub fn is_duplicate(&self, student_id: &str, amount: Decimal, at: DateTime<Utc>) -> bool {
        match self.accepted.get(&DedupKey::new(student_id, amount)) {
            Some(accepted_at) => at.signed_duration_since(*accepted_at) < self.window,
            None => false,
        }
    }

    pub fn record(&self, student_id: &str, amount: Decimal, at: DateTime<Utc>) {
        self.accepted.insert(DedupKey::new(student_id, amount), at);
    }

    /// Drops entries whose window has passed. Returns how many were removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.accepted.len();
        self.accepted
            .retain(|_, accepted_at| now.signed_duration_since(*accepted_at) < self.window);
        before - self.accepted.len()
    }

    pub fn len(&self) -> usize {
        self.accepted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }
}
