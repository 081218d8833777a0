use crate::services::clock::{Clock, SystemClock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

// `PAY<unix millis>-<sequence>`; only the sequence is unique.
pub struct IdGenerator {
    counter: AtomicU64,
    clock: Arc<dyn Clock>,
}

impl IdGenerator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        IdGenerator {
            counter: AtomicU64::new(0),
            clock,
        }
    }

    pub fn next_id(&self) -> String {
        let seq = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("PAY{}-{}", self.clock.now().timestamp_millis(), seq)
    }

    pub fn issued(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}
