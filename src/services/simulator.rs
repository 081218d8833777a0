use crate::config::ServiceConfig;
use crate::domain::payment::Submission;
use crate::error::{FeeError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use std::time::Duration;

pub struct Simulator {
    gateway_delay: Duration,
    gateway_failure_rate: f64,
    report_delay: Duration,
    report_failure_rate: f64,
    rng: Mutex<StdRng>,
}

impl Simulator {
    pub fn from_config(config: &ServiceConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Simulator {
            gateway_delay: config.gateway_delay,
            gateway_failure_rate: config.gateway_failure_rate,
            report_delay: config.report_delay,
            report_failure_rate: config.report_failure_rate,
            rng: Mutex::new(rng),
        }
    }

    fn roll(&self) -> f64 {
        self.rng
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .gen::<f64>()
    }

    /// Base delay plus up to 50% jitter.
    fn jittered(&self, base: Duration) -> Duration {
        if base.is_zero() {
            return base;
        }
        base + base.mul_f64(self.roll() * 0.5)
    }

    pub async fn charge(&self, submission: &Submission) -> Result<()> {
        tokio::time::sleep(self.jittered(self.gateway_delay)).await;

        if self.roll() < self.gateway_failure_rate {
            let err = if self.roll() < 0.5 {
                FeeError::network().with_message("Payment gateway timed out")
            } else {
                FeeError::payment_processing("Payment gateway declined the transaction")
            };
            log::debug!(
                "Gateway failure injected: student={}, amount={}, code={}",
                submission.student_id,
                submission.amount,
                err.code()
            );
            return Err(err);
        }
        Ok(())
    }

    pub async fn query_reports(&self) -> Result<()> {
        tokio::time::sleep(self.jittered(self.report_delay)).await;

        if self.roll() < self.report_failure_rate {
            return Err(FeeError::database().with_message("Report generation failed"));
        }
        Ok(())
    }
}
