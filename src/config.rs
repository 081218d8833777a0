use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub max_amount: Decimal,
    pub dedup_window: Duration,
    pub gateway_delay: Duration,
    pub gateway_failure_rate: f64,
    pub report_delay: Duration,
    pub report_failure_rate: f64,
    pub rng_seed: Option<u64>,
    pub bind_addr: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            max_amount: dec!(100000),
            dedup_window: Duration::from_secs(5 * 60),
            gateway_delay: Duration::from_millis(1000),
            gateway_failure_rate: 0.1,
            report_delay: Duration::from_millis(3000),
            report_failure_rate: 0.0,
            rng_seed: None,
            bind_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

impl ServiceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn demo() -> Self {
        Self::default()
    }

    /// No simulated latency and no injected failures.
    pub fn instant() -> Self {
        ServiceConfig {
            gateway_delay: Duration::ZERO,
            gateway_failure_rate: 0.0,
            report_delay: Duration::ZERO,
            report_failure_rate: 0.0,
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(bind) = env::var("SCHOOL_FEES_BIND") {
            if !bind.trim().is_empty() {
                config.bind_addr = bind.trim().to_string();
            }
        }
        if let Some(ms) = parse_env::<u64>("SCHOOL_FEES_GATEWAY_DELAY_MS").filter(|v| *v <= 60_000) {
            config.gateway_delay = Duration::from_millis(ms);
        }
        if let Some(rate) = parse_env::<f64>("SCHOOL_FEES_FAILURE_RATE").filter(|v| (0.0..=1.0).contains(v)) {
            config.gateway_failure_rate = rate;
        }
        if let Some(ms) = parse_env::<u64>("SCHOOL_FEES_REPORT_DELAY_MS").filter(|v| *v <= 60_000) {
            config.report_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = parse_env::<u64>("SCHOOL_FEES_DEDUP_WINDOW_SECS") {
            config.dedup_window = Duration::from_secs(secs);
        }
        config.rng_seed = parse_env::<u64>("SCHOOL_FEES_SEED");

        config
    }

    pub fn with_max_amount(mut self, max: Decimal) -> Self {
        self.max_amount = max;
        self
    }

    pub fn with_dedup_window(mut self, window: Duration) -> Self {
        self.dedup_window = window;
        self
    }

    pub fn with_gateway_delay(mut self, delay: Duration) -> Self {
        self.gateway_delay = delay;
        self
    }

    pub fn with_gateway_failure_rate(mut self, rate: f64) -> Self {
        self.gateway_failure_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_report_delay(mut self, delay: Duration) -> Self {
        self.report_delay = delay;
        self
    }

    pub fn with_report_failure_rate(mut self, rate: f64) -> Self {
        self.report_failure_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn with_bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = addr.into();
        self
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse::<T>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServiceConfig::default();
        assert_eq!(config.max_amount, dec!(100000));
        assert_eq!(config.dedup_window, Duration::from_secs(300));
        assert!(config.gateway_failure_rate > 0.0);
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_builder_pattern() {
        let config = ServiceConfig::new()
            .with_max_amount(dec!(500))
            .with_gateway_failure_rate(1.5)
            .with_seed(7);

        assert_eq!(config.max_amount, dec!(500));
        assert_eq!(config.gateway_failure_rate, 1.0);
        assert_eq!(config.rng_seed, Some(7));
    }

    #[test]
    fn test_instant_config() {
        let config = ServiceConfig::instant();
        assert_eq!(config.gateway_delay, Duration::ZERO);
        assert_eq!(config.report_delay, Duration::ZERO);
        assert_eq!(config.gateway_failure_rate, 0.0);
        assert_eq!(config.max_amount, dec!(100000));
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        env::set_var("SCHOOL_FEES_TEST_GARBAGE", "not-a-number");
        assert_eq!(parse_env::<u64>("SCHOOL_FEES_TEST_GARBAGE"), None);
        env::set_var("SCHOOL_FEES_TEST_NUMBER", " 42 ");
        assert_eq!(parse_env::<u64>("SCHOOL_FEES_TEST_NUMBER"), Some(42));
    }
}
