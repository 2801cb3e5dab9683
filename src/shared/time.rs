use chrono::{DateTime, Utc};

/// Clock trait for abstracting time operations
///
/// Command timestamps are generated by this service at request-acceptance
/// time, never by the store; injecting the clock keeps them deterministic
/// in tests.
pub trait Clock: Send + Sync {
    /// Get the current instant in UTC
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Production implementation of Clock using system time
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Test implementation of Clock with fixed/controllable time
#[derive(Debug, Clone)]
pub struct FixedClock {
    timestamp: DateTime<Utc>,
}

impl FixedClock {
    /// Create a new FixedClock with the given timestamp
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self { timestamp }
    }

    /// Create a FixedClock from an RFC3339 string
    pub fn from_rfc3339(timestamp_str: &str) -> Result<Self, chrono::ParseError> {
        let timestamp = DateTime::parse_from_rfc3339(timestamp_str)?.with_timezone(&Utc);
        Ok(Self { timestamp })
    }

    /// Advance time by the given number of seconds
    pub fn advance_seconds(&mut self, seconds: i64) {
        self.timestamp += chrono::Duration::seconds(seconds);
    }
}

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_returns_current_time() {
        let clock = SystemClock::new();
        let now = clock.now_utc();

        // After 2020-01-01 and before 2100-01-01
        assert!(now.timestamp() > 1_577_836_800);
        assert!(now.timestamp() < 4_102_444_800);
    }

    #[test]
    fn test_fixed_clock_is_deterministic() {
        let clock = FixedClock::from_rfc3339("2024-01-15T10:30:00Z").unwrap();
        assert_eq!(clock.now_utc(), clock.now_utc());
        assert_eq!(clock.now_utc().timestamp(), 1_705_314_600);
    }

    #[test]
    fn test_fixed_clock_advance_seconds() {
        let mut clock = FixedClock::from_rfc3339("2024-01-15T10:30:00Z").unwrap();
        let before = clock.now_utc();

        clock.advance_seconds(3600);
        assert_eq!(clock.now_utc() - before, chrono::Duration::seconds(3600));
    }

    #[test]
    fn test_clock_trait_object() {
        let clocks: Vec<Box<dyn Clock>> = vec![
            Box::new(SystemClock::new()),
            Box::new(FixedClock::from_rfc3339("2024-01-15T10:30:00Z").unwrap()),
        ];

        for clock in &clocks {
            let _ = clock.now_utc();
        }
    }
}
