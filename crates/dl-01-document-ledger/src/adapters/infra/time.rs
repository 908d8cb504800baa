use crate::ports::outbound::TimeSource;
use shared_types::Timestamp;

/// Default time source using system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Time source pinned to one instant. Used by tests and replay tooling.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource(pub Timestamp);

impl TimeSource for FixedTimeSource {
    fn now(&self) -> Timestamp {
        self.0
    }
}
