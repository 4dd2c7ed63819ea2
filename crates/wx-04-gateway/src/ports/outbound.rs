//! Outbound ports for the message gateway.

/// Time source trait for testability
pub trait TimeSource: Send + Sync {
    /// Unix seconds, used as the reply `CreateTime`.
    fn now(&self) -> u64;
}

/// System time implementation
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            // Clock before Unix epoch - return 0 rather than panic
            .unwrap_or(0)
    }
}
