use chrono::Utc;

pub const TRACKING_ID_PREFIX: &str = "HX-";

/// Source of wall-clock milliseconds for id generation.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Builds `HX-` + 8-digit zero-padded order id + last four digits of the epoch millis.
///
/// Collisions inside the same millisecond window are possible; the store's
/// uniqueness check is the real guard.
pub struct TrackingIdGenerator {
    clock: Box<dyn Clock>,
}

impl TrackingIdGenerator {
    pub fn new(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Box::new(clock),
        }
    }

    pub fn generate(&self, order_id: i64) -> String {
        format_tracking_id(order_id, self.clock.now_millis())
    }
}

impl Default for TrackingIdGenerator {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

pub fn format_tracking_id(order_id: i64, epoch_millis: i64) -> String {
    let jitter = epoch_millis.rem_euclid(10_000);
    format!("{TRACKING_ID_PREFIX}{order_id:08}{jitter:04}")
}
