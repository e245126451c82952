//! Gateway performance tuning constants and configuration defaults

/// Default SPMC market-event ring capacity (must be power of 2)
pub const DEFAULT_RING_CAPACITY: usize = 1 << 16; // 65,536 slots

/// Maximum SPMC ring capacity for heavy multi-symbol fan-out
pub const MAX_RING_CAPACITY: usize = 1 << 22; // ~4M slots

/// Default MPSC order-command queue capacity (must be power of 2)
pub const DEFAULT_QUEUE_CAPACITY: usize = 1 << 12; // 4,096 slots

/// Cache line size for alignment optimizations (64 bytes on most modern CPUs)
pub const CACHE_LINE_SIZE: usize = 64;

/// Padded sequence alignment (128 bytes): covers Intel's adjacent-cache-line
/// prefetch so producer and consumer sequences never share a fetched pair.
pub const SEQUENCE_ALIGNMENT: usize = 128;

/// Inline client-order-id buffer size carried inline in `OrderCommand`
pub const CLIENT_ORDER_ID_SIZE: usize = 32;

/// Default mmap journal page size (128 MiB)
pub const DEFAULT_JOURNAL_PAGE_SIZE: usize = 128 * 1024 * 1024;

/// Journal wire-format version
pub const JOURNAL_VERSION: u16 = 1;

/// System page size
pub const PAGE_SIZE: usize = 4096;

/// Huge page size (2MB on most systems)
pub const HUGE_PAGE_SIZE: usize = 2 * 1024 * 1024;

/// Default WebSocket application-layer ping cadence
pub const DEFAULT_PING_INTERVAL_SECS: u64 = 30;

/// Default WebSocket connect timeout
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Default REST call timeout
pub const DEFAULT_REST_TIMEOUT_SECS: u64 = 5;

/// Default user-data listen-key refresh cadence (server expiry is 60 min)
pub const DEFAULT_LISTEN_KEY_REFRESH_SECS: u64 = 1800;

/// Max listen-key refresh retries before forcing a user-stream reconnect
pub const MAX_LISTEN_KEY_REFRESH_RETRIES: u32 = 3;

/// Outbound subscription-replay throttle (messages per second)
pub const SUBSCRIBE_REPLAY_RATE_LIMIT: usize = 5;

/// Base reconnect backoff
pub const RECONNECT_BACKOFF_BASE_MS: u64 = 200;

/// Maximum reconnect backoff
pub const RECONNECT_BACKOFF_MAX_MS: u64 = 30_000;

/// Nanoseconds per second for throughput calculations
pub const NANOS_PER_SEC: f64 = 1_000_000_000.0;

/// Default CPU core for the market-data producer thread
pub const DEFAULT_PRODUCER_CPU_CORE: usize = 1;

/// Default CPU core for the journal writer / telemetry thread
pub const DEFAULT_JOURNAL_CPU_CORE: usize = 5;

/// Validate that all constants are properly configured
pub fn validate_constants() -> Result<(), &'static str> {
    if !DEFAULT_RING_CAPACITY.is_power_of_two() {
        return Err("DEFAULT_RING_CAPACITY must be a power of 2");
    }
    if !MAX_RING_CAPACITY.is_power_of_two() {
        return Err("MAX_RING_CAPACITY must be a power of 2");
    }
    if !DEFAULT_QUEUE_CAPACITY.is_power_of_two() {
        return Err("DEFAULT_QUEUE_CAPACITY must be a power of 2");
    }
    if CACHE_LINE_SIZE == 0 || !CACHE_LINE_SIZE.is_power_of_two() {
        return Err("CACHE_LINE_SIZE must be a power of 2");
    }
    if DEFAULT_JOURNAL_PAGE_SIZE % PAGE_SIZE != 0 {
        return Err("DEFAULT_JOURNAL_PAGE_SIZE must be a multiple of PAGE_SIZE");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_validation() {
        assert!(validate_constants().is_ok());
    }

    #[test]
    fn test_ring_and_queue_capacities_are_powers_of_two() {
        assert!(DEFAULT_RING_CAPACITY.is_power_of_two());
        assert!(MAX_RING_CAPACITY.is_power_of_two());
        assert!(DEFAULT_QUEUE_CAPACITY.is_power_of_two());
    }

    #[test]
    fn test_cache_line_size_is_power_of_two() {
        assert!(CACHE_LINE_SIZE.is_power_of_two());
        assert!(SEQUENCE_ALIGNMENT >= CACHE_LINE_SIZE);
    }
}
