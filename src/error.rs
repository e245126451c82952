//! Error types and handling for the gateway core

use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Main error type for the gateway core
#[derive(Error, Debug)]
pub enum GatewayError {
    /// I/O errors from mmap journal / filesystem operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// SPMC ring is full relative to a lagging consumer (informational; the ring itself never blocks)
    #[error("ring buffer is full")]
    RingBufferFull,

    /// MPSC order-command queue rejected a push because every slot is unacknowledged
    #[error("order command queue is full")]
    QueueFull,

    /// Invalid configuration parameter
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration issue
        message: String,
    },

    /// WebSocket / TCP socket errors
    #[error("socket error: {message}")]
    Socket {
        /// Description of the socket issue
        message: String,
    },

    /// Inbound message failed to parse into a canonical event
    #[error("invalid message: {reason}")]
    InvalidMessage {
        /// Reason the message was rejected
        reason: String,
    },

    /// HMAC signing misuse (empty secret, non-UTF8 canonical string, etc.)
    #[error("signing error: {message}")]
    Signing {
        /// Description of the signing issue
        message: String,
    },

    /// Venue rejected an order with a business error code
    #[error("order rejected: {reason}")]
    OrderRejected {
        /// Venue-supplied rejection reason
        reason: String,
    },

    /// Venue REST/WS authentication failure (401, signature mismatch)
    #[error("authentication error: {message}")]
    Auth {
        /// Description of the authentication failure
        message: String,
    },

    /// The mmap journal page has no room left for the next frame
    #[error("journal page is full")]
    JournalFull,

    /// A journal frame failed its bounds or length check during a tail read
    #[error("corrupt journal frame at offset {offset}: {reason}")]
    CorruptFrame {
        /// Byte offset of the offending frame
        offset: u64,
        /// What failed validation
        reason: String,
    },

    /// System resource errors (mmap, affinity, numa)
    #[error("system resource error: {message}")]
    SystemResource {
        /// Description of the system resource issue
        message: String,
    },

    /// Serialization/deserialization errors
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of the serialization issue
        message: String,
    },

    /// CPU affinity errors
    #[error("CPU affinity error: {0}")]
    CpuAffinity(#[from] nix::Error),

    /// Registration attempted on the EventFabric while it is mid-dispatch
    #[error("cannot register a listener while the fabric is dispatching")]
    FabricBusy,

    /// Timeout errors (connect, REST call, wait_for)
    #[error("operation timed out")]
    Timeout,

    /// Generic error for conditions that should not occur in a correctly
    /// functioning gateway (capacity not a power of two, programming bugs).
    #[error("unexpected error: {message}")]
    Unexpected {
        /// Description of the unexpected condition
        message: String,
    },
}

impl GatewayError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig { message: message.into() }
    }

    /// Create a new socket error
    pub fn socket(message: impl Into<String>) -> Self {
        Self::Socket { message: message.into() }
    }

    /// Create a new message validation error
    pub fn invalid_message(reason: impl Into<String>) -> Self {
        Self::InvalidMessage { reason: reason.into() }
    }

    /// Create a new signing error
    pub fn signing(message: impl Into<String>) -> Self {
        Self::Signing { message: message.into() }
    }

    /// Create a new order-rejected error
    pub fn order_rejected(reason: impl Into<String>) -> Self {
        Self::OrderRejected { reason: reason.into() }
    }

    /// Create a new authentication error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth { message: message.into() }
    }

    /// Create a new corrupt-frame error
    pub fn corrupt_frame(offset: u64, reason: impl Into<String>) -> Self {
        Self::CorruptFrame { offset, reason: reason.into() }
    }

    /// Create a new system resource error
    pub fn system_resource(message: impl Into<String>) -> Self {
        Self::SystemResource { message: message.into() }
    }

    /// Create a new unexpected error
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected { message: message.into() }
    }

    /// Check if this error is recoverable by retry/reconnect
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::RingBufferFull
                | Self::QueueFull
                | Self::Timeout
                | Self::Socket { .. }
                | Self::Io(_)
                | Self::JournalFull
        )
    }

    /// Check if this error is related to system resources
    pub fn is_system_resource_error(&self) -> bool {
        matches!(self, Self::SystemResource { .. } | Self::CpuAffinity(_))
    }

    /// Check if this error is related to network operations
    pub fn is_network_error(&self) -> bool {
        matches!(self, Self::Socket { .. } | Self::Io(_) | Self::Timeout)
    }
}

/// Convenience macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::error::GatewayError::config(format!($($arg)*))
    };
}

/// Convenience macro for creating socket errors
#[macro_export]
macro_rules! socket_error {
    ($($arg:tt)*) => {
        $crate::error::GatewayError::socket(format!($($arg)*))
    };
}

/// Convenience macro for creating signing errors
#[macro_export]
macro_rules! signing_error {
    ($($arg:tt)*) => {
        $crate::error::GatewayError::signing(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = GatewayError::config("test message");
        assert!(matches!(err, GatewayError::InvalidConfig { .. }));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_error_classification() {
        let ring_full = GatewayError::RingBufferFull;
        assert!(ring_full.is_recoverable());
        assert!(!ring_full.is_system_resource_error());
        assert!(!ring_full.is_network_error());

        let auth_err = GatewayError::auth("signature mismatch");
        assert!(!auth_err.is_recoverable());

        let socket_err = GatewayError::socket("connection refused");
        assert!(socket_err.is_recoverable());
        assert!(socket_err.is_network_error());
    }

    #[test]
    fn test_error_macros() {
        let err = config_error!("invalid value: {}", 42);
        assert!(matches!(err, GatewayError::InvalidConfig { .. }));

        let err = socket_error!("port {} is busy", 8080);
        assert!(matches!(err, GatewayError::Socket { .. }));
    }
}
