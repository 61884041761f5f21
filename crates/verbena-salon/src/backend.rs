//! The salon backend trait.

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{
    AvailabilityQuery, BookingRecord, BookingRequest, SalonProfile, ServiceInfo, TimeSlot,
};

/// Result type alias using the salon error type.
pub type Result<T> = std::result::Result<T, SalonError>;

/// Error type for salon backend operations.
#[derive(Debug, Error)]
pub enum SalonError {
    /// The supplied date could not be resolved.
    #[error("Invalid date '{0}': expected YYYY-MM-DD, 'today', or 'tomorrow'")]
    InvalidDate(String),

    /// No catalog service matches the request.
    #[error("Unknown service '{0}'")]
    UnknownService(String),

    /// The requested slot is already taken.
    #[error("Slot {time} on {date} is no longer available")]
    SlotUnavailable {
        /// Requested date.
        date: String,
        /// Requested time.
        time: String,
    },

    /// Upstream/backend failure.
    #[error("Salon backend error: {0}")]
    Backend(String),
}

/// Interface to the salon's domain data.
///
/// Implementations are stateless request/response collaborators from the
/// orchestration core's point of view; their internal correctness is their
/// own concern. The in-memory implementation in this crate is deterministic
/// so tests and demos behave reproducibly.
#[async_trait]
pub trait SalonBackend: Send + Sync {
    /// Find open slots matching an availability query.
    async fn check_availability(&self, query: &AvailabilityQuery) -> Result<Vec<TimeSlot>>;

    /// Create a booking, returning the confirmed record.
    async fn create_booking(&self, request: BookingRequest) -> Result<BookingRecord>;

    /// Look up a booking by booking id or confirmation code.
    async fn find_booking(&self, reference: &str) -> Result<Option<BookingRecord>>;

    /// Look up all bookings made with a phone number.
    async fn bookings_for_phone(&self, phone: &str) -> Result<Vec<BookingRecord>>;

    /// Search the service catalog. An empty query returns the full catalog.
    async fn search_services(&self, query: &str, limit: usize) -> Result<Vec<ServiceInfo>>;

    /// The salon profile and branch directory.
    async fn profile(&self) -> Result<SalonProfile>;
}
