//! Salon domain types.
//!
//! Structured records exchanged with the domain collaborators: availability
//! slots, bookings, services, and the salon directory.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Availability
// ─────────────────────────────────────────────────────────────────────────────

/// A user's availability query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AvailabilityQuery {
    /// The service the customer wants (free-text, matched against the catalog).
    pub service: String,
    /// Requested date: `YYYY-MM-DD`, `today`, or `tomorrow`.
    pub date: String,
    /// Optional preferred time of day (`HH:MM`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    /// Optional branch code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// An open appointment slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Slot start time (`HH:MM`).
    pub time: String,
    /// Resolved date (`YYYY-MM-DD`).
    pub date: String,
    /// Service the slot is for.
    pub service: String,
    /// Slot length in minutes.
    pub duration_minutes: u32,
    /// Price for the service at this slot.
    pub price: f64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Bookings
// ─────────────────────────────────────────────────────────────────────────────

/// Customer contact details attached to a booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerInfo {
    /// Customer name.
    pub name: String,
    /// Contact phone number.
    pub phone: String,
    /// Optional email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A request to create an appointment booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    /// The service to book (matched against the catalog).
    pub service: String,
    /// Requested date: `YYYY-MM-DD`, `today`, or `tomorrow`.
    pub date: String,
    /// Requested time (`HH:MM`).
    pub time: String,
    /// Customer details.
    pub customer: CustomerInfo,
    /// Optional branch code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Free-text special requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Status of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

/// A confirmed booking record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRecord {
    /// Generated booking id (`BK…`).
    pub booking_id: String,
    /// Short confirmation code the customer quotes to retrieve the booking.
    pub confirmation_code: String,
    /// Booking status.
    pub status: BookingStatus,
    /// Booked service name (canonical catalog name).
    pub service: String,
    /// Booked date (`YYYY-MM-DD`).
    pub date: String,
    /// Booked time (`HH:MM`).
    pub time: String,
    /// Service price at booking time.
    pub price: f64,
    /// Customer details.
    pub customer: CustomerInfo,
    /// Free-text special requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Services & Directory
// ─────────────────────────────────────────────────────────────────────────────

/// A service offered by the salon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    /// Stable service id (`SRV…`).
    pub service_id: String,
    /// Display name.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Typical duration in minutes.
    pub duration_minutes: u32,
    /// Price.
    pub price: f64,
    /// Category (hair, skin, nails, spa).
    pub category: String,
}

/// A salon branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    /// Branch code (`CN…`).
    pub code: String,
    /// Branch name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Contact phone.
    pub phone: String,
    /// Opening time (`HH:MM`).
    pub open_from: String,
    /// Closing time (`HH:MM`).
    pub open_to: String,
}

/// The salon and its branches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalonProfile {
    /// Salon display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// All branches.
    pub branches: Vec<Branch>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Date resolution
// ─────────────────────────────────────────────────────────────────────────────

/// Resolve a user-supplied date string to a concrete date.
///
/// Accepts `YYYY-MM-DD`, `today`, and `tomorrow`. Relative dates are resolved
/// against `reference`.
pub fn resolve_date(input: &str, reference: NaiveDate) -> Option<NaiveDate> {
    match input.trim().to_lowercase().as_str() {
        "today" => Some(reference),
        "tomorrow" => reference.succ_opt(),
        other => NaiveDate::parse_from_str(other, "%Y-%m-%d").ok(),
    }
}
