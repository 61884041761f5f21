//! Salon domain collaborators for Verbena.
//!
//! This crate holds the structured records and backends the conversational
//! core's tools talk to:
//!
//! - [`types`]: availability, booking, service, and directory records
//! - [`backend`]: the [`SalonBackend`] trait and error type
//! - [`memory`]: [`InMemorySalon`], a deterministic seeded implementation
//! - [`advice`]: the [`BeautyAdvisor`] advice generator

pub mod advice;
pub mod backend;
pub mod memory;
pub mod types;

pub use advice::{Advice, BeautyAdvisor};
pub use backend::{Result, SalonBackend, SalonError};
pub use memory::InMemorySalon;
pub use types::{
    AvailabilityQuery, BookingRecord, BookingRequest, BookingStatus, Branch, CustomerInfo,
    SalonProfile, ServiceInfo, TimeSlot, resolve_date,
};
