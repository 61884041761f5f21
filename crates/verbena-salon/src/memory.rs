//! Deterministic in-memory salon backend.
//!
//! Seeded with a small catalog and branch directory; bookings live in a
//! process-local ledger. Slot generation is a pure function of the catalog,
//! opening hours, and existing bookings, so tests and demos are reproducible.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, Timelike, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::backend::{Result, SalonBackend, SalonError};
use crate::types::{
    AvailabilityQuery, BookingRecord, BookingRequest, BookingStatus, Branch, SalonProfile,
    ServiceInfo, TimeSlot, resolve_date,
};

/// Maximum slots returned per availability query.
const MAX_SLOTS: usize = 6;

/// In-memory salon backend with a seeded catalog and booking ledger.
pub struct InMemorySalon {
    profile: SalonProfile,
    services: Vec<ServiceInfo>,
    bookings: Mutex<Vec<BookingRecord>>,
    /// Reference date for resolving `today`/`tomorrow`; fixed in tests.
    reference_date: Option<NaiveDate>,
}

impl InMemorySalon {
    /// Create a backend seeded with the default catalog and branches.
    pub fn new() -> Self {
        Self {
            profile: default_profile(),
            services: default_services(),
            bookings: Mutex::new(Vec::new()),
            reference_date: None,
        }
    }

    /// Pin the reference date used to resolve relative dates.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    fn today(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Utc::now().date_naive())
    }

    /// Match a free-text service name against the catalog.
    fn resolve_service(&self, name: &str) -> Option<&ServiceInfo> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.services.iter().find(|s| {
            let n = s.name.to_lowercase();
            n == needle || n.contains(&needle) || needle.contains(&n)
        })
    }

    fn branch(&self, code: Option<&str>) -> &Branch {
        code.and_then(|c| self.profile.branches.iter().find(|b| b.code == c))
            .unwrap_or(&self.profile.branches[0])
    }
}

impl Default for InMemorySalon {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SalonBackend for InMemorySalon {
    async fn check_availability(&self, query: &AvailabilityQuery) -> Result<Vec<TimeSlot>> {
        let service = self
            .resolve_service(&query.service)
            .ok_or_else(|| SalonError::UnknownService(query.service.clone()))?;
        let date = resolve_date(&query.date, self.today())
            .ok_or_else(|| SalonError::InvalidDate(query.date.clone()))?;
        let date_str = date.format("%Y-%m-%d").to_string();
        let branch = self.branch(query.branch.as_deref());

        let open = parse_time(&branch.open_from).unwrap_or_else(|| hm(9, 0));
        let close = parse_time(&branch.open_to).unwrap_or_else(|| hm(18, 0));

        let booked: Vec<String> = {
            let ledger = self.bookings.lock();
            ledger
                .iter()
                .filter(|b| {
                    b.status == BookingStatus::Confirmed
                        && b.date == date_str
                        && b.service == service.name
                })
                .map(|b| b.time.clone())
                .collect()
        };

        // Hourly grid between opening hours, minus already-booked times.
        let mut slots = Vec::new();
        let mut at = open;
        while at < close && slots.len() < MAX_SLOTS {
            let time = format!("{:02}:{:02}", at.hour(), at.minute());
            let after_preference = query
                .time
                .as_deref()
                .and_then(parse_time)
                .map(|preferred| at >= preferred)
                .unwrap_or(true);
            if after_preference && !booked.contains(&time) {
                slots.push(TimeSlot {
                    time,
                    date: date_str.clone(),
                    service: service.name.clone(),
                    duration_minutes: service.duration_minutes,
                    price: service.price,
                });
            }
            at = at
                .overflowing_add_signed(chrono::Duration::hours(1))
                .0;
            if at == open {
                break;
            }
        }

        tracing::debug!(
            service = %service.name,
            date = %date_str,
            open_slots = slots.len(),
            "Availability computed"
        );

        Ok(slots)
    }

    async fn create_booking(&self, request: BookingRequest) -> Result<BookingRecord> {
        let service = self
            .resolve_service(&request.service)
            .ok_or_else(|| SalonError::UnknownService(request.service.clone()))?;
        let date = resolve_date(&request.date, self.today())
            .ok_or_else(|| SalonError::InvalidDate(request.date.clone()))?;
        let date_str = date.format("%Y-%m-%d").to_string();
        let time = parse_time(&request.time)
            .map(|t| format!("{:02}:{:02}", t.hour(), t.minute()))
            .ok_or_else(|| SalonError::InvalidDate(request.time.clone()))?;

        let mut ledger = self.bookings.lock();

        let taken = ledger.iter().any(|b| {
            b.status == BookingStatus::Confirmed
                && b.date == date_str
                && b.time == time
                && b.service == service.name
        });
        if taken {
            return Err(SalonError::SlotUnavailable {
                date: date_str,
                time,
            });
        }

        let uuid = Uuid::new_v4().simple().to_string().to_uppercase();
        let record = BookingRecord {
            booking_id: format!("BK{}{}", date.format("%Y%m%d"), &uuid[..8]),
            confirmation_code: format!("VC{}", &uuid[8..14]),
            status: BookingStatus::Confirmed,
            service: service.name.clone(),
            date: date_str,
            time,
            price: service.price,
            customer: request.customer,
            notes: request.notes,
        };

        tracing::info!(
            booking_id = %record.booking_id,
            service = %record.service,
            date = %record.date,
            time = %record.time,
            "Booking created"
        );

        ledger.push(record.clone());
        Ok(record)
    }

    async fn find_booking(&self, reference: &str) -> Result<Option<BookingRecord>> {
        let needle = reference.trim().to_uppercase();
        let ledger = self.bookings.lock();
        Ok(ledger
            .iter()
            .find(|b| b.booking_id == needle || b.confirmation_code == needle)
            .cloned())
    }

    async fn bookings_for_phone(&self, phone: &str) -> Result<Vec<BookingRecord>> {
        let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            return Ok(Vec::new());
        }
        let ledger = self.bookings.lock();
        Ok(ledger
            .iter()
            .filter(|b| {
                let booked: String = b
                    .customer
                    .phone
                    .chars()
                    .filter(|c| c.is_ascii_digit())
                    .collect();
                booked == digits
            })
            .cloned()
            .collect())
    }

    async fn search_services(&self, query: &str, limit: usize) -> Result<Vec<ServiceInfo>> {
        let needle = query.trim().to_lowercase();
        let matches: Vec<ServiceInfo> = self
            .services
            .iter()
            .filter(|s| {
                needle.is_empty()
                    || s.name.to_lowercase().contains(&needle)
                    || s.description.to_lowercase().contains(&needle)
                    || s.category.to_lowercase().contains(&needle)
            })
            .take(limit)
            .cloned()
            .collect();
        Ok(matches)
    }

    async fn profile(&self) -> Result<SalonProfile> {
        Ok(self.profile.clone())
    }
}

fn parse_time(input: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(input.trim(), "%H:%M").ok()
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// Seed data
// ─────────────────────────────────────────────────────────────────────────────

fn default_profile() -> SalonProfile {
    SalonProfile {
        name: "Verbena Beauty Lounge".to_string(),
        email: "hello@verbena.salon".to_string(),
        branches: vec![
            Branch {
                code: "CN0001".to_string(),
                name: "Verbena Downtown".to_string(),
                address: "20 Mai Lao Bang".to_string(),
                phone: "0589956650".to_string(),
                open_from: "09:00".to_string(),
                open_to: "18:00".to_string(),
            },
            Branch {
                code: "CN0002".to_string(),
                name: "Verbena Riverside".to_string(),
                address: "45 Riverside Avenue".to_string(),
                phone: "0589956651".to_string(),
                open_from: "10:00".to_string(),
                open_to: "20:00".to_string(),
            },
        ],
    }
}

fn default_services() -> Vec<ServiceInfo> {
    let seed = [
        ("SRV001", "Haircut", "Wash, cut, and finish with a senior stylist", 45, 35.0, "hair"),
        ("SRV002", "Coloring", "Full-head color with gloss treatment", 120, 110.0, "hair"),
        ("SRV003", "Styling", "Blow-dry and event styling", 40, 30.0, "hair"),
        ("SRV004", "Hair Treatment", "Deep conditioning keratin treatment", 60, 65.0, "hair"),
        ("SRV005", "Facial", "Hydrating facial with massage", 60, 55.0, "skin"),
        ("SRV006", "Manicure", "Classic manicure with polish", 40, 25.0, "nails"),
        ("SRV007", "Pedicure", "Spa pedicure with exfoliation", 50, 32.0, "nails"),
        ("SRV008", "Massage", "Full-body relaxation massage", 60, 70.0, "spa"),
    ];
    seed.into_iter()
        .map(
            |(id, name, description, duration, price, category)| ServiceInfo {
                service_id: id.to_string(),
                name: name.to_string(),
                description: description.to_string(),
                duration_minutes: duration,
                price,
                category: category.to_string(),
            },
        )
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
