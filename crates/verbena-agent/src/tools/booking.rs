//! Booking creation and retrieval tools.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;

use verbena_salon::{BookingRequest, CustomerInfo, SalonBackend, SalonError};

use crate::error::{AgentError, Result};
use crate::tool::{ParamKind, ParameterSchema, Tool, ToolOutput};

// ─────────────────────────────────────────────────────────────────────────────
// Book Appointment
// ─────────────────────────────────────────────────────────────────────────────

/// Tool creating a new appointment booking.
pub struct BookAppointmentTool {
    salon: Arc<dyn SalonBackend>,
}

impl BookAppointmentTool {
    /// Create the tool over a salon backend.
    pub fn new(salon: Arc<dyn SalonBackend>) -> Self {
        Self { salon }
    }
}

#[async_trait]
impl Tool for BookAppointmentTool {
    fn name(&self) -> &str {
        "book_appointment"
    }

    fn description(&self) -> &str {
        "Create a new appointment booking. Requires the service, date, time, and the customer's name and phone number. Returns the booking id and confirmation code."
    }

    fn schema(&self) -> ParameterSchema {
        ParameterSchema::new()
            .required("service", ParamKind::String, "Service to book")
            .required("date", ParamKind::String, "Date: YYYY-MM-DD, 'today', or 'tomorrow'")
            .required("time", ParamKind::String, "Time, HH:MM")
            .required("customer_name", ParamKind::String, "Customer's full name")
            .required("customer_phone", ParamKind::String, "Customer's phone number")
            .optional("customer_email", ParamKind::String, "Customer's email address")
            .optional("branch", ParamKind::String, "Branch code")
            .optional("notes", ParamKind::String, "Special requests")
    }

    async fn invoke(&self, args: Value) -> Result<ToolOutput> {
        let request = BookingRequest {
            service: args["service"].as_str().unwrap_or_default().to_string(),
            date: args["date"].as_str().unwrap_or_default().to_string(),
            time: args["time"].as_str().unwrap_or_default().to_string(),
            customer: CustomerInfo {
                name: args["customer_name"].as_str().unwrap_or_default().to_string(),
                phone: args["customer_phone"].as_str().unwrap_or_default().to_string(),
                email: args["customer_email"].as_str().map(String::from),
            },
            branch: args["branch"].as_str().map(String::from),
            notes: args["notes"].as_str().map(String::from),
        };

        match self.salon.create_booking(request).await {
            Ok(record) => Ok(ToolOutput::json(json!({ "booking": record }))),
            Err(
                e @ (SalonError::UnknownService(_)
                | SalonError::InvalidDate(_)
                | SalonError::SlotUnavailable { .. }),
            ) => Ok(ToolOutput::error(e.to_string())),
            Err(e) => Err(AgentError::tool_failed(self.name(), e.to_string())),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Retrieve Booking
// ─────────────────────────────────────────────────────────────────────────────

/// Tool looking up existing bookings by reference or phone number.
pub struct RetrieveBookingTool {
    salon: Arc<dyn SalonBackend>,
}

impl RetrieveBookingTool {
    /// Create the tool over a salon backend.
    pub fn new(salon: Arc<dyn SalonBackend>) -> Self {
        Self { salon }
    }
}

#[async_trait]
impl Tool for RetrieveBookingTool {
    fn name(&self) -> &str {
        "retrieve_booking"
    }

    fn description(&self) -> &str {
        "Retrieve existing booking information by booking id, confirmation code, or the customer's phone number."
    }

    fn schema(&self) -> ParameterSchema {
        ParameterSchema::new()
            .optional("reference", ParamKind::String, "Booking id or confirmation code")
            .optional("phone", ParamKind::String, "Customer phone number to search by")
    }

    async fn invoke(&self, args: Value) -> Result<ToolOutput> {
        let reference = args["reference"].as_str().filter(|s| !s.trim().is_empty());
        let phone = args["phone"].as_str().filter(|s| !s.trim().is_empty());

        if let Some(reference) = reference {
            let found = self
                .salon
                .find_booking(reference)
                .await
                .map_err(|e| AgentError::tool_failed(self.name(), e.to_string()))?;
            return Ok(match found {
                Some(record) => ToolOutput::json(json!({ "booking": record })),
                None => ToolOutput::text(format!("No booking found for '{reference}'.")),
            });
        }

        if let Some(phone) = phone {
            let bookings = self
                .salon
                .bookings_for_phone(phone)
                .await
                .map_err(|e| AgentError::tool_failed(self.name(), e.to_string()))?;
            return Ok(if bookings.is_empty() {
                ToolOutput::text("No bookings found for that phone number.".to_string())
            } else {
                ToolOutput::json(json!({ "bookings": bookings }))
            });
        }

        Ok(ToolOutput::error(
            "provide a booking id, confirmation code, or phone number",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use verbena_salon::InMemorySalon;

    fn salon() -> Arc<InMemorySalon> {
        Arc::new(
            InMemorySalon::new().with_reference_date(NaiveDate::from_ymd_opt(2025, 7, 14).unwrap()),
        )
    }

    fn booking_args() -> Value {
        json!({
            "service": "haircut",
            "date": "tomorrow",
            "time": "10:00",
            "customer_name": "Linh Tran",
            "customer_phone": "0589956650",
        })
    }

    #[tokio::test]
    async fn test_book_then_retrieve_by_code() {
        let salon = salon();
        let book = BookAppointmentTool::new(salon.clone());
        let retrieve = RetrieveBookingTool::new(salon);

        let output = book.invoke(booking_args()).await.unwrap();
        let code = match &output {
            ToolOutput::Json { content } => content["booking"]["confirmation_code"]
                .as_str()
                .unwrap()
                .to_string(),
            other => panic!("expected JSON output, got {other:?}"),
        };

        let found = retrieve
            .invoke(json!({"reference": code}))
            .await
            .unwrap();
        match found {
            ToolOutput::Json { content } => {
                assert_eq!(content["booking"]["service"], "Haircut");
            }
            other => panic!("expected JSON output, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_retrieve_by_phone() {
        let salon = salon();
        BookAppointmentTool::new(salon.clone())
            .invoke(booking_args())
            .await
            .unwrap();

        let output = RetrieveBookingTool::new(salon)
            .invoke(json!({"phone": "0589 956 650"}))
            .await
            .unwrap();
        match output {
            ToolOutput::Json { content } => {
                assert_eq!(content["bookings"].as_array().unwrap().len(), 1);
            }
            other => panic!("expected JSON output, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_retrieve_without_identifier_is_soft_error() {
        let output = RetrieveBookingTool::new(salon())
            .invoke(json!({}))
            .await
            .unwrap();
        assert!(output.is_error());
    }

    #[tokio::test]
    async fn test_double_booking_is_soft_error() {
        let salon = salon();
        let book = BookAppointmentTool::new(salon);
        book.invoke(booking_args()).await.unwrap();

        let output = book.invoke(booking_args()).await.unwrap();
        assert!(output.is_error());
        assert!(output.to_llm_content().contains("no longer available"));
    }
}
