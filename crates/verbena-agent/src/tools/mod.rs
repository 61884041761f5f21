//! Domain tools registered with the orchestration core.
//!
//! Each tool wraps one salon-domain operation behind the [`Tool`] trait with
//! a declared parameter schema. [`default_registry`] assembles the full
//! catalog the assistant ships with.

mod advice;
mod availability;
mod booking;
mod salons;
mod search;
mod services;

pub use advice::BeautyAdviceTool;
pub use availability::CheckAvailabilityTool;
pub use booking::{BookAppointmentTool, RetrieveBookingTool};
pub use salons::SearchSalonsTool;
pub use search::SemanticSearchTool;
pub use services::SearchServicesTool;

use std::sync::Arc;

use verbena_salon::{BeautyAdvisor, SalonBackend};
use verbena_suggest::SimilarityBackend;

use crate::error::Result;
use crate::tool::ToolRegistry;

/// Build the standard tool catalog over the given collaborators.
pub fn default_registry(
    salon: Arc<dyn SalonBackend>,
    index: Arc<dyn SimilarityBackend>,
    advisor: BeautyAdvisor,
) -> Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    registry.register(CheckAvailabilityTool::new(Arc::clone(&salon)))?;
    registry.register(BookAppointmentTool::new(Arc::clone(&salon)))?;
    registry.register(RetrieveBookingTool::new(Arc::clone(&salon)))?;
    registry.register(SearchServicesTool::new(Arc::clone(&salon)))?;
    registry.register(SearchSalonsTool::new(salon))?;
    registry.register(BeautyAdviceTool::new(advisor))?;
    registry.register(SemanticSearchTool::new(index))?;
    Ok(registry)
}
