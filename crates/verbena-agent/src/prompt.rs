//! System prompt for the assistant persona.

use chrono::NaiveDate;

/// Base persona for the salon assistant.
const PERSONA: &str = "\
You are a friendly and knowledgeable beauty assistant for Verbena Beauty Lounge.

Your capabilities:
- Check appointment availability for beauty services
- Book appointments and retrieve existing bookings
- Provide information about services, pricing, and salon branches
- Offer beauty advice and treatment recommendations
- Answer general beauty-related questions

Guidelines:
- Be professional, warm, and concise
- Use the available tools whenever the customer asks about availability,
  bookings, services, salons, or wants advice; never invent slots or prices
- Resolve relative dates (like \"tomorrow\") to concrete dates before calling tools
- Focus on practical, actionable recommendations";

/// Build the default system prompt for a given date.
///
/// The current date is injected so the reasoning engine can resolve
/// relative dates in user requests before calling tools.
pub fn default_system_prompt(today: NaiveDate) -> String {
    format!(
        "{PERSONA}\n\nToday's date is {} ({}).",
        today.format("%Y-%m-%d"),
        today.format("%A"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_carries_the_date() {
        let prompt = default_system_prompt(NaiveDate::from_ymd_opt(2025, 7, 14).unwrap());
        assert!(prompt.contains("2025-07-14"));
        assert!(prompt.contains("Monday"));
        assert!(prompt.contains("beauty assistant"));
    }
}
