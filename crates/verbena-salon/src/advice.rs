//! Beauty advice generation.
//!
//! A curated, deterministic advice catalog keyed by concern keywords. The
//! reasoning engine turns these structured entries into conversational
//! recommendations.

use serde::{Deserialize, Serialize};

/// A structured piece of beauty advice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Advice {
    /// Concern category (skin, hair, nails, body, general).
    pub category: String,
    /// The matched concern keyword, or the raw concern if none matched.
    pub topic: String,
    /// Practical recommendations.
    pub recommendations: Vec<String>,
    /// Catalog services worth suggesting.
    pub suggested_services: Vec<String>,
    /// Aftercare and maintenance tips.
    pub aftercare: Vec<String>,
}

/// Deterministic keyword-driven beauty advisor.
#[derive(Debug, Clone, Default)]
pub struct BeautyAdvisor;

/// Concern keywords per category, checked in order.
const SKIN_CONCERNS: &[&str] = &[
    "acne", "pimples", "breakouts", "wrinkles", "aging", "dark spots", "pigmentation", "dryness",
    "oily skin", "sensitive skin", "blackheads",
];
const HAIR_CONCERNS: &[&str] = &[
    "hair loss", "thinning hair", "dandruff", "oily hair", "dry hair", "frizzy hair",
    "split ends", "hair color", "grey hair", "hair growth",
];
const NAIL_CONCERNS: &[&str] = &["brittle nails", "nail growth", "cuticles", "nail health"];
const BODY_CONCERNS: &[&str] = &["cellulite", "stretch marks", "body acne", "tension", "stress"];

impl BeautyAdvisor {
    /// Create a new advisor.
    pub fn new() -> Self {
        Self
    }

    /// Produce advice for a free-text concern.
    pub fn advise(&self, concern: &str) -> Advice {
        let lowered = concern.to_lowercase();

        if let Some(topic) = match_concern(&lowered, SKIN_CONCERNS) {
            return Advice {
                category: "skin".to_string(),
                topic,
                recommendations: vec![
                    "Cleanse twice daily with a gentle, pH-balanced cleanser".to_string(),
                    "Use broad-spectrum SPF every morning, even indoors".to_string(),
                    "Introduce actives (retinoids, AHAs) gradually, one at a time".to_string(),
                ],
                suggested_services: vec!["Facial".to_string()],
                aftercare: vec![
                    "Avoid picking or over-exfoliating irritated areas".to_string(),
                    "Keep skin hydrated with a non-comedogenic moisturizer".to_string(),
                ],
            };
        }

        if let Some(topic) = match_concern(&lowered, HAIR_CONCERNS) {
            return Advice {
                category: "hair".to_string(),
                topic,
                recommendations: vec![
                    "Wash with lukewarm water and sulfate-free shampoo".to_string(),
                    "Trim every 6-8 weeks to keep ends healthy".to_string(),
                    "Limit heat styling and always use a heat protectant".to_string(),
                ],
                suggested_services: vec!["Hair Treatment".to_string(), "Haircut".to_string()],
                aftercare: vec![
                    "Deep-condition weekly".to_string(),
                    "Sleep on a silk pillowcase to reduce friction".to_string(),
                ],
            };
        }

        if let Some(topic) = match_concern(&lowered, NAIL_CONCERNS) {
            return Advice {
                category: "nails".to_string(),
                topic,
                recommendations: vec![
                    "Keep cuticles moisturized with cuticle oil".to_string(),
                    "File in one direction to prevent splitting".to_string(),
                ],
                suggested_services: vec!["Manicure".to_string(), "Pedicure".to_string()],
                aftercare: vec!["Wear gloves for household chemicals".to_string()],
            };
        }

        if let Some(topic) = match_concern(&lowered, BODY_CONCERNS) {
            return Advice {
                category: "body".to_string(),
                topic,
                recommendations: vec![
                    "Regular massage improves circulation and eases tension".to_string(),
                    "Dry-brush before showering to exfoliate gently".to_string(),
                ],
                suggested_services: vec!["Massage".to_string()],
                aftercare: vec!["Drink plenty of water after treatments".to_string()],
            };
        }

        Advice {
            category: "general".to_string(),
            topic: concern.trim().to_string(),
            recommendations: vec![
                "A consistent routine beats occasional intensive treatments".to_string(),
                "Book a consultation so a stylist can assess in person".to_string(),
            ],
            suggested_services: vec!["Facial".to_string(), "Haircut".to_string()],
            aftercare: Vec::new(),
        }
    }
}

fn match_concern(lowered: &str, keywords: &[&str]) -> Option<String> {
    keywords
        .iter()
        .find(|kw| lowered.contains(*kw))
        .map(|kw| kw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skin_concern_matched() {
        let advice = BeautyAdvisor::new().advise("I keep getting acne on my forehead");
        assert_eq!(advice.category, "skin");
        assert_eq!(advice.topic, "acne");
        assert!(!advice.recommendations.is_empty());
        assert_eq!(advice.suggested_services, vec!["Facial"]);
    }

    #[test]
    fn test_hair_concern_matched() {
        let advice = BeautyAdvisor::new().advise("my dry hair is so frizzy lately");
        assert_eq!(advice.category, "hair");
        // First matching keyword in catalog order wins.
        assert_eq!(advice.topic, "dry hair");
    }

    #[test]
    fn test_unmatched_concern_falls_back_to_general() {
        let advice = BeautyAdvisor::new().advise("what should I do before a wedding?");
        assert_eq!(advice.category, "general");
        assert_eq!(advice.topic, "what should I do before a wedding?");
        assert!(!advice.recommendations.is_empty());
    }

    #[test]
    fn test_advise_is_deterministic() {
        let advisor = BeautyAdvisor::new();
        let a = advisor.advise("dandruff");
        let b = advisor.advise("dandruff");
        assert_eq!(a.topic, b.topic);
        assert_eq!(a.recommendations, b.recommendations);
    }
}
