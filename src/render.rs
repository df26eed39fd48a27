//! Typed rendering of recommendation cards.
//!
//! Cards are plain data; view adapters decide how to draw them.

use std::fmt::Display;

use serde::Serialize;

use crate::models::{BookingTarget, CarId, RecommendationItem};

/// Rental durations offered on every card, in days
pub const DURATION_CHOICES: [u32; 7] = [1, 2, 3, 5, 7, 14, 30];

pub const NO_RECOMMENDATIONS_MESSAGE: &str = "No recommendations available.";

const CURRENCY: &str = "₹";
const MAX_STARS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StarGlyph {
    Full,
    Half,
    Empty,
}

/// Five glyphs for a 0 to 5 rating
///
/// Out-of-range ratings are clamped and NaN counts as zero.
pub fn star_glyphs(rating: f64) -> [StarGlyph; MAX_STARS] {
    let rating = if rating.is_nan() {
        0.0
    } else {
        rating.clamp(0.0, MAX_STARS as f64)
    };
    let full = rating.floor() as usize;
    let half = rating - rating.floor() >= 0.5 && full < MAX_STARS;

    let mut glyphs = [StarGlyph::Empty; MAX_STARS];
    for (i, glyph) in glyphs.iter_mut().enumerate() {
        if i < full {
            *glyph = StarGlyph::Full;
        } else if i == full && half {
            *glyph = StarGlyph::Half;
        }
    }
    glyphs
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum PriceLabel {
    PerDay(f64),
    PerHour(f64),
    Unavailable,
}

impl PriceLabel {
    /// Day pricing wins when the server sends both; a zero day price counts as absent
    pub fn for_item(item: &RecommendationItem) -> Self {
        let per_day = item.price_per_day.filter(|day| *day != 0.0);
        match (per_day, item.price_per_hour) {
            (Some(day), _) => PriceLabel::PerDay(day),
            (None, Some(hour)) => PriceLabel::PerHour(hour),
            (None, None) => PriceLabel::Unavailable,
        }
    }
}

impl Display for PriceLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceLabel::PerDay(amount) => write!(f, "{}{}/day", CURRENCY, amount),
            PriceLabel::PerHour(amount) => write!(f, "{}{}/hour", CURRENCY, amount),
            PriceLabel::Unavailable => write!(f, "Price on request"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "url", rename_all = "snake_case")]
pub enum CardImage {
    Url(String),
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardAttribute {
    pub label: &'static str,
    pub value: String,
}

/// One rendered recommendation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationCard {
    pub car_id: CarId,
    pub title: String,
    pub stars: [StarGlyph; MAX_STARS],
    pub image: CardImage,
    pub attributes: Vec<CardAttribute>,
    pub price: PriceLabel,
    pub durations: &'static [u32],
}

impl RecommendationCard {
    pub fn from_item(item: &RecommendationItem) -> Self {
        let image = match &item.image_url {
            Some(url) => CardImage::Url(url.clone()),
            None => CardImage::Placeholder,
        };

        let attributes = vec![
            attribute("Type", &item.car_type),
            attribute("Transmission", &item.transmission),
            attribute("Fuel Policy", &item.fuel_policy),
            attribute("Mileage", format!("{} kmpl", item.mileage_kmpl)),
            attribute("Seats", item.occupancy),
            attribute("AC", if item.ac_present { "Yes" } else { "No" }),
            attribute("Luggage", &item.luggage_capacity),
            attribute("Agency", &item.agency_name),
        ];

        Self {
            car_id: item.id.clone(),
            title: item.display_name.clone(),
            stars: star_glyphs(item.rating),
            image,
            attributes,
            price: PriceLabel::for_item(item),
            durations: &DURATION_CHOICES,
        }
    }

    /// Resolves the booking action for a selected duration
    pub fn booking_target(&self, days: u32) -> Option<BookingTarget> {
        self.durations.contains(&days).then(|| BookingTarget {
            car_id: self.car_id.clone(),
            days,
        })
    }
}

fn attribute(label: &'static str, value: impl Display) -> CardAttribute {
    CardAttribute {
        label,
        value: value.to_string(),
    }
}

/// Label for a duration option
pub fn duration_label(days: u32) -> String {
    if days > 1 {
        format!("{} days", days)
    } else {
        format!("{} day", days)
    }
}

/// What the results step shows
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderedRecommendations {
    Empty { message: &'static str },
    Cards { cards: Vec<RecommendationCard> },
}

impl RenderedRecommendations {
    pub fn cards(&self) -> &[RecommendationCard] {
        match self {
            RenderedRecommendations::Empty { .. } => &[],
            RenderedRecommendations::Cards { cards } => cards,
        }
    }

    pub fn find(&self, car_id: &CarId) -> Option<&RecommendationCard> {
        self.cards().iter().find(|card| &card.car_id == car_id)
    }
}

/// Renders items in input order, or the empty-state message
pub fn render_recommendations(items: &[RecommendationItem]) -> RenderedRecommendations {
    if items.is_empty() {
        return RenderedRecommendations::Empty {
            message: NO_RECOMMENDATIONS_MESSAGE,
        };
    }

    RenderedRecommendations::Cards {
        cards: items.iter().map(RecommendationCard::from_item).collect(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_item(id: &str) -> RecommendationItem {
        RecommendationItem {
            id: CarId::from(id),
            display_name: "Hyundai Creta".to_string(),
            rating: 4.2,
            car_type: "SUV".to_string(),
            transmission: "Automatic".to_string(),
            fuel_policy: "Full to Full".to_string(),
            mileage_kmpl: 16.5,
            occupancy: 5,
            ac_present: true,
            luggage_capacity: "3".to_string(),
            agency_name: "Zoomcar".to_string(),
            image_url: None,
            price_per_day: None,
            price_per_hour: Some(150.0),
        }
    }

    fn counts(glyphs: &[StarGlyph; 5]) -> (usize, usize, usize) {
        let count = |g: StarGlyph| glyphs.iter().filter(|x| **x == g).count();
        (
            count(StarGlyph::Full),
            count(StarGlyph::Half),
            count(StarGlyph::Empty),
        )
    }

    #[test]
    fn test_star_glyphs_across_range() {
        for tenths in 0..=50 {
            let rating = tenths as f64 / 10.0;
            let glyphs = star_glyphs(rating);
            let (full, half, empty) = counts(&glyphs);

            assert_eq!(full + half + empty, 5);
            assert_eq!(full, rating.floor() as usize, "rating {}", rating);
            let expect_half = rating - rating.floor() >= 0.5 && full < 5;
            assert_eq!(half == 1, expect_half, "rating {}", rating);
        }
    }

    #[test]
    fn test_star_glyph_order() {
        assert_eq!(
            star_glyphs(3.5),
            [
                StarGlyph::Full,
                StarGlyph::Full,
                StarGlyph::Full,
                StarGlyph::Half,
                StarGlyph::Empty
            ]
        );
        assert_eq!(star_glyphs(5.0), [StarGlyph::Full; 5]);
        assert_eq!(star_glyphs(0.4), [StarGlyph::Empty; 5]);
    }

    #[test]
    fn test_star_glyphs_clamp() {
        assert_eq!(star_glyphs(7.5), [StarGlyph::Full; 5]);
        assert_eq!(star_glyphs(-1.0), [StarGlyph::Empty; 5]);
        assert_eq!(star_glyphs(f64::NAN), [StarGlyph::Empty; 5]);
    }

    #[test]
    fn test_price_labels() {
        let mut item = sample_item("1");
        item.price_per_day = Some(1200.0);
        item.price_per_hour = None;
        assert_eq!(PriceLabel::for_item(&item).to_string(), "₹1200/day");

        item.price_per_day = None;
        item.price_per_hour = Some(150.0);
        assert_eq!(PriceLabel::for_item(&item).to_string(), "₹150/hour");

        item.price_per_day = Some(999.5);
        assert_eq!(PriceLabel::for_item(&item).to_string(), "₹999.5/day");

        item.price_per_day = None;
        item.price_per_hour = None;
        assert_eq!(PriceLabel::for_item(&item).to_string(), "Price on request");
    }

    #[test]
    fn test_zero_day_price_falls_back_to_hourly() {
        let mut item = sample_item("1");
        item.price_per_day = Some(0.0);
        item.price_per_hour = Some(150.0);
        assert_eq!(PriceLabel::for_item(&item), PriceLabel::PerHour(150.0));

        item.price_per_hour = None;
        assert_eq!(PriceLabel::for_item(&item), PriceLabel::Unavailable);
    }

    #[test]
    fn test_empty_list() {
        let rendered = render_recommendations(&[]);
        assert_eq!(
            rendered,
            RenderedRecommendations::Empty {
                message: "No recommendations available."
            }
        );
        assert!(rendered.cards().is_empty());
    }

    #[test]
    fn test_cards_keep_input_order() {
        let items = vec![sample_item("b"), sample_item("a"), sample_item("c")];
        let rendered = render_recommendations(&items);
        let ids: Vec<&str> = rendered.cards().iter().map(|c| c.car_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_card_contents() {
        let mut item = sample_item("9");
        item.image_url = Some("https://img.example/creta.png".to_string());
        let card = RecommendationCard::from_item(&item);

        assert_eq!(card.title, "Hyundai Creta");
        assert_eq!(
            card.image,
            CardImage::Url("https://img.example/creta.png".to_string())
        );
        let labels: Vec<&str> = card.attributes.iter().map(|a| a.label).collect();
        assert_eq!(
            labels,
            vec![
                "Type",
                "Transmission",
                "Fuel Policy",
                "Mileage",
                "Seats",
                "AC",
                "Luggage",
                "Agency"
            ]
        );
        assert_eq!(card.attributes[3].value, "16.5 kmpl");
        assert_eq!(card.attributes[5].value, "Yes");
        assert_eq!(card.durations, &[1, 2, 3, 5, 7, 14, 30]);

        assert_eq!(
            RecommendationCard::from_item(&sample_item("1")).image,
            CardImage::Placeholder
        );
    }

    #[test]
    fn test_booking_target() {
        let card = RecommendationCard::from_item(&sample_item("42"));
        assert_eq!(
            card.booking_target(14).map(|t| t.path()),
            Some("/confirm_booking/42?days=14".to_string())
        );
        assert!(card.booking_target(4).is_none());
    }

    #[test]
    fn test_duration_labels() {
        assert_eq!(duration_label(1), "1 day");
        assert_eq!(duration_label(30), "30 days");
    }
}
