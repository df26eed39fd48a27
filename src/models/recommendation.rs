use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::CarId;

/// A recommended car as consumed by the renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationItem {
    pub id: CarId,
    pub display_name: String,
    /// 0 to 5
    pub rating: f64,
    pub car_type: String,
    pub transmission: String,
    pub fuel_policy: String,
    pub mileage_kmpl: f64,
    pub occupancy: u32,
    pub ac_present: bool,
    pub luggage_capacity: String,
    pub agency_name: String,
    pub image_url: Option<String>,
    pub price_per_day: Option<f64>,
    pub price_per_hour: Option<f64>,
}

// ============================================================================
// Recommendation API Types
// ============================================================================

/// Raw car record from the recommendation endpoints
///
/// Older server builds send `car_id` plus `make`/`model` instead of `id`/`name`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiCar {
    #[serde(alias = "car_id")]
    pub id: CarId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub make: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    pub rating: f64,
    pub car_type: String,
    pub transmission: String,
    pub fuel_policy: String,
    pub mileage_kmpl: f64,
    pub occupancy: u32,
    #[serde(alias = "ac_present", deserialize_with = "yes_no")]
    pub ac: bool,
    #[serde(deserialize_with = "string_or_number")]
    pub luggage_capacity: String,
    pub agency_name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub price_per_day: Option<f64>,
    #[serde(default)]
    pub price_per_hour: Option<f64>,
}

impl TryFrom<ApiCar> for RecommendationItem {
    type Error = String;

    fn try_from(car: ApiCar) -> Result<Self, Self::Error> {
        let display_name = match (car.name, car.make, car.model) {
            (Some(name), _, _) if !name.trim().is_empty() => name,
            (_, Some(make), Some(model)) => format!("{} {}", make, model),
            (_, Some(make), None) => make,
            _ => return Err(format!("car {} has no name", car.id)),
        };

        Ok(RecommendationItem {
            id: car.id,
            display_name,
            rating: car.rating,
            car_type: car.car_type,
            transmission: car.transmission,
            fuel_policy: car.fuel_policy,
            mileage_kmpl: car.mileage_kmpl,
            occupancy: car.occupancy,
            ac_present: car.ac,
            luggage_capacity: car.luggage_capacity,
            agency_name: car.agency_name,
            image_url: car.image_url.filter(|url| !url.trim().is_empty()),
            price_per_day: car.price_per_day,
            price_per_hour: car.price_per_hour,
        })
    }
}

/// Accepts `"abc"` or `123` and yields a string
pub(crate) fn string_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

/// Accepts booleans or case-insensitive `"yes"`/`"no"`
fn yes_no<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Bool(b) => Ok(b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "yes" | "true" => Ok(true),
            "no" | "false" => Ok(false),
            _ => Err(de::Error::custom(format!("expected yes/no, got {:?}", s))),
        },
        other => Err(de::Error::custom(format!("expected yes/no, got {}", other))),
    }
}
