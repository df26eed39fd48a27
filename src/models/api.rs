use serde::{Deserialize, Serialize, Serializer};

use super::{ApiCar, UserClassification, UserId};

// ============================================================================
// Request bodies
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ContentRecommendationRequest<'a> {
    pub location: &'a str,
    pub car_type: &'a str,
    #[serde(serialize_with = "price_as_text")]
    pub max_price: Option<f64>,
    pub ac_required: bool,
    pub unlimited_mileage: bool,
    pub user_id: Option<&'a UserId>,
}

/// The server reads `max_price` as form text, so it goes out as `"1500"` or null
fn price_as_text<S: Serializer>(price: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match price {
        Some(price) => serializer.serialize_str(&price.to_string()),
        None => serializer.serialize_none(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CollaborativeRecommendationRequest<'a> {
    pub user_id: &'a UserId,
    pub location: &'a str,
}

// ============================================================================
// Response bodies (after the `error` field has been ruled out)
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LocationsResponse {
    pub locations: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CarTypesResponse {
    pub car_types: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CheckUserResponse {
    pub user_exists: bool,
    #[serde(default)]
    pub user_id: Option<UserId>,
}

impl From<CheckUserResponse> for UserClassification {
    fn from(response: CheckUserResponse) -> Self {
        UserClassification {
            exists: response.user_exists || response.user_id.is_some(),
            user_id: response.user_id,
            has_rental_history: response.user_exists,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<ApiCar>,
}
