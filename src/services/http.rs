//! HTTP client for the recommendation server
//!
//! Every endpoint answers with a JSON object. Errors come back as `{"error": "..."}`,
//! usually with a 4xx/5xx status, so the body is parsed regardless of status.
use std::time::Duration;

use reqwest::{Client as HttpClient, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::instrument;

use crate::{
    error::{WizardError, WizardResult},
    models::{
        CarTypesResponse, CheckUserResponse, CollaborativeRecommendationRequest,
        ContentRecommendationRequest, IdentityForm, LocationsResponse, PreferencesForm,
        RecommendationItem, RecommendationsResponse, UserClassification, UserId,
    },
    services::RecommendationBackend,
};

#[derive(Clone)]
pub struct HttpBackend {
    http_client: HttpClient,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> WizardResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self::with_client(http_client, base_url))
    }

    pub fn with_client(http_client: HttpClient, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http_client,
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> WizardResult<T> {
        let response = self.http_client.get(self.url(path)).send().await?;
        decode_envelope(response).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> WizardResult<T>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.http_client.post(self.url(path)).json(body).send().await?;
        decode_envelope(response).await
    }
}

/// Reads a response body, surfacing `error` fields before decoding `T`
async fn decode_envelope<T: DeserializeOwned>(response: Response) -> WizardResult<T> {
    let status = response.status();
    let body = response.text().await?;

    let value: Value = match serde_json::from_str(&body) {
        Ok(value) => value,
        Err(e) if status.is_success() => return Err(e.into()),
        Err(_) => return Err(WizardError::UnexpectedStatus { status, body }),
    };

    if let Some(message) = error_field(&value) {
        return Err(WizardError::ServerReported(message));
    }

    if !status.is_success() {
        return Err(WizardError::UnexpectedStatus { status, body });
    }

    Ok(serde_json::from_value(value)?)
}

fn error_field(value: &Value) -> Option<String> {
    match value.get("error")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn into_items(response: RecommendationsResponse) -> WizardResult<Vec<RecommendationItem>> {
    response
        .recommendations
        .into_iter()
        .map(|car| {
            RecommendationItem::try_from(car).map_err(|e| {
                WizardError::Decode(<serde_json::Error as serde::de::Error>::custom(e))
            })
        })
        .collect()
}

#[async_trait::async_trait]
impl RecommendationBackend for HttpBackend {
    #[instrument(skip(self))]
    async fn fetch_locations(&self) -> WizardResult<Vec<String>> {
        let response: LocationsResponse = self.get_json("/api/locations").await?;
        tracing::info!(count = response.locations.len(), "Locations fetched");
        Ok(response.locations)
    }

    #[instrument(skip(self))]
    async fn fetch_car_types(&self) -> WizardResult<Vec<String>> {
        let response: CarTypesResponse = self.get_json("/api/car_types").await?;
        tracing::info!(count = response.car_types.len(), "Car types fetched");
        Ok(response.car_types)
    }

    #[instrument(skip(self, form), fields(location = %form.location()))]
    async fn check_user(&self, form: &IdentityForm) -> WizardResult<UserClassification> {
        let response: CheckUserResponse = self.post_json("/api/check_user", form).await?;
        let classification = UserClassification::from(response);

        tracing::info!(
            exists = classification.exists,
            has_rental_history = classification.has_rental_history,
            "User classified"
        );

        Ok(classification)
    }

    #[instrument(skip(self, preferences), fields(car_type = %preferences.car_type))]
    async fn content_recommendations(
        &self,
        location: &str,
        preferences: &PreferencesForm,
        user_id: Option<UserId>,
    ) -> WizardResult<Vec<RecommendationItem>> {
        let body = ContentRecommendationRequest {
            location,
            car_type: &preferences.car_type,
            max_price: preferences.max_price,
            ac_required: preferences.ac_required,
            unlimited_mileage: preferences.unlimited_mileage,
            user_id: user_id.as_ref(),
        };
        let response: RecommendationsResponse = self
            .post_json("/api/content_recommendations", &body)
            .await?;
        let items = into_items(response)?;

        tracing::info!(count = items.len(), "Content recommendations fetched");

        Ok(items)
    }

    #[instrument(skip(self, user_id), fields(user_id = %user_id))]
    async fn collaborative_recommendations(
        &self,
        user_id: &UserId,
        location: &str,
    ) -> WizardResult<Vec<RecommendationItem>> {
        let body = CollaborativeRecommendationRequest { user_id, location };
        let response: RecommendationsResponse = self
            .post_json("/api/collaborative_recommendations", &body)
            .await?;
        let items = into_items(response)?;

        tracing::info!(count = items.len(), "Collaborative recommendations fetched");

        Ok(items)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_field() {
        assert_eq!(
            error_field(&json!({"error": "no data"})),
            Some("no data".to_string())
        );
        assert_eq!(error_field(&json!({"error": null, "locations": []})), None);
        assert_eq!(error_field(&json!({"locations": []})), None);
        assert_eq!(
            error_field(&json!({"error": {"code": 3}})),
            Some("{\"code\":3}".to_string())
        );
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let backend = HttpBackend::with_client(HttpClient::new(), "http://rentals.local/");
        assert_eq!(
            backend.url("/api/locations"),
            "http://rentals.local/api/locations"
        );
    }

    #[test]
    fn test_nameless_car_is_a_decode_error() {
        let response: RecommendationsResponse = serde_json::from_value(json!({
            "recommendations": [{
                "car_id": 1,
                "rating": 4.0,
                "car_type": "SUV",
                "transmission": "Manual",
                "fuel_policy": "Full to Full",
                "mileage_kmpl": 11.0,
                "occupancy": 7,
                "ac": "Yes",
                "luggage_capacity": 4,
                "agency_name": "Zoomcar",
                "price_per_hour": 200.0
            }]
        }))
        .unwrap();

        let err = into_items(response).unwrap_err();
        assert!(err.is_transport());
    }
}
