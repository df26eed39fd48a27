//! Recommendation server abstraction
//!
//! The wizard only ever talks to the server through this trait, so the controller
//! can be driven against the real HTTP client or an in-process double.
use crate::{
    error::WizardResult,
    models::{IdentityForm, PreferencesForm, RecommendationItem, UserClassification, UserId},
};

/// Everything the wizard needs from the recommendation server
///
/// Implementations turn a payload `error` field into `WizardError::ServerReported`
/// and any missing or mis-shaped field into a transport-class error.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommendationBackend: Send + Sync {
    /// Pickup locations, in server order
    async fn fetch_locations(&self) -> WizardResult<Vec<String>>;

    /// Car types, in server order
    async fn fetch_car_types(&self) -> WizardResult<Vec<String>>;

    /// Classify the user behind an identity form
    async fn check_user(&self, form: &IdentityForm) -> WizardResult<UserClassification>;

    /// Content-based recommendations from explicit preferences
    async fn content_recommendations(
        &self,
        location: &str,
        preferences: &PreferencesForm,
        user_id: Option<UserId>,
    ) -> WizardResult<Vec<RecommendationItem>>;

    /// Collaborative recommendations from the user's rental history
    async fn collaborative_recommendations(
        &self,
        user_id: &UserId,
        location: &str,
    ) -> WizardResult<Vec<RecommendationItem>>;

    /// Backend name for logging and debugging
    fn name(&self) -> &'static str;
}
