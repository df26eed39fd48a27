use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;

mod api;
mod forms;
mod recommendation;

pub use api::*;
pub use forms::*;
pub use recommendation::*;

/// One of the three mutually exclusive wizard phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    /// Identity and pickup location
    Identity,
    /// Explicit preferences for content-based recommendations
    Preferences,
    /// Recommendation cards
    Results,
}

impl Step {
    pub const ALL: [Step; 3] = [Step::Identity, Step::Preferences, Step::Results];

    /// 1-based step number as shown to the user
    pub fn number(self) -> u8 {
        match self {
            Step::Identity => 1,
            Step::Preferences => 2,
            Step::Results => 3,
        }
    }
}

impl TryFrom<u8> for Step {
    type Error = u8;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            1 => Ok(Step::Identity),
            2 => Ok(Step::Preferences),
            3 => Ok(Step::Results),
            other => Err(other),
        }
    }
}

impl Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "step{}", self.number())
    }
}

/// The two forms the wizard submits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormKind {
    Identity,
    Preferences,
}

impl Display for FormKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormKind::Identity => write!(f, "identity"),
            FormKind::Preferences => write!(f, "preferences"),
        }
    }
}

/// Server-side user identifier
///
/// The server echoes back whatever the client sent, so this accepts both JSON
/// strings and integers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        recommendation::string_or_number(deserializer).map(UserId)
    }
}

/// Identifier of a rentable car
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CarId(pub String);

impl CarId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CarId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for CarId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for CarId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        recommendation::string_or_number(deserializer).map(CarId)
    }
}

/// Result of the `check_user` lookup
#[derive(Debug, Clone, PartialEq)]
pub struct UserClassification {
    /// The server knows this user at all
    pub exists: bool,
    pub user_id: Option<UserId>,
    /// The user has rented at the selected location before
    pub has_rental_history: bool,
}

/// Where the booking action hands the user off to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingTarget {
    pub car_id: CarId,
    pub days: u32,
}

impl BookingTarget {
    /// Path of the confirmation page, relative to the server root
    pub fn path(&self) -> String {
        format!("/confirm_booking/{}?days={}", self.car_id, self.days)
    }
}

/// State owned by a single wizard controller
#[derive(Debug, Clone, PartialEq)]
pub struct WizardState {
    pub current_step: Step,
    pub user_id: Option<UserId>,
    pub location: Option<String>,
    pub has_rental_history: bool,
    /// Bumped on every state change; scheduled work compares against it
    pub epoch: u64,
    /// Set once the user has left the wizard for the confirmation page
    pub booking: Option<BookingTarget>,
}

impl Default for WizardState {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardState {
    pub fn new() -> Self {
        Self {
            current_step: Step::Identity,
            user_id: None,
            location: None,
            has_rental_history: false,
            epoch: 0,
            booking: None,
        }
    }

    /// Records a classification result and returns the new epoch
    pub fn classify(&mut self, location: &str, classification: &UserClassification) -> u64 {
        self.location = Some(location.to_string());
        if let Some(user_id) = &classification.user_id {
            self.user_id = Some(user_id.clone());
        }
        self.has_rental_history = classification.has_rental_history;
        self.bump()
    }

    pub fn bump(&mut self) -> u64 {
        self.epoch += 1;
        self.epoch
    }
}
