use serde::Serialize;

use super::UserId;

/// Step 1 form, in either of its two shapes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum IdentityForm {
    NameEmail {
        name: String,
        email: String,
        location: String,
    },
    UserId {
        user_id: String,
        location: String,
    },
}

impl IdentityForm {
    pub fn location(&self) -> &str {
        match self {
            IdentityForm::NameEmail { location, .. } | IdentityForm::UserId { location, .. } => {
                location
            }
        }
    }

    /// Copy of the form with every field trimmed, as read from the inputs
    pub fn trimmed(&self) -> Self {
        match self {
            IdentityForm::NameEmail {
                name,
                email,
                location,
            } => IdentityForm::NameEmail {
                name: name.trim().to_string(),
                email: email.trim().to_string(),
                location: location.trim().to_string(),
            },
            IdentityForm::UserId { user_id, location } => IdentityForm::UserId {
                user_id: user_id.trim().to_string(),
                location: location.trim().to_string(),
            },
        }
    }

    /// The identifier typed by the user, when this form collects one
    pub fn typed_user_id(&self) -> Option<UserId> {
        match self {
            IdentityForm::UserId { user_id, .. } => Some(UserId(user_id.clone())),
            IdentityForm::NameEmail { .. } => None,
        }
    }
}

/// Step 2 form
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PreferencesForm {
    pub car_type: String,
    pub max_price: Option<f64>,
    pub ac_required: bool,
    pub unlimited_mileage: bool,
}
