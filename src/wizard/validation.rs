use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{WizardError, WizardResult};
use crate::models::{IdentityForm, PreferencesForm};

static EMAIL_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

pub const FILL_ALL_FIELDS: &str = "Please fill in all fields";
pub const INVALID_EMAIL: &str = "Please enter a valid email address";
pub const INVALID_LOCATION: &str = "Please select a valid location";
pub const MISSING_CAR_TYPE: &str = "Please select a car type";
pub const INVALID_MAX_PRICE: &str = "Please enter a valid maximum price";
pub const MISSING_LOCATION: &str = "Please select a location first";

pub fn is_email(value: &str) -> bool {
    EMAIL_SHAPE.is_match(value)
}

/// Checks a trimmed identity form
///
/// `known_locations` is the loaded location catalog, or `None` while it is still
/// loading (or failed), in which case any non-empty location is accepted.
pub fn validate_identity(
    form: &IdentityForm,
    known_locations: Option<&[String]>,
) -> WizardResult<()> {
    let filled = match form {
        IdentityForm::NameEmail {
            name,
            email,
            location,
        } => !name.is_empty() && !email.is_empty() && !location.is_empty(),
        IdentityForm::UserId { user_id, location } => !user_id.is_empty() && !location.is_empty(),
    };
    if !filled {
        return Err(WizardError::Validation(FILL_ALL_FIELDS.to_string()));
    }

    if let IdentityForm::NameEmail { email, .. } = form {
        if !is_email(email) {
            return Err(WizardError::Validation(INVALID_EMAIL.to_string()));
        }
    }

    if let Some(locations) = known_locations {
        if !locations.iter().any(|l| l == form.location()) {
            return Err(WizardError::Validation(INVALID_LOCATION.to_string()));
        }
    }

    Ok(())
}

pub fn validate_preferences(form: &PreferencesForm, location: Option<&str>) -> WizardResult<()> {
    if form.car_type.trim().is_empty() {
        return Err(WizardError::Validation(MISSING_CAR_TYPE.to_string()));
    }

    if let Some(price) = form.max_price {
        if !price.is_finite() || price < 0.0 {
            return Err(WizardError::Validation(INVALID_MAX_PRICE.to_string()));
        }
    }

    if location.map_or(true, str::is_empty) {
        return Err(WizardError::Validation(MISSING_LOCATION.to_string()));
    }

    Ok(())
}
