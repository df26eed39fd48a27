//! Client-side controller for a multi-step car-rental booking wizard.
//!
//! The wizard asks the recommendation server who the user is, then shows either
//! history-based (collaborative) or preference-based (content) recommendations and
//! hands off to a booking confirmation page.

pub mod config;
pub mod error;
pub mod models;
pub mod render;
pub mod services;
pub mod view;
pub mod wizard;

pub use error::{WizardError, WizardResult};
pub use wizard::{WizardController, WizardSettings};
