//! View binding for the wizard
//!
//! The controller never touches a rendering environment directly. Adapters implement
//! this trait for the terminal and for test recording.
use crate::models::Step;
use crate::render::RenderedRecommendations;

pub mod headless;
pub mod terminal;

pub use headless::{HeadlessView, ViewSnapshot};
pub use terminal::TerminalView;

/// Selection controls the wizard fills from server catalogs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectId {
    Location,
    CarType,
}

impl SelectId {
    pub fn placeholder(self) -> &'static str {
        match self {
            SelectId::Location => "-- Select a location --",
            SelectId::CarType => "-- Select car type --",
        }
    }
}

/// One entry of a selection control; the placeholder carries an empty value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn placeholder(select: SelectId) -> Self {
        Self {
            value: String::new(),
            label: select.placeholder().to_string(),
        }
    }

    pub fn value(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.value.is_empty()
    }
}

/// Placeholder followed by one option per value, in the given order
pub fn select_options(select: SelectId, values: &[String]) -> Vec<SelectOption> {
    std::iter::once(SelectOption::placeholder(select))
        .chain(values.iter().map(SelectOption::value))
        .collect()
}

pub trait WizardView: Send + Sync {
    /// Show `step` and hide the others
    fn set_step_visible(&self, step: Step);

    /// Show a message scoped to one step's region
    fn show_error(&self, scope: Step, message: &str);

    /// Hide every displayed error
    fn clear_errors(&self);

    fn set_loading(&self, scope: Step, loading: bool);

    fn populate_select(&self, select: SelectId, options: Vec<SelectOption>);

    /// Replace any previously rendered results
    fn render_recommendations(&self, rendered: &RenderedRecommendations);

    /// Leave the wizard for `url`
    fn navigate(&self, url: &str);
}
