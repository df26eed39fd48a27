use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use crate::models::Step;
use crate::render::RenderedRecommendations;

use super::{SelectId, SelectOption, WizardView};

/// Everything a headless view currently displays
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewSnapshot {
    pub visible_steps: HashSet<Step>,
    /// Every step shown, oldest first
    pub step_history: Vec<Step>,
    pub errors: HashMap<Step, String>,
    pub loading: HashSet<Step>,
    pub selects: HashMap<SelectId, Vec<SelectOption>>,
    pub rendered: Option<RenderedRecommendations>,
    pub navigations: Vec<String>,
}

impl ViewSnapshot {
    /// The single visible step, if exactly one is visible
    pub fn visible_step(&self) -> Option<Step> {
        match self.visible_steps.len() {
            1 => self.visible_steps.iter().next().copied(),
            _ => None,
        }
    }

    pub fn error(&self, scope: Step) -> Option<&str> {
        self.errors.get(&scope).map(String::as_str)
    }

    /// Non-placeholder values of a select
    pub fn select_values(&self, select: SelectId) -> Vec<String> {
        self.selects
            .get(&select)
            .map(|options| {
                options
                    .iter()
                    .filter(|o| !o.is_placeholder())
                    .map(|o| o.value.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// View that keeps its display state in memory
///
/// Useful for embedding the wizard behind another UI layer and for tests.
#[derive(Debug)]
pub struct HeadlessView {
    snapshot: Mutex<ViewSnapshot>,
}

impl Default for HeadlessView {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessView {
    pub fn new() -> Self {
        let mut snapshot = ViewSnapshot::default();
        snapshot.visible_steps.insert(Step::Identity);
        Self {
            snapshot: Mutex::new(snapshot),
        }
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, ViewSnapshot> {
        self.snapshot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl WizardView for HeadlessView {
    fn set_step_visible(&self, step: Step) {
        let mut snapshot = self.lock();
        snapshot.visible_steps.clear();
        snapshot.visible_steps.insert(step);
        snapshot.step_history.push(step);
    }

    fn show_error(&self, scope: Step, message: &str) {
        self.lock().errors.insert(scope, message.to_string());
    }

    fn clear_errors(&self) {
        self.lock().errors.clear();
    }

    fn set_loading(&self, scope: Step, loading: bool) {
        let mut snapshot = self.lock();
        if loading {
            snapshot.loading.insert(scope);
        } else {
            snapshot.loading.remove(&scope);
        }
    }

    fn populate_select(&self, select: SelectId, options: Vec<SelectOption>) {
        self.lock().selects.insert(select, options);
    }

    fn render_recommendations(&self, rendered: &RenderedRecommendations) {
        self.lock().rendered = Some(rendered.clone());
    }

    fn navigate(&self, url: &str) {
        self.lock().navigations.push(url.to_string());
    }
}
