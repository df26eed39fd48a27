//! The booking wizard controller.
//!
//! Owns the step state, submits the identity and preferences forms, picks the
//! recommendation path from the user's classification and renders the results
//! through a [`WizardView`].

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    error::{WizardError, WizardResult},
    models::{
        BookingTarget, CarId, FormKind, IdentityForm, PreferencesForm, RecommendationItem, Step,
        UserClassification, UserId, WizardState,
    },
    render::{render_recommendations, RenderedRecommendations},
    services::{RecommendationBackend, SessionKey, SessionStore},
    view::{select_options, SelectId, WizardView},
};

mod fallback;
pub mod validation;

pub use fallback::ScheduledTask;

const DEGRADED_SUFFIX: &str = "We'll find cars based on your preferences instead.";

/// Tunables for a controller instance
#[derive(Debug, Clone)]
pub struct WizardSettings {
    /// Server root that confirmation paths are appended to
    pub base_url: String,
    /// Delay before a failed collaborative fetch falls back to step 2
    pub fallback_delay: Duration,
}

impl Default for WizardSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            fallback_delay: Duration::from_millis(2000),
        }
    }
}

#[derive(Debug, Default)]
struct Catalogs {
    locations: Option<Vec<String>>,
    car_types: Option<Vec<String>>,
}

struct Inner {
    session_id: Uuid,
    backend: Arc<dyn RecommendationBackend>,
    view: Arc<dyn WizardView>,
    session: Arc<dyn SessionStore>,
    settings: WizardSettings,
    state: RwLock<WizardState>,
    catalogs: RwLock<Catalogs>,
    rendered: RwLock<Option<RenderedRecommendations>>,
    fallback: Mutex<Option<ScheduledTask>>,
    in_flight: Mutex<HashSet<FormKind>>,
}

/// Booking wizard controller
///
/// Cheap to clone; clones drive the same wizard.
#[derive(Clone)]
pub struct WizardController {
    inner: Arc<Inner>,
}

/// Holds a form's in-flight slot until dropped
struct InFlightSlot<'a> {
    slots: &'a Mutex<HashSet<FormKind>>,
    kind: FormKind,
}

impl Drop for InFlightSlot<'_> {
    fn drop(&mut self) {
        lock(self.slots).remove(&self.kind);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Message shown for a failed request, keeping server-reported text verbatim
fn failure_message(prefix: &str, err: &WizardError) -> String {
    match err {
        WizardError::ServerReported(message) => message.clone(),
        other => format!("{}: {}", prefix, other),
    }
}

impl WizardController {
    pub fn new(
        backend: Arc<dyn RecommendationBackend>,
        view: Arc<dyn WizardView>,
        session: Arc<dyn SessionStore>,
        settings: WizardSettings,
    ) -> Self {
        let session_id = Uuid::new_v4();
        tracing::info!(%session_id, backend = backend.name(), "Wizard created");

        Self {
            inner: Arc::new(Inner {
                session_id,
                backend,
                view,
                session,
                settings,
                state: RwLock::new(WizardState::new()),
                catalogs: RwLock::new(Catalogs::default()),
                rendered: RwLock::new(None),
                fallback: Mutex::new(None),
                in_flight: Mutex::new(HashSet::new()),
            }),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.inner.session_id
    }

    /// Snapshot of the wizard state
    pub async fn state(&self) -> WizardState {
        self.inner.state.read().await.clone()
    }

    /// Results currently on screen, if any
    pub async fn rendered(&self) -> Option<RenderedRecommendations> {
        self.inner.rendered.read().await.clone()
    }

    /// Whether a collaborative fallback is waiting to fire
    pub fn fallback_pending(&self) -> bool {
        lock(&self.inner.fallback)
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    // ------------------------------------------------------------------------
    // Step controller
    // ------------------------------------------------------------------------

    /// Shows `step`, hides the others and clears every error
    ///
    /// Safe to call with the step that is already active. Cancels any pending
    /// collaborative fallback.
    pub async fn go_to_step(&self, step: Step) {
        self.cancel_fallback();
        self.transition(step, None).await;
    }

    /// Moves to `step` if the state epoch still equals `expected` (when given)
    async fn transition(&self, step: Step, expected: Option<u64>) -> bool {
        let epoch = {
            let mut state = self.inner.state.write().await;
            if expected.is_some_and(|epoch| epoch != state.epoch) {
                tracing::debug!(%step, "Skipping stale transition");
                return false;
            }
            state.current_step = step;
            state.bump()
        };

        self.inner.view.set_step_visible(step);
        self.inner.view.clear_errors();

        tracing::info!(session_id = %self.inner.session_id, %step, epoch, "Step changed");
        true
    }

    // ------------------------------------------------------------------------
    // Catalog loader
    // ------------------------------------------------------------------------

    /// Shows step 1 and loads both catalogs concurrently
    ///
    /// Failures are shown in their step's error region and never block the wizard.
    pub async fn start(&self) {
        self.inner.view.set_step_visible(Step::Identity);
        self.load_catalogs().await;
    }

    pub async fn load_catalogs(&self) {
        tokio::join!(self.load_locations(), self.load_car_types());
    }

    async fn load_locations(&self) {
        let view = &self.inner.view;
        view.set_loading(Step::Identity, true);
        let result = self.inner.backend.fetch_locations().await;
        view.set_loading(Step::Identity, false);

        match result {
            Ok(locations) => {
                view.populate_select(
                    SelectId::Location,
                    select_options(SelectId::Location, &locations),
                );
                self.inner.catalogs.write().await.locations = Some(locations);
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load locations");
                view.populate_select(SelectId::Location, select_options(SelectId::Location, &[]));
                view.show_error(
                    Step::Identity,
                    &format!("Failed to load locations: {}", e),
                );
            }
        }
    }

    async fn load_car_types(&self) {
        let view = &self.inner.view;
        match self.inner.backend.fetch_car_types().await {
            Ok(car_types) => {
                view.populate_select(
                    SelectId::CarType,
                    select_options(SelectId::CarType, &car_types),
                );
                self.inner.catalogs.write().await.car_types = Some(car_types);
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load car types");
                view.populate_select(SelectId::CarType, select_options(SelectId::CarType, &[]));
                view.show_error(
                    Step::Preferences,
                    &format!("Failed to load car types: {}", e),
                );
            }
        }
    }

    /// Loaded car types, if the catalog arrived
    pub async fn car_types(&self) -> Option<Vec<String>> {
        self.inner.catalogs.read().await.car_types.clone()
    }

    /// Loaded locations, if the catalog arrived
    pub async fn locations(&self) -> Option<Vec<String>> {
        self.inner.catalogs.read().await.locations.clone()
    }

    // ------------------------------------------------------------------------
    // Identity submission
    // ------------------------------------------------------------------------

    /// Validates and submits step 1, then routes on the user's classification
    ///
    /// Returns the step the wizard ended on. Errors have already been shown in the
    /// view when this returns `Err`.
    #[instrument(skip(self, form), fields(session_id = %self.inner.session_id))]
    pub async fn submit_identity(&self, form: IdentityForm) -> WizardResult<Step> {
        let _slot = self.claim(FormKind::Identity)?;

        let form = form.trimmed();
        let known_locations = self.inner.catalogs.read().await.locations.clone();
        if let Err(e) = validation::validate_identity(&form, known_locations.as_deref()) {
            self.inner.view.show_error(Step::Identity, &e.to_string());
            return Err(e);
        }
        // A rejected form leaves any pending fallback armed
        self.cancel_fallback();

        self.inner.view.set_loading(Step::Identity, true);
        let result = self.inner.backend.check_user(&form).await;
        self.inner.view.set_loading(Step::Identity, false);

        let classification = match result {
            Ok(classification) => UserClassification {
                user_id: classification.user_id.or_else(|| form.typed_user_id()),
                ..classification
            },
            Err(e) => {
                tracing::error!(error = %e, "User check failed");
                self.inner
                    .view
                    .show_error(Step::Identity, &failure_message("Error checking user", &e));
                return Err(e);
            }
        };

        let location = form.location().to_string();
        self.inner
            .state
            .write()
            .await
            .classify(&location, &classification);
        self.persist(SessionKey::SelectedLocation, &location).await;
        if let Some(user_id) = &classification.user_id {
            self.persist(SessionKey::UserId, user_id.as_str()).await;
        }

        match (classification.has_rental_history, classification.user_id) {
            (true, Some(user_id)) => {
                tracing::info!(%user_id, %location, "Returning user, using rental history");
                self.fetch_collaborative(user_id, location).await
            }
            (history, _) => {
                if history {
                    tracing::warn!("Server reported rental history without a user id");
                    self.inner.state.write().await.has_rental_history = false;
                }
                tracing::info!(%location, "No rental history, asking for preferences");
                self.transition(Step::Preferences, None).await;
                Ok(Step::Preferences)
            }
        }
    }

    // ------------------------------------------------------------------------
    // Recommendation fetchers
    // ------------------------------------------------------------------------

    /// Collaborative recommendations for a returning user
    ///
    /// On any failure the error is shown on step 1 and the wizard moves to step 2
    /// once `fallback_delay` has passed, unless the state changes first.
    #[instrument(skip(self), fields(session_id = %self.inner.session_id))]
    pub async fn fetch_collaborative(
        &self,
        user_id: UserId,
        location: String,
    ) -> WizardResult<Step> {
        self.inner.view.set_loading(Step::Identity, true);
        let result = self
            .inner
            .backend
            .collaborative_recommendations(&user_id, &location)
            .await;
        self.inner.view.set_loading(Step::Identity, false);

        match result {
            Ok(items) => {
                self.show_results(&items).await;
                Ok(Step::Results)
            }
            Err(e) => {
                let reason = failure_message("Error getting recommendations", &e);
                let message = format!("{}. {}", reason.trim_end_matches('.'), DEGRADED_SUFFIX);
                tracing::warn!(error = %e, "Collaborative recommendations failed, falling back");
                self.inner.view.show_error(Step::Identity, &message);
                self.schedule_fallback().await;
                Err(e)
            }
        }
    }

    /// Validates and submits step 2 for content-based recommendations
    #[instrument(skip(self, form), fields(session_id = %self.inner.session_id))]
    pub async fn submit_preferences(&self, form: PreferencesForm) -> WizardResult<Step> {
        let _slot = self.claim(FormKind::Preferences)?;

        let form = PreferencesForm {
            car_type: form.car_type.trim().to_string(),
            ..form
        };
        let (location, user_id) = {
            let state = self.inner.state.read().await;
            (state.location.clone(), state.user_id.clone())
        };

        if let Err(e) = validation::validate_preferences(&form, location.as_deref()) {
            self.inner.view.show_error(Step::Preferences, &e.to_string());
            return Err(e);
        }
        let location = location.unwrap_or_default();

        self.inner.view.set_loading(Step::Preferences, true);
        let result = self
            .inner
            .backend
            .content_recommendations(&location, &form, user_id)
            .await;
        self.inner.view.set_loading(Step::Preferences, false);

        match result {
            Ok(items) => {
                self.show_results(&items).await;
                Ok(Step::Results)
            }
            Err(e) => {
                tracing::error!(error = %e, car_type = %form.car_type, "Content recommendations failed");
                self.inner.view.show_error(
                    Step::Preferences,
                    &failure_message("Error getting recommendations", &e),
                );
                Err(e)
            }
        }
    }

    async fn show_results(&self, items: &[RecommendationItem]) {
        let rendered = render_recommendations(items);
        self.inner.view.render_recommendations(&rendered);
        *self.inner.rendered.write().await = Some(rendered);

        tracing::info!(count = items.len(), "Recommendations rendered");
        self.cancel_fallback();
        self.transition(Step::Results, None).await;
    }

    // ------------------------------------------------------------------------
    // Booking hand-off
    // ------------------------------------------------------------------------

    /// Books a rendered car for `days`, navigating to its confirmation page
    ///
    /// Returns the destination URL.
    #[instrument(skip(self), fields(session_id = %self.inner.session_id))]
    pub async fn book(&self, car_id: CarId, days: u32) -> WizardResult<String> {
        let target = match self.booking_target(&car_id, days).await {
            Ok(target) => target,
            Err(e) => {
                self.inner.view.show_error(Step::Results, &e.to_string());
                return Err(e);
            }
        };

        let url = format!("{}{}", self.inner.settings.base_url, target.path());
        {
            let mut state = self.inner.state.write().await;
            state.booking = Some(target);
            state.bump();
        }
        self.cancel_fallback();

        tracing::info!(%car_id, days, %url, "Leaving wizard for booking confirmation");
        self.inner.view.navigate(&url);
        Ok(url)
    }

    async fn booking_target(&self, car_id: &CarId, days: u32) -> WizardResult<BookingTarget> {
        let rendered = self.inner.rendered.read().await;
        let card = rendered
            .as_ref()
            .and_then(|r| r.find(car_id))
            .ok_or_else(|| WizardError::UnknownCar(car_id.to_string()))?;
        card.booking_target(days)
            .ok_or(WizardError::InvalidDuration(days))
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn claim(&self, kind: FormKind) -> WizardResult<InFlightSlot<'_>> {
        let mut slots = lock(&self.inner.in_flight);
        if !slots.insert(kind) {
            tracing::warn!(form = %kind, "Ignoring duplicate submission");
            return Err(WizardError::Busy(kind));
        }
        Ok(InFlightSlot {
            slots: &self.inner.in_flight,
            kind,
        })
    }

    async fn persist(&self, key: SessionKey, value: &str) {
        if let Err(e) = self.inner.session.set(key, value).await {
            tracing::warn!(error = %e, %key, "Failed to persist session value");
        }
    }

    fn cancel_fallback(&self) {
        if let Some(task) = lock(&self.inner.fallback).take() {
            task.cancel();
        }
    }

    async fn schedule_fallback(&self) {
        let epoch = self.inner.state.read().await.epoch;
        let delay = self.inner.settings.fallback_delay;
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);

        let task = ScheduledTask::spawn(delay, async move {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let controller = WizardController { inner };
            if controller.inner.state.read().await.epoch != epoch {
                tracing::debug!("Collaborative fallback is stale");
                return;
            }
            // Detach our own handle; aborting it here would cancel this task
            drop(lock(&controller.inner.fallback).take());
            if controller.transition(Step::Preferences, Some(epoch)).await {
                tracing::info!("Fell back to preferences after collaborative failure");
            }
        });

        if let Some(previous) = lock(&self.inner.fallback).replace(task) {
            previous.cancel();
        }
    }
}
