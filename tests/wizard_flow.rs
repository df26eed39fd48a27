use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio_test::{assert_err, assert_ok};

use tripglide_wizard::{
    models::{CarId, IdentityForm, PreferencesForm, Step, UserId},
    services::{HttpBackend, MemorySessionStore, SessionKey, SessionStore},
    view::{HeadlessView, SelectId},
    WizardController, WizardSettings,
};

type Recorded = Arc<Mutex<Vec<(String, Value)>>>;

fn legacy_car() -> Value {
    json!({
        "car_id": 101,
        "make": "Mahindra",
        "model": "XUV700",
        "rating": 4.6,
        "car_type": "SUV",
        "transmission": "Automatic",
        "fuel_policy": "Full to Full",
        "mileage_kmpl": 13.5,
        "occupancy": 7,
        "ac": "Yes",
        "luggage_capacity": 4,
        "agency_name": "Revv",
        "price_per_day": 2400.0
    })
}

async fn locations() -> Json<Value> {
    Json(json!({"locations": ["Pune", "Goa"]}))
}

async fn car_types() -> Json<Value> {
    Json(json!({"car_types": ["SUV", "Sedan"]}))
}

async fn record(State(recorded): State<Recorded>, path: &str, body: Value) {
    recorded.lock().unwrap().push((path.to_string(), body));
}

fn new_user_router(recorded: Recorded) -> Router {
    Router::new()
        .route("/api/locations", get(locations))
        .route("/api/car_types", get(car_types))
        .route(
            "/api/check_user",
            post(|state: State<Recorded>, Json(body): Json<Value>| async move {
                record(state, "/api/check_user", body).await;
                Json(json!({"user_exists": false}))
            }),
        )
        .route(
            "/api/content_recommendations",
            post(|state: State<Recorded>, Json(body): Json<Value>| async move {
                record(state, "/api/content_recommendations", body).await;
                Json(json!({"recommendations": [legacy_car()]}))
            }),
        )
        .with_state(recorded)
}

fn returning_user_router(recorded: Recorded) -> Router {
    Router::new()
        .route("/api/locations", get(locations))
        .route("/api/car_types", get(car_types))
        .route(
            "/api/check_user",
            post(|| async { Json(json!({"user_exists": true, "user_id": 12})) }),
        )
        .route(
            "/api/collaborative_recommendations",
            post(|state: State<Recorded>, Json(body): Json<Value>| async move {
                record(state, "/api/collaborative_recommendations", body).await;
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"error": "No rental history found for user"})),
                )
            }),
        )
        .with_state(recorded)
}

fn broken_catalog_router() -> Router {
    Router::new()
        .route(
            "/api/locations",
            get(|| async { Json(json!({"locations": 5})) }),
        )
        .route(
            "/api/car_types",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response() }),
        )
}

/// Serves `router` on an ephemeral port and returns its base URL
async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

struct Client {
    controller: WizardController,
    view: Arc<HeadlessView>,
    session: Arc<MemorySessionStore>,
}

fn client(base_url: &str, fallback_delay: Duration) -> Client {
    let backend = HttpBackend::new(base_url, Duration::from_secs(5)).unwrap();
    let view = Arc::new(HeadlessView::new());
    let session = Arc::new(MemorySessionStore::new());
    let controller = WizardController::new(
        Arc::new(backend),
        view.clone(),
        session.clone(),
        WizardSettings {
            base_url: base_url.to_string(),
            fallback_delay,
        },
    );
    Client {
        controller,
        view,
        session,
    }
}

fn asha(location: &str) -> IdentityForm {
    IdentityForm::NameEmail {
        name: "Asha".to_string(),
        email: "asha@example.com".to_string(),
        location: location.to_string(),
    }
}

#[tokio::test]
async fn test_new_user_books_from_content_recommendations() {
    let recorded = Recorded::default();
    let base_url = serve(new_user_router(recorded.clone())).await;
    let c = client(&base_url, Duration::from_millis(2000));

    c.controller.start().await;
    let snapshot = c.view.snapshot();
    assert_eq!(snapshot.select_values(SelectId::Location), vec!["Pune", "Goa"]);
    assert_eq!(snapshot.select_values(SelectId::CarType), vec!["SUV", "Sedan"]);

    let step = assert_ok!(c.controller.submit_identity(asha("Goa")).await);
    assert_eq!(step, Step::Preferences);
    assert_eq!(
        c.session
            .get(SessionKey::SelectedLocation)
            .await
            .unwrap()
            .unwrap()
            .value,
        "Goa"
    );

    let step = assert_ok!(
        c.controller
            .submit_preferences(PreferencesForm {
                car_type: "SUV".to_string(),
                max_price: Some(1500.0),
                ac_required: true,
                unlimited_mileage: false,
            })
            .await
    );
    assert_eq!(step, Step::Results);

    let rendered = c.view.snapshot().rendered.unwrap();
    let card = &rendered.cards()[0];
    assert_eq!(card.car_id, CarId::from("101"));
    assert_eq!(card.title, "Mahindra XUV700");
    assert_eq!(card.price.to_string(), "₹2400/day");

    let url = assert_ok!(c.controller.book(CarId::from("101"), 3).await);
    assert_eq!(url, format!("{}/confirm_booking/101?days=3", base_url));
    assert_eq!(c.view.snapshot().navigations, vec![url]);

    let requests = recorded.lock().unwrap().clone();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].1["email"], "asha@example.com");

    let (path, body) = &requests[1];
    assert_eq!(path, "/api/content_recommendations");
    assert_eq!(body["location"], "Goa");
    assert_eq!(body["car_type"], "SUV");
    assert_eq!(body["max_price"], "1500");
    assert_eq!(body["ac_required"], true);
    assert_eq!(body["unlimited_mileage"], false);
}

#[tokio::test]
async fn test_reported_history_error_falls_back_to_preferences() {
    let recorded = Recorded::default();
    let base_url = serve(returning_user_router(recorded.clone())).await;
    let c = client(&base_url, Duration::from_millis(300));

    c.controller.start().await;
    assert_err!(c.controller.submit_identity(asha("Pune")).await);

    assert_eq!(
        c.view.snapshot().error(Step::Identity),
        Some("No rental history found for user. We'll find cars based on your preferences instead.")
    );
    let state = c.controller.state().await;
    assert_eq!(state.current_step, Step::Identity);
    assert_eq!(state.user_id, Some(UserId::from("12")));

    let requests = recorded.lock().unwrap().clone();
    assert_eq!(requests[0].1, json!({"user_id": "12", "location": "Pune"}));

    tokio::time::sleep(Duration::from_millis(900)).await;

    assert_eq!(c.controller.state().await.current_step, Step::Preferences);
    let snapshot = c.view.snapshot();
    assert_eq!(snapshot.visible_step(), Some(Step::Preferences));
    assert!(snapshot.errors.is_empty());
    assert!(!c.controller.fallback_pending());
}

#[tokio::test]
async fn test_broken_catalogs_are_reported_per_step() {
    let base_url = serve(broken_catalog_router()).await;
    let c = client(&base_url, Duration::from_millis(2000));

    c.controller.start().await;

    let snapshot = c.view.snapshot();
    assert!(snapshot
        .error(Step::Identity)
        .unwrap()
        .starts_with("Failed to load locations: Invalid data format"));
    assert!(snapshot
        .error(Step::Preferences)
        .unwrap()
        .starts_with("Failed to load car types"));
    assert!(snapshot.select_values(SelectId::Location).is_empty());
    assert!(c.controller.locations().await.is_none());
    assert_eq!(snapshot.visible_step(), Some(Step::Identity));
}
