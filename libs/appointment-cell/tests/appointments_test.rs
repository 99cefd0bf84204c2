use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::models::ClassifyError;
use appointment_cell::router::{admin_appointment_routes, doctor_appointment_routes, AppointmentState};
use appointment_cell::services::clock::{Clock, FixedClock};
use shared_utils::test_utils::{AppointmentFixture, MockBackendResponses, TestConfig};

fn get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

fn post(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn ids(list: &Value) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|a| a["_id"].as_str().unwrap().to_string())
        .collect()
}

struct StoppedClock;

impl Clock for StoppedClock {
    fn now(&self) -> Result<NaiveDateTime, ClassifyError> {
        Err(ClassifyError::InvalidReferenceTime("clock unavailable".to_string()))
    }
}

fn new_year() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
}

fn state_with_clock(mock_server: &MockServer, clock: Arc<dyn Clock>) -> AppointmentState {
    AppointmentState::with_clock(TestConfig::with_backend(mock_server.uri()).to_arc(), clock)
}

fn admin_app(mock_server: &MockServer) -> Router {
    admin_appointment_routes(state_with_clock(mock_server, Arc::new(FixedClock(new_year()))))
}

fn doctor_app(mock_server: &MockServer) -> Router {
    doctor_appointment_routes(state_with_clock(mock_server, Arc::new(FixedClock(new_year()))))
}

fn mixed_appointments() -> Vec<Value> {
    vec![
        AppointmentFixture::new("soon", "2_1_2025", "9:00 AM").paid().build(),
        AppointmentFixture::new("far", "1_1_2099", "10:00 AM").build(),
        AppointmentFixture::new("old", "1_1_2020", "9:00 AM").completed().paid().amount(800.0).build(),
        AppointmentFixture::new("older", "1_1_2019", "9:00 AM").build(),
        AppointmentFixture::new("patient-cancel", "1_1_2099", "11:00 AM").cancelled_by("user").build(),
        AppointmentFixture::new("broken", "2020-01-01", "9:00 AM").build(),
    ]
}

#[tokio::test]
async fn admin_view_is_classified_with_statuses() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/admin/appointments"))
        .and(header("authorization", "Bearer admin-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(MockBackendResponses::appointments_response(mixed_appointments())),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = admin_app(&mock_server)
        .oneshot(get("/appointments", "admin-token"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let view = &body["appointments"];

    assert_eq!(body["total"], 6);
    assert_eq!(view["upcoming_by_day"][0]["label"], "Tomorrow");
    assert_eq!(ids(&view["upcoming_by_day"][0]["appointments"]), vec!["soon"]);
    assert_eq!(ids(&view["upcoming_future"]), vec!["far"]);
    assert_eq!(ids(&view["past"]), vec!["old", "older"]);
    assert_eq!(ids(&view["cancelled"]), vec!["patient-cancel"]);
    assert_eq!(view["unparseable"], json!(["broken"]));

    assert_eq!(view["past"][0]["status"]["label"], "Completed");
    assert_eq!(view["past"][1]["status"]["label"], "Missed (Unpaid)");
    assert_eq!(view["cancelled"][0]["status"]["severity"], "danger");
}

#[tokio::test]
async fn doctor_view_hides_patient_cancellations() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/doctor/appointments"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(MockBackendResponses::appointments_response(mixed_appointments())),
        )
        .mount(&mock_server)
        .await;

    let response = doctor_app(&mock_server)
        .oneshot(get("/appointments", "doc-token"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body["appointments"]["cancelled"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn expired_session_maps_to_unauthorized() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/doctor/appointments"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(MockBackendResponses::failure_message("Not authorized. Please login again.")),
        )
        .mount(&mock_server)
        .await;

    let response = doctor_app(&mock_server)
        .oneshot(get("/appointments", "stale-token"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn backend_outage_is_a_bad_gateway() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/admin/appointments"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&mock_server)
        .await;

    let response = admin_app(&mock_server)
        .oneshot(get("/appointments", "admin-token"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn completing_returns_the_rebuilt_view() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/doctor/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockBackendResponses::appointments_response(vec![
                AppointmentFixture::new("visit", "1_1_2020", "9:00 AM").paid().build(),
            ]),
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/doctor/complete-appointment"))
        .and(body_json(json!({ "appointmentId": "visit" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(MockBackendResponses::success_message("Appointment Completed")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = doctor_app(&mock_server)
        .oneshot(post("/appointments/visit/complete", "doc-token"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let past = &body["appointments"]["past"];
    assert_eq!(past[0]["isCompleted"], true);
    assert_eq!(past[0]["status"]["label"], "Completed");
    assert_eq!(past[0]["status"]["severity"], "info");
}

#[tokio::test]
async fn completing_an_unknown_appointment_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/doctor/appointments"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(MockBackendResponses::appointments_response(vec![])),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/doctor/complete-appointment"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let response = doctor_app(&mock_server)
        .oneshot(post("/appointments/ghost/complete", "doc-token"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_dashboard_combines_stats_roster_and_patients() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/admin/appointments"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(MockBackendResponses::appointments_response(mixed_appointments())),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/admin/all-doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockBackendResponses::doctors_response(vec![
            MockBackendResponses::doctor_response("d1", "Dr. Rao", "Dermatologist", true),
            MockBackendResponses::doctor_response("d2", "Dr. Iyer", "Neurologist", true),
            MockBackendResponses::doctor_response("d3", "Dr. Sen", "Dermatologist", false),
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/admin/patients-count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockBackendResponses::patients_count_response(42)))
        .mount(&mock_server)
        .await;

    let response = admin_app(&mock_server)
        .oneshot(get("/dashboard", "admin-token"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let dashboard = &json_body(response).await["dashboard"];

    assert_eq!(dashboard["total_patients"], 42);
    assert_eq!(dashboard["total_doctors"], 3);
    assert_eq!(dashboard["earnings"], 800.0);
    assert_eq!(dashboard["totals"]["total"], 6);
    assert_eq!(dashboard["totals"]["upcoming"], 2);
    assert_eq!(dashboard["totals"]["past"], 2);
    assert_eq!(dashboard["totals"]["cancelled"], 1);
    assert_eq!(dashboard["totals"]["unparseable"], 1);
    assert_eq!(dashboard["speciality_distribution"][0]["speciality"], "Dermatologist");
    assert_eq!(dashboard["speciality_distribution"][0]["count"], 2);
    assert_eq!(dashboard["recent"].as_array().unwrap().len(), 5);
    assert_eq!(dashboard["doctors"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn doctor_dashboard_includes_profile_and_next_up() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/doctor/appointments"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(MockBackendResponses::appointments_response(mixed_appointments())),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/doctor/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "doctor": MockBackendResponses::doctor_response("d1", "Dr. Rao", "Dermatologist", true)
        })))
        .mount(&mock_server)
        .await;

    let response = doctor_app(&mock_server)
        .oneshot(get("/dashboard", "doc-token"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let dashboard = &json_body(response).await["dashboard"];

    assert_eq!(dashboard["doctor"]["name"], "Dr. Rao");
    assert_eq!(dashboard["total"], 4);
    assert_eq!(dashboard["completed"], 1);
    assert_eq!(dashboard["earnings"], 800.0);
    assert_eq!(ids(&dashboard["next_up"]), vec!["soon", "far"]);
}

#[tokio::test]
async fn admin_routes_reject_missing_token() {
    let mock_server = MockServer::start().await;

    let response = admin_app(&mock_server)
        .oneshot(Request::builder().uri("/appointments").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn failing_clock_is_reported_without_touching_the_backend() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/doctor/appointments"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let app = doctor_appointment_routes(state_with_clock(&mock_server, Arc::new(StoppedClock)));

    for uri in ["/appointments", "/dashboard"] {
        let response = app.clone().oneshot(get(uri, "doc-token")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "{}", uri);
        assert!(json_body(response).await["error"].as_str().unwrap().contains("clock unavailable"));
    }
}

#[tokio::test]
async fn day_buckets_follow_the_injected_clock() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/admin/appointments"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(MockBackendResponses::appointments_response(vec![
                AppointmentFixture::new("visit", "2_1_2025", "9:00 AM").build(),
            ])),
        )
        .mount(&mock_server)
        .await;

    let day_before = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(8, 0, 0).unwrap();
    let day_after = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap().and_hms_opt(8, 0, 0).unwrap();

    let before = admin_appointment_routes(state_with_clock(&mock_server, Arc::new(FixedClock(day_before))))
        .oneshot(get("/appointments", "admin-token"))
        .await
        .unwrap();
    let view = &json_body(before).await["appointments"];
    assert_eq!(view["upcoming_by_day"][0]["label"], "Tomorrow");

    let after = admin_appointment_routes(state_with_clock(&mock_server, Arc::new(FixedClock(day_after))))
        .oneshot(get("/appointments", "admin-token"))
        .await
        .unwrap();
    let view = &json_body(after).await["appointments"];
    assert_eq!(ids(&view["past"]), vec!["visit"]);
}
