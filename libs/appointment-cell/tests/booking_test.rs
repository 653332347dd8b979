use assert_matches::assert_matches;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::models::{
    AppointmentStatus, BookAppointmentRequest, SchedulingError,
};
use appointment_cell::services::booking::BookingService;
use shared_config::AppConfig;

// ==============================================================================
// TEST FIXTURES AND UTILITIES
// ==============================================================================

struct TestSetup {
    service: BookingService,
    mock_server: MockServer,
    auth_token: String,
}

impl TestSetup {
    async fn new() -> Self {
        let mock_server = MockServer::start().await;

        let config = AppConfig {
            store_url: mock_server.uri(),
            store_api_key: "test-api-key".to_string(),
            jwt_secret: "test-secret-key-for-jwt-validation".to_string(),
            slot_minutes: 30,
        };

        Self {
            service: BookingService::new(&config),
            mock_server,
            auth_token: "test_token".to_string(),
        }
    }
}

fn appointment_json(
    id: Uuid,
    doctor_id: Uuid,
    date: &str,
    start_time: &str,
    status: &str,
) -> serde_json::Value {
    json!({
        "id": id,
        "patient_id": Uuid::new_v4(),
        "patient_name": "Demo User",
        "doctor_id": doctor_id,
        "doctor_name": "Dra. Martínez",
        "specialty": "Dermatología",
        "date": date,
        "start_time": start_time,
        "reason": "Chequeo",
        "status": status,
        "created_at": "2025-10-01T09:00:00Z",
        "updated_at": "2025-10-01T09:00:00Z"
    })
}

fn block_json(doctor_id: Uuid, date: &str, start: &str, end: &str) -> serde_json::Value {
    json!({
        "id": Uuid::new_v4(),
        "doctor_id": doctor_id,
        "date": date,
        "start_time": start,
        "end_time": end,
        "note": "Reunión"
    })
}

fn booking_request(doctor_id: Uuid, date: &str, start_time: &str) -> BookAppointmentRequest {
    BookAppointmentRequest {
        patient_id: Uuid::new_v4(),
        patient_name: "Demo User".to_string(),
        doctor_id,
        doctor_name: "Dra. Martínez".to_string(),
        specialty: "Dermatología".to_string(),
        date: date.parse().unwrap(),
        start_time: start_time.parse().unwrap(),
        reason: "Chequeo".to_string(),
    }
}

async fn mount_day_fixtures(
    setup: &TestSetup,
    doctor_id: Uuid,
    date: &str,
    appointments: Vec<serde_json::Value>,
    blocks: Vec<serde_json::Value>,
) {
    Mock::given(method("GET"))
        .and(path("/appointments"))
        .and(query_param("doctor_id", doctor_id.to_string()))
        .and(query_param("date", date))
        .respond_with(ResponseTemplate::new(200).set_body_json(appointments))
        .mount(&setup.mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/doctors/{}/blocks", doctor_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(blocks))
        .mount(&setup.mock_server)
        .await;
}

// ==============================================================================
// BOOKING
// ==============================================================================

#[tokio::test]
async fn booking_a_free_slot_creates_a_pending_appointment() {
    let setup = TestSetup::new().await;
    let doctor_id = Uuid::new_v4();

    mount_day_fixtures(&setup, doctor_id, "2025-10-22", vec![], vec![]).await;

    let created_id = Uuid::new_v4();
    Mock::given(method("POST"))
        .and(path("/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(appointment_json(
            created_id,
            doctor_id,
            "2025-10-22",
            "10:30:00",
            "pending",
        )))
        .expect(1)
        .mount(&setup.mock_server)
        .await;

    let appointment = setup
        .service
        .book_appointment(
            booking_request(doctor_id, "2025-10-22", "10:30:00"),
            &setup.auth_token,
        )
        .await
        .unwrap();

    assert_eq!(appointment.id, created_id);
    assert_eq!(appointment.status, AppointmentStatus::Pending);
}

#[tokio::test]
async fn booking_inside_a_blocked_slot_is_rejected_before_any_write() {
    let setup = TestSetup::new().await;
    let doctor_id = Uuid::new_v4();

    mount_day_fixtures(
        &setup,
        doctor_id,
        "2025-10-22",
        vec![],
        vec![block_json(doctor_id, "2025-10-22", "09:00:00", "09:30:00")],
    )
    .await;

    // No POST mock is mounted: a write reaching the store would fail the
    // test with a store error instead of the expected conflict.
    let result = setup
        .service
        .book_appointment(
            booking_request(doctor_id, "2025-10-22", "09:15:00"),
            &setup.auth_token,
        )
        .await;

    assert_matches!(result, Err(SchedulingError::Conflict));
}

#[tokio::test]
async fn booking_adjacent_to_a_blocked_slot_succeeds() {
    let setup = TestSetup::new().await;
    let doctor_id = Uuid::new_v4();

    mount_day_fixtures(
        &setup,
        doctor_id,
        "2025-10-22",
        vec![],
        vec![block_json(doctor_id, "2025-10-22", "09:00:00", "09:30:00")],
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(appointment_json(
            Uuid::new_v4(),
            doctor_id,
            "2025-10-22",
            "09:30:00",
            "pending",
        )))
        .expect(1)
        .mount(&setup.mock_server)
        .await;

    let result = setup
        .service
        .book_appointment(
            booking_request(doctor_id, "2025-10-22", "09:30:00"),
            &setup.auth_token,
        )
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn double_booking_an_occupied_start_is_rejected() {
    let setup = TestSetup::new().await;
    let doctor_id = Uuid::new_v4();

    mount_day_fixtures(
        &setup,
        doctor_id,
        "2025-10-22",
        vec![appointment_json(
            Uuid::new_v4(),
            doctor_id,
            "2025-10-22",
            "10:30:00",
            "confirmed",
        )],
        vec![],
    )
    .await;

    let result = setup
        .service
        .book_appointment(
            booking_request(doctor_id, "2025-10-22", "10:30:00"),
            &setup.auth_token,
        )
        .await;

    assert_matches!(result, Err(SchedulingError::Conflict));
}

#[tokio::test]
async fn a_cancelled_appointment_frees_its_slot_for_rebooking() {
    let setup = TestSetup::new().await;
    let doctor_id = Uuid::new_v4();

    mount_day_fixtures(
        &setup,
        doctor_id,
        "2025-10-22",
        vec![appointment_json(
            Uuid::new_v4(),
            doctor_id,
            "2025-10-22",
            "10:30:00",
            "cancelled",
        )],
        vec![],
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(appointment_json(
            Uuid::new_v4(),
            doctor_id,
            "2025-10-22",
            "10:30:00",
            "pending",
        )))
        .mount(&setup.mock_server)
        .await;

    let result = setup
        .service
        .book_appointment(
            booking_request(doctor_id, "2025-10-22", "10:30:00"),
            &setup.auth_token,
        )
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn booking_without_a_reason_is_rejected() {
    let setup = TestSetup::new().await;
    let doctor_id = Uuid::new_v4();

    let mut request = booking_request(doctor_id, "2025-10-22", "10:30:00");
    request.reason = "   ".to_string();

    let result = setup
        .service
        .book_appointment(request, &setup.auth_token)
        .await;

    assert_matches!(result, Err(SchedulingError::Validation(_)));
}

// ==============================================================================
// STATUS CHANGES
// ==============================================================================

#[tokio::test]
async fn confirming_a_pending_appointment_persists_the_new_status() {
    let setup = TestSetup::new().await;
    let doctor_id = Uuid::new_v4();
    let appointment_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/appointments"))
        .and(query_param("id", appointment_id.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![appointment_json(
            appointment_id,
            doctor_id,
            "2025-10-22",
            "10:30:00",
            "pending",
        )]))
        .mount(&setup.mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path(format!("/appointments/{}/status", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(appointment_json(
            appointment_id,
            doctor_id,
            "2025-10-22",
            "10:30:00",
            "confirmed",
        )))
        .expect(1)
        .mount(&setup.mock_server)
        .await;

    let updated = setup
        .service
        .change_status(appointment_id, AppointmentStatus::Confirmed, &setup.auth_token)
        .await
        .unwrap();

    assert_eq!(updated.status, AppointmentStatus::Confirmed);
}

#[tokio::test]
async fn cancelling_a_cancelled_appointment_is_rejected_without_a_write() {
    let setup = TestSetup::new().await;
    let appointment_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/appointments"))
        .and(query_param("id", appointment_id.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![appointment_json(
            appointment_id,
            Uuid::new_v4(),
            "2025-10-22",
            "10:30:00",
            "cancelled",
        )]))
        .mount(&setup.mock_server)
        .await;

    // No PATCH mock: the guard must reject before the store is written.
    let result = setup
        .service
        .cancel_appointment(appointment_id, &setup.auth_token)
        .await;

    assert_matches!(
        result,
        Err(SchedulingError::InvalidTransition {
            from: AppointmentStatus::Cancelled,
            to: AppointmentStatus::Cancelled,
        })
    );
}

#[tokio::test]
async fn changing_status_of_a_missing_appointment_is_not_found() {
    let setup = TestSetup::new().await;
    let appointment_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/appointments"))
        .and(query_param("id", appointment_id.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(Vec::<serde_json::Value>::new()))
        .mount(&setup.mock_server)
        .await;

    let result = setup
        .service
        .change_status(appointment_id, AppointmentStatus::Confirmed, &setup.auth_token)
        .await;

    assert_matches!(result, Err(SchedulingError::NotFound));
}

// ==============================================================================
// ADVISORY CONFLICT PROBE
// ==============================================================================

#[tokio::test]
async fn conflict_probe_reports_occupied_and_free_slots() {
    let setup = TestSetup::new().await;
    let doctor_id = Uuid::new_v4();

    mount_day_fixtures(
        &setup,
        doctor_id,
        "2025-10-22",
        vec![],
        vec![block_json(doctor_id, "2025-10-22", "09:00:00", "09:30:00")],
    )
    .await;

    let date = "2025-10-22".parse().unwrap();
    let occupied = shared_models::interval::TimeInterval::new(
        date,
        "09:15:00".parse().unwrap(),
        "09:45:00".parse().unwrap(),
    )
    .unwrap();
    let free = shared_models::interval::TimeInterval::new(
        date,
        "09:30:00".parse().unwrap(),
        "10:00:00".parse().unwrap(),
    )
    .unwrap();

    assert!(setup
        .service
        .check_conflict(doctor_id, occupied, &setup.auth_token)
        .await
        .unwrap());
    assert!(!setup
        .service
        .check_conflict(doctor_id, free, &setup.auth_token)
        .await
        .unwrap());
}
