use std::sync::Arc;
use serde_json::{json, Value};

use shared_config::AppConfig;

pub struct TestConfig {
    pub backend_url: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:4000".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_backend(backend_url: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into(),
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig::with_backend_url(self.backend_url.clone())
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

/// Builder for backend-shaped appointment JSON.
#[derive(Debug, Clone)]
pub struct AppointmentFixture {
    value: Value,
}

impl AppointmentFixture {
    pub fn new(id: &str, slot_date: &str, slot_time: &str) -> Self {
        Self {
            value: json!({
                "_id": id,
                "userId": "user-1",
                "docId": "doc-1",
                "slotDate": slot_date,
                "slotTime": slot_time,
                "userData": {
                    "name": "Asha Verma",
                    "email": "asha@example.com",
                    "phone": "9000000000"
                },
                "docData": {
                    "name": "Dr. Rao",
                    "speciality": "Dermatologist"
                },
                "amount": 500,
                "date": 1_700_000_000_000_i64,
                "cancelled": false,
                "paymentStatus": "pending",
                "isCompleted": false
            }),
        }
    }

    fn set(mut self, key: &str, value: Value) -> Self {
        self.value[key] = value;
        self
    }

    pub fn cancelled_by(self, who: &str) -> Self {
        self.set("cancelled", json!(true)).set("cancelledBy", json!(who))
    }

    pub fn completed(self) -> Self {
        self.set("isCompleted", json!(true))
    }

    pub fn paid(self) -> Self {
        self.set("paymentStatus", json!("paid"))
    }

    pub fn payment(self, status: &str) -> Self {
        self.set("paymentStatus", json!(status))
    }

    pub fn amount(self, amount: f64) -> Self {
        self.set("amount", json!(amount))
    }

    pub fn booked_at_millis(self, millis: i64) -> Self {
        self.set("date", json!(millis))
    }

    pub fn build(self) -> Value {
        self.value
    }
}

pub struct MockBackendResponses;

impl MockBackendResponses {
    pub fn appointments_response(appointments: Vec<Value>) -> Value {
        json!({
            "success": true,
            "appointments": appointments
        })
    }

    pub fn doctor_response(id: &str, name: &str, speciality: &str, available: bool) -> Value {
        json!({
            "_id": id,
            "name": name,
            "email": format!("{}@clinic.test", id),
            "image": "https://cdn.clinic.test/doctor.png",
            "speciality": speciality,
            "degree": "MBBS",
            "experience": "4 Years",
            "about": "Focused on preventive care.",
            "fees": 500,
            "address": { "line1": "12 Residency Road", "line2": "Bengaluru" },
            "available": available
        })
    }

    pub fn doctors_response(doctors: Vec<Value>) -> Value {
        json!({
            "success": true,
            "doctors": doctors
        })
    }

    pub fn patients_count_response(count: u64) -> Value {
        json!({
            "success": true,
            "count": count
        })
    }

    pub fn success_message(message: &str) -> Value {
        json!({
            "success": true,
            "message": message
        })
    }

    pub fn failure_message(message: &str) -> Value {
        json!({
            "success": false,
            "message": message
        })
    }
}
