//! Fixtures and an in-memory transport for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::api::{ApiError, SpoolmanTransport};

pub fn acme_vendors() -> Value {
    json!([
        {"id": 1, "name": "Acme"},
        {"id": 2, "name": "Polymaker"}
    ])
}

pub fn acme_filaments() -> Value {
    json!([
        {
            "id": 10,
            "name": "PLA Basic",
            "vendor": {"id": 1, "name": "Acme"},
            "material": "PLA",
            "price": 24.99,
            "density": 1.24,
            "diameter": 1.75,
            "article_number": "PLA-175-BLK",
            "settings_extruder_temp": 210,
            "settings_bed_temp": 60,
            "color_hex": "1A1A1A"
        },
        {
            "id": 11,
            "name": "PETG Clear",
            "vendor": {"id": 1, "name": "Acme"},
            "material": "PETG",
            "price": null,
            "density": 1.27,
            "diameter": 1.75
        },
        {
            "id": 12,
            "name": "PolyLite ABS",
            "vendor": {"id": 2, "name": "Polymaker"},
            "material": "ABS",
            "price": 21.5,
            "density": 1.04,
            "diameter": 1.75,
            "settings_extruder_temp": 250,
            "settings_bed_temp": 100,
            "color_hex": "#F0F0F0"
        }
    ])
}

pub fn acme_spools() -> Value {
    json!([
        {
            "id": 100,
            "filament": {"id": 10, "vendor": {"id": 1}},
            "remaining_weight": 900.0,
            "used_weight": 100.0,
            "remaining_length": 301234.5,
            "used_length": 33470.1,
            "archived": false
        },
        {
            "id": 101,
            "filament": {"id": 10, "vendor": {"id": 1}},
            "remaining_weight": 250.0,
            "used_weight": 750.0,
            "archived": false
        },
        {
            "id": 102,
            "filament": {"id": 12, "vendor": {"id": 2}},
            "remaining_weight": 0.0,
            "used_weight": 1000.0,
            "archived": true
        }
    ])
}

/// Look up one item of a fixture list by id
pub fn item(list: &Value, id: i64) -> Value {
    list.as_array()
        .and_then(|items| items.iter().find(|v| v["id"] == json!(id)))
        .cloned()
        .unwrap_or_else(|| panic!("fixture has no item {}", id))
}

enum FakeResponse {
    Json(Value),
    Status(u16),
}

/// Transport serving canned documents and recording every request.
/// Unknown endpoints answer 404.
#[derive(Default)]
pub struct FakeTransport {
    routes: Mutex<HashMap<String, FakeResponse>>,
    calls: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport serving the Acme fixture on every list and item endpoint
    pub fn acme() -> Self {
        let fake = Self::new();
        fake.serve_lists(acme_vendors(), acme_filaments(), acme_spools());
        fake
    }

    pub fn serve_lists(&self, vendors: Value, filaments: Value, spools: Value) {
        for (endpoint, list) in [("vendor", vendors), ("filament", filaments), ("spool", spools)] {
            if let Some(items) = list.as_array() {
                for entry in items {
                    if let Some(id) = entry["id"].as_i64() {
                        self.serve(&format!("{}/{}", endpoint, id), entry.clone());
                    }
                }
            }
            self.serve(endpoint, list);
        }
    }

    pub fn serve(&self, endpoint: &str, body: Value) {
        self.routes
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), FakeResponse::Json(body));
    }

    pub fn fail(&self, endpoint: &str, status: u16) {
        self.routes
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), FakeResponse::Status(status));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, endpoint: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == endpoint).count()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl SpoolmanTransport for FakeTransport {
    async fn get_json(&self, endpoint: &str) -> Result<Value, ApiError> {
        self.calls.lock().unwrap().push(endpoint.to_string());
        // Let concurrent callers interleave
        tokio::task::yield_now().await;

        match self.routes.lock().unwrap().get(endpoint) {
            Some(FakeResponse::Json(body)) => Ok(body.clone()),
            Some(FakeResponse::Status(code)) => {
                let status = StatusCode::from_u16(*code).unwrap();
                Err(ApiError::from_status(status, "fake failure"))
            }
            None => Err(ApiError::NotFound(endpoint.to_string())),
        }
    }
}
