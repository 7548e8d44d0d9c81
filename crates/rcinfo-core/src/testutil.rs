//! Shared fakes for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use serde_json::{json, Value};

use crate::error::LookupError;
use crate::lookup::VehicleLookup;
use crate::regno::RegNo;
use crate::vehicle::VehicleRecord;

/// Lookup that returns a fixed record or a fixed upstream message.
pub struct FakeLookup {
    outcome: Result<Value, String>,
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl FakeLookup {
    pub fn found(record: Value) -> Self {
        Self {
            outcome: Ok(record),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

impl VehicleLookup for FakeLookup {
    fn fetch(&self, regno: &RegNo) -> Result<VehicleRecord, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(regno.to_string());
        match &self.outcome {
            Ok(v) => Ok(VehicleRecord::new(v.clone())),
            Err(m) => Err(LookupError::Upstream(m.clone())),
        }
    }
}

/// A typical upstream detail object with a masked engine number.
pub fn sample_detail() -> Value {
    json!({
        "registrationNumber": "JK03N1234",
        "rc_owner_name": "A & B",
        "brand": { "make_display": "Tata" },
        "model": { "model_display": "Nexon" },
        "fuelType": "DIESEL",
        "modelImageUrl": "https://img.example/nexon.jpg",
        "engineNo": "MX1234X56",
        "insuranceUpTo": "2024-03-15",
        "full_details": { "engineNo": "M1234956", "cubicCap": "1497" }
    })
}
