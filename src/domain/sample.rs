// Health sample domain models
use serde::{Deserialize, Serialize};

/// Absolute sample time in seconds since the epoch.
pub type Timestamp = i64;

/// Anything carrying an absolute sample time.
pub trait Timestamped {
    fn timestamp(&self) -> Timestamp;
}

/// One sensor glucose reading in mg/dL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlucoseRead {
    pub local_time: String,
    pub timestamp: Timestamp,
    pub value: i32,
}

/// One meter calibration reading in mg/dL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationRead {
    pub local_time: String,
    pub timestamp: Timestamp,
    pub value: i32,
}

/// One insulin injection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Injection {
    pub local_time: String,
    pub timestamp: Timestamp,
    pub units: f32,
}

/// One meal, recorded as grams of carbohydrate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub local_time: String,
    pub timestamp: Timestamp,
    pub carbs: f32,
}

/// One exercise event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub local_time: String,
    pub timestamp: Timestamp,
    #[serde(rename = "durationInMinutes")]
    pub duration_minutes: i32,
    pub intensity: String,
}

impl Timestamped for GlucoseRead {
    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

impl Timestamped for CalibrationRead {
    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

impl Timestamped for Injection {
    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

impl Timestamped for Meal {
    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

impl Timestamped for Exercise {
    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}
