// Line-protocol codec - renders window batches as InfluxDB points
use crate::domain::sample::{CalibrationRead, Exercise, GlucoseRead, Injection, Meal, Timestamped};
use crate::domain::window::WindowBatch;

/// A sample that knows how to render itself as an InfluxDB line-protocol
/// point.
pub trait SamplePoint: Timestamped {
    /// Measurement the sample kind is stored under.
    fn measurement() -> &'static str;

    /// Display-formatted local timestamp, stored alongside the values.
    fn local_time(&self) -> &str;

    /// Appends the kind-specific field set (`key=value[,key=value]`).
    fn encode_fields(&self, line: &mut String);
}

impl SamplePoint for GlucoseRead {
    fn measurement() -> &'static str {
        "glucose_read"
    }

    fn local_time(&self) -> &str {
        &self.local_time
    }

    fn encode_fields(&self, line: &mut String) {
        line.push_str("value=");
        line.push_str(&self.value.to_string());
        line.push('i');
    }
}

impl SamplePoint for CalibrationRead {
    fn measurement() -> &'static str {
        "calibration_read"
    }

    fn local_time(&self) -> &str {
        &self.local_time
    }

    fn encode_fields(&self, line: &mut String) {
        line.push_str("value=");
        line.push_str(&self.value.to_string());
        line.push('i');
    }
}

impl SamplePoint for Injection {
    fn measurement() -> &'static str {
        "injection"
    }

    fn local_time(&self) -> &str {
        &self.local_time
    }

    fn encode_fields(&self, line: &mut String) {
        line.push_str("units=");
        line.push_str(&self.units.to_string());
    }
}

impl SamplePoint for Meal {
    fn measurement() -> &'static str {
        "meal"
    }

    fn local_time(&self) -> &str {
        &self.local_time
    }

    fn encode_fields(&self, line: &mut String) {
        line.push_str("carbs=");
        line.push_str(&self.carbs.to_string());
    }
}

impl SamplePoint for Exercise {
    fn measurement() -> &'static str {
        "exercise"
    }

    fn local_time(&self) -> &str {
        &self.local_time
    }

    fn encode_fields(&self, line: &mut String) {
        line.push_str("duration_minutes=");
        line.push_str(&self.duration_minutes.to_string());
        line.push_str("i,intensity=\"");
        line.push_str(&escape_field_string(&self.intensity));
        line.push('"');
    }
}

/// Renders a group of window batches into one line-protocol body, tagged
/// with the owning user. Batch and sample order is preserved.
pub fn encode_batches<T: SamplePoint>(batches: &[WindowBatch<T>], user: &str) -> String {
    let mut body = String::new();
    for batch in batches {
        for sample in batch.samples() {
            encode_point(sample, user, &mut body);
        }
    }

    body
}

fn encode_point<T: SamplePoint>(sample: &T, user: &str, body: &mut String) {
    body.push_str(T::measurement());
    body.push_str(",user=");
    body.push_str(&escape_tag(user));
    body.push(' ');
    sample.encode_fields(body);
    body.push_str(",local_time=\"");
    body.push_str(&escape_field_string(sample.local_time()));
    body.push_str("\" ");
    body.push_str(&sample.timestamp().to_string());
    body.push('\n');
}

fn escape_tag(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace(',', "\\,")
        .replace('=', "\\=")
        .replace(' ', "\\ ")
}

fn escape_field_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
