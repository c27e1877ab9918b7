// HTTP request handlers - per-kind sample ingestion endpoints
use crate::application::batcher::BatchingWriter;
use crate::application::sample_writer::BatchWriter;
use crate::application::streamer::{
    calibration_read_streamer, exercise_streamer, glucose_read_streamer, injection_streamer,
    meal_streamer, SampleStreamer,
};
use crate::domain::sample::{CalibrationRead, Exercise, GlucoseRead, Injection, Meal, Timestamped};
use crate::infrastructure::influx_writer::InfluxBatchWriter;
use crate::presentation::app_state::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use thiserror::Error;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Error decoding data: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Error storing data: {0}")]
    Store(anyhow::Error),
    #[error("Missing or malformed bearer token")]
    Unauthorized,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Decode(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(_) => StatusCode::BAD_GATEWAY,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
        };

        (status, self.to_string()).into_response()
    }
}

/// Extracts the caller identity from the Authorization header. Token
/// exchange happens upstream; here the opaque token is the user key the
/// persisted samples are tagged with.
fn bearer_user(headers: &HeaderMap) -> Result<String, ApiError> {
    let value = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    let token = value.strip_prefix("Bearer ").unwrap_or_default();
    if token.is_empty() {
        return Err(ApiError::Unauthorized);
    }

    Ok(token.to_string())
}

/// Drives one request body through a freshly built streamer chain. The body
/// is a stream of JSON arrays, globally sorted oldest to newest; each decoded
/// chunk is written through the streamer, always rebinding to the returned
/// state. The first failure stops the remaining chunks.
async fn drive_streamer<T, W>(
    mut streamer: SampleStreamer<T, W>,
    body: &[u8],
    kind: &str,
) -> Result<usize, ApiError>
where
    T: Timestamped + DeserializeOwned + Clone + Send + Sync,
    W: BatchWriter<T> + Send,
{
    let mut total = 0;
    for chunk in serde_json::Deserializer::from_slice(body).into_iter::<Vec<T>>() {
        let chunk = chunk?;
        tracing::debug!("Writing {} new {} samples", chunk.len(), kind);
        total += chunk.len();
        streamer = streamer.write_many(&chunk).await.map_err(ApiError::Store)?;
    }

    streamer.close().await.map_err(ApiError::Store)?;
    Ok(total)
}

/// Handle a POST of new glucose read data
pub async fn ingest_glucose_reads(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let user = bearer_user(&headers)?;

    let store_writer = InfluxBatchWriter::<GlucoseRead>::new(state.store.clone(), user.clone());
    let batching_writer = BatchingWriter::new(store_writer, state.pipeline.batch_flush_size);
    let streamer = glucose_read_streamer(batching_writer, state.pipeline.window_duration());

    match drive_streamer(streamer, &body, "glucose read").await {
        Ok(count) => {
            tracing::info!("Wrote {} glucose reads for user [{}]", count, user);
            Ok(StatusCode::OK)
        }
        Err(e) => {
            tracing::warn!("Error processing glucose read data for user [{}]: {}", user, e);
            Err(e)
        }
    }
}

/// Handle a POST of new calibration read data
pub async fn ingest_calibration_reads(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let user = bearer_user(&headers)?;

    let store_writer = InfluxBatchWriter::<CalibrationRead>::new(state.store.clone(), user.clone());
    let batching_writer = BatchingWriter::new(store_writer, state.pipeline.batch_flush_size);
    let streamer = calibration_read_streamer(batching_writer, state.pipeline.window_duration());

    match drive_streamer(streamer, &body, "calibration read").await {
        Ok(count) => {
            tracing::info!("Wrote {} calibration reads for user [{}]", count, user);
            Ok(StatusCode::OK)
        }
        Err(e) => {
            tracing::warn!(
                "Error processing calibration read data for user [{}]: {}",
                user,
                e
            );
            Err(e)
        }
    }
}

/// Handle a POST of new injection data
pub async fn ingest_injections(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let user = bearer_user(&headers)?;

    let store_writer = InfluxBatchWriter::<Injection>::new(state.store.clone(), user.clone());
    let batching_writer = BatchingWriter::new(store_writer, state.pipeline.batch_flush_size);
    let streamer = injection_streamer(batching_writer, state.pipeline.window_duration());

    match drive_streamer(streamer, &body, "injection").await {
        Ok(count) => {
            tracing::info!("Wrote {} injections for user [{}]", count, user);
            Ok(StatusCode::OK)
        }
        Err(e) => {
            tracing::warn!("Error processing injection data for user [{}]: {}", user, e);
            Err(e)
        }
    }
}

/// Handle a POST of new meal data
pub async fn ingest_meals(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let user = bearer_user(&headers)?;

    let store_writer = InfluxBatchWriter::<Meal>::new(state.store.clone(), user.clone());
    let batching_writer = BatchingWriter::new(store_writer, state.pipeline.batch_flush_size);
    let streamer = meal_streamer(batching_writer, state.pipeline.window_duration());

    match drive_streamer(streamer, &body, "meal").await {
        Ok(count) => {
            tracing::info!("Wrote {} meals for user [{}]", count, user);
            Ok(StatusCode::OK)
        }
        Err(e) => {
            tracing::warn!("Error processing meal data for user [{}]: {}", user, e);
            Err(e)
        }
    }
}

/// Handle a POST of new exercise data
pub async fn ingest_exercises(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let user = bearer_user(&headers)?;

    let store_writer = InfluxBatchWriter::<Exercise>::new(state.store.clone(), user.clone());
    let batching_writer = BatchingWriter::new(store_writer, state.pipeline.batch_flush_size);
    let streamer = exercise_streamer(batching_writer, state.pipeline.window_duration());

    match drive_streamer(streamer, &body, "exercise").await {
        Ok(count) => {
            tracing::info!("Wrote {} exercises for user [{}]", count, user);
            Ok(StatusCode::OK)
        }
        Err(e) => {
            tracing::warn!("Error processing exercise data for user [{}]: {}", user, e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_user_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc123"));

        assert_eq!(bearer_user(&headers).unwrap(), "abc123");
    }

    #[test]
    fn test_missing_authorization_is_rejected() {
        let headers = HeaderMap::new();
        assert!(matches!(
            bearer_user(&headers),
            Err(ApiError::Unauthorized)
        ));
    }

    #[test]
    fn test_bare_bearer_prefix_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer "));

        assert!(matches!(bearer_user(&headers), Err(ApiError::Unauthorized)));
    }

    #[test]
    fn test_request_body_decodes_as_chunked_arrays() {
        let body = br#"[{"localTime":"","timestamp":1,"value":80}]
[{"localTime":"","timestamp":2,"value":81},{"localTime":"","timestamp":3,"value":82}]"#;

        let chunks: Vec<Vec<GlucoseRead>> = serde_json::Deserializer::from_slice(body)
            .into_iter::<Vec<GlucoseRead>>()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 1);
        assert_eq!(chunks[1].len(), 2);
    }
}
