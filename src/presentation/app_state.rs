// Application state for HTTP handlers
use crate::infrastructure::config::PipelineSettings;
use crate::infrastructure::influx_writer::InfluxStore;

#[derive(Clone)]
pub struct AppState {
    pub store: InfluxStore,
    pub pipeline: PipelineSettings,
}
