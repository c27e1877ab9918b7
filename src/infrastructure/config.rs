use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct InfluxConfig {
    pub influx: InfluxSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InfluxSettings {
    pub host: String,
    pub token: String,
    pub database: String,
    pub retention_policy: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PipelineConfig {
    #[serde(default)]
    pub pipeline: PipelineSettings,
}

/// Tuning knobs for the buffering pipeline.
#[derive(Debug, Deserialize, Clone)]
pub struct PipelineSettings {
    /// Sample-time span of one window batch, in hours.
    #[serde(default = "default_window_duration_hours")]
    pub window_duration_hours: u64,
    /// Window batches coalesced into one backing-store write.
    #[serde(default = "default_batch_flush_size")]
    pub batch_flush_size: usize,
}

impl PipelineSettings {
    pub fn window_duration(&self) -> Duration {
        Duration::from_secs(self.window_duration_hours * 60 * 60)
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            window_duration_hours: default_window_duration_hours(),
            batch_flush_size: default_batch_flush_size(),
        }
    }
}

fn default_window_duration_hours() -> u64 {
    24
}

fn default_batch_flush_size() -> usize {
    200
}

pub fn load_influx_config() -> anyhow::Result<InfluxConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/influx"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

pub fn load_pipeline_config() -> anyhow::Result<PipelineConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/pipeline").required(false))
        .build()?;

    Ok(settings.try_deserialize()?)
}
