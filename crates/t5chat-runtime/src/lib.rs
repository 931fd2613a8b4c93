//! # t5chat-runtime
//!
//! Everything between a chat turn and the engine: device placement, loading a
//! named model once per process, timing generations, and the [`ChatGateway`]
//! that turns user text into a reply without ever failing the turn.

pub mod device;
pub mod gateway;
pub mod provider;
pub mod telemetry;

pub use device::{Device, DeviceError, DevicePreference};
pub use gateway::{ChatGateway, ResponseGenerator, FALLBACK_REPLY};
pub use provider::{LoadState, LoadedModel, ModelCache, ModelProvider, PretrainedProvider};
pub use telemetry::{
    GenerationMetrics, GenerationTimer, RecordingTelemetry, TelemetryHook, TracingTelemetry,
};
