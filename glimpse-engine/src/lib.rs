//! Glimpse Engine - Image Analysis
//!
//! Provides the concrete analysis capability consumed by the request
//! pipeline:
//! - `FeatureDetector`: Harris corners plus orientation-histogram descriptors
//! - `EngineAdapter`: NotReady/Ready lifecycle, readiness gating and timeouts

pub mod adapter;
pub mod config;
pub mod detector;
pub mod features;

pub use adapter::EngineAdapter;
pub use config::DetectorConfig;
pub use detector::FeatureDetector;
pub use features::{detect, detect_from_bytes, DetectError, Features, Keypoint, DESCRIPTOR_LEN};
