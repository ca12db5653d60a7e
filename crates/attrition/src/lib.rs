//! Employee attrition predictions: record encoding, fitted artifact loading,
//! and the scale-then-classify inference pipeline.

pub mod config;
pub mod error;
pub mod prediction;
pub mod telemetry;

#[cfg(test)]
mod test_support;
