//! Cross-module tests over the full analysis pipeline.

mod network_properties;
