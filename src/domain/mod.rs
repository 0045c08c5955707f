//! Domain layer containing Grafana read models and the tool catalog.
//!
//! # Module Organization
//!
//! - `grafana` - Dashboards, panels, catalog records, Prometheus results
//! - `tools` - Tool definitions, calls, outputs, and the registry

pub mod grafana;
pub mod tools;
