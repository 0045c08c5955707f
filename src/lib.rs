//! Grafana Observer - read-only Grafana access for MCP clients
//!
//! This crate exposes dashboards, panels, folders, datasources, and
//! Prometheus metrics of a Grafana instance as Model Context Protocol tools
//! served over stdio. Nothing in Grafana is ever modified.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
