//! Grafana adapters - implementations of the GrafanaApi port.
//!
//! - [`GrafanaHttpClient`] - reqwest client for a live Grafana instance
//! - [`MockGrafanaApi`] - canned responses for tests

mod http_client;
mod mock_client;

pub use http_client::GrafanaHttpClient;
pub use mock_client::{MockCall, MockGrafanaApi, MockReply};
