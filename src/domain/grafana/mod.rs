//! Grafana domain - read models for documents returned by the Grafana API.
//!
//! Grafana owns every record here; this crate only reads and reshapes them.
//! Each record names the fields the tools use and keeps everything else in an
//! `extra` map, so new Grafana schema versions deserialize without loss.
//!
//! ## Key Types
//!
//! - [`DashboardDocument`] - `{meta, dashboard}` envelope for a dashboard
//! - [`Panel`] - closed variant: a leaf panel or a row holding leaf panels
//! - [`SearchHit`], [`Folder`], [`DataSource`] - flat records keyed by UID
//! - [`PrometheusResponse`] / [`QueryResult`] - proxied metric query results
//! - [`ServiceStatus`], [`SeriesStats`] - summaries derived from query results

mod catalog;
mod dashboard;
mod prometheus;

pub use catalog::{
    dedupe_by_uid, DataSource, Folder, HealthStatus, OrgInfo, SearchHit, TagCount,
};
pub use dashboard::{
    DashboardDocument, DashboardMeta, DashboardModel, LeafPanel, Panel, PanelQuery, PanelRef,
    PanelTarget, RowPanel, TargetQuery, Templating, TemplateVariable, ROW_PANEL_TYPE,
};
pub use prometheus::{
    service_statuses, up_query, InstantSample, Labels, PrometheusResponse, QueryResult,
    RangeSeries, SamplePair, SeriesStats, ServiceState, ServiceStatus,
};

use serde::{Deserialize, Deserializer, Serialize};

/// Largest number of list entries a tool result carries.
pub const MAX_LIST_ITEMS: usize = 100;

/// A list cut down to a fixed cap, remembering the original size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Capped<T> {
    /// Number of entries before capping
    pub total: usize,
    /// Whether entries were dropped
    pub truncated: bool,
    /// The first `cap` entries
    pub items: Vec<T>,
}

impl<T> Capped<T> {
    /// Keep at most `cap` entries.
    pub fn new(mut items: Vec<T>, cap: usize) -> Self {
        let total = items.len();
        let truncated = total > cap;
        items.truncate(cap);
        Self {
            total,
            truncated,
            items,
        }
    }
}

/// Treat an explicit JSON `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capped_keeps_short_lists_whole() {
        let capped = Capped::new(vec![1, 2, 3], MAX_LIST_ITEMS);

        assert_eq!(capped.total, 3);
        assert!(!capped.truncated);
        assert_eq!(capped.items, vec![1, 2, 3]);
    }

    #[test]
    fn capped_truncates_long_lists() {
        let capped = Capped::new((0..150).collect::<Vec<_>>(), MAX_LIST_ITEMS);

        assert_eq!(capped.total, 150);
        assert!(capped.truncated);
        assert_eq!(capped.items.len(), 100);
        assert_eq!(capped.items[99], 99);
    }

    #[test]
    fn capped_at_exact_cap_is_not_truncated() {
        let capped = Capped::new(vec![0; 100], MAX_LIST_ITEMS);
        assert!(!capped.truncated);
    }
}
