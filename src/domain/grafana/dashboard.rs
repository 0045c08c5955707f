//! Dashboard documents, panels, and template variables.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};

use super::null_as_default;

/// Panel type string Grafana uses for row containers.
pub const ROW_PANEL_TYPE: &str = "row";

/// Template variables keep at most this many options in summaries.
const MAX_VARIABLE_OPTIONS: usize = 10;

/// Response of `/api/dashboards/uid/{uid}` and `/api/dashboards/home`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardDocument {
    #[serde(default, deserialize_with = "null_as_default")]
    pub meta: DashboardMeta,

    #[serde(default, deserialize_with = "null_as_default")]
    pub dashboard: DashboardModel,
}

/// Dashboard metadata: permissions, timestamps, folder linkage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMeta {
    pub can_save: Option<bool>,
    pub can_edit: Option<bool>,
    pub can_admin: Option<bool>,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub url: Option<String>,
    pub folder_id: Option<i64>,
    pub folder_uid: Option<String>,
    pub folder_title: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DashboardMeta {
    /// The subset of metadata reported by dashboard summaries.
    pub fn summary(&self) -> Value {
        json!({
            "canSave": self.can_save,
            "canEdit": self.can_edit,
            "canAdmin": self.can_admin,
            "created": self.created,
            "updated": self.updated,
            "url": self.url,
            "folderId": self.folder_id,
            "folderTitle": self.folder_title,
        })
    }
}

/// The dashboard model itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardModel {
    pub id: Option<i64>,
    pub uid: Option<String>,
    pub title: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,

    pub timezone: Option<String>,

    /// Refresh interval; Grafana stores either a string or `false`
    pub refresh: Option<Value>,

    pub version: Option<i64>,
    pub editable: Option<bool>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub panels: Vec<Panel>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub templating: Templating,

    /// Default time range, e.g. `{"from": "now-6h", "to": "now"}`
    pub time: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DashboardModel {
    /// Template variables, in dashboard order.
    pub fn variables(&self) -> &[TemplateVariable] {
        &self.templating.list
    }

    /// The time settings, if the dashboard defines any.
    pub fn time_settings(&self) -> Option<&Value> {
        self.time
            .as_ref()
            .filter(|time| time.as_object().is_some_and(|map| !map.is_empty()))
    }

    /// Find a panel by id.
    ///
    /// Each top-level panel is checked first, then the panels nested inside it
    /// when it is a row. The first match wins.
    pub fn find_panel(&self, panel_id: i64) -> Option<PanelRef<'_>> {
        for panel in &self.panels {
            match panel {
                Panel::Leaf(leaf) => {
                    if leaf.id == Some(panel_id) {
                        return Some(PanelRef::Leaf(leaf));
                    }
                }
                Panel::Row(row) => {
                    if row.id == Some(panel_id) {
                        return Some(PanelRef::Row(row));
                    }
                    if let Some(nested) = row.panels.iter().find(|p| p.id == Some(panel_id)) {
                        return Some(PanelRef::Leaf(nested));
                    }
                }
            }
        }
        None
    }

    /// Every visualization panel, with rows replaced by their children.
    pub fn leaf_panels(&self) -> impl Iterator<Item = &LeafPanel> {
        self.panels.iter().flat_map(|panel| match panel {
            Panel::Leaf(leaf) => std::slice::from_ref(leaf).iter(),
            Panel::Row(row) => row.panels.iter(),
        })
    }

    /// Flattened panel summaries: a row is followed by the panels it holds.
    pub fn panel_summaries(&self) -> Vec<Value> {
        let mut summaries = Vec::new();
        for panel in &self.panels {
            match panel {
                Panel::Leaf(leaf) => summaries.push(leaf.info()),
                Panel::Row(row) => {
                    summaries.push(row.summary());
                    summaries.extend(row.panels.iter().map(LeafPanel::info));
                }
            }
        }
        summaries
    }

    /// Queries of every visualization panel.
    pub fn panel_queries(&self) -> Vec<PanelQuery> {
        self.leaf_panels().map(LeafPanel::query_summary).collect()
    }
}

/// A dashboard panel.
///
/// Grafana nests panels only inside rows and only one level deep, so a row
/// holds leaf panels and nothing else.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Panel {
    Row(RowPanel),
    Leaf(LeafPanel),
}

impl<'de> Deserialize<'de> for Panel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let is_row = value.get("type").and_then(Value::as_str) == Some(ROW_PANEL_TYPE);

        if is_row {
            serde_json::from_value(value)
                .map(Panel::Row)
                .map_err(D::Error::custom)
        } else {
            serde_json::from_value(value)
                .map(Panel::Leaf)
                .map_err(D::Error::custom)
        }
    }
}

/// Borrowed result of a panel lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelRef<'a> {
    Row(&'a RowPanel),
    Leaf(&'a LeafPanel),
}

impl PanelRef<'_> {
    /// Panel details as reported by the panel lookup tool.
    pub fn info(&self) -> Value {
        match self {
            PanelRef::Row(row) => row.summary(),
            PanelRef::Leaf(leaf) => leaf.info(),
        }
    }
}

/// A row container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowPanel {
    pub id: Option<i64>,
    pub title: Option<String>,

    #[serde(rename = "type")]
    pub panel_type: String,

    pub collapsed: Option<bool>,

    /// Children; Grafana fills this only while the row is collapsed
    #[serde(default, deserialize_with = "null_as_default")]
    pub panels: Vec<LeafPanel>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RowPanel {
    pub fn summary(&self) -> Value {
        json!({
            "id": self.id,
            "title": self.title.as_deref().unwrap_or("Row"),
            "type": ROW_PANEL_TYPE,
            "collapsed": self.collapsed.unwrap_or(false),
        })
    }
}

/// A visualization panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeafPanel {
    pub id: Option<i64>,
    pub title: Option<String>,

    #[serde(rename = "type")]
    pub panel_type: Option<String>,

    pub description: Option<String>,
    pub datasource: Option<Value>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub targets: Vec<PanelTarget>,

    pub grid_pos: Option<Value>,
    pub field_config: Option<Value>,
    pub options: Option<Value>,
    pub transparent: Option<bool>,
    pub links: Option<Value>,
    pub repeat: Option<String>,
    pub interval: Option<String>,
    pub max_data_points: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LeafPanel {
    fn title_or_untitled(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled")
    }

    /// Panel details: queries, visualization settings, field configuration.
    pub fn info(&self) -> Value {
        json!({
            "id": self.id,
            "title": self.title_or_untitled(),
            "type": self.panel_type,
            "description": self.description,
            "datasource": self.datasource,
            "targets": self.targets,
            "gridPos": self.grid_pos,
            "fieldConfig": self.field_config,
            "options": self.options,
            "transparent": self.transparent.unwrap_or(false),
            "links": self.links,
            "repeat": self.repeat,
            "interval": self.interval,
            "maxDataPoints": self.max_data_points,
        })
    }

    /// Targets that carry an expression, query, or raw SQL, keyed by ref id.
    pub fn query_summary(&self) -> PanelQuery {
        PanelQuery {
            panel_id: self.id,
            panel_title: self.title_or_untitled().to_string(),
            panel_type: self.panel_type.clone(),
            queries: self
                .targets
                .iter()
                .filter(|target| target.has_query())
                .map(TargetQuery::from)
                .collect(),
        }
    }
}

/// A panel query target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelTarget {
    pub ref_id: Option<String>,
    pub datasource: Option<Value>,

    /// PromQL expression
    pub expr: Option<String>,

    /// Query text for other datasources; some plugins store an object
    pub query: Option<Value>,

    /// SQL datasources
    pub raw_sql: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PanelTarget {
    pub fn has_query(&self) -> bool {
        let non_empty = |s: &Option<String>| s.as_deref().is_some_and(|s| !s.is_empty());
        non_empty(&self.expr) || non_empty(&self.raw_sql) || self.query.as_ref().is_some_and(is_truthy)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Queries extracted from one panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelQuery {
    pub panel_id: Option<i64>,
    pub panel_title: String,
    pub panel_type: Option<String>,
    pub queries: Vec<TargetQuery>,
}

/// One query of a panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetQuery {
    #[serde(rename = "refId", skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Value>,
    #[serde(rename = "rawSql", skip_serializing_if = "Option::is_none")]
    pub raw_sql: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datasource: Option<Value>,
}

impl From<&PanelTarget> for TargetQuery {
    fn from(target: &PanelTarget) -> Self {
        Self {
            ref_id: target.ref_id.clone(),
            expr: target.expr.clone(),
            query: target.query.clone(),
            raw_sql: target.raw_sql.clone(),
            datasource: target.datasource.clone(),
        }
    }
}

/// `dashboard.templating`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Templating {
    #[serde(default, deserialize_with = "null_as_default")]
    pub list: Vec<TemplateVariable>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A dashboard template variable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateVariable {
    pub name: Option<String>,

    #[serde(rename = "type")]
    pub variable_type: Option<String>,

    pub label: Option<String>,
    pub description: Option<String>,
    pub query: Option<Value>,
    pub datasource: Option<Value>,
    pub current: Option<Value>,
    pub multi: Option<bool>,
    pub include_all: Option<bool>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub options: Vec<Value>,

    pub hide: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TemplateVariable {
    /// Variable summary with at most ten options.
    pub fn summary(&self) -> Value {
        let options: Vec<&Value> = self.options.iter().take(MAX_VARIABLE_OPTIONS).collect();
        json!({
            "name": self.name,
            "type": self.variable_type,
            "label": self.label,
            "description": self.description,
            "query": self.query,
            "datasource": self.datasource,
            "current": self.current,
            "multi": self.multi.unwrap_or(false),
            "includeAll": self.include_all.unwrap_or(false),
            "options": options,
            "hide": self.hide.clone().unwrap_or_else(|| json!(0)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_dashboard() -> DashboardModel {
        serde_json::from_value(json!({
            "uid": "abc",
            "title": "Service Overview",
            "tags": ["prod"],
            "panels": [
                {
                    "id": 5,
                    "type": "timeseries",
                    "title": "Requests",
                    "targets": [
                        { "refId": "A", "expr": "rate(http_requests_total[5m])" },
                        { "refId": "B", "hide": true }
                    ]
                },
                {
                    "id": 10,
                    "type": "row",
                    "title": "Details",
                    "collapsed": true,
                    "panels": [
                        {
                            "id": 11,
                            "type": "table",
                            "targets": [{ "refId": "A", "rawSql": "SELECT 1" }]
                        }
                    ]
                }
            ],
            "templating": { "list": [{ "name": "env", "type": "query" }] },
            "time": { "from": "now-6h", "to": "now" },
            "schemaVersion": 39
        }))
        .unwrap()
    }

    #[test]
    fn rows_deserialize_into_row_variant() {
        let dashboard = sample_dashboard();

        assert!(matches!(dashboard.panels[0], Panel::Leaf(_)));
        let Panel::Row(row) = &dashboard.panels[1] else {
            panic!("expected row panel");
        };
        assert_eq!(row.panels.len(), 1);
        assert_eq!(row.panels[0].id, Some(11));
    }

    #[test]
    fn unknown_fields_are_kept_in_extra() {
        let dashboard = sample_dashboard();
        assert_eq!(dashboard.extra.get("schemaVersion"), Some(&json!(39)));
    }

    #[test]
    fn missing_and_null_fields_are_tolerated() {
        let document: DashboardDocument =
            serde_json::from_value(json!({ "dashboard": { "tags": null, "panels": null } }))
                .unwrap();

        assert!(document.dashboard.tags.is_empty());
        assert!(document.dashboard.panels.is_empty());
        assert!(document.meta.can_edit.is_none());
    }

    #[test]
    fn find_panel_returns_top_level_panel() {
        let dashboard = sample_dashboard();
        let found = dashboard.find_panel(5).unwrap();

        assert_eq!(found.info()["title"], "Requests");
    }

    #[test]
    fn find_panel_descends_into_rows() {
        let dashboard = sample_dashboard();
        let found = dashboard.find_panel(11).unwrap();

        assert!(matches!(found, PanelRef::Leaf(p) if p.id == Some(11)));
        assert_eq!(found.info()["title"], "Untitled");
    }

    #[test]
    fn find_panel_matches_row_itself() {
        let dashboard = sample_dashboard();
        assert!(matches!(dashboard.find_panel(10), Some(PanelRef::Row(_))));
    }

    #[test]
    fn find_panel_returns_none_for_unknown_id() {
        assert!(sample_dashboard().find_panel(99).is_none());
    }

    #[test]
    fn panel_summaries_flatten_rows() {
        let summaries = sample_dashboard().panel_summaries();

        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries[1]["type"], "row");
        assert_eq!(summaries[1]["collapsed"], true);
        assert_eq!(summaries[2]["id"], 11);
    }

    #[test]
    fn panel_queries_skip_rows_and_empty_targets() {
        let queries = sample_dashboard().panel_queries();

        assert_eq!(queries.len(), 2);
        assert_eq!(queries[0].panel_id, Some(5));
        assert_eq!(queries[0].queries.len(), 1);
        assert_eq!(queries[0].queries[0].ref_id.as_deref(), Some("A"));
        assert_eq!(queries[1].queries[0].raw_sql.as_deref(), Some("SELECT 1"));
    }

    #[test]
    fn target_query_omits_absent_fields() {
        let queries = sample_dashboard().panel_queries();
        let rendered = serde_json::to_value(&queries[0].queries[0]).unwrap();

        assert_eq!(
            rendered,
            json!({ "refId": "A", "expr": "rate(http_requests_total[5m])" })
        );
    }

    #[test]
    fn object_queries_count_as_present() {
        let target: PanelTarget =
            serde_json::from_value(json!({ "refId": "A", "query": { "kind": "logs" } })).unwrap();
        assert!(target.has_query());

        let empty: PanelTarget =
            serde_json::from_value(json!({ "refId": "A", "query": "" })).unwrap();
        assert!(!empty.has_query());
    }

    #[test]
    fn variable_summary_caps_options() {
        let variable: TemplateVariable = serde_json::from_value(json!({
            "name": "host",
            "type": "custom",
            "options": (0..25).map(|i| json!({ "value": i })).collect::<Vec<_>>()
        }))
        .unwrap();

        let summary = variable.summary();
        assert_eq!(summary["options"].as_array().unwrap().len(), 10);
        assert_eq!(summary["multi"], false);
        assert_eq!(summary["hide"], 0);
    }

    #[test]
    fn time_settings_ignore_empty_objects() {
        let mut dashboard = sample_dashboard();
        assert!(dashboard.time_settings().is_some());

        dashboard.time = Some(json!({}));
        assert!(dashboard.time_settings().is_none());
    }
}
