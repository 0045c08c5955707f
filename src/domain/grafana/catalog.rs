//! Flat records: search hits, folders, datasources, tags, instance info.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::null_as_default;

/// An entry returned by `/api/search`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub id: Option<i64>,
    pub uid: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub uri: Option<String>,

    #[serde(rename = "type")]
    pub hit_type: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,

    pub is_starred: Option<bool>,
    pub folder_id: Option<i64>,
    pub folder_uid: Option<String>,
    pub folder_title: Option<String>,
    pub folder_url: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SearchHit {
    /// Summary used by dashboard listings.
    pub fn summary(&self) -> Value {
        json!({
            "uid": self.uid,
            "title": self.title,
            "url": self.url,
            "tags": self.tags,
            "folderTitle": self.folder_title,
            "isStarred": self.is_starred.unwrap_or(false),
        })
    }

    /// Summary used by tag search, which does not report starring.
    pub fn tag_summary(&self) -> Value {
        json!({
            "uid": self.uid,
            "title": self.title,
            "url": self.url,
            "tags": self.tags,
            "folderTitle": self.folder_title,
        })
    }
}

/// Drop repeated UIDs, keeping the first occurrence. Hits without a UID are dropped.
pub fn dedupe_by_uid(hits: Vec<SearchHit>) -> Vec<SearchHit> {
    let mut seen = HashSet::new();
    hits.into_iter()
        .filter(|hit| match &hit.uid {
            Some(uid) if !uid.is_empty() => seen.insert(uid.clone()),
            _ => false,
        })
        .collect()
}

/// A dashboard folder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub id: Option<i64>,
    pub uid: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A configured datasource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    pub id: Option<i64>,
    pub uid: Option<String>,
    pub name: Option<String>,

    #[serde(rename = "type")]
    pub datasource_type: Option<String>,

    pub url: Option<String>,
    pub access: Option<String>,
    pub is_default: Option<bool>,
    pub json_data: Option<Value>,
    pub read_only: Option<bool>,
    pub version: Option<i64>,

    /// Everything else, including fields that may carry secrets
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DataSource {
    /// Listing summary.
    pub fn summary(&self) -> Value {
        json!({
            "uid": self.uid,
            "name": self.name,
            "type": self.datasource_type,
            "url": self.url,
            "isDefault": self.is_default.unwrap_or(false),
            "readOnly": self.read_only.unwrap_or(false),
        })
    }

    /// Detail view limited to non-sensitive fields.
    pub fn safe_detail(&self) -> Value {
        json!({
            "uid": self.uid,
            "name": self.name,
            "type": self.datasource_type,
            "url": self.url,
            "access": self.access,
            "isDefault": self.is_default.unwrap_or(false),
            "jsonData": self.json_data.clone().unwrap_or_else(|| json!({})),
            "readOnly": self.read_only.unwrap_or(false),
            "version": self.version,
        })
    }
}

/// Tag usage count from `/api/dashboards/tags`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub term: String,
    pub count: u64,
}

/// Response of `/api/health`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub version: Option<String>,
    pub database: Option<String>,
    pub commit: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response of `/api/org`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrgInfo {
    pub id: Option<i64>,
    pub name: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(uid: &str, title: &str) -> SearchHit {
        SearchHit {
            uid: Some(uid.to_string()),
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let hits = vec![hit("x", "first"), hit("y", "other"), hit("x", "second")];
        let unique = dedupe_by_uid(hits);

        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].title.as_deref(), Some("first"));
        assert_eq!(unique[1].uid.as_deref(), Some("y"));
    }

    #[test]
    fn dedupe_drops_hits_without_uid() {
        let unique = dedupe_by_uid(vec![SearchHit::default(), hit("", "blank"), hit("a", "ok")]);
        assert_eq!(unique.len(), 1);
    }

    #[test]
    fn search_hit_deserializes_camel_case() {
        let hit: SearchHit = serde_json::from_value(json!({
            "uid": "abc",
            "title": "Overview",
            "type": "dash-db",
            "isStarred": true,
            "folderTitle": "Ops",
            "tags": null,
            "sortMeta": 0
        }))
        .unwrap();

        assert_eq!(hit.is_starred, Some(true));
        assert_eq!(hit.folder_title.as_deref(), Some("Ops"));
        assert!(hit.tags.is_empty());
        assert!(hit.extra.contains_key("sortMeta"));
        assert_eq!(hit.summary()["isStarred"], true);
    }

    #[test]
    fn datasource_safe_detail_hides_extra_fields() {
        let datasource: DataSource = serde_json::from_value(json!({
            "uid": "prom",
            "name": "Prometheus",
            "type": "prometheus",
            "basicAuthPassword": "hunter2",
            "secureJsonFields": { "httpHeaderValue1": true }
        }))
        .unwrap();

        let detail = datasource.safe_detail();
        assert_eq!(detail["type"], "prometheus");
        assert_eq!(detail["jsonData"], json!({}));
        assert!(detail.get("basicAuthPassword").is_none());
        assert!(!detail.to_string().contains("hunter2"));
    }

    #[test]
    fn folder_round_trips_unknown_fields() {
        let folder: Folder = serde_json::from_value(json!({
            "uid": "f1",
            "title": "Ops",
            "type": "dash-folder"
        }))
        .unwrap();

        let rendered = serde_json::to_value(&folder).unwrap();
        assert_eq!(rendered["type"], "dash-folder");
    }
}
