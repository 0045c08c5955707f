//! Prometheus query results proxied through Grafana.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A series label set.
pub type Labels = BTreeMap<String, String>;

/// Envelope of every Prometheus HTTP API response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrometheusResponse<T> {
    pub status: String,
    pub data: T,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// `[timestamp, "value"]`; Prometheus sends sample values as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplePair(pub f64, pub String);

impl SamplePair {
    pub fn value(&self) -> &str {
        &self.1
    }
}

/// One series of an instant query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstantSample {
    #[serde(default)]
    pub metric: Labels,
    pub value: SamplePair,
}

/// One series of a range query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeSeries {
    #[serde(default)]
    pub metric: Labels,
    #[serde(default)]
    pub values: Vec<SamplePair>,
}

/// `data` of a query response, discriminated by `resultType`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "resultType", content = "result", rename_all = "lowercase")]
pub enum QueryResult {
    Vector(Vec<InstantSample>),
    Matrix(Vec<RangeSeries>),
    Scalar(SamplePair),
    #[serde(rename = "string")]
    Text(SamplePair),
}

impl QueryResult {
    pub fn result_type(&self) -> &'static str {
        match self {
            QueryResult::Vector(_) => "vector",
            QueryResult::Matrix(_) => "matrix",
            QueryResult::Scalar(_) => "scalar",
            QueryResult::Text(_) => "string",
        }
    }

    /// Number of series (scalars and strings count as one).
    pub fn len(&self) -> usize {
        match self {
            QueryResult::Vector(samples) => samples.len(),
            QueryResult::Matrix(series) => series.len(),
            QueryResult::Scalar(_) | QueryResult::Text(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Whether a scrape target is up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ServiceState {
    Up,
    Down,
}

/// State of one scrape target, derived from the `up` metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub instance: String,
    pub status: ServiceState,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<String>,
}

impl ServiceStatus {
    pub fn is_up(&self) -> bool {
        self.status == ServiceState::Up
    }
}

/// Build `up{job="..", instance=".."}`, leaving out absent filters.
pub fn up_query(job: Option<&str>, instance: Option<&str>) -> String {
    let filters: Vec<String> = [("job", job), ("instance", instance)]
        .into_iter()
        .filter_map(|(label, value)| {
            value
                .filter(|v| !v.is_empty())
                .map(|v| format!("{}=\"{}\"", label, escape_label_value(v)))
        })
        .collect();

    if filters.is_empty() {
        "up".to_string()
    } else {
        format!("up{{{}}}", filters.join(", "))
    }
}

/// Backslashes and double quotes must be escaped inside a PromQL string.
fn escape_label_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Map an `up` instant-query result to service states.
///
/// Only vector results carry per-target samples; anything else yields an
/// empty list.
pub fn service_statuses(result: &QueryResult) -> Vec<ServiceStatus> {
    let QueryResult::Vector(samples) = result else {
        return Vec::new();
    };

    samples
        .iter()
        .map(|sample| {
            let value = sample.value.value().to_string();
            ServiceStatus {
                instance: sample
                    .metric
                    .get("instance")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                status: if value == "1" {
                    ServiceState::Up
                } else {
                    ServiceState::Down
                },
                value,
                job: sample.metric.get("job").cloned(),
            }
        })
        .collect()
}

/// Summary statistics over the numeric values of one range series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesStats {
    pub sum: f64,
    /// Rounded to two decimals
    pub avg: f64,
    pub max: f64,
    pub min: f64,
    pub first: f64,
    pub last: f64,
}

impl SeriesStats {
    /// Compute statistics in one pass.
    ///
    /// Values that do not parse to a finite number are skipped; `None` when
    /// nothing is left.
    pub fn from_samples(samples: &[SamplePair]) -> Option<Self> {
        let mut values = samples
            .iter()
            .filter_map(|sample| sample.value().trim().parse::<f64>().ok())
            .filter(|value| value.is_finite());

        let first = values.next()?;
        let mut stats = SeriesStats {
            sum: first,
            avg: 0.0,
            max: first,
            min: first,
            first,
            last: first,
        };
        let mut count = 1_usize;

        for value in values {
            stats.sum += value;
            stats.max = stats.max.max(value);
            stats.min = stats.min.min(value);
            stats.last = value;
            count += 1;
        }

        stats.avg = round2(stats.sum / count as f64);
        Some(stats)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
