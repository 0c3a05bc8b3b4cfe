//! The event record as returned by the index.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One event from the Riemann index.
///
/// Serializes with PascalCase keys (`Host`, `Service`, ..., `Attributes`),
/// which is also the shape of the `.json` file. Attributes are kept in an
/// ordered map so listings come out in lexicographic key order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Event {
    pub host: String,
    pub service: String,
    pub metric: f64,
    pub description: String,
    pub state: String,
    /// Seconds since the Unix epoch.
    pub time: i64,
    pub tags: Vec<String>,
    pub ttl: f64,
    pub attributes: BTreeMap<String, String>,
}

impl Event {
    pub fn new(host: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            service: service.into(),
            ..Default::default()
        }
    }

    pub fn with_metric(mut self, metric: f64) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = state.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_time(mut self, time: i64) -> Self {
        self.time = time;
        self
    }

    pub fn with_ttl(mut self, ttl: f64) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_keys() {
        let event = Event::new("web1", "cpu")
            .with_metric(0.5)
            .with_tags(["prod"])
            .with_time(100)
            .with_attribute("region", "eu");
        let value = serde_json::to_value(&event).unwrap();
        let obj = value.as_object().unwrap();

        for key in [
            "Host",
            "Service",
            "Metric",
            "Description",
            "State",
            "Time",
            "Tags",
            "Ttl",
            "Attributes",
        ] {
            assert!(obj.contains_key(key), "missing {key}");
        }
        assert_eq!(obj["Time"], serde_json::json!(100));
        assert_eq!(obj["Tags"], serde_json::json!(["prod"]));
        assert_eq!(obj["Attributes"]["region"], "eu");
    }
}
