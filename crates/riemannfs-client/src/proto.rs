//! Riemann protocol buffer messages.
//!
//! Hand-declared with `prost` derives instead of generated from
//! `proto.proto`. Only the fields a query client touches are declared.
//! Everything else (`states`, the deprecated `metric` fields) is skipped
//! when decoding.

use riemannfs_kernel::Event;

/// Top-level message, used for both requests and responses.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Msg {
    #[prost(bool, optional, tag = "2")]
    pub ok: Option<bool>,
    #[prost(string, optional, tag = "3")]
    pub error: Option<String>,
    #[prost(message, optional, tag = "5")]
    pub query: Option<Query>,
    #[prost(message, repeated, tag = "6")]
    pub events: Vec<RawEvent>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Query {
    #[prost(string, optional, tag = "1")]
    pub string: Option<String>,
}

/// Event as it travels on the wire.
#[derive(Clone, PartialEq, prost::Message)]
pub struct RawEvent {
    #[prost(int64, optional, tag = "1")]
    pub time: Option<i64>,
    #[prost(string, optional, tag = "2")]
    pub state: Option<String>,
    #[prost(string, optional, tag = "3")]
    pub service: Option<String>,
    #[prost(string, optional, tag = "4")]
    pub host: Option<String>,
    #[prost(string, optional, tag = "5")]
    pub description: Option<String>,
    #[prost(string, repeated, tag = "7")]
    pub tags: Vec<String>,
    #[prost(float, optional, tag = "8")]
    pub ttl: Option<f32>,
    #[prost(message, repeated, tag = "9")]
    pub attributes: Vec<Attribute>,
    #[prost(int64, optional, tag = "10")]
    pub time_micros: Option<i64>,
    #[prost(sint64, optional, tag = "13")]
    pub metric_sint64: Option<i64>,
    #[prost(double, optional, tag = "14")]
    pub metric_d: Option<f64>,
    #[prost(float, optional, tag = "15")]
    pub metric_f: Option<f32>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Attribute {
    #[prost(string, required, tag = "1")]
    pub key: String,
    #[prost(string, optional, tag = "2")]
    pub value: Option<String>,
}

impl Msg {
    /// A query request.
    pub fn query(filter: &str) -> Self {
        Self {
            query: Some(Query {
                string: Some(filter.to_string()),
            }),
            ..Default::default()
        }
    }
}

impl From<RawEvent> for Event {
    fn from(raw: RawEvent) -> Self {
        // Integer metric wins, then double, then float.
        let metric = raw
            .metric_sint64
            .map(|m| m as f64)
            .or(raw.metric_d)
            .or(raw.metric_f.map(widen))
            .unwrap_or(0.0);
        let time = raw
            .time
            .or(raw.time_micros.map(|us| us.div_euclid(1_000_000)))
            .unwrap_or(0);

        Event {
            host: raw.host.unwrap_or_default(),
            service: raw.service.unwrap_or_default(),
            metric,
            description: raw.description.unwrap_or_default(),
            state: raw.state.unwrap_or_default(),
            time,
            tags: raw.tags,
            ttl: raw.ttl.map(widen).unwrap_or(0.0),
            attributes: raw
                .attributes
                .into_iter()
                .map(|a| (a.key, a.value.unwrap_or_default()))
                .collect(),
        }
    }
}

/// Widen a wire `float` to the `f64` its shortest decimal form names.
///
/// A plain cast keeps the binary error of the `f32`, so a ttl of 0.1 would
/// read back as 0.100000001490116.
fn widen(value: f32) -> f64 {
    value.to_string().parse().unwrap_or(f64::from(value))
}
