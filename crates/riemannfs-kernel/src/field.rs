//! Field resolution: one event plus a field name becomes file content.

use crate::event::Event;
use crate::vfs::{VfsError, VfsResult};

/// The fixed event fields, in listing order.
pub const FIXED_FIELDS: [&str; 8] = [
    "Service",
    "Host",
    "Metric",
    "Description",
    "State",
    "Time",
    "Tags",
    "Ttl",
];

/// Sentinel file holding the whole event as JSON.
pub const JSON_FILE: &str = ".json";

/// Separator between tags in the `Tags` file.
pub const TAG_SEPARATOR: &str = ", ";

/// Returns true for the eight fixed field names.
pub fn is_fixed_field(name: &str) -> bool {
    FIXED_FIELDS.contains(&name)
}

/// Produce the bytes of `field` for `event`.
///
/// Precedence: `.json`, then attribute keys, then fixed fields. An attribute
/// named like a fixed field therefore shadows it.
pub fn resolve(event: &Event, field: &str) -> VfsResult<Vec<u8>> {
    if field == JSON_FILE {
        return Ok(serde_json::to_vec(event)?);
    }
    if let Some(value) = event.attributes.get(field) {
        return Ok(value.as_bytes().to_vec());
    }
    let text = match field {
        "Host" => event.host.clone(),
        "Service" => event.service.clone(),
        "Description" => event.description.clone(),
        "State" => event.state.clone(),
        "Tags" => event.tags.join(TAG_SEPARATOR),
        "Time" => event.time.to_string(),
        "Metric" => format_float(event.metric),
        "Ttl" => format_float(event.ttl),
        _ => return Err(VfsError::field_not_found(field)),
    };
    Ok(text.into_bytes())
}

/// Six digits after the decimal point, like C's `%f`.
pub fn format_float(value: f64) -> String {
    format!("{value:.6}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(event: &Event, field: &str) -> String {
        String::from_utf8(resolve(event, field).unwrap()).unwrap()
    }

    fn sample() -> Event {
        Event::new("web1", "cpu")
            .with_metric(0.5)
            .with_state("ok")
            .with_description("load")
            .with_time(42)
            .with_ttl(60.0)
            .with_tags(["a", "b"])
            .with_attribute("region", "eu-west")
    }

    #[test]
    fn test_string_fields_raw() {
        let e = sample();
        assert_eq!(read(&e, "Host"), "web1");
        assert_eq!(read(&e, "Service"), "cpu");
        assert_eq!(read(&e, "State"), "ok");
        assert_eq!(read(&e, "Description"), "load");
    }

    #[test]
    fn test_tags_joined() {
        assert_eq!(read(&sample(), "Tags"), "a, b");
        assert_eq!(read(&Event::new("h", "s"), "Tags"), "");
    }

    #[test]
    fn test_time_is_integer() {
        assert_eq!(read(&sample(), "Time"), "42");
    }

    #[test]
    fn test_floats_six_digits() {
        let e = sample();
        assert_eq!(read(&e, "Metric"), "0.500000");
        assert_eq!(read(&e, "Ttl"), "60.000000");
        assert_eq!(format_float(-1.25), "-1.250000");
    }

    #[test]
    fn test_attribute_verbatim() {
        assert_eq!(read(&sample(), "region"), "eu-west");
    }

    #[test]
    fn test_attribute_shadows_fixed_field() {
        let e = sample().with_attribute("State", "custom");
        assert_eq!(read(&e, "State"), "custom");
    }

    #[test]
    fn test_unknown_field() {
        let err = resolve(&sample(), "Bogus").unwrap_err();
        assert!(matches!(err, VfsError::FieldNotFound(ref f) if f == "Bogus"));
    }

    #[test]
    fn test_json_roundtrips_event() {
        let e = sample();
        let bytes = resolve(&e, JSON_FILE).unwrap();
        let back: Event = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back, e);
    }
}
