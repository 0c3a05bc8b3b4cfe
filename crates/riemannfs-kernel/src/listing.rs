//! Directory listings built from query results.
//!
//! Intermediate levels list distinct field values as directories. A
//! resolved event lists its fields as files, fixed fields first, then
//! attribute keys, then `.json`.

use std::collections::BTreeSet;

use crate::event::Event;
use crate::field::{is_fixed_field, FIXED_FIELDS, JSON_FILE};
use crate::path::QUERY_DIR;
use crate::vfs::{DirEntry, VfsError, VfsResult};

/// Distinct values of one field across `events`, one directory each.
///
/// Output is sorted by name. Values that cannot be a path segment (empty,
/// or containing `/`) are skipped.
pub fn distinct_dirs<F>(events: &[Event], extract: F) -> Vec<DirEntry>
where
    F: Fn(&Event) -> &str,
{
    collect_names(events, extract)
        .into_iter()
        .map(DirEntry::directory)
        .collect()
}

/// Root listing: every distinct host plus the `.query` directory.
pub fn root_entries(events: &[Event]) -> Vec<DirEntry> {
    let mut names = collect_names(events, |e| e.host.as_str());
    names.insert(QUERY_DIR.to_string());
    names.into_iter().map(DirEntry::directory).collect()
}

fn collect_names<F>(events: &[Event], extract: F) -> BTreeSet<String>
where
    F: Fn(&Event) -> &str,
{
    events
        .iter()
        .map(|e| extract(e))
        .filter(|name| {
            let ok = is_segment(name);
            if !ok && !name.is_empty() {
                tracing::debug!(name = *name, "skipping value that is not a path segment");
            }
            ok
        })
        .map(str::to_string)
        .collect()
}

/// Whether `name` can appear as one directory entry.
fn is_segment(name: &str) -> bool {
    !name.is_empty() && !name.contains('/')
}

/// Field files of one event, in precedence order.
///
/// Attribute keys that collide with a fixed field or `.json` are listed
/// once, at the earlier position.
pub fn record_entries(event: &Event) -> Vec<DirEntry> {
    let mut entries = Vec::with_capacity(FIXED_FIELDS.len() + event.attributes.len() + 1);
    entries.extend(FIXED_FIELDS.iter().map(|name| DirEntry::file(*name)));
    entries.extend(
        event
            .attributes
            .keys()
            .filter(|key| !is_fixed_field(key) && key.as_str() != JSON_FILE)
            .filter(|key| is_segment(key))
            .map(|key| DirEntry::file(key.as_str())),
    );
    entries.push(DirEntry::file(JSON_FILE));
    entries
}

/// Enforce the one-event-per-(host, service) invariant.
///
/// Zero events is `Ok(None)`; more than one is an invariant violation.
pub fn at_most_one(mut events: Vec<Event>, filter: &str) -> VfsResult<Option<Event>> {
    match events.len() {
        0 => Ok(None),
        1 => Ok(events.pop()),
        count => Err(VfsError::InvariantViolation {
            filter: filter.to_string(),
            count,
        }),
    }
}
