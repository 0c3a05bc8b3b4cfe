//! End-to-end walks of the event tree through `EventFs`.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use riemannfs_kernel::field::FIXED_FIELDS;
use riemannfs_kernel::{Event, EventFs, FileType, MemoryStore, OpenFlags, VfsOps};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("riemannfs_kernel=debug")
        .with_test_writer()
        .try_init();
}

fn single_event_fs() -> (EventFs, Arc<MemoryStore>) {
    init_tracing();
    let event = Event::new("web1", "cpu")
        .with_metric(0.5)
        .with_tags(["prod"])
        .with_time(100);
    let store = Arc::new(MemoryStore::index(vec![event]));
    (EventFs::new(store.clone()), store)
}

async fn list(fs: &EventFs, path: &str) -> Vec<String> {
    fs.readdir(Path::new(path))
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect()
}

async fn read(fs: &EventFs, path: &str) -> String {
    let bytes = fs.open(Path::new(path), OpenFlags::read()).await.unwrap();
    String::from_utf8(bytes).unwrap()
}

#[tokio::test]
async fn single_event_walk() {
    let (fs, _) = single_event_fs();

    let root: BTreeSet<_> = list(&fs, "/").await.into_iter().collect();
    assert_eq!(root, BTreeSet::from(["web1".to_string(), ".query".to_string()]));

    assert_eq!(list(&fs, "/web1").await, vec!["cpu"]);

    assert_eq!(
        list(&fs, "/web1/cpu").await,
        vec![
            "Service",
            "Host",
            "Metric",
            "Description",
            "State",
            "Time",
            "Tags",
            "Ttl",
            ".json"
        ]
    );

    assert_eq!(read(&fs, "/web1/cpu/Tags").await, "prod");
    assert_eq!(read(&fs, "/web1/cpu/Time").await, "100");
    assert_eq!(read(&fs, "/web1/cpu/Metric").await, "0.500000");
}

#[tokio::test]
async fn listing_kinds() {
    let (fs, _) = single_event_fs();

    let root = fs.readdir(Path::new("/")).await.unwrap();
    assert!(root.iter().all(|e| e.kind == FileType::Directory));

    let fields = fs.readdir(Path::new("/web1/cpu")).await.unwrap();
    assert!(fields.iter().all(|e| e.kind == FileType::File));

    assert!(fs.getattr(Path::new("/web1")).await.unwrap().is_dir());
    assert!(fs.getattr(Path::new("/web1/cpu/Host")).await.unwrap().is_file());
}

#[tokio::test]
async fn advanced_true_matches_plain() {
    let (fs, _) = single_event_fs();

    assert_eq!(list(&fs, "/.query").await, Vec::<String>::new());
    assert_eq!(list(&fs, "/.query/true").await, vec!["web1"]);
    assert_eq!(list(&fs, "/.query/true/web1").await, vec!["cpu"]);
    assert_eq!(
        list(&fs, "/.query/true/web1/cpu").await,
        list(&fs, "/web1/cpu").await
    );
    assert_eq!(
        read(&fs, "/.query/true/web1/cpu/.json").await,
        read(&fs, "/web1/cpu/.json").await
    );
}

#[tokio::test]
async fn attributes_follow_fixed_fields() {
    init_tracing();
    let event = Event::new("db1", "disk")
        .with_attribute("mount", "/var")
        .with_attribute("device", "sda1")
        .with_attribute("zone", "b");
    let fs = EventFs::new(Arc::new(MemoryStore::index(vec![event])));

    let names = list(&fs, "db1/disk").await;
    assert_eq!(names.len(), 8 + 3 + 1);
    assert_eq!(&names[..8], &FIXED_FIELDS[..]);
    assert_eq!(&names[8..], &["device", "mount", "zone", ".json"]);

    assert_eq!(read(&fs, "db1/disk/mount").await, "/var");
}

#[tokio::test]
async fn json_file_is_full_event() {
    let (fs, _) = single_event_fs();
    let json: serde_json::Value = serde_json::from_str(&read(&fs, "web1/cpu/.json").await).unwrap();
    assert_eq!(json["Host"], "web1");
    assert_eq!(json["Service"], "cpu");
    assert_eq!(json["Time"], 100);
    assert_eq!(json["Metric"], 0.5);
    assert_eq!(json["Tags"], serde_json::json!(["prod"]));
    assert!(json["Attributes"].is_object());
}

#[tokio::test]
async fn repeated_reads_are_identical_and_requery() {
    let (fs, store) = single_event_fs();

    let first = read(&fs, "web1/cpu/Metric").await;
    let second = read(&fs, "web1/cpu/Metric").await;
    assert_eq!(first, second);

    let issued = store.issued();
    assert_eq!(issued.len(), 2);
    assert_eq!(issued[0], issued[1]);
}

#[tokio::test]
async fn store_changes_are_visible_immediately() {
    let (fs, store) = single_event_fs();
    assert_eq!(read(&fs, "web1/cpu/State").await, "");

    store.respond(
        "host = \"web1\" and service = \"cpu\"",
        vec![Event::new("web1", "cpu").with_state("critical")],
    );
    assert_eq!(read(&fs, "web1/cpu/State").await, "critical");
}
