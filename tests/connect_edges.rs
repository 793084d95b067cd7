// tests/connect_edges.rs
mod common;
use crate::common::{
    RecordBuilder, TaskDirFixture, TestResult, assert_transposed, build, children, deps,
    init_tracing, level,
};

use std::path::Path;

use taskdag::dag::{GraphMutator, TaskNode, compute_levels};
use taskdag::errors::{StoreError, TaskdagError};
use taskdag::fs::mock::MockFileSystem;
use taskdag::record::RecordStore;
use taskdag::types::{ConnectOutcome, GraphEvent};

fn snapshot(graph: &taskdag::dag::TaskGraph) -> Vec<TaskNode> {
    graph.nodes().cloned().collect()
}

#[test]
fn connect_writes_group_id_reference_and_updates_both_endpoints() -> TestResult {
    init_tracing();
    let dir = TaskDirFixture::new()?
        .with_record("AAAA1", RecordBuilder::new("Fetch").group("AAAA").id(1).build())?
        .with_record("BBBB1", RecordBuilder::new("Clean").group("BBBB").id(1).build())?;
    let (mut graph, _) = build(&dir.store())?;
    let mutator = GraphMutator::new(dir.store());

    let outcome = mutator.add_edge(&mut graph, "AAAA1", "BBBB1")?;

    assert_eq!(
        outcome,
        ConnectOutcome::Connected {
            reference: "AAAA1".to_string()
        }
    );
    assert_eq!(deps(&graph, "BBBB1"), vec!["AAAA1"]);
    assert_eq!(children(&graph, "AAAA1"), vec!["BBBB1"]);
    assert_eq!(
        graph.get("BBBB1").map(|n| n.raw_deps.clone()),
        Some(vec!["AAAA1".to_string()])
    );
    assert_transposed(&graph);

    let on_disk = dir.store().read("BBBB1")?;
    assert_eq!(on_disk.depends_on, vec!["AAAA1"]);
    Ok(())
}

#[test]
fn connect_falls_back_to_key_without_group_and_id() -> TestResult {
    init_tracing();
    let dir = TaskDirFixture::new()?
        .with_record("setup", RecordBuilder::new("Setup").group("OPS").build())?
        .with_record("deploy", RecordBuilder::new("Deploy").build())?;
    let (mut graph, _) = build(&dir.store())?;

    let outcome = GraphMutator::new(dir.store()).add_edge(&mut graph, "setup", "deploy")?;

    assert_eq!(
        outcome,
        ConnectOutcome::Connected {
            reference: "setup".to_string()
        }
    );
    assert_eq!(dir.store().read("deploy")?.depends_on, vec!["setup"]);
    Ok(())
}

#[test]
fn connecting_twice_is_idempotent() -> TestResult {
    init_tracing();
    let dir = TaskDirFixture::new()?
        .with_record("A", RecordBuilder::new("A").group("G").id(1).build())?
        .with_record("B", RecordBuilder::new("B").build())?;
    let (mut graph, _) = build(&dir.store())?;
    let mutator = GraphMutator::new(dir.store());

    mutator.add_edge(&mut graph, "A", "B")?;
    let after_first = snapshot(&graph);
    let bytes_after_first = dir.read_bytes("B")?;

    let second = mutator.add_edge(&mut graph, "A", "B")?;

    assert_eq!(second, ConnectOutcome::AlreadyConnected);
    assert_eq!(snapshot(&graph), after_first);
    assert_eq!(dir.read_bytes("B")?, bytes_after_first);
    Ok(())
}

#[test]
fn existing_dependency_reports_already_connected_and_leaves_file_untouched() -> TestResult {
    init_tracing();
    let dir = TaskDirFixture::new()?
        .with_record("A", RecordBuilder::new("A").build())?
        .with_record("B", RecordBuilder::new("B").depends_on("A").build())?;
    let before = dir.read_bytes("B")?;
    let (mut graph, _) = build(&dir.store())?;

    let outcome = GraphMutator::new(dir.store()).add_edge(&mut graph, "A", "B")?;

    assert_eq!(outcome, ConnectOutcome::AlreadyConnected);
    assert_eq!(dir.read_bytes("B")?, before);
    Ok(())
}

#[test]
fn connected_edge_survives_a_fresh_reload() -> TestResult {
    init_tracing();
    let dir = TaskDirFixture::new()?
        .with_record("A", RecordBuilder::new("A").group("G").id(3).build())?
        .with_record("B", RecordBuilder::new("B").build())?
        .with_record("C", RecordBuilder::new("C").depends_on("B").build())?;
    let (mut graph, _) = build(&dir.store())?;
    GraphMutator::new(dir.store()).add_edge(&mut graph, "A", "B")?;

    let (reloaded, report) = build(&dir.store())?;

    assert!(report.resolve.is_clean());
    assert_eq!(deps(&reloaded, "B"), vec!["A"]);
    assert_eq!(level(&reloaded, "A"), 0);
    assert_eq!(level(&reloaded, "B"), 1);
    assert_eq!(level(&reloaded, "C"), 2);
    Ok(())
}

#[test]
fn failed_write_leaves_graph_unchanged() -> TestResult {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file("tasks/A.json", r#"{ "task": "A" }"#);
    fs.add_file("tasks/B.json", r#"{ "task": "B" }"#);
    fs.set_read_only("tasks/B.json");
    let store = RecordStore::with_fs(fs.clone(), "tasks");
    let (mut graph, _) = build(&store)?;
    let before = snapshot(&graph);

    let result = GraphMutator::new(store).add_edge(&mut graph, "A", "B");

    match result {
        Err(TaskdagError::Store(StoreError::Io { path, .. })) => {
            assert_eq!(path, Path::new("tasks/B.json"));
        }
        other => panic!("expected store IO error, got {:?}", other),
    }
    assert_eq!(snapshot(&graph), before);
    assert_eq!(
        fs.contents("tasks/B.json"),
        Some(br#"{ "task": "B" }"#.to_vec())
    );
    Ok(())
}

#[test]
fn record_deleted_after_load_is_a_hard_error() -> TestResult {
    init_tracing();
    let dir = TaskDirFixture::new()?
        .with_record("A", RecordBuilder::new("A").build())?
        .with_record("B", RecordBuilder::new("B").build())?;
    let (mut graph, _) = build(&dir.store())?;
    let before = snapshot(&graph);
    std::fs::remove_file(dir.record_path("B"))?;

    let result = GraphMutator::new(dir.store()).add_edge(&mut graph, "A", "B");

    assert!(matches!(
        result,
        Err(TaskdagError::Store(StoreError::NotFound { .. }))
    ));
    assert_eq!(snapshot(&graph), before);
    Ok(())
}

#[test]
fn unknown_and_self_edges_are_rejected() -> TestResult {
    init_tracing();
    let dir = TaskDirFixture::new()?.with_record("A", RecordBuilder::new("A").build())?;
    let (mut graph, _) = build(&dir.store())?;
    let mutator = GraphMutator::new(dir.store());

    assert!(matches!(
        mutator.add_edge(&mut graph, "missing", "A"),
        Err(TaskdagError::NodeNotFound(key)) if key == "missing"
    ));
    assert!(matches!(
        mutator.add_edge(&mut graph, "A", "A"),
        Err(TaskdagError::SelfDependency(_))
    ));
    Ok(())
}

#[test]
fn new_edge_is_signalled_to_subscribers() -> TestResult {
    init_tracing();
    let dir = TaskDirFixture::new()?
        .with_record("A", RecordBuilder::new("A").build())?
        .with_record("B", RecordBuilder::new("B").build())?;
    let (mut graph, _) = build(&dir.store())?;
    let mut mutator = GraphMutator::new(dir.store());
    let mut events = mutator.subscribe();

    mutator.add_edge(&mut graph, "A", "B")?;
    mutator.add_edge(&mut graph, "A", "B")?;

    assert_eq!(
        events.try_recv().ok(),
        Some(GraphEvent::EdgeAdded {
            parent: "A".to_string(),
            child: "B".to_string()
        })
    );
    // The no-op second call emits nothing.
    assert!(events.try_recv().is_err());
    Ok(())
}

#[test]
fn dropped_event_receiver_does_not_fail_the_mutation() -> TestResult {
    init_tracing();
    let dir = TaskDirFixture::new()?
        .with_record("A", RecordBuilder::new("A").build())?
        .with_record("B", RecordBuilder::new("B").build())?;
    let (mut graph, _) = build(&dir.store())?;
    let mut mutator = GraphMutator::new(dir.store());
    drop(mutator.subscribe());

    let outcome = mutator.add_edge(&mut graph, "A", "B")?;

    assert!(matches!(outcome, ConnectOutcome::Connected { .. }));
    Ok(())
}

#[test]
fn cycle_creating_edge_is_accepted_and_then_reported_by_layering() -> TestResult {
    init_tracing();
    let dir = TaskDirFixture::new()?
        .with_record("A", RecordBuilder::new("A").build())?
        .with_record("B", RecordBuilder::new("B").depends_on("A").build())?
        .with_record("C", RecordBuilder::new("C").build())?;
    let (mut graph, _) = build(&dir.store())?;

    let outcome = GraphMutator::new(dir.store()).add_edge(&mut graph, "B", "A")?;
    assert!(matches!(outcome, ConnectOutcome::Connected { .. }));

    let report = compute_levels(&mut graph, true);
    assert_eq!(report.cycle_affected, vec!["A", "B"]);
    assert_eq!(level(&graph, "A"), 0);
    assert_eq!(level(&graph, "B"), 0);
    assert_eq!(level(&graph, "C"), 0);
    Ok(())
}

#[test]
fn relayering_after_connect_moves_the_child_down() -> TestResult {
    init_tracing();
    let dir = TaskDirFixture::new()?
        .with_record("A", RecordBuilder::new("A").build())?
        .with_record("B", RecordBuilder::new("B").depends_on("A").build())?
        .with_record("C", RecordBuilder::new("C").build())?;
    let (mut graph, _) = build(&dir.store())?;
    assert_eq!(level(&graph, "C"), 0);

    GraphMutator::new(dir.store()).add_edge(&mut graph, "B", "C")?;
    let report = compute_levels(&mut graph, true);

    assert!(!report.has_cycles());
    assert_eq!(level(&graph, "C"), 2);
    Ok(())
}

#[test]
fn rewrite_keeps_unknown_fields_and_updates() -> TestResult {
    init_tracing();
    let dir = TaskDirFixture::new()?.with_record("A", RecordBuilder::new("A").build())?;
    let original = r#"{
  "task": "B",
  "id": "x12",
  "depends_on": [3, "zz"],
  "updates": [
    {
      "timestamp": "2024-05-01T10:00:00Z",
      "note": "started",
      "tags": ["keep"],
      "attachments": [{ "name": "log", "content": "ok", "size": 9 }]
    }
  ],
  "color": "red"
}"#;
    dir.write_raw("B.json", original)?;
    let (mut graph, _) = build(&dir.store())?;

    let outcome = GraphMutator::new(dir.store()).add_edge(&mut graph, "A", "B")?;
    assert!(matches!(outcome, ConnectOutcome::Connected { .. }));

    let before: serde_json::Value = serde_json::from_str(original)?;
    let raw: serde_json::Value = serde_json::from_slice(&dir.read_bytes("B")?)?;
    // Only depends_on changes; entries the resolver ignores stay put.
    assert_eq!(raw["depends_on"], serde_json::json!([3, "zz", "A"]));
    assert_eq!(raw["id"], "x12");
    assert_eq!(raw["color"], "red");
    assert_eq!(raw["updates"], before["updates"]);
    assert_eq!(raw["updates"][0]["attachments"][0].get("type"), None);
    assert_eq!(raw.get("description"), None);
    assert_eq!(raw.get("owner"), None);

    let keys: Vec<&str> = raw
        .as_object()
        .map(|o| o.keys().map(String::as_str).collect())
        .unwrap_or_default();
    assert_eq!(keys, vec!["task", "id", "depends_on", "updates", "color"]);
    Ok(())
}

#[test]
fn non_list_depends_on_is_replaced_when_connecting() -> TestResult {
    init_tracing();
    let dir = TaskDirFixture::new()?.with_record("A", RecordBuilder::new("A").build())?;
    dir.write_raw("B.json", r#"{"task":"B","depends_on":"A","note":1}"#)?;
    let (mut graph, _) = build(&dir.store())?;
    assert!(deps(&graph, "B").is_empty());

    GraphMutator::new(dir.store()).add_edge(&mut graph, "A", "B")?;

    let raw: serde_json::Value = serde_json::from_slice(&dir.read_bytes("B")?)?;
    assert_eq!(raw["depends_on"], serde_json::json!(["A"]));
    assert_eq!(raw["note"], 1);
    assert_eq!(deps(&graph, "B"), vec!["A"]);
    Ok(())
}
