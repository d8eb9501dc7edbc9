// Unit tests for task wire types
// Tests that serde mapping matches the backend's snake_case JSON exactly

use crate::Task;

use serde_json::json;

/// **VALUE**: Verifies a task deserializes from the backend's exact JSON shape.
///
/// **WHY THIS MATTERS**: The task cache holds these verbatim; a field-name
/// mismatch would surface as every task failing to load, not a compile error.
///
/// **BUG THIS CATCHES**: Would catch a renamed field or an added
/// `#[serde(rename_all)]` that silently diverges from the wire format.
#[test]
fn given_backend_task_json_when_deserialized_then_all_fields_map() {
    let value = json!({
        "id": "5f6b2c1e-8b0a-4c9d-9d6e-1f2a3b4c5d6e",
        "description": "Buy milk",
        "is_completed": false,
        "created_at": "2026-01-05T09:30:00Z",
        "updated_at": "2026-01-05T10:00:00Z"
    });

    let task: Task = serde_json::from_value(value).expect("task should deserialize");

    assert_eq!(task.description, "Buy milk");
    assert!(!task.is_completed);
    assert!(task.updated_at > task.created_at);
}

/// **VALUE**: Verifies serialization round-trips without losing fields.
///
/// **WHY THIS MATTERS**: Cached tasks are echoed into logs and test fixtures;
/// a lossy round-trip would make reconciliation comparisons lie.
#[test]
fn given_task_when_round_tripped_then_equal() {
    let value = json!({
        "id": "5f6b2c1e-8b0a-4c9d-9d6e-1f2a3b4c5d6e",
        "description": "Water the plants",
        "is_completed": true,
        "created_at": "2026-01-05T09:30:00Z",
        "updated_at": "2026-01-05T09:30:00Z"
    });

    let task: Task = serde_json::from_value(value).expect("task should deserialize");
    let echoed = serde_json::to_value(&task).expect("task should serialize");
    let back: Task = serde_json::from_value(echoed).expect("echo should deserialize");

    assert_eq!(task, back);
}
