use liftlog_types::{ActionPayload, WorkoutSession, WorkoutType};
use pretty_assertions::assert_eq;
use serde_json::json;

// ── Wire shape ───────────────────────────────────────────────────

#[test]
fn add_set_wire_shape() {
    let session = WorkoutSession::begin(WorkoutType::Gym);
    let payload = session.add_set("Squat", 100.0, 5);

    let value = serde_json::to_value(&payload).unwrap();
    assert_eq!(
        value,
        json!({
            "action": "addSet",
            "data": {
                "workoutId": session.id().to_string(),
                "workoutType": "Gym",
                "exercise": "Squat",
                "weight": 100.0,
                "reps": 5
            }
        })
    );
}

#[test]
fn end_workout_wire_shape() {
    let session = WorkoutSession::begin(WorkoutType::Calisthenics);
    let payload = session.finish();

    let value = serde_json::to_value(&payload).unwrap();
    assert_eq!(
        value,
        json!({
            "action": "endWorkout",
            "data": { "workoutId": session.id().to_string() }
        })
    );
}

#[test]
fn add_weight_wire_shape() {
    let payload = ActionPayload::AddWeight { weight: 82.4 };

    let value = serde_json::to_value(&payload).unwrap();
    assert_eq!(
        value,
        json!({
            "action": "addWeight",
            "data": { "weight": 82.4 }
        })
    );
}

#[test]
fn payload_serde_roundtrip() {
    let session = WorkoutSession::begin(WorkoutType::Gym);
    let payload = session.add_set("Bench Press", 60.0, 8);

    let encoded = serde_json::to_string(&payload).unwrap();
    let decoded: ActionPayload = serde_json::from_str(&encoded).unwrap();
    assert_eq!(payload, decoded);
}

#[test]
fn payload_name_matches_wire_action() {
    let session = WorkoutSession::begin(WorkoutType::Gym);
    for payload in [
        session.add_set("Deadlift", 140.0, 3),
        session.finish(),
        ActionPayload::AddWeight { weight: 80.0 },
    ] {
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["action"], payload.name());
    }
}

// ── Session context ──────────────────────────────────────────────

#[test]
fn session_actions_share_the_session_id() {
    let session = WorkoutSession::begin(WorkoutType::Gym);
    let set = session.add_set("Squat", 100.0, 5);
    let end = session.finish();

    let ActionPayload::AddSet { workout_id: set_id, .. } = set else {
        panic!("expected AddSet");
    };
    let ActionPayload::EndWorkout { workout_id: end_id } = end else {
        panic!("expected EndWorkout");
    };
    assert_eq!(set_id, session.id());
    assert_eq!(end_id, session.id());
}

#[test]
fn sessions_are_distinct() {
    let a = WorkoutSession::begin(WorkoutType::Gym);
    let b = WorkoutSession::begin(WorkoutType::Gym);
    assert_ne!(a.id(), b.id());
}

#[test]
fn session_records_type_and_start() {
    let session = WorkoutSession::begin(WorkoutType::Calisthenics);
    assert_eq!(session.workout_type(), WorkoutType::Calisthenics);
    assert!(session.started_at() <= chrono::Utc::now());
}
