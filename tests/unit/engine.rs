use super::*;
use std::sync::Mutex;

use crate::{
    model::track::Channel,
    playback::sink::FrameState,
};

#[derive(Default)]
struct RecordingSink {
    states: Mutex<Vec<(TrackId, FrameState)>>,
    completed: Mutex<Vec<f64>>,
}

impl RenderSink for RecordingSink {
    fn apply_frame_state(&self, track_id: &TrackId, state: &FrameState) {
        self.states.lock().unwrap().push((track_id.clone(), state.clone()));
    }

    fn frame_complete(&self, time: f64) {
        self.completed.lock().unwrap().push(time);
    }
}

fn engine() -> (StudioEngine, Arc<RecordingSink>) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let sink = Arc::new(RecordingSink::default());
    let engine = StudioEngine::new(Canvas::logical(), sink.clone() as Arc<dyn RenderSink>);
    (engine, sink)
}

fn one_layer() -> Vec<SpawnLayer> {
    vec![SpawnLayer {
        asset_hash: "h1".to_string(),
        z_index: 0,
    }]
}

#[test]
fn spawn_character_is_undoable_and_selects_the_track() {
    let (mut engine, _sink) = engine();
    let id = engine.spawn_character("Hero", Some("char-1".to_string()), one_layer());

    assert_eq!(engine.data().tracks.len(), 1);
    assert!(engine.selection().is_selected(&id));
    let track = engine.data().track(&id).unwrap();
    assert_eq!(track.actions.len(), 1);
    assert_eq!(track.transform.channel(Channel::X)[0].value, 960.0);

    assert!(engine.undo());
    assert!(engine.data().tracks.is_empty());
    assert!(engine.redo());
    assert_eq!(engine.data().tracks.len(), 1);
}

#[test]
fn spawned_entities_get_distinct_ids() {
    let (mut engine, _sink) = engine();
    let a = engine.spawn_character("A", None, one_layer());
    let b = engine.spawn_character("B", None, one_layer());
    assert_ne!(a, b);
    let actions: Vec<_> = engine
        .data()
        .tracks
        .iter()
        .flat_map(|t| t.actions.iter().map(|x| x.id.clone()))
        .collect();
    assert_ne!(actions[0], actions[1]);
}

#[test]
fn seek_delivers_the_exact_frame_before_returning() {
    let (mut engine, sink) = engine();
    engine.spawn_character("Hero", None, one_layer());
    sink.states.lock().unwrap().clear();
    sink.completed.lock().unwrap().clear();

    engine.seek(1.25);

    assert_eq!(*sink.completed.lock().unwrap(), vec![1.25]);
    assert_eq!(sink.states.lock().unwrap().len(), 1);
    assert_eq!(engine.clock().current_time(), 1.25);
}

#[test]
fn save_and_load_round_trip_the_document() {
    let (mut engine, _sink) = engine();
    engine.spawn_character("Hero", None, one_layer());
    let json = engine.save_document("scene-1").unwrap();

    let (mut other, _sink2) = self::engine();
    other.load_document(&json).unwrap();
    assert_eq!(other.data(), engine.data());
    assert!(!other.history().can_undo());
    assert_eq!(other.clock().current_time(), 0.0);
}

#[test]
fn load_document_clears_history_and_selection() {
    let (mut engine, _sink) = engine();
    let id = engine.spawn_character("Hero", None, one_layer());
    assert!(engine.selection().is_selected(&id));
    let json = engine.save_document("p").unwrap();

    engine.load_document(&json).unwrap();
    assert!(engine.selection().selected().is_none());
    assert!(!engine.history().can_undo());
}

#[test]
fn commit_drag_snaps_and_lands_in_history() {
    let (mut engine, _sink) = engine();
    let id = engine.spawn_character("Hero", None, one_layer());
    let undo_before = engine.history().undo_depth();

    engine.commit_drag(&id, 955.0, 300.0).unwrap();

    let track = engine.data().track(&id).unwrap();
    assert_eq!(track.transform.channel(Channel::X)[0].value, 960.0);
    assert_eq!(engine.history().undo_depth(), undo_before + 1);
}

#[test]
fn auto_keyframe_toggle_flips() {
    let (mut engine, _sink) = engine();
    assert!(engine.auto_keyframe());
    assert!(!engine.toggle_auto_keyframe());
    assert!(engine.toggle_auto_keyframe());
}

#[test]
fn duration_follows_the_document() {
    let (mut engine, _sink) = engine();
    assert_eq!(engine.duration(), crate::foundation::core::MIN_DURATION);
    engine.spawn_character("Hero", None, one_layer());
    // seeded action runs 0..5, so content end + tail still floors at 10
    assert_eq!(engine.duration(), 10.0);
}

#[test]
fn tick_requests_frames_only_while_playing() {
    let (mut engine, sink) = engine();
    engine.spawn_character("Hero", None, one_layer());
    sink.completed.lock().unwrap().clear();

    engine.tick();
    std::thread::sleep(std::time::Duration::from_millis(20));
    assert!(sink.completed.lock().unwrap().is_empty());

    engine.play();
    std::thread::sleep(std::time::Duration::from_millis(20));
    engine.tick();
    engine.pause();

    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(2);
    while sink.completed.lock().unwrap().is_empty() {
        assert!(std::time::Instant::now() < deadline, "worker never delivered");
        std::thread::sleep(std::time::Duration::from_millis(2));
    }
    assert!(engine.clock().current_time() > 0.0);
    engine.shutdown();
}
