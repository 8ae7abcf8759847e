use super::*;
use std::{
    sync::Mutex as StdMutex,
    time::{Duration, Instant},
};

use crate::{
    animation::ease::Easing,
    foundation::core::ActionId,
    model::track::{ActionBlock, Track, Transform},
};

// worker-thread logs are only visible with a capturing subscriber installed
fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn canvas() -> Canvas {
    Canvas::logical()
}

fn track(id: &str) -> Track {
    Track {
        id: TrackId::from(id),
        name: id.to_string(),
        character_id: None,
        transform: Transform::default(),
        blend_mode: None,
        speed_multiplier: None,
        actions: Vec::new(),
        is_expanded: false,
    }
}

fn action(id: &str, start: f64, end: f64, z: i32) -> ActionBlock {
    ActionBlock {
        id: ActionId::from(id),
        asset_hash: "h".to_string(),
        start,
        end,
        z_index: z,
        hidden: false,
        locked: false,
    }
}

#[derive(Default)]
struct RecordingSink {
    states: StdMutex<Vec<(TrackId, FrameState)>>,
    completed: StdMutex<Vec<f64>>,
    delay: Option<Duration>,
}

impl RenderSink for RecordingSink {
    fn apply_frame_state(&self, track_id: &TrackId, state: &FrameState) {
        self.states.lock().unwrap().push((track_id.clone(), state.clone()));
    }

    fn frame_complete(&self, time: f64) {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.completed.lock().unwrap().push(time);
    }
}

#[test]
fn keyframeless_tracks_rest_at_the_canvas_center() {
    let mut data = EditorData::empty();
    data.add_track(track("t1"));
    let frames = sweep_frame(1.0, &data, canvas());
    assert_eq!(frames.len(), 1);
    let (_, state) = &frames[0];
    assert_eq!(state.x, 960.0);
    assert_eq!(state.y, 540.0);
    assert_eq!(state.scale_x, 1.0);
    assert_eq!(state.rotation, 0.0);
    assert_eq!(state.opacity, 1.0);
    assert!(state.in_viewport);
}

#[test]
fn opacity_is_delivered_normalized() {
    let mut data = EditorData::empty();
    data.add_track(track("t1"));
    data.set_or_add_keyframe(&TrackId::from("t1"), Channel::Opacity, 0.0, 40.0, None);
    let frames = sweep_frame(0.0, &data, canvas());
    assert_eq!(frames[0].1.opacity, 0.4);
}

#[test]
fn speed_ramp_remaps_sampling_relative_to_the_track_start() {
    let mut data = EditorData::empty();
    let mut t = track("t1");
    t.actions.push(action("a1", 2.0, 10.0, 0));
    t.speed_multiplier = Some(2.0);
    data.add_track(t);
    data.set_or_add_keyframe(&TrackId::from("t1"), Channel::X, 2.0, 0.0, Some(Easing::Linear));
    data.set_or_add_keyframe(&TrackId::from("t1"), Channel::X, 6.0, 100.0, Some(Easing::Linear));

    // wall time 3.0 -> effective 2.0 + (3.0 - 2.0) * 2.0 = 4.0, halfway
    let frames = sweep_frame(3.0, &data, canvas());
    assert!((frames[0].1.x - 50.0).abs() < 1e-9);
}

#[test]
fn action_visibility_uses_wall_time_not_ramped_time() {
    let mut data = EditorData::empty();
    let mut t = track("t1");
    t.actions.push(action("a1", 2.0, 4.0, 0));
    t.speed_multiplier = Some(10.0);
    data.add_track(t);

    // effective time is far past the block, wall time is inside it
    let frames = sweep_frame(3.0, &data, canvas());
    assert_eq!(frames[0].1.visible_assets, vec![ActionId::from("a1")]);
}

#[test]
fn cull_padding_grows_with_scale() {
    let mut data = EditorData::empty();
    let mut t = track("t1");
    t.actions.push(action("a1", 0.0, 10.0, 0));
    data.add_track(t);
    data.set_or_add_keyframe(&TrackId::from("t1"), Channel::X, 0.0, -700.0, None);

    // at scale 1 the padding is 600, so x = -700 is culled
    let frames = sweep_frame(1.0, &data, canvas());
    assert!(!frames[0].1.in_viewport);
    assert!(frames[0].1.visible_assets.is_empty());

    // at scale 2 the padding doubles and the track is visible again
    data.set_or_add_keyframe(&TrackId::from("t1"), Channel::Scale, 0.0, 2.0, None);
    let frames = sweep_frame(1.0, &data, canvas());
    assert!(frames[0].1.in_viewport);
    assert_eq!(frames[0].1.visible_assets.len(), 1);
}

#[test]
fn hidden_and_inactive_actions_are_not_visible() {
    let mut data = EditorData::empty();
    let mut t = track("t1");
    let mut hidden = action("a1", 0.0, 10.0, 0);
    hidden.hidden = true;
    t.actions.push(hidden);
    t.actions.push(action("a2", 5.0, 10.0, 1));
    t.actions.push(action("a3", 0.0, 10.0, 2));
    data.add_track(t);

    let frames = sweep_frame(1.0, &data, canvas());
    assert_eq!(frames[0].1.visible_assets, vec![ActionId::from("a3")]);
}

#[test]
fn visible_assets_are_ordered_by_z() {
    let mut data = EditorData::empty();
    let mut t = track("t1");
    t.actions.push(action("front", 0.0, 10.0, 5));
    t.actions.push(action("back", 0.0, 10.0, 1));
    data.add_track(t);

    let frames = sweep_frame(1.0, &data, canvas());
    assert_eq!(
        frames[0].1.visible_assets,
        vec![ActionId::from("back"), ActionId::from("front")]
    );
}

#[test]
fn deliver_frame_applies_every_track_then_completes() {
    let mut data = EditorData::empty();
    data.add_track(track("t1"));
    data.add_track(track("t2"));
    let sink = RecordingSink::default();
    deliver_frame(1.5, &data, canvas(), &sink);

    assert_eq!(sink.states.lock().unwrap().len(), 2);
    assert_eq!(*sink.completed.lock().unwrap(), vec![1.5]);
}

#[test]
fn worker_drops_stale_requests_and_finishes_on_the_newest() {
    init_tracing();
    let mut data = EditorData::empty();
    data.add_track(track("t1"));
    let sink = Arc::new(RecordingSink {
        delay: Some(Duration::from_millis(5)),
        ..Default::default()
    });
    let worker = InterpolationWorker::spawn(sink.clone() as Arc<dyn RenderSink>);

    let total = 50usize;
    for i in 0..total {
        worker.request(FrameRequest {
            time: i as f64,
            data: data.clone(),
            canvas: canvas(),
        });
    }

    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        let done = sink
            .completed
            .lock()
            .unwrap()
            .last()
            .copied();
        if done == Some((total - 1) as f64) {
            break;
        }
        assert!(Instant::now() < deadline, "worker never reached the newest frame");
        std::thread::sleep(Duration::from_millis(2));
    }
    let completed = sink.completed.lock().unwrap();
    assert!(completed.len() < total, "intermediate frames should have been dropped");
}

#[test]
fn shutdown_joins_and_is_idempotent() {
    init_tracing();
    let sink = Arc::new(RecordingSink::default());
    let mut worker = InterpolationWorker::spawn(sink.clone() as Arc<dyn RenderSink>);
    worker.request(FrameRequest {
        time: 0.5,
        data: EditorData::empty(),
        canvas: canvas(),
    });
    worker.shutdown();
    worker.shutdown();
}
