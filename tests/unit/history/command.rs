use super::*;
use crate::model::track::Transform;

fn track(id: &str) -> Track {
    Track {
        id: TrackId::from(id),
        name: format!("Track {id}"),
        character_id: None,
        transform: Transform::default(),
        blend_mode: None,
        speed_multiplier: None,
        actions: Vec::new(),
        is_expanded: false,
    }
}

fn action(id: &str, start: f64, end: f64) -> ActionBlock {
    ActionBlock {
        id: ActionId::from(id),
        asset_hash: "h".to_string(),
        start,
        end,
        z_index: 0,
        hidden: false,
        locked: false,
    }
}

fn seeded() -> EditorData {
    let mut data = EditorData::empty();
    data.add_track(track("t1"));
    data.add_action(&TrackId::from("t1"), action("a1", 1.0, 4.0));
    data
}

fn keyframe_cmd(data: &EditorData, channel: Channel, time: f64, value: f64) -> EditorCommand {
    EditorCommand::add_keyframe(data, &TrackId::from("t1"), channel, time, value, Easing::Linear)
        .unwrap()
}

#[test]
fn add_track_apply_and_revert() {
    let mut data = EditorData::empty();
    let cmd = EditorCommand::add_track(track("t1"));
    cmd.apply(&mut data);
    assert_eq!(data.tracks.len(), 1);
    cmd.revert(&mut data);
    assert!(data.tracks.is_empty());
}

#[test]
fn delete_track_restores_at_the_original_index() {
    let mut data = EditorData::empty();
    data.add_track(track("t1"));
    data.add_track(track("t2"));
    data.add_track(track("t3"));
    let cmd = EditorCommand::delete_track(&data, &TrackId::from("t2")).unwrap();
    cmd.apply(&mut data);
    assert_eq!(data.tracks.len(), 2);
    cmd.revert(&mut data);
    let ids: Vec<&str> = data.tracks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["t1", "t2", "t3"]);
}

#[test]
fn factories_validate_input() {
    let data = seeded();
    let t1 = TrackId::from("t1");
    assert!(EditorCommand::delete_track(&data, &TrackId::from("nope")).is_err());
    assert!(EditorCommand::add_action(&data, &t1, action("bad", 3.0, 3.0)).is_err());
    assert!(EditorCommand::move_action(&data, &ActionId::from("a1"), f64::NAN).is_err());
    assert!(
        EditorCommand::add_keyframe(&data, &t1, Channel::X, 1.0, f64::NAN, Easing::Linear)
            .is_err()
    );
    assert!(EditorCommand::set_speed_multiplier(&data, &TrackId::from("t1"), 0.0).is_err());
}

#[test]
fn move_action_round_trips() {
    let mut data = seeded();
    let cmd = EditorCommand::move_action(&data, &ActionId::from("a1"), 6.0).unwrap();
    cmd.apply(&mut data);
    let moved = data.tracks[0].action(&ActionId::from("a1")).unwrap().clone();
    assert_eq!((moved.start, moved.end), (6.0, 9.0));
    cmd.revert(&mut data);
    let back = data.tracks[0].action(&ActionId::from("a1")).unwrap();
    assert_eq!((back.start, back.end), (1.0, 4.0));
}

#[test]
fn add_keyframe_over_an_existing_one_restores_it_on_undo() {
    let mut data = seeded();
    data.set_or_add_keyframe(&TrackId::from("t1"), Channel::X, 2.0, 10.0, Some(Easing::EaseIn));
    let cmd = keyframe_cmd(&data, Channel::X, 2.0, 77.0);
    cmd.apply(&mut data);
    let keys = data.tracks[0].transform.channel(Channel::X);
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0].value, 77.0);
    cmd.revert(&mut data);
    let keys = data.tracks[0].transform.channel(Channel::X);
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0].value, 10.0);
    assert_eq!(keys[0].easing, Easing::EaseIn);
}

#[test]
fn add_keyframe_on_empty_spot_disappears_on_undo() {
    let mut data = seeded();
    let cmd = keyframe_cmd(&data, Channel::Y, 1.5, 300.0);
    cmd.apply(&mut data);
    assert_eq!(data.tracks[0].transform.channel(Channel::Y).len(), 1);
    cmd.revert(&mut data);
    assert!(data.tracks[0].transform.channel(Channel::Y).is_empty());
}

#[test]
fn update_keyframe_retimes() {
    let mut data = seeded();
    data.set_or_add_keyframe(&TrackId::from("t1"), Channel::X, 2.0, 10.0, None);
    let cmd = EditorCommand::update_keyframe(
        &data,
        &TrackId::from("t1"),
        Channel::X,
        2.0,
        Keyframe::new(3.5, 20.0, Easing::EaseOut),
    )
    .unwrap();
    cmd.apply(&mut data);
    let keys = data.tracks[0].transform.channel(Channel::X);
    assert_eq!(keys.len(), 1);
    assert_eq!((keys[0].time, keys[0].value), (3.5, 20.0));
    cmd.revert(&mut data);
    let keys = data.tracks[0].transform.channel(Channel::X);
    assert_eq!((keys[0].time, keys[0].value), (2.0, 10.0));
}

#[test]
fn commands_on_vanished_entities_are_no_ops() {
    let mut data = seeded();
    let cmd = EditorCommand::move_action(&data, &ActionId::from("a1"), 6.0).unwrap();
    data.remove_action(&ActionId::from("a1"));
    let before = data.clone();
    cmd.apply(&mut data);
    assert_eq!(data, before);
    cmd.revert(&mut data);
    assert_eq!(data, before);
}

#[test]
fn remove_actions_reverts_in_reverse_order() {
    let mut data = seeded();
    data.add_action(&TrackId::from("t1"), action("a2", 5.0, 7.0));
    let before = data.clone();
    let ids = [ActionId::from("a1"), ActionId::from("a2")];
    let cmd = EditorCommand::remove_actions(&data, &ids).unwrap();
    cmd.apply(&mut data);
    assert!(data.tracks[0].actions.is_empty());
    cmd.revert(&mut data);
    assert_eq!(data, before);
}

#[test]
fn batch_applies_in_order_and_reverts_in_reverse() {
    let mut data = EditorData::empty();
    let add = EditorCommand::add_track(track("t1"));
    add.apply(&mut data);
    let kf1 = keyframe_cmd(&data, Channel::X, 0.0, 1.0);
    let kf2 = keyframe_cmd(&data, Channel::X, 2.0, 9.0);
    add.revert(&mut data);

    let batch = EditorCommand::batch("Pose", vec![add, kf1, kf2]);
    batch.apply(&mut data);
    assert_eq!(data.tracks[0].transform.channel(Channel::X).len(), 2);
    batch.revert(&mut data);
    assert!(data.tracks.is_empty());
}

#[test]
fn descriptions_and_ids_are_populated() {
    let data = seeded();
    let cmd =
        EditorCommand::set_blend_mode(&data, &TrackId::from("t1"), BlendMode::Multiply).unwrap();
    assert!(!cmd.description().is_empty());
    let other = EditorCommand::add_track(track("t9"));
    assert_ne!(cmd.id(), other.id());
    assert!(other.description().contains("t9") || other.description().contains("Track"));
}
