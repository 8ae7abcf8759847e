use super::*;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

#[test]
fn select_and_clear() {
    let mut selection = SelectionManager::new();
    assert!(selection.selected().is_none());
    selection.select(TrackId::from("t1"));
    assert!(selection.is_selected(&TrackId::from("t1")));
    selection.clear();
    assert!(selection.selected().is_none());
}

#[test]
fn reselecting_the_same_track_does_not_notify() {
    let mut selection = SelectionManager::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    selection.subscribe(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
    });

    selection.select(TrackId::from("t1"));
    selection.select(TrackId::from("t1"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    selection.select(TrackId::from("t2"));
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    selection.clear();
    selection.clear();
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn listeners_receive_the_new_selection() {
    let mut selection = SelectionManager::new();
    let last: Arc<std::sync::Mutex<Option<String>>> = Arc::default();
    let seen = Arc::clone(&last);
    selection.subscribe(move |id| {
        *seen.lock().unwrap() = id.map(|t| t.as_str().to_owned());
    });

    selection.select(TrackId::from("t1"));
    assert_eq!(last.lock().unwrap().as_deref(), Some("t1"));
    selection.clear();
    assert!(last.lock().unwrap().is_none());
}

#[test]
fn unsubscribe_stops_notifications() {
    let mut selection = SelectionManager::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let token = selection.subscribe(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    selection.select(TrackId::from("t1"));
    selection.unsubscribe(token);
    selection.select(TrackId::from("t2"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
