mod common;

use std::time::Instant;

use common::{addresses, at, cue_data, engine_in, CueArgs};
use cuemirror::eos::ConsoleEvent;
use cuemirror::store::CueKey;
use cuemirror::LastSeen;

fn active(list: i32, number: &str) -> ConsoleEvent {
    ConsoleEvent::ActiveCue { list, number: number.to_owned() }
}

#[test]
fn ghost_timings_from_secondary_lists_are_suppressed() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut engine = engine_in(&dir);
    let t0 = Instant::now();

    assert_eq!(engine.settings().main_playback_list, "1");
    engine.start_recording();

    engine.handle_event(active(2, "3"), at(t0, 1_000));
    engine.handle_event(active(1, "7"), at(t0, 4_000));

    let timings = engine.timings();
    assert_eq!(timings.cue_timings.len(), 1);
    assert_eq!(timings.cue_timings[0].cue_number, "7");
    assert_eq!(timings.cue_timings[0].cue_list, 1);
    // the clock anchored at the first active event, list 2's
    assert!((timings.cue_timings[0].timestamp - 3.0).abs() < 1e-9);
}

#[test]
fn refiring_a_cue_updates_in_place() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut engine = engine_in(&dir);
    let t0 = Instant::now();

    engine.start_recording();
    engine.handle_event(active(1, "1"), at(t0, 0));
    engine.handle_event(active(1, "2"), at(t0, 10_000));
    engine.handle_event(active(1, "1"), at(t0, 25_000));

    let timings = engine.timings();
    assert_eq!(timings.cue_timings.len(), 2);

    let one = timings.entry("1").expect("entry for 1");
    assert!((one.timestamp - 25.0).abs() < 1e-9, "latest firing wins");
    assert!((one.time_from_previous - 15.0).abs() < 1e-9);
}

#[test]
fn repeated_active_pushes_do_not_duplicate() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut engine = engine_in(&dir);
    let t0 = Instant::now();

    engine.start_recording();
    engine.handle_event(active(1, "5"), at(t0, 0));
    engine.handle_event(active(1, "5"), at(t0, 3_000));
    engine.handle_event(active(1, "5"), at(t0, 6_000));

    assert_eq!(engine.timings().cue_timings.len(), 1);
    assert!((engine.timings().cue_timings[0].timestamp - 0.0).abs() < 1e-9);
}

#[test]
fn per_list_scoping_of_active_state() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut engine = engine_in(&dir);
    let t0 = Instant::now();

    engine.handle_event(active(1, "5"), at(t0, 0));
    engine.handle_event(active(2, "9"), at(t0, 10));

    // empty text on list 1 resets list 1 only
    engine.handle_event(ConsoleEvent::ActiveCueText { list: Some(1), text: String::new() }, at(t0, 20));

    let one = engine.cues().get(&CueKey { list: 1, number: "5".to_owned(), part: 0 }).expect("stub");
    assert_eq!(one.last_seen, None);
    let two = engine.cues().get(&CueKey { list: 2, number: "9".to_owned(), part: 0 }).expect("stub");
    assert_eq!(two.last_seen, Some(LastSeen::Active));
}

#[test]
fn fader_config_sets_the_main_list() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut engine = engine_in(&dir);
    let t0 = Instant::now();

    engine.handle_event(
        ConsoleEvent::FaderConfig { index: 0, fader_type: 1, target_id: 3, label: "Main".to_owned() },
        at(t0, 0),
    );
    assert_eq!(engine.settings().main_playback_list, "3");

    engine.start_recording();
    engine.handle_event(active(1, "4"), at(t0, 1_000));
    engine.handle_event(active(3, "8"), at(t0, 2_000));

    let numbers: Vec<&str> = engine.timings().cue_timings.iter().map(|t| t.cue_number.as_str()).collect();
    assert_eq!(numbers, vec!["8"], "only list-3 transitions recorded");
}

#[test]
fn user_main_list_override_is_replaced_by_fader_config() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut engine = engine_in(&dir);

    engine.set_main_list("5");
    assert_eq!(engine.settings().main_playback_list, "5");

    engine.handle_event(
        ConsoleEvent::FaderConfig { index: 0, fader_type: 1, target_id: 2, label: String::new() },
        Instant::now(),
    );
    assert_eq!(engine.settings().main_playback_list, "2");
}

#[test]
fn pending_text_captures_fade_time() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut engine = engine_in(&dir);
    let t0 = Instant::now();

    engine.handle_event(cue_data(1, "5", 0, 0, 1, &CueArgs::default()), at(t0, 0));
    engine.handle_event(
        ConsoleEvent::PendingCueText { list: Some(1), text: "1/5 Blackout 3".to_owned() },
        at(t0, 100),
    );

    let cue = engine.cues().get(&CueKey { list: 1, number: "5".to_owned(), part: 0 }).expect("cue");
    assert_eq!(cue.fade_time, Some(3.0));
    assert_eq!(cue.last_seen, Some(LastSeen::Pending));
}

#[test]
fn active_text_with_running_fade_does_not_capture() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut engine = engine_in(&dir);
    let t0 = Instant::now();

    engine.handle_event(cue_data(1, "5", 0, 0, 1, &CueArgs::default()), at(t0, 0));
    engine.handle_event(
        ConsoleEvent::ActiveCueText { list: Some(1), text: "1/5 Blackout 3 47%".to_owned() },
        at(t0, 100),
    );

    let cue = engine.cues().get(&CueKey { list: 1, number: "5".to_owned(), part: 0 }).expect("cue");
    assert_eq!(cue.fade_time, None, "47% means the fade is moving");

    engine.handle_event(
        ConsoleEvent::ActiveCueText { list: Some(1), text: "1/5 Blackout 3 0%".to_owned() },
        at(t0, 200),
    );
    let cue = engine.cues().get(&CueKey { list: 1, number: "5".to_owned(), part: 0 }).expect("cue");
    assert_eq!(cue.fade_time, Some(3.0));
}

#[test]
fn countdown_tracks_the_recorded_schedule() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut engine = engine_in(&dir);
    let t0 = Instant::now();

    // record three firings: 0s, 10s, 25s
    engine.start_recording();
    engine.handle_event(active(1, "1"), at(t0, 0));
    engine.handle_event(active(1, "2"), at(t0, 10_000));
    engine.handle_event(active(1, "3"), at(t0, 25_000));
    engine.stop_recording();

    // playback: cue 1 fires again
    let t1 = at(t0, 100_000);
    engine.handle_event(active(1, "1"), t1);

    // 4 seconds later the countdown reads 6 to the next cue
    engine.tick(at(t0, 104_000));
    let snapshot = engine.countdown().expect("countdown available").clone();
    assert_eq!(snapshot.active_cue, "1");
    assert!((snapshot.show_elapsed - 4.0).abs() < 1e-9);
    assert!((snapshot.time_to_next.expect("next exists") - 6.0).abs() < 1e-9);
    assert!((snapshot.estimated_remaining - 21.0).abs() < 1e-9);
    assert_eq!(snapshot.countdown, snapshot.time_to_next);
}

#[test]
fn countdown_clamps_at_zero_when_running_long() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut engine = engine_in(&dir);
    let t0 = Instant::now();

    engine.start_recording();
    engine.handle_event(active(1, "1"), at(t0, 0));
    engine.handle_event(active(1, "2"), at(t0, 5_000));
    engine.stop_recording();

    let t1 = at(t0, 60_000);
    engine.handle_event(active(1, "1"), t1);
    engine.tick(at(t0, 69_000)); // nine seconds into a five second gap

    let snapshot = engine.countdown().expect("countdown available");
    assert!(snapshot.time_to_next.expect("next exists") < 0.0);
    assert_eq!(snapshot.countdown, Some(0.0));
}

#[test]
fn poll_requests_go_out_while_idle_and_connected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut engine = engine_in(&dir);
    let t0 = Instant::now();

    engine.on_transport_ready(at(t0, 0));
    engine.handle_event(ConsoleEvent::CueListDiscovered(1), at(t0, 10));
    engine.take_outbox(); // bootstrap + refresh traffic

    // finish the refresh so polling may run
    engine.handle_event(ConsoleEvent::CueCount { list: 1, count: 1 }, at(t0, 50));
    engine.handle_event(cue_data(1, "1", 0, 0, 1, &CueArgs::default()), at(t0, 60));
    engine.take_outbox();

    engine.tick(at(t0, 1_000));
    let first = addresses(engine.take_outbox());
    assert_eq!(first, vec!["/eos/get/cue/1/active"]);

    // the slot frees on the matching reply; next tick polls pending
    engine.handle_event(active(1, "1"), at(t0, 1_100));
    engine.tick(at(t0, 1_600));
    let second = addresses(engine.take_outbox());
    assert_eq!(second, vec!["/eos/get/cue/1/pending"]);
}

#[test]
fn contextless_text_uses_the_outstanding_poll() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut engine = engine_in(&dir);
    let t0 = Instant::now();

    engine.on_transport_ready(at(t0, 0));
    engine.handle_event(ConsoleEvent::CueListDiscovered(2), at(t0, 10));
    engine.handle_event(ConsoleEvent::CueCount { list: 2, count: 1 }, at(t0, 50));
    engine.handle_event(cue_data(2, "4", 0, 0, 1, &CueArgs::default()), at(t0, 60));
    engine.take_outbox();

    // poll for list 2 goes out; the reply text has no list prefix
    engine.tick(at(t0, 1_000));
    assert_eq!(addresses(engine.take_outbox()), vec!["/eos/get/cue/2/active"]);

    engine.handle_event(
        ConsoleEvent::ActiveCueText { list: None, text: "4 Intro 3".to_owned() },
        at(t0, 1_050),
    );

    let cue = engine.cues().get(&CueKey { list: 2, number: "4".to_owned(), part: 0 }).expect("cue");
    assert_eq!(cue.last_seen, Some(LastSeen::Active));
}
