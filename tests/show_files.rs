mod common;

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use common::{at, cue_data, engine_in, CueArgs};
use cuemirror::show::files::ShowFiles;
use cuemirror::show::paths::{decode_show_name, encode_show_name};
use cuemirror::store::CueKey;

#[test]
fn encoding_round_trips_user_names() {
    for name in [
        "Default",
        "My Show",
        "Noël 2024!",
        "50% off",
        "a/b\\c:d",
        "日本語の芝居",
        "dots.and-dashes_ok~",
        "(parens) 'quotes' *stars*",
    ] {
        let encoded = encode_show_name(name);
        assert_eq!(decode_show_name(&encoded), name, "decode(encode) for {name:?}");
        // encoded form is filesystem-safe ascii
        assert!(encoded.bytes().all(|b| b.is_ascii() && b != b'/' && b != b'\\'));
        // system-written names re-encode to themselves
        assert_eq!(encode_show_name(&decode_show_name(&encoded)), encoded);
    }
}

#[test]
fn legacy_root_files_move_into_the_default_show() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("cues.json"), "[]").expect("write");
    fs::write(dir.path().join("show_notes.json"), "{\"notes\":\"old\"}").expect("write");

    let files = ShowFiles::new(PathBuf::from(dir.path()));
    files.migrate();

    assert!(!dir.path().join("cues.json").exists());
    assert!(dir.path().join("Default").join("cues.json").exists());
    assert_eq!(files.load_notes("Default"), "old");
}

#[test]
fn misencoded_directories_are_renamed_at_startup() {
    let dir = tempfile::tempdir().expect("tempdir");
    // written by an old build that never encoded spaces
    fs::create_dir_all(dir.path().join("My Show")).expect("mkdir");

    let files = ShowFiles::new(PathBuf::from(dir.path()));
    files.migrate();

    assert!(dir.path().join("My%20Show").is_dir());
    assert!(!dir.path().join("My Show").exists());
    assert_eq!(files.list_shows(), vec!["My Show".to_owned()]);
}

#[test]
fn corrupt_show_file_resets_to_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let show = dir.path().join("Default");
    fs::create_dir_all(&show).expect("mkdir");
    fs::write(show.join("cues.json"), "{not json").expect("write");

    let files = ShowFiles::new(PathBuf::from(dir.path()));
    assert!(files.load_cues("Default").is_empty());
}

#[test]
fn settings_file_uses_the_fixed_key_shapes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let files = ShowFiles::new(PathBuf::from(dir.path()));

    files.save_settings(&cuemirror::show::settings::GlobalSettings::default()).expect("save");
    let text = fs::read_to_string(dir.path().join("global_settings.json")).expect("read");

    for keyword in ["lastShowName", "mainPlaybackList", "oscSettings", "ip_address", "osc_version", "protocol"] {
        assert!(text.contains(keyword), "missing {keyword} in {text}");
    }

    let reloaded = files.load_settings();
    assert_eq!(reloaded, cuemirror::show::settings::GlobalSettings::default());
}

#[test]
fn timings_file_uses_the_fixed_key_shapes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut engine = engine_in(&dir);
    let t0 = Instant::now();

    engine.start_recording();
    engine.handle_event(
        cuemirror::eos::ConsoleEvent::ActiveCue { list: 1, number: "1".to_owned() },
        at(t0, 0),
    );

    let text = fs::read_to_string(dir.path().join("Default").join("show_timings.json")).expect("read");
    for keyword in ["isRecording", "showStartTime", "lastCueTime", "lastCueNumber", "cueTimings", "time_from_previous"] {
        assert!(text.contains(keyword), "missing {keyword} in {text}");
    }
}

#[test]
fn annotations_survive_persist_and_reload() {
    let dir = tempfile::tempdir().expect("tempdir");
    let t0 = Instant::now();
    let key = CueKey { list: 1, number: "5".to_owned(), part: 0 };

    {
        let mut engine = engine_in(&dir);
        engine.handle_event(cue_data(1, "5", 0, 0, 1, &CueArgs { label: "Opening", ..CueArgs::default() }), at(t0, 0));
        assert!(engine.set_cue_notes(&key, "check the followspot", at(t0, 10)));
        assert!(engine.set_cue_page(&key, "p. 12", at(t0, 11)));
        engine.persist_now();
    }

    let engine = engine_in(&dir);
    let cue = engine.cues().get(&key).expect("cue reloaded");
    assert_eq!(cue.notes, "check the followspot");
    assert_eq!(cue.page, "p. 12");
    assert_eq!(cue.label, "Opening");
    assert_eq!(cue.last_seen, None, "runtime state is not persisted");
}

#[test]
fn switching_shows_swaps_the_model_and_autocreates() {
    let dir = tempfile::tempdir().expect("tempdir");
    let t0 = Instant::now();

    let mut engine = engine_in(&dir);
    engine.handle_event(cue_data(1, "5", 0, 0, 1, &CueArgs::default()), at(t0, 0));
    engine.set_show_notes("act one notes");
    assert_eq!(engine.current_show(), "Default");

    engine.switch_show("Tech Rehearsal");
    assert_eq!(engine.current_show(), "Tech Rehearsal");
    assert_eq!(engine.cues().len(), 0, "new show starts empty");
    assert_eq!(engine.show_notes(), "");
    assert!(dir.path().join("Tech%20Rehearsal").is_dir(), "auto-created on disk");

    // settings remember the switch
    let files = ShowFiles::new(PathBuf::from(dir.path()));
    assert_eq!(files.load_settings().last_show_name, "Tech Rehearsal");

    engine.switch_show("Default");
    assert_eq!(engine.cues().len(), 1, "original model restored");
    assert_eq!(engine.show_notes(), "act one notes");
}

#[test]
fn scene_and_tag_metadata_persist_per_show() {
    let dir = tempfile::tempdir().expect("tempdir");

    {
        let mut engine = engine_in(&dir);
        engine.set_scene_meta("Prologue", cuemirror::show::SceneMeta {
            notes: "slow build".to_owned(),
            color: "#101010".to_owned(),
        });
        engine.set_tag_color("fx", "#00ff00");
    }

    let engine = engine_in(&dir);
    assert_eq!(engine.scenes().get("Prologue").map(|m| m.notes.as_str()), Some("slow build"));
    assert_eq!(engine.tag_colors().get("fx").map(String::as_str), Some("#00ff00"));
}

#[test]
fn debounced_cue_writes_coalesce() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut engine = engine_in(&dir);
    let t0 = Instant::now();
    let cues_path = dir.path().join("Default").join("cues.json");

    engine.handle_event(cue_data(1, "5", 0, 0, 1, &CueArgs::default()), at(t0, 0));
    engine.tick(at(t0, 500));
    assert!(!cues_path.exists(), "write held back inside the debounce window");

    engine.tick(at(t0, 1_100));
    assert!(cues_path.exists(), "write lands after a quiet second");
}
