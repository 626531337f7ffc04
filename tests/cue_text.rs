use cuemirror::eos::text::{parse, CueTextOutcome};

fn info(text: &str) -> cuemirror::eos::text::CueTextInfo {
    match parse(text) {
        CueTextOutcome::Info(info) => info,
        CueTextOutcome::Reset => panic!("unexpected reset for {text:?}"),
    }
}

#[test]
fn full_active_form() {
    let parsed = info("1/5 Blackout 3 100%");
    assert_eq!(parsed.list, Some(1));
    assert_eq!(parsed.number, "5");
    assert_eq!(parsed.label.as_deref(), Some("Blackout"));
    assert_eq!(parsed.fade, Some(3.0));
    assert_eq!(parsed.percent, Some(100));
}

#[test]
fn multi_word_labels_stay_whole() {
    let parsed = info("1/10.5 House to half 7.5 0%");
    assert_eq!(parsed.number, "10.5");
    assert_eq!(parsed.label.as_deref(), Some("House to half"));
    assert_eq!(parsed.fade, Some(7.5));
    assert_eq!(parsed.percent, Some(0));
}

#[test]
fn fade_and_percent_without_label() {
    let parsed = info("1/5 3 100%");
    assert_eq!(parsed.label, None);
    assert_eq!(parsed.fade, Some(3.0));
    assert_eq!(parsed.percent, Some(100));
}

#[test]
fn pending_form_without_percent() {
    let parsed = info("2/9 Sunrise 5");
    assert_eq!(parsed.list, Some(2));
    assert_eq!(parsed.label.as_deref(), Some("Sunrise"));
    assert_eq!(parsed.fade, Some(5.0));
    assert_eq!(parsed.percent, None);
}

#[test]
fn bare_fade() {
    let parsed = info("2/9 5");
    assert_eq!(parsed.label, None);
    assert_eq!(parsed.fade, Some(5.0));
}

#[test]
fn remainder_is_a_label_when_nothing_else_fits() {
    let parsed = info("1/5 Thunder crash");
    assert_eq!(parsed.label.as_deref(), Some("Thunder crash"));
    assert_eq!(parsed.fade, None);
}

#[test]
fn contextless_cue_number() {
    let parsed = info("5.5 Blackout 3");
    assert_eq!(parsed.list, None);
    assert_eq!(parsed.number, "5.5");
    assert_eq!(parsed.label.as_deref(), Some("Blackout"));
}

#[test]
fn reset_forms() {
    assert_eq!(parse(""), CueTextOutcome::Reset);
    assert_eq!(parse("   "), CueTextOutcome::Reset);
    assert_eq!(parse("0.0 0 0%"), CueTextOutcome::Reset);
    assert_eq!(parse("0/0 0 0%"), CueTextOutcome::Reset);
    assert_eq!(parse("0/0"), CueTextOutcome::Reset);
}

#[test]
fn parse_is_total_on_garbage() {
    // every non-empty input is info or reset, never a panic
    for text in [
        "garbage",
        "1/",
        "/5",
        "1/5",
        "%%%",
        "1/5 100%",
        "🎭 🎭 🎭",
        "5 ",
        "- - - -",
        "1/5 Label 3 12x%",
    ] {
        let _ = parse(text);
    }
}

#[test]
fn cue_number_only() {
    let parsed = info("1/5");
    assert_eq!(parsed.list, Some(1));
    assert_eq!(parsed.number, "5");
    assert_eq!(parsed.label, None);
    assert_eq!(parsed.fade, None);
}
