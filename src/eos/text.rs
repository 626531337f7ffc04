//! Active/pending cue text parsing.
//!
//! The console's text payload is under-specified: the label may be
//! missing, the percent may be missing, the list prefix may be missing
//! when a contextual list is implied. Parses are tried most-specific
//! first and the whole remainder is a label as the last resort, so
//! every non-empty input yields either cue info or a reset.

use crate::enums::{TEXT_FADE, TEXT_FADE_PCT, TEXT_LABEL_FADE, TEXT_LABEL_FADE_PCT};

/// Result of a cue text parse
#[derive(Debug, Clone, PartialEq)]
pub enum CueTextOutcome {
    /// "no cue" for this slot; clear the contextual list only
    Reset,
    /// a cue reference, possibly partial
    Info(CueTextInfo),
}

/// Parsed cue text fields
#[derive(Debug, Clone, PartialEq)]
pub struct CueTextInfo {
    /// cue list from the "L/C" head, if present
    pub list: Option<i32>,
    /// displayed cue number
    pub number: String,
    /// label, when one could be split out
    pub label: Option<String>,
    /// fade time in seconds
    pub fade: Option<f64>,
    /// completion percent
    pub percent: Option<u32>,
}

/// Parse one active/pending text payload
#[must_use]
pub fn parse(text: &str) -> CueTextOutcome {
    let text = text.trim();

    if text.is_empty() || text.starts_with("0.0 ") || text.starts_with("0/0") {
        return CueTextOutcome::Reset;
    }

    let (head, remainder) = text.split_once(char::is_whitespace)
        .map_or((text, ""), |(h, r)| (h, r.trim_start()));

    let (list, number) = head.split_once('/').map_or_else(
        || (None, head.to_owned()),
        |(l, c)| (l.parse::<i32>().ok(), c.to_owned()),
    );

    let mut info = CueTextInfo { list, number, label: None, fade: None, percent: None };

    if remainder.is_empty() {
        return CueTextOutcome::Info(info);
    }

    if let Some(caps) = TEXT_LABEL_FADE_PCT.captures(remainder) {
        info.label = Some(caps["label"].to_owned());
        info.fade = caps["fade"].parse().ok();
        info.percent = caps["pct"].parse().ok();
    } else if let Some(caps) = TEXT_FADE_PCT.captures(remainder) {
        info.fade = caps["fade"].parse().ok();
        info.percent = caps["pct"].parse().ok();
    } else if let Some(caps) = TEXT_LABEL_FADE.captures(remainder) {
        info.label = Some(caps["label"].to_owned());
        info.fade = caps["fade"].parse().ok();
    } else if let Some(caps) = TEXT_FADE.captures(remainder) {
        info.fade = caps["fade"].parse().ok();
    } else {
        info.label = Some(remainder.to_owned());
    }

    CueTextOutcome::Info(info)
}
