use crate::osc::Type;

/// One cue payload, decoded from the console's positional argument
/// vector. Everything downstream works from this; nothing else looks
/// at raw argument positions.
///
/// Console argument layout (list index at [0] is redundant with the
/// address and skipped; [13..16], [19], [22..26], [27] are not
/// consumed):
/// - [1] uid, [2] label
/// - [3]/[4] up, [5]/[6] down, [7]/[8] focus, [9]/[10] color,
///   [11]/[12] beam - (duration, delay) pairs in centiseconds,
///   negative = not set
/// - [16] mark, [17] block, [18] assert - strings, empty = unset
/// - [20] follow, [21] hang - centiseconds, -1 = not set
/// - [26] part count, [28] scene name, [29] scene-end flag
#[derive(Debug, Clone, PartialEq)]
pub struct CueUpdate {
    /// cue list the payload belongs to
    pub list: i32,
    /// displayed cue number
    pub number: String,
    /// part number, 0 = main cue
    pub part: u32,
    /// position within the list, from the address
    pub index: usize,
    /// total list size, from the address
    pub count: usize,
    /// console-assigned unique id
    pub uid: Option<String>,
    /// cue label
    pub label: Option<String>,
    /// intensity upfade seconds
    pub up_duration: Option<f64>,
    /// intensity upfade delay seconds
    pub up_delay: Option<f64>,
    /// intensity downfade seconds
    pub down_duration: Option<f64>,
    /// intensity downfade delay seconds
    pub down_delay: Option<f64>,
    /// focus fade seconds
    pub focus_duration: Option<f64>,
    /// focus delay seconds
    pub focus_delay: Option<f64>,
    /// color fade seconds
    pub color_duration: Option<f64>,
    /// color delay seconds
    pub color_delay: Option<f64>,
    /// beam fade seconds
    pub beam_duration: Option<f64>,
    /// beam delay seconds
    pub beam_delay: Option<f64>,
    /// mark flag text, empty = unset
    pub mark: Option<String>,
    /// block flag text, empty = unset
    pub block: Option<String>,
    /// assert flag text, empty = unset
    pub assert_flag: Option<String>,
    /// follow time seconds
    pub follow_time: Option<f64>,
    /// hang time seconds
    pub hang_time: Option<f64>,
    /// number of parts under this cue
    pub part_count: Option<u32>,
    /// scene name carried on the first cue of a scene
    pub scene: Option<String>,
    /// last cue of a scene
    pub scene_end: Option<bool>,
    /// max of the five fade durations
    pub duration: Option<f64>,
}

/// Centiseconds to seconds, 2 decimals; negative means not set
#[expect(clippy::cast_precision_loss)]
fn cents_to_seconds(v: i64) -> Option<f64> {
    if v < 0 { None } else { Some(((v as f64) / 10.0).round() / 100.0) }
}

/// Numeric argument at a position, converted from centiseconds
fn cents_at(args: &[Type], idx: usize) -> Option<f64> {
    args.get(idx).and_then(Type::as_integer).and_then(cents_to_seconds)
}

/// String argument at a position
fn string_at(args: &[Type], idx: usize) -> Option<String> {
    args.get(idx).and_then(Type::as_str).map(str::to_owned)
}

impl CueUpdate {
    /// Decode the argument vector for a cue at (list, number, part),
    /// with its index/count as carried on the address
    #[must_use]
    pub fn from_args(list: i32, number: String, part: u32, index: usize, count: usize, args: &[Type]) -> Self {
        let up_duration = cents_at(args, 3);
        let down_duration = cents_at(args, 5);
        let focus_duration = cents_at(args, 7);
        let color_duration = cents_at(args, 9);
        let beam_duration = cents_at(args, 11);

        let duration = [up_duration, down_duration, focus_duration, color_duration, beam_duration]
            .into_iter()
            .flatten()
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))));

        #[expect(clippy::cast_possible_truncation)]
        #[expect(clippy::cast_sign_loss)]
        let part_count = args.get(26)
            .and_then(Type::as_integer)
            .filter(|v| *v >= 0)
            .map(|v| v as u32);

        Self {
            list,
            number,
            part,
            index,
            count,
            uid: string_at(args, 1),
            label: string_at(args, 2),
            up_duration,
            up_delay: cents_at(args, 4),
            down_duration,
            down_delay: cents_at(args, 6),
            focus_duration,
            focus_delay: cents_at(args, 8),
            color_duration,
            color_delay: cents_at(args, 10),
            beam_duration,
            beam_delay: cents_at(args, 12),
            mark: string_at(args, 16),
            block: string_at(args, 17),
            assert_flag: string_at(args, 18),
            follow_time: cents_at(args, 20),
            hang_time: cents_at(args, 21),
            part_count,
            scene: string_at(args, 28),
            scene_end: args.get(29).and_then(Type::as_flag),
            duration,
        }
    }
}
