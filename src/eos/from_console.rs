use crate::enums::{EosError, Error, SUPPRESSED_FACETS};
use crate::eos::records::CueUpdate;
use crate::osc::{Buffer, Message, Type};

/// Events decoded from the console. The address family is asymmetric:
/// the same `/eos/out/get/...` space carries discovery listings, counts
/// and cue payloads, so everything routes through here exactly once.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleEvent {
    /// show file name
    ShowName(String),
    /// console software version
    Version(String),
    /// number of cue lists
    CueListCount(usize),
    /// a cue list exists
    CueListDiscovered(i32),
    /// cue count for one list
    CueCount {
        /// cue list
        list: i32,
        /// reported size
        count: usize,
    },
    /// one cue payload
    CueData(CueUpdate),
    /// a list changed on the console
    CueNotify {
        /// cue list
        list: i32,
        /// cue number the console flagged, when parseable
        cue_number: Option<String>,
        /// new list size from the address
        count: usize,
    },
    /// active cue as display text
    ActiveCueText {
        /// list from the address, when present
        list: Option<i32>,
        /// raw text payload
        text: String,
    },
    /// pending cue as display text
    PendingCueText {
        /// list from the address, when present
        list: Option<i32>,
        /// raw text payload
        text: String,
    },
    /// active cue for one list
    ActiveCue {
        /// cue list
        list: i32,
        /// displayed cue number
        number: String,
    },
    /// pending cue for one list
    PendingCue {
        /// cue list
        list: i32,
        /// displayed cue number
        number: String,
    },
    /// fader binding report
    FaderConfig {
        /// fader index
        index: i32,
        /// target type; 1 = cuelist
        fader_type: i32,
        /// bound target number
        target_id: i32,
        /// fader label
        label: String,
    },
}

impl TryFrom<Buffer> for ConsoleEvent {
    type Error = Error;

    fn try_from(value: Buffer) -> Result<Self, Self::Error> {
        let msg: Message = value.try_into()?;
        msg.try_into()
    }
}

/// Parse a cue list number; negative lists are reserved system lists
fn parse_list(s: &str) -> Result<i32, Error> {
    let list = s.parse::<i32>().map_err(|_| Error::Eos(EosError::MalformedPacket))?;
    if list < 0 {
        Err(Error::Eos(EosError::SystemList))
    } else {
        Ok(list)
    }
}

/// Parse an index or count path segment
fn parse_size(s: &str) -> Result<usize, Error> {
    s.parse::<usize>().map_err(|_| Error::Eos(EosError::MalformedPacket))
}

impl TryFrom<Message> for ConsoleEvent {
    type Error = Error;

    #[expect(clippy::too_many_lines)]
    fn try_from(msg: Message) -> Result<Self, Self::Error> {
        if SUPPRESSED_FACETS.iter().any(|facet| msg.address.contains(facet)) {
            return Err(Error::Eos(EosError::SuppressedFacet));
        }

        let address = msg.address.strip_prefix('/').unwrap_or(&msg.address);
        let parts: Vec<&str> = address.split('/').collect();

        match parts.as_slice() {
            ["eos", "out", "show", "name"] =>
                Ok(Self::ShowName(msg.first_default(String::new()))),

            ["eos", "out", "get", "version"] =>
                Ok(Self::Version(msg.first_default(String::new()))),

            ["eos", "out", "get", "cuelist", "count"] => {
                let count = msg.args.first()
                    .and_then(Type::as_integer)
                    .ok_or(Error::Eos(EosError::MalformedPacket))?;
                usize::try_from(count)
                    .map(Self::CueListCount)
                    .map_err(|_| Error::Eos(EosError::MalformedPacket))
            },

            // cue list discovery listing
            ["eos", "out", "get", "cuelist", list, "list", _, _] =>
                Ok(Self::CueListDiscovered(parse_list(list)?)),

            ["eos", "out", "get", "cue", list, "count"] => {
                let list = parse_list(list)?;
                let count = msg.args.first()
                    .and_then(Type::as_integer)
                    .and_then(|v| usize::try_from(v).ok())
                    .ok_or(Error::Eos(EosError::MalformedPacket))?;
                Ok(Self::CueCount { list, count })
            },

            // cue payload, short address family
            ["eos", "out", "get", "cue", list, number, part, "list", index, count] => {
                let list = parse_list(list)?;
                let part = parse_size(part)?;
                Ok(Self::CueData(CueUpdate::from_args(
                    list,
                    (*number).to_owned(),
                    u32::try_from(part).map_err(|_| Error::Eos(EosError::MalformedPacket))?,
                    parse_size(index)?,
                    parse_size(count)?,
                    &msg.args,
                )))
            },

            // cue payload, cuelist-qualified address family
            ["eos", "out", "get", "cuelist", list, "cue", number, part, "list", index, count] => {
                let list = parse_list(list)?;
                let part = parse_size(part)?;
                Ok(Self::CueData(CueUpdate::from_args(
                    list,
                    (*number).to_owned(),
                    u32::try_from(part).map_err(|_| Error::Eos(EosError::MalformedPacket))?,
                    parse_size(index)?,
                    parse_size(count)?,
                    &msg.args,
                )))
            },

            ["eos", "out", "notify", "cue", list, "list", _, count] => {
                let list = parse_list(list)?;
                let cue_number = msg.args.first().and_then(|arg| match arg {
                    Type::String(v) => Some(v.clone()),
                    other => other.as_integer().map(|v| v.to_string()),
                });
                Ok(Self::CueNotify { list, cue_number, count: parse_size(count)? })
            },

            ["eos", "out", "active", "cue", "text"] =>
                Ok(Self::ActiveCueText { list: None, text: msg.first_default(String::new()) }),

            ["eos", "out", "active", "cue", list, "text"] =>
                Ok(Self::ActiveCueText { list: Some(parse_list(list)?), text: msg.first_default(String::new()) }),

            ["eos", "out", "pending", "cue", "text"] =>
                Ok(Self::PendingCueText { list: None, text: msg.first_default(String::new()) }),

            ["eos", "out", "pending", "cue", list, "text"] =>
                Ok(Self::PendingCueText { list: Some(parse_list(list)?), text: msg.first_default(String::new()) }),

            ["eos", "out", "active", "cue", list, number, ..] =>
                Ok(Self::ActiveCue { list: parse_list(list)?, number: (*number).to_owned() }),

            ["eos", "out", "pending", "cue", list, number, ..] =>
                Ok(Self::PendingCue { list: parse_list(list)?, number: (*number).to_owned() }),

            ["eos", "out", "get", "fader", _, "config", ..] => {
                /// i32 argument at a position, or a malformed-packet error
                fn int_at(args: &[Type], idx: usize) -> Result<i32, Error> {
                    args.get(idx)
                        .and_then(Type::as_integer)
                        .and_then(|v| i32::try_from(v).ok())
                        .ok_or(Error::Eos(EosError::MalformedPacket))
                }

                Ok(Self::FaderConfig {
                    index: int_at(&msg.args, 0)?,
                    fader_type: int_at(&msg.args, 1)?,
                    target_id: int_at(&msg.args, 2)?,
                    label: msg.args.get(3).and_then(Type::as_str).unwrap_or_default().to_owned(),
                })
            },

            _ => Err(Error::Eos(EosError::UnimplementedPacket)),
        }
    }
}
