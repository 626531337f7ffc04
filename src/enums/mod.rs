use std::fmt;
use std::sync::LazyLock;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Active/pending text, full form: label, fade, percent
pub static TEXT_LABEL_FADE_PCT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?<label>.*\S)\s+(?<fade>\d+(?:\.\d+)?)\s+(?<pct>\d+)%$").expect("unable to compile pattern")
});

/// Active/pending text without a label: fade, percent
pub static TEXT_FADE_PCT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?<fade>\d+(?:\.\d+)?)\s+(?<pct>\d+)%$").expect("unable to compile pattern")
});

/// Pending text, full form: label, fade
pub static TEXT_LABEL_FADE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?<label>.*\S)\s+(?<fade>\d+(?:\.\d+)?)$").expect("unable to compile pattern")
});

/// Pending text without a label: fade alone
pub static TEXT_FADE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?<fade>\d+(?:\.\d+)?)$").expect("unable to compile pattern")
});

/// Auxiliary cue facets the console emits on the same address family;
/// never the primary cue payload
pub const SUPPRESSED_FACETS: [&str; 4] = ["/fx/", "/actions/", "/links/", "/curves/"];

/// Cue color meaning "no color"
pub const DEFAULT_CUE_COLOR: &str = "#ffffff";

/// Show name used for data migrated from a pre-show data root
pub const DEFAULT_SHOW: &str = "Default";

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
/// Wire-level error type for crate
pub enum Error {
    /// Packet / buffer errors
    Packet(PacketError),
    /// OSC type errors
    Osc(OscError),
    /// Eos dialect errors
    Eos(EosError),
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
/// Packet (buffer) errors
pub enum PacketError {
    /// buffer is not 4-byte aligned
    NotFourByte,
    /// buffer does not end with 1 or more nulls
    UnterminatedString,
    /// buffer not large enough for operation
    Underrun,
    /// invalid message framing
    InvalidMessage,
    /// argument list shorter than its type list
    InvalidTypesForMessage,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
/// OSC type conversion errors
pub enum OscError {
    /// String from bytes failed
    ConvertFromString,
    /// Unknown OSC type tag
    UnknownType,
    /// Invalid type conversion (type -> primitive)
    InvalidTypeConversion,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
/// Eos dialect errors
pub enum EosError {
    /// Address family is not one we track
    UnimplementedPacket,
    /// Address matched but payload was missing or unparseable
    MalformedPacket,
    /// Negative cue list numbers are reserved system lists
    SystemList,
    /// Auxiliary facet of a cue address (fx, actions, links, curves)
    SuppressedFacet,
}

// MARK: Error->String
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for Error {}

/// Surfaced error type: persistence, transport lifecycle, and command failures
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// disk i/o failed
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    /// persisted file did not parse
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
    /// send or request attempted with no console connection
    #[error("not connected to a console")]
    NotConnected,
    /// the service task is gone
    #[error("service is no longer running")]
    ServiceGone,
    /// wire-level decode/encode failure
    #[error("wire error: {0}")]
    Wire(#[from] Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Transport selection
pub enum Protocol {
    /// one OSC message per datagram
    Udp,
    /// one shared connection, SLIP framed
    Tcp,
}

impl Default for Protocol {
    fn default() -> Self { Self::Udp }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Runtime playback state of a cue, per list
pub enum LastSeen {
    /// currently executing
    Active,
    /// will fire next
    Pending,
}
