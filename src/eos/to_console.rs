use crate::osc::{Buffer, Message};

/// Requests to the console. Each renders to one or more encoded
/// buffers ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConsoleRequest {
    /// console software version
    Version,
    /// register for push updates
    Subscribe,
    /// number of cue lists
    CueListCount,
    /// cue list at a discovery index
    CueListIndex(usize),
    /// cue count for a list
    CueCount(i32),
    /// cue at an index within a list
    CueIndex(i32, usize),
    /// cue by displayed number
    Cue(i32, String),
    /// active cue of a list
    ActiveCue(i32),
    /// pending cue of a list
    PendingCue(i32),
    /// fader 0 binding, to find the main playback list
    FaderConfig,
    /// the three-message fallback when a count request went unanswered
    CountFallback(i32),
}

impl ConsoleRequest {
    /// Everything sent immediately after the transport reports ready
    #[must_use]
    pub fn connect_sequence() -> Vec<Buffer> {
        let mut buffers: Vec<Buffer> = vec![];

        buffers.extend(Self::Subscribe);
        buffers.extend(Self::Version);
        buffers.extend(Self::FaderConfig);
        buffers.extend(Self::CueListCount);
        buffers
    }

    /// Encode a message, swallowing the (impossible) failure for
    /// addresses we build ourselves
    fn encoded(msg: Message) -> Buffer {
        msg.try_into().unwrap_or_default()
    }
}

impl IntoIterator for ConsoleRequest {
    type Item = Buffer;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        <Self as Into<Vec<Buffer>>>::into(self).into_iter()
    }
}

impl From<ConsoleRequest> for Vec<Buffer> {
    fn from(value: ConsoleRequest) -> Self {
        match value {
            ConsoleRequest::Version => vec![
                ConsoleRequest::encoded(Message::new("/eos/get/version"))
            ],
            ConsoleRequest::Subscribe => vec![
                ConsoleRequest::encoded(Message::new_with_int("/eos/subscribe", 1))
            ],
            ConsoleRequest::CueListCount => vec![
                ConsoleRequest::encoded(Message::new("/eos/get/cuelist/count"))
            ],
            ConsoleRequest::CueListIndex(i) => vec![
                ConsoleRequest::encoded(Message::new(&format!("/eos/get/cuelist/index/{i}")))
            ],
            ConsoleRequest::CueCount(list) => vec![
                ConsoleRequest::encoded(Message::new(&format!("/eos/get/cue/{list}/count")))
            ],
            ConsoleRequest::CueIndex(list, i) => vec![
                ConsoleRequest::encoded(Message::new(&format!("/eos/get/cue/{list}/index/{i}")))
            ],
            ConsoleRequest::Cue(list, number) => vec![
                ConsoleRequest::encoded(Message::new(&format!("/eos/get/cue/{list}/{number}")))
            ],
            ConsoleRequest::ActiveCue(list) => vec![
                ConsoleRequest::encoded(Message::new(&format!("/eos/get/cue/{list}/active")))
            ],
            ConsoleRequest::PendingCue(list) => vec![
                ConsoleRequest::encoded(Message::new(&format!("/eos/get/cue/{list}/pending")))
            ],
            ConsoleRequest::FaderConfig => vec![
                ConsoleRequest::encoded(Message::new("/eos/get/fader/0/config"))
            ],
            ConsoleRequest::CountFallback(list) => vec![
                ConsoleRequest::encoded(Message::new(&format!("/eos/get/cue/{list}/0/1000"))),
                ConsoleRequest::encoded(Message::new(&format!("/eos/get/cue/{list}/1"))),
                ConsoleRequest::encoded(Message::new(&format!("/eos/get/cuelist/{list}/cue/*/list"))),
            ],
        }
    }
}
