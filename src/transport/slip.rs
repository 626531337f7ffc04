//! SLIP framing (RFC 1055) for OSC over a TCP stream

use tracing::warn;

/// frame delimiter
pub const END: u8 = 0xC0;
/// escape introducer
pub const ESC: u8 = 0xDB;
/// escaped END literal
pub const ESC_END: u8 = 0xDC;
/// escaped ESC literal
pub const ESC_ESC: u8 = 0xDD;

/// Encode one message: escape END/ESC literals, terminate with END
#[must_use]
pub fn encode(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 1);
    for byte in payload {
        match *byte {
            END => out.extend([ESC, ESC_END]),
            ESC => out.extend([ESC, ESC_ESC]),
            b => out.push(b),
        }
    }
    out.push(END);
    out
}

/// Incremental SLIP decoder. TCP segments carry partial frames and
/// multiple frames per segment; feed whatever arrived and collect
/// whole messages.
#[derive(Debug, Default)]
pub struct Decoder {
    /// bytes of the frame in progress
    frame: Vec<u8>,
    /// last byte seen was ESC
    escaped: bool,
    /// current frame had a bad escape and will be dropped at END
    poisoned: bool,
}

impl Decoder {
    /// new empty decoder
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Feed received bytes, get back every frame completed by them.
    /// Empty frames between delimiters are skipped; a frame with an
    /// invalid escape is dropped whole.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<Vec<u8>> {
        let mut complete = vec![];

        for byte in bytes {
            match (*byte, self.escaped) {
                (END, false) => {
                    if self.poisoned {
                        warn!(len = self.frame.len(), "dropping frame with invalid SLIP escape");
                    } else if !self.frame.is_empty() {
                        complete.push(std::mem::take(&mut self.frame));
                    }
                    self.frame.clear();
                    self.poisoned = false;
                },
                (ESC, false) => self.escaped = true,
                (b, false) => self.frame.push(b),
                (ESC_END, true) => { self.frame.push(END); self.escaped = false; },
                (ESC_ESC, true) => { self.frame.push(ESC); self.escaped = false; },
                (_, true) => {
                    // RFC 1055 protocol violation
                    self.poisoned = true;
                    self.escaped = false;
                },
            }
        }

        complete
    }
}
