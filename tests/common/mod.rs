//! Shared builders for the integration suites.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use cuemirror::engine::Engine;
use cuemirror::eos::ConsoleEvent;
use cuemirror::osc::{Buffer, Message, Type};
use cuemirror::show::files::ShowFiles;

/// Engine backed by a throwaway data directory
pub fn engine_in(dir: &tempfile::TempDir) -> Engine {
    Engine::new(ShowFiles::new(PathBuf::from(dir.path())))
}

/// A fixed origin plus an offset, for deterministic protocol time
pub fn at(t0: Instant, millis: u64) -> Instant {
    t0 + Duration::from_millis(millis)
}

/// Decode queued outbound buffers back into their addresses
pub fn addresses(outbox: Vec<Buffer>) -> Vec<String> {
    outbox.into_iter()
        .map(|b| Message::try_from(b).expect("outbound message decodes").address)
        .collect()
}

/// The full cue argument vector the console sends, with the fields
/// tests care about injectable
#[derive(Clone)]
pub struct CueArgs {
    pub uid: &'static str,
    pub label: &'static str,
    pub up_ms: i32,
    pub down_ms: i32,
    pub follow_ms: i32,
    pub scene: &'static str,
    pub scene_end: bool,
    pub part_count: i32,
}

impl Default for CueArgs {
    fn default() -> Self {
        Self {
            uid: "1CFF2EAD",
            label: "",
            up_ms: 5000,
            down_ms: 5000,
            follow_ms: -1,
            scene: "",
            scene_end: false,
            part_count: 0,
        }
    }
}

impl CueArgs {
    pub fn to_args(&self, index: usize) -> Vec<Type> {
        let mut args = vec![
            Type::Integer(i32::try_from(index).expect("index fits")),
            Type::String(self.uid.to_owned()),
            Type::String(self.label.to_owned()),
            Type::Integer(self.up_ms),  // up duration
            Type::Integer(0),           // up delay
            Type::Integer(self.down_ms),
            Type::Integer(0),
            Type::Integer(-1),          // focus pair
            Type::Integer(-1),
            Type::Integer(-1),          // color pair
            Type::Integer(-1),
            Type::Integer(-1),          // beam pair
            Type::Integer(-1),
        ];
        args.extend([Type::Integer(0), Type::Integer(0), Type::Integer(0)]); // 13..16
        args.extend([
            Type::String(String::new()), // mark
            Type::String(String::new()), // block
            Type::String(String::new()), // assert
            Type::Integer(0),            // 19
            Type::Integer(self.follow_ms),
            Type::Integer(-1),           // hang
        ]);
        args.extend([Type::Integer(0), Type::Integer(0), Type::Integer(0), Type::Integer(0)]); // 22..26
        args.push(Type::Integer(self.part_count));
        args.push(Type::Integer(0)); // 27
        args.push(Type::String(self.scene.to_owned()));
        args.push(Type::Boolean(self.scene_end));
        args
    }
}

/// A cue payload event as the console would send it
pub fn cue_data(list: i32, number: &str, part: u32, index: usize, count: usize, args: &CueArgs) -> ConsoleEvent {
    let mut msg = Message::new(&format!("/eos/out/get/cue/{list}/{number}/{part}/list/{index}/{count}"));
    msg.args = args.to_args(index);
    ConsoleEvent::try_from(msg).expect("cue payload decodes")
}
