#![doc = include_str!("../README.md")]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
#![warn(clippy::allow_attributes)]
#![warn(clippy::default_trait_access)]
#![warn(clippy::derive_partial_eq_without_eq)]
#![warn(clippy::equatable_if_let)]
#![warn(clippy::from_iter_instead_of_collect)]
#![warn(clippy::if_not_else)]
#![warn(clippy::if_then_some_else_none)]
#![warn(clippy::implicit_clone)]
#![warn(clippy::inefficient_to_string)]
#![warn(clippy::manual_is_variant_and)]
#![warn(clippy::manual_let_else)]
#![warn(clippy::manual_ok_or)]
#![warn(clippy::map_unwrap_or)]
#![warn(clippy::missing_docs_in_private_items)]
#![warn(clippy::needless_collect)]
#![warn(clippy::needless_pass_by_ref_mut)]
#![warn(clippy::option_if_let_else)]
#![warn(clippy::or_fun_call)]
#![warn(clippy::partial_pub_fields)]
#![warn(clippy::redundant_type_annotations)]
#![warn(clippy::renamed_function_params)]
#![warn(clippy::return_self_not_must_use)]
#![warn(clippy::str_to_string)]
#![warn(clippy::string_to_string)]
#![warn(clippy::suspicious_operation_groupings)]
#![warn(clippy::unseparated_literal_suffix)]
#![warn(clippy::unwrap_in_result)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::use_self)]

/// Shared enums, errors, and compiled patterns
pub mod enums;
/// Low-level OSC message handling
pub mod osc;
/// UDP / SLIP-over-TCP transports
pub mod transport;
/// Eos dialect: typed events in, requests out
pub mod eos;
/// Cue records and the merge store
pub mod store;
/// Show persistence: directories, files, settings
pub mod show;
/// The serialized protocol engine
pub mod engine;
/// Tokio service loop and command handle
pub mod service;

pub use enums::{CoreError, LastSeen, Protocol};
pub use engine::Engine;
pub use eos::ConsoleEvent;
pub use eos::ConsoleRequest;
pub use osc::Buffer as OscBuffer;
pub use osc::Message as OscMessage;
pub use service::{Handle, Service};
pub use show::settings::OscSettings;
pub use store::{Cue, CueKey, CueStore};
