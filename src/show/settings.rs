//! Global settings: transport parameters, last-used show, main
//! playback list. Persisted as `global_settings.json` at the data
//! root.

use serde::{Deserialize, Serialize};

use crate::enums::{DEFAULT_SHOW, Protocol};

/// Console connection parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OscSettings {
    /// console address
    pub ip_address: String,
    /// console port (also the local listening port for UDP)
    pub port: u16,
    /// OSC dialect version tag, informational
    pub osc_version: String,
    /// datagrams or SLIP stream
    #[serde(default)]
    pub protocol: Protocol,
}

impl Default for OscSettings {
    fn default() -> Self {
        Self {
            ip_address: "127.0.0.1".to_owned(),
            port: 8000,
            osc_version: "1.1".to_owned(),
            protocol: Protocol::Udp,
        }
    }
}

/// The global settings file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GlobalSettings {
    /// show loaded on startup
    pub last_show_name: String,
    /// cue list bound to fader 0, as the console reports it
    pub main_playback_list: String,
    /// transport parameters
    pub osc_settings: OscSettings,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            last_show_name: DEFAULT_SHOW.to_owned(),
            main_playback_list: "1".to_owned(),
            osc_settings: OscSettings::default(),
        }
    }
}

impl GlobalSettings {
    /// Main playback list as a number, when it parses
    #[must_use]
    pub fn main_list(&self) -> Option<i32> {
        self.main_playback_list.parse().ok()
    }
}
