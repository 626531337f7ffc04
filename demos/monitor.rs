use std::time::Duration;

use cuemirror::{LastSeen, OscSettings, Protocol, Service};

#[tokio::main]
async fn main() -> Result<(), cuemirror::CoreError> {
    tracing_subscriber::fmt().with_env_filter(
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "cuemirror=info".into()),
    ).init();

    let handle = Service::spawn(None)?;

    // Eos consoles default to 8000/8001 for UDP and 3032 for TCP.
    handle.connect(OscSettings {
        ip_address: "192.168.1.10".into(),
        port: 3032,
        osc_version: "1.1".into(),
        protocol: Protocol::Tcp,
    }).await?;

    handle.refresh(1).await?;

    // Print main-list active cue transitions once a second.
    let mut last = String::new();
    loop {
        tokio::time::sleep(Duration::from_secs(1)).await;

        let line = handle.with_engine(|engine| {
            let main = engine.settings().main_list()?;
            let cue = engine.cues().seen_in_list(main, LastSeen::Active)?;
            Some(format!("list {} cue {} :: {}", cue.cue_list, cue.cue_number, cue.label))
        }).await;

        if let Some(line) = line {
            if line != last {
                println!("{line}");
                last = line;
            }
        }
    }
}
