// SPDX-License-Identifier: MIT
//! `statewire events` — a read-only tail of the broadcaster's frame stream
//! (§6 "Event monitor").

use futures_util::StreamExt;
use tokio_tungstenite::tungstenite::Message;

use crate::cli::{EventsArgs, EventsFormat};
use crate::exit_error::ExitError;

pub async fn run(args: EventsArgs) -> Result<(), ExitError> {
    let port = args.port.unwrap_or_else(crate::env::websocket_port);
    let url = format!("ws://127.0.0.1:{port}/ws/events");
    let (ws_stream, _) = tokio_tungstenite::connect_async(url.clone())
        .await
        .map_err(|err| ExitError::unhandled(format!("failed to connect to {url}: {err}")))?;
    let (_sink, mut stream) = ws_stream.split();

    let deadline = args.duration.map(|secs| tokio::time::Instant::now() + std::time::Duration::from_secs(secs));

    loop {
        let next = match deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, stream.next()).await.ok().flatten(),
            None => stream.next().await,
        };
        let Some(message) = next else { break };
        let Ok(Message::Text(text)) = message else { continue };
        let Ok(frame) = serde_json::from_str::<serde_json::Value>(&text) else { continue };

        if let Some(wanted) = &args.machine {
            if frame.get("machine_name").and_then(|v| v.as_str()) != Some(wanted.as_str()) {
                continue;
            }
        }

        print_frame(&frame, args.format);
    }
    Ok(())
}

fn print_frame(frame: &serde_json::Value, format: EventsFormat) {
    match format {
        EventsFormat::Json => println!("{frame}"),
        EventsFormat::Compact => {
            println!(
                "{} {} {}",
                frame.get("type").and_then(|v| v.as_str()).unwrap_or("?"),
                frame.get("machine_name").and_then(|v| v.as_str()).unwrap_or("-"),
                frame.get("payload").cloned().unwrap_or(serde_json::Value::Null),
            );
        }
        EventsFormat::Human => {
            let kind = frame.get("type").and_then(|v| v.as_str()).unwrap_or("unknown");
            let machine = frame.get("machine_name").and_then(|v| v.as_str()).unwrap_or("-");
            let timestamp = frame.get("timestamp").and_then(|v| v.as_f64()).unwrap_or(0.0);
            println!("[{timestamp:.3}] {machine} :: {kind} :: {}", frame.get("payload").cloned().unwrap_or_default());
        }
    }
}
