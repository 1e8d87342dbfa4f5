//! Stdout event writer, stdin command reader and the two `UiBridge` front
//! ends (JSON lines for a GUI shell, plain text for the console).

use std::io::{self, BufRead, Write};

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use super::{UiBridge, UiCommand, UiEvent};

/// Write one event as a single JSON line.
pub fn write_event(out: &mut impl Write, event: &UiEvent) -> io::Result<()> {
    let line = serde_json::to_string(event)?;
    writeln!(out, "{}", line)?;
    out.flush()
}

/// Send an event to the front end on stdout.
pub fn emit_event(event: &UiEvent) {
    if let Err(e) = write_event(&mut io::stdout().lock(), event) {
        // The front end has gone away; the reader will notice stdin closing.
        debug!("Event not delivered: {}", e);
    }
}

pub fn emit_error(message: &str) {
    emit_event(&UiEvent::Error {
        message: message.to_string(),
    });
}

/// Front end attached over stdin/stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonLineBridge;

impl UiBridge for JsonLineBridge {
    fn emit(&self, event: UiEvent) {
        emit_event(&event);
    }
}

/// Front end for one-shot CLI use: prints what the user should see.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleBridge;

impl UiBridge for ConsoleBridge {
    fn emit(&self, event: UiEvent) {
        match event {
            UiEvent::Speak { text } => println!("{}", text),
            UiEvent::Error { message } => eprintln!("error: {}", message),
            UiEvent::Listening {} => eprintln!("(listening)"),
            // Speech already printed the text.
            _ => {}
        }
    }
}

/// Decode one line from the front end.
///
/// Lines tagged with `type` instead of `command` are accepted too.
pub fn parse_command(line: &str) -> Result<UiCommand, serde_json::Error> {
    let mut value: Value = serde_json::from_str(line.trim())?;
    if let Value::Object(fields) = &mut value {
        if !fields.contains_key("command") {
            if let Some(kind) = fields.remove("type") {
                fields.insert("command".into(), kind);
            }
        }
    }
    serde_json::from_value(value)
}

/// Decode every line of `input` into `tx` until input ends or the receiver
/// is dropped. Undecodable lines go to `reject` and are skipped.
fn forward_commands(
    input: impl BufRead,
    tx: &mpsc::UnboundedSender<UiCommand>,
    reject: impl Fn(&str),
) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("stdin read error: {}", e);
                return;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match parse_command(&line) {
            Ok(command) => {
                debug!(?command, "UI command");
                if tx.send(command).is_err() {
                    return;
                }
            }
            Err(e) => {
                warn!(input = line.trim(), "Rejected UI command: {}", e);
                reject(&format!("Invalid JSON command: {}", e));
            }
        }
    }
}

/// Read commands from stdin on a dedicated thread. The channel closes when
/// stdin does.
pub fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<UiCommand> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        forward_commands(io::stdin().lock(), &tx, emit_error);
        debug!("stdin closed");
    });
    rx
}
