//! UI bridge protocol.
//!
//! Events use `{"event": "<name>", "data": {...}}` format (assistant -> UI).
//! Commands use `{"command": "<name>", ...}` format (UI -> assistant).

pub mod bridge;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Events: assistant -> UI (stdout)
// ---------------------------------------------------------------------------

/// All events emitted to the front end as JSON lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data")]
#[serde(rename_all = "snake_case")]
pub enum UiEvent {
    Starting {},
    Loading { step: String },
    Ready {},
    /// Text the front end may voice with its own synthesizer.
    Speak { text: String },
    DisplayMessage { text: String },
    ShowIdleState {},
    Listening {},
    Error { message: String },
    Pong {},
    Stopping {},
}

// ---------------------------------------------------------------------------
// Commands: UI -> assistant (stdin)
// ---------------------------------------------------------------------------

/// All commands received from the front end as JSON lines.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "command")]
#[serde(rename_all = "snake_case")]
pub enum UiCommand {
    /// Typed command, or voice input when `text` is absent.
    AllCommands {
        #[serde(default)]
        text: Option<String>,
    },
    PlayClickSound {},
    Ping {},
    Stop {},
}

/// Callbacks into the front end.
pub trait UiBridge: Send + Sync {
    fn emit(&self, event: UiEvent);

    fn display_message(&self, text: &str) {
        self.emit(UiEvent::DisplayMessage {
            text: text.to_string(),
        });
    }

    /// Return the UI to its default, idle look.
    fn show_idle_state(&self) {
        self.emit(UiEvent::ShowIdleState {});
    }
}
