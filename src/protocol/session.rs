//! Line-delimited JSON session loop.
//!
//! Each stdin line is one `SessionMessage`. A turn request is answered with
//! exactly one reply line on stdout; everything else is acknowledged through
//! the log only. Malformed input gets an error line and the loop carries on.

use std::io::{self, BufRead, Write};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::engines::engine_trait::Engine;
use crate::game_state::maze_types::PlayerId;
use crate::protocol::turn_payload::{MoveMessage, TurnPayload};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionMessage {
    NewGame,
    AwaitMove(TurnPayload),
    Accept {
        accept: bool,
        #[serde(default)]
        error: Option<String>,
    },
    Win {
        winner: PlayerId,
    },
    Disconnect {
        #[serde(default)]
        reason: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionReply {
    Move(MoveMessage),
    Error { message: String },
}

pub fn run_stdio_loop(engine: Box<dyn Engine>) -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut session = SessionState::new(engine);

    for line in stdin.lock().lines() {
        let line = line?;
        let should_quit = session.handle_line(&line, &mut stdout)?;
        stdout.flush()?;
        if should_quit {
            break;
        }
    }

    Ok(())
}

pub struct SessionState {
    engine: Box<dyn Engine>,
    turns_played: u32,
}

impl SessionState {
    pub fn new(engine: Box<dyn Engine>) -> Self {
        Self {
            engine,
            turns_played: 0,
        }
    }

    pub fn turns_played(&self) -> u32 {
        self.turns_played
    }

    /// Handle one input line. Returns `true` once the game is over.
    pub fn handle_line(&mut self, line: &str, out: &mut impl Write) -> io::Result<bool> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(false);
        }

        let message: SessionMessage = match serde_json::from_str(trimmed) {
            Ok(message) => message,
            Err(err) => {
                warn!("unreadable session line: {err}");
                write_reply(out, &SessionReply::Error {
                    message: format!("unreadable message: {err}"),
                })?;
                return Ok(false);
            }
        };

        match message {
            SessionMessage::NewGame => {
                info!("new game, engine {}", self.engine.name());
                self.engine.new_game();
                self.turns_played = 0;
            }
            SessionMessage::AwaitMove(payload) => {
                let reply = match self.play_turn(&payload) {
                    Ok(message) => SessionReply::Move(message),
                    Err(message) => {
                        warn!("turn {} failed: {message}", self.turns_played + 1);
                        SessionReply::Error { message }
                    }
                };
                write_reply(out, &reply)?;
            }
            SessionMessage::Accept { accept, error } => {
                if accept {
                    debug!("move accepted");
                } else {
                    warn!(
                        "move rejected: {}",
                        error.as_deref().unwrap_or("no reason given")
                    );
                }
            }
            SessionMessage::Win { winner } => {
                info!("game over after {} turns, winner {winner}", self.turns_played);
                return Ok(true);
            }
            SessionMessage::Disconnect { reason } => {
                info!(
                    "disconnected: {}",
                    reason.as_deref().unwrap_or("no reason given")
                );
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn play_turn(&mut self, payload: &TurnPayload) -> Result<MoveMessage, String> {
        let board = payload.to_board_state().map_err(|e| e.to_string())?;
        let output = self.engine.choose_move(&board)?;
        for line in &output.info_lines {
            debug!("{line}");
        }
        let action = output
            .action
            .ok_or_else(|| format!("{} produced no action", self.engine.name()))?;
        self.turns_played += 1;
        Ok(MoveMessage::from_action(&action, &payload.board.shift_card))
    }
}

fn write_reply(out: &mut impl Write, reply: &SessionReply) -> io::Result<()> {
    let json = serde_json::to_string(reply).map_err(io::Error::other)?;
    writeln!(out, "{json}")
}
