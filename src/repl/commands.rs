//! Slash command handlers for the REPL
//!
//! Handles /help, /personas, /history, /back, /uptime, etc. Deliberately no
//! /clear: conversations live for the whole process and are dropped only on
//! restart.

use std::time::{Duration, Instant};

use crate::personas::PersonaRegistry;
use crate::session::Session;

use super::colors;

/// What the REPL loop should do after a command
#[derive(Debug, PartialEq, Eq)]
pub enum CommandAction {
    Stay,
    GoHome,
    Quit,
}

/// Command handler with access to REPL state
pub struct CommandHandler<'a> {
    pub session: &'a Session,
    pub registry: &'a PersonaRegistry,
    pub start_time: Instant,
}

impl<'a> CommandHandler<'a> {
    pub fn handle(&mut self, cmd: &str) -> CommandAction {
        let command = cmd.split_whitespace().next().unwrap_or(cmd);

        match command {
            "/version" => {
                println!("hearth-chat v{}", env!("CARGO_PKG_VERSION"));
            }
            "/uptime" => {
                let elapsed = self.start_time.elapsed();
                println!("Uptime: {}", format_duration(elapsed));
            }
            "/help" => {
                println!("Commands:");
                println!("  /help       - Show this help");
                println!("  /version    - Show version info");
                println!("  /uptime     - Show session uptime");
                println!("  /personas   - List available advisors");
                println!("  /history    - Reprint the current conversation");
                println!("  /back       - Return to the advisor list");
                println!("  /quit       - Exit");
            }
            "/personas" => {
                self.cmd_personas();
            }
            "/history" => {
                self.cmd_history();
            }
            "/back" => {
                if self.session.active_persona().is_some() {
                    return CommandAction::GoHome;
                }
                println!("Already at the advisor list.");
            }
            "/quit" | "/exit" => {
                return CommandAction::Quit;
            }
            _ => {
                println!("Unknown command: {}. Try /help", command);
            }
        }
        CommandAction::Stay
    }

    /// /personas - list advisors with their turn counts
    fn cmd_personas(&self) {
        for persona in self.registry.iter() {
            let turns = self
                .session
                .store
                .peek(&persona.id)
                .map(|c| c.len())
                .unwrap_or(0);
            println!(
                "  {} {} — {} ({} turns)",
                colors::persona_name(&persona.theme, &persona.name),
                colors::role_badge(&persona.role),
                persona.title,
                turns
            );
        }
    }

    /// /history - reprint the active conversation
    fn cmd_history(&self) {
        let Some(id) = self.session.active_persona() else {
            println!("No active conversation. Pick an advisor first.");
            return;
        };
        let persona = match self.registry.get(id) {
            Ok(p) => p,
            Err(e) => {
                println!("{}", colors::error(&e.to_string()));
                return;
            }
        };
        match self.session.store.peek(id) {
            Some(conversation) if !conversation.is_empty() => {
                for turn in conversation.turns() {
                    super::print_turn(persona, turn);
                }
            }
            _ => println!("{}", colors::status("(no messages yet)")),
        }
    }
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs >= 3600 {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}s", secs)
    }
}
