//! Interactive REPL for hearth-chat
//!
//! Two screens over one session: the advisor list (Home) and the chat thread
//! (Chat). Submitting a message echoes it immediately, then blocks on the
//! completion call and prints the reply, the terminal version of the
//! two-phase re-render.

pub mod colors;
mod commands;
mod helper;

use anyhow::Result;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use std::sync::Arc;
use std::time::Instant;

use crate::chat;
use crate::conversation::{Role, Turn};
use crate::personas::{Persona, PersonaRegistry};
use crate::provider::CompletionProvider;
use crate::session::Session;

use commands::{CommandAction, CommandHandler};
use helper::HearthHelper;

/// REPL state
pub struct Repl {
    /// Readline editor with history and completion
    editor: Editor<HearthHelper, DefaultHistory>,
    registry: Arc<PersonaRegistry>,
    provider: Arc<dyn CompletionProvider>,
    /// The per-run session: router state + conversations
    session: Session,
    /// History file path
    history_path: std::path::PathBuf,
    /// When this REPL instance started (used for /uptime)
    start_time: Instant,
}

impl Repl {
    pub fn new(registry: Arc<PersonaRegistry>, provider: Arc<dyn CompletionProvider>) -> Result<Self> {
        let mut editor = Editor::new()?;
        editor.set_helper(Some(HearthHelper::new()));

        let history_path = crate::config::hearth_dir().join("chat_history");

        Ok(Self {
            editor,
            registry,
            provider,
            session: Session::new(),
            history_path,
            start_time: Instant::now(),
        })
    }

    /// Load command history
    fn load_history(&mut self) {
        if self.history_path.exists() {
            let _ = self.editor.load_history(&self.history_path);
        }
    }

    /// Save command history
    fn save_history(&mut self) {
        if let Some(parent) = self.history_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let _ = self.editor.save_history(&self.history_path);
    }

    /// Run the REPL loop
    pub async fn run(&mut self) -> Result<()> {
        self.load_history();

        println!("Type a number or id to pick an advisor (Ctrl+D to exit, /help for commands)");
        println!();
        self.render_home();

        loop {
            let prompt = if self.session.active_persona().is_some() {
                colors::prompt()
            } else {
                colors::select_prompt()
            };

            let line = match self.editor.readline(&prompt) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Goodbye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            };

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            self.editor.add_history_entry(&line)?;

            // Handle slash commands
            if trimmed.starts_with('/') {
                let mut handler = CommandHandler {
                    session: &self.session,
                    registry: self.registry.as_ref(),
                    start_time: self.start_time,
                };
                match handler.handle(trimmed) {
                    CommandAction::Stay => {}
                    CommandAction::GoHome => {
                        self.session.back();
                        println!();
                        self.render_home();
                    }
                    CommandAction::Quit => {
                        println!("Goodbye!");
                        break;
                    }
                }
                continue;
            }

            match self.session.active_persona() {
                None => self.handle_selection(trimmed),
                Some(_) => self.handle_message(trimmed).await,
            }
        }

        self.save_history();
        Ok(())
    }

    /// Render the advisor selection screen
    fn render_home(&self) {
        println!("{}", colors::header("Who would you like to talk to today?"));
        println!("{}", colors::separator(50));
        for (i, persona) in self.registry.iter().enumerate() {
            println!(
                " {}. {} {} — {}",
                i + 1,
                colors::persona_name(&persona.theme, &persona.name),
                colors::role_badge(&persona.role),
                persona.title
            );
            if !persona.tagline.is_empty() {
                println!("    {}", colors::tagline(&persona.tagline));
            }
        }
        println!("{}", colors::separator(50));
    }

    /// Home screen input: a number or persona id selects an advisor
    fn handle_selection(&mut self, input: &str) {
        let id = match input.parse::<usize>() {
            Ok(n) if n >= 1 && n <= self.registry.len() => {
                self.registry.iter().nth(n - 1).map(|p| p.id.clone())
            }
            _ => self
                .registry
                .iter()
                .find(|p| p.id.eq_ignore_ascii_case(input))
                .map(|p| p.id.clone()),
        };

        let Some(id) = id else {
            println!(
                "{}",
                colors::warning("No advisor by that name. Type a number from the list or an id.")
            );
            return;
        };

        match self.session.select(&self.registry, &id) {
            Ok(persona) => {
                let persona = persona.clone();
                self.render_chat_entry(&persona);
            }
            Err(e) => println!("{}", colors::error(&e.to_string())),
        }
    }

    /// Header, history, and one-time greeting when a chat is (re)entered
    fn render_chat_entry(&self, persona: &Persona) {
        println!();
        println!(
            "{} {} {}",
            colors::separator(15),
            colors::persona_name(&persona.theme, &persona.name),
            colors::role_badge(&persona.role)
        );

        if let Some(conversation) = self.session.store.peek(&persona.id) {
            for turn in conversation.turns() {
                print_turn(persona, turn);
            }
        }

        // Welcome line, shown only while the thread is empty. Never stored,
        // so it is never sent to the gateway as context.
        if let Some(greeting) = chat::greeting_for(persona, &self.session.store) {
            print_bubble(persona, greeting);
        }
        println!("{}", colors::status("(/back for the advisor list)"));
    }

    /// Chat screen input: the two-phase submit
    async fn handle_message(&mut self, text: &str) {
        let Some(id) = self.session.active_persona().map(String::from) else {
            return;
        };
        let persona = match self.registry.get(&id) {
            Ok(p) => p.clone(),
            Err(e) => {
                println!("{}", colors::error(&e.to_string()));
                return;
            }
        };

        // Phase one: echo the user's message before any network traffic
        let turn = chat::submit_user(&mut self.session.store, &id, text);
        print_turn(&persona, &turn);

        // Phase two: blocking completion call, reply or error text appended
        println!("{}", colors::status(&format!("{} is typing…", persona.name)));
        if let Some(reply) =
            chat::resolve_pending(&mut self.session.store, &persona, self.provider.as_ref()).await
        {
            print_turn(&persona, &reply);
        }
    }
}

/// Print one stored turn as a chat bubble
pub(crate) fn print_turn(persona: &Persona, turn: &Turn) {
    match turn.role {
        Role::User => {
            println!("{} {}", colors::header("you ›"), turn.content);
        }
        Role::Assistant => print_bubble(persona, &turn.content),
    }
}

/// Print assistant-side text with the persona's accent
fn print_bubble(persona: &Persona, text: &str) {
    let label = colors::persona_name(&persona.theme, &persona.name);
    let mut lines = text.lines();
    if let Some(first) = lines.next() {
        println!("{} › {}", label, first);
    }
    for line in lines {
        println!("  {}", line);
    }
    println!();
}

/// Entry point for the REPL
pub async fn run(registry: Arc<PersonaRegistry>, provider: Arc<dyn CompletionProvider>) -> Result<()> {
    let mut repl = Repl::new(registry, provider)?;
    repl.run().await
}
