pub mod context;
pub mod relay;

use chrono::Local;
use log::{ info, warn };
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::error::Error;
use std::io::{ self, Write };
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error as ThisError;

use crate::cli::ChatArgs;
use crate::history::{ initialize_turn_store, TurnStore };
use crate::models::chat::ChatTurn;
use self::context::build_context;
use self::relay::{ HttpRelayClient, RelayApi };

const FALLBACK_REPLY: &str = "Something went wrong.";
const EMPTY_REPLY: &str = "Sorry, I couldn't understand that.";
const TYPING_INTERVAL_MS: u64 = 20;

#[derive(Debug, ThisError)]
pub enum ChatError {
    #[error("Please type something!")]
    EmptyQuestion,

    #[error("History store error: {0}")]
    Store(String),
}

#[derive(Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Answered {
        turn_id: u64,
    },
    Failed {
        turn_id: u64,
        error: String,
    },
}

/// The chat client's state: the ordered turn list, the id counter and the
/// collaborators it talks through. Replies are reconciled into their turn
/// by id, so a reply can never land in a turn it did not originate from.
pub struct ChatSession {
    turns: Vec<ChatTurn>,
    next_id: u64,
    store: Box<dyn TurnStore>,
    relay: Arc<dyn RelayApi>,
    output: Box<dyn Write + Send>,
}

impl ChatSession {
    pub async fn open(
        store: Box<dyn TurnStore>,
        relay: Arc<dyn RelayApi>,
        output: Box<dyn Write + Send>,
    ) -> Result<Self, ChatError> {
        let turns = store.load().await.map_err(|e| ChatError::Store(e.to_string()))?;
        let next_id = turns
            .iter()
            .map(|turn| turn.id)
            .max()
            .map_or(1, |id| id + 1);

        Ok(Self {
            turns,
            next_id,
            store,
            relay,
            output,
        })
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn turn(&self, id: u64) -> Option<&ChatTurn> {
        self.turns.iter().find(|turn| turn.id == id)
    }

    fn turn_mut(&mut self, id: u64) -> Option<&mut ChatTurn> {
        self.turns.iter_mut().find(|turn| turn.id == id)
    }

    /// Sends a question through the relay. The turn is appended and
    /// persisted before the call starts; the context window covers only
    /// the turns that existed before it.
    pub async fn submit(&mut self, question: &str) -> Result<SubmitOutcome, ChatError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ChatError::EmptyQuestion);
        }

        let conversation = build_context(&self.turns, question);

        let turn_id = self.next_id;
        self.next_id += 1;
        self.turns.push(ChatTurn::new(turn_id, question.to_string(), now()));
        self.persist().await?;

        match self.relay.ask(&conversation).await {
            Ok(reply) => {
                self.fill_reply(turn_id, clean_reply(reply)).await?;
                Ok(SubmitOutcome::Answered { turn_id })
            }
            Err(e) => {
                warn!("Relay call failed: {}", e);
                self.reveal_fallback(turn_id, FALLBACK_REPLY).await?;
                Ok(SubmitOutcome::Failed {
                    turn_id,
                    error: e.to_string(),
                })
            }
        }
    }

    pub async fn clear(&mut self) -> Result<(), ChatError> {
        self.turns.clear();
        self.store.clear().await.map_err(|e| ChatError::Store(e.to_string()))
    }

    async fn fill_reply(&mut self, turn_id: u64, reply: String) -> Result<(), ChatError> {
        let stamp = now();
        if let Some(turn) = self.turn_mut(turn_id) {
            turn.ai_text = reply;
            turn.ai_time = stamp;
        }
        self.persist().await
    }

    /// Types the canned failure text into the turn one character at a
    /// time, echoing it to the output as it grows. Ends with the full
    /// string present and the AI timestamp set.
    async fn reveal_fallback(&mut self, turn_id: u64, text: &str) -> Result<(), ChatError> {
        let stamp = now();
        let _ = write!(self.output, "AI: ");
        let _ = self.output.flush();

        for ch in text.chars() {
            if let Some(turn) = self.turn_mut(turn_id) {
                turn.ai_text.push(ch);
                turn.ai_time = stamp.clone();
            }
            self.persist().await?;
            let _ = write!(self.output, "{}", ch);
            let _ = self.output.flush();
            tokio::time::sleep(Duration::from_millis(TYPING_INTERVAL_MS)).await;
        }

        let _ = writeln!(self.output);
        Ok(())
    }

    async fn persist(&mut self) -> Result<(), ChatError> {
        self.store
            .save(&self.turns)
            .await
            .map_err(|e| ChatError::Store(e.to_string()))
    }
}

fn now() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// The relay already stringifies non-string content, but some models wrap
/// the whole reply in quotes; a blank reply gets the canned substitute.
fn clean_reply(raw: String) -> String {
    let mut reply = raw;
    if reply.len() >= 2 && reply.starts_with('"') && reply.ends_with('"') {
        reply = reply[1..reply.len() - 1].to_string();
    }

    if reply.trim().is_empty() {
        EMPTY_REPLY.to_string()
    } else {
        reply
    }
}

pub async fn run(args: ChatArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    let store = initialize_turn_store(&args.history_path)?;
    let relay: Arc<dyn RelayApi> = Arc::new(HttpRelayClient::new(args.relay_url.clone()));
    let mut session = ChatSession::open(store, relay, Box::new(io::stdout())).await?;

    info!("Using relay at {}", args.relay_url);
    println!("Ask away. /history shows stored chats, /clear erases them, /quit exits.");

    let mut rl = DefaultEditor::new()?;
    loop {
        match rl.readline("> ") {
            Ok(line) => {
                let line = line.trim().to_string();
                if !line.is_empty() {
                    let _ = rl.add_history_entry(line.as_str());
                }

                match line.as_str() {
                    "/quit" | "/exit" => {
                        break;
                    }
                    "/history" => {
                        print_transcript(&session);
                    }
                    "/clear" => {
                        confirm_and_clear(&mut session, &mut rl).await?;
                    }
                    _ => {
                        handle_question(&mut session, &line).await?;
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                break;
            }
            Err(e) => {
                return Err(Box::new(e));
            }
        }
    }

    Ok(())
}

async fn handle_question(session: &mut ChatSession, question: &str) -> Result<(), ChatError> {
    match session.submit(question).await {
        Ok(SubmitOutcome::Answered { turn_id }) => {
            if let Some(turn) = session.turn(turn_id) {
                println!("AI ({}): {}", turn.ai_time, turn.ai_text);
            }
            Ok(())
        }
        Ok(SubmitOutcome::Failed { .. }) => {
            println!("Failed to get AI response!");
            Ok(())
        }
        Err(ChatError::EmptyQuestion) => {
            println!("Please type something!");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

async fn confirm_and_clear(
    session: &mut ChatSession,
    rl: &mut DefaultEditor,
) -> Result<(), ChatError> {
    match rl.readline("Clear all chats? This cannot be undone. [y/N] ") {
        Ok(answer) if answer.trim().eq_ignore_ascii_case("y") => {
            session.clear().await?;
            println!("All chats cleared!");
        }
        _ => {
            println!("Clear cancelled.");
        }
    }
    Ok(())
}

fn print_transcript(session: &ChatSession) {
    if session.turns().is_empty() {
        println!("No chats yet.");
        return;
    }

    for turn in session.turns() {
        println!("You ({}): {}", turn.user_time, turn.user_text);
        if turn.is_pending() {
            println!("AI: ...");
        } else {
            println!("AI ({}): {}", turn.ai_time, turn.ai_text);
        }
    }
}
