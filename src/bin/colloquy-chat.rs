//! Interactive chat application for OpenAI-compatible completion APIs.
//!
//! This binary provides a streaming REPL interface for chatting with models
//! behind a chat-completions endpoint.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage with default settings
//! colloquy-chat
//!
//! # Specify a model
//! colloquy-chat --model gpt-4o
//!
//! # Set a system prompt
//! colloquy-chat --system "You are a helpful coding assistant"
//!
//! # Point at a compatible host
//! colloquy-chat --base-url http://localhost:8080/v1
//!
//! # Disable colors (useful for piping output)
//! colloquy-chat --no-color
//! ```
//!
//! The API key is read from OPENAI_API_KEY; if unset, the application asks
//! for one before anything else happens. Without a key there is nothing to
//! talk to, so it prints a notice and exits without making any requests.
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/clear` - Clear conversation history
//! - `/model <name>` - Change the model
//! - `/system [prompt]` - Set or clear system prompt
//! - `/history` - Re-render the conversation so far
//! - `/stats` - Show session statistics
//! - `/quit` - Exit the application

use std::borrow::Cow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arrrg::CommandLine;
use rustyline::completion::Completer;
use rustyline::config::Config;
use rustyline::error::ReadlineError;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{ColorMode, DefaultEditor, Editor, Helper};

use colloquy::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatSession, PlainTextRenderer, Renderer, SessionStats,
    help_text, parse_command, replay_transcript,
};
use colloquy::{ApiKey, Model, OpenAi, Role};

/// Readline helper that masks typed characters with asterisks.
struct MaskedPrompt;

impl Completer for MaskedPrompt {
    type Candidate = String;
}

impl Hinter for MaskedPrompt {
    type Hint = String;
}

impl Validator for MaskedPrompt {}

impl Highlighter for MaskedPrompt {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Owned("*".repeat(line.chars().count()))
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        true
    }
}

impl Helper for MaskedPrompt {}

/// Resolves the API key from the environment or an interactive prompt.
///
/// Returns `None` when the user declines to provide one.
fn resolve_api_key() -> Result<Option<ApiKey>, ReadlineError> {
    if let Some(key) = ApiKey::from_env() {
        return Ok(Some(key));
    }

    let config = Config::builder().color_mode(ColorMode::Forced).build();
    let mut editor: Editor<MaskedPrompt, DefaultHistory> = Editor::with_config(config)?;
    editor.set_helper(Some(MaskedPrompt));

    match editor.readline("OpenAI API key: ") {
        Ok(line) => Ok(ApiKey::from_input(&line)),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
        Err(err) => Err(err),
    }
}

/// Main entry point for the colloquy-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("colloquy-chat [OPTIONS]");
    let config = ChatConfig::from(args);
    let use_color = config.use_color;

    // Credential gate: no key, no client, no requests.
    let Some(api_key) = resolve_api_key()? else {
        println!("Please add your OpenAI API key to continue.");
        return Ok(());
    };

    let client = OpenAi::with_options(Some(api_key), config.base_url.clone(), None)?;
    let mut session = ChatSession::new(client, config);

    // Flag for interrupt handling during streaming
    let interrupted = Arc::new(AtomicBool::new(false));
    let mut renderer =
        PlainTextRenderer::with_color(use_color).with_interrupt(interrupted.clone());

    // Set up Ctrl+C handler
    let interrupted_clone = interrupted.clone();
    ctrlc::set_handler(move || {
        interrupted_clone.store(true, Ordering::Relaxed);
    })?;

    let mut rl = DefaultEditor::new()?;

    println!("Colloquy Chat (model: {})", session.model());
    println!("Type /help for commands, /quit to exit\n");

    loop {
        // Reset interrupt flag before each input
        interrupted.store(false, Ordering::Relaxed);

        let readline = rl.readline("You: ");

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                // Check for slash commands
                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::Clear => {
                            session.clear();
                            renderer.print_info("Conversation cleared.");
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Model(model_name) => {
                            session.set_model(Model::from(model_name.as_str()));
                            renderer.print_info(&format!("Model changed to: {}", model_name));
                        }
                        ChatCommand::System(prompt) => {
                            session.set_system_prompt(prompt.clone());
                            match prompt {
                                Some(p) => {
                                    renderer.print_info(&format!("System prompt set to: {}", p))
                                }
                                None => renderer.print_info("System prompt cleared."),
                            }
                        }
                        ChatCommand::MaxTokens(value) => {
                            session.set_max_tokens(Some(value));
                            renderer.print_info(&format!("max_tokens set to {value}"));
                        }
                        ChatCommand::ClearMaxTokens => {
                            session.set_max_tokens(None);
                            renderer.print_info("max_tokens reset to provider default");
                        }
                        ChatCommand::Temperature(value) => {
                            session.set_temperature(Some(value));
                            renderer.print_info(&format!("temperature set to {:.2}", value));
                        }
                        ChatCommand::ClearTemperature => {
                            session.set_temperature(None);
                            renderer.print_info("temperature reset to model default");
                        }
                        ChatCommand::TopP(value) => {
                            session.set_top_p(Some(value));
                            renderer.print_info(&format!("top_p set to {:.2}", value));
                        }
                        ChatCommand::ClearTopP => {
                            session.set_top_p(None);
                            renderer.print_info("top_p reset to model default");
                        }
                        ChatCommand::AddStopSequence(sequence) => {
                            session.add_stop_sequence(sequence.clone());
                            renderer.print_info(&format!("Added stop sequence: {sequence}"));
                        }
                        ChatCommand::ClearStopSequences => {
                            session.clear_stop_sequences();
                            renderer.print_info("Stop sequences cleared.");
                        }
                        ChatCommand::ListStopSequences => {
                            print_stop_sequences(session.stop_sequences());
                        }
                        ChatCommand::History => {
                            if session.transcript().is_empty() {
                                renderer.print_info("No conversation yet.");
                            } else {
                                replay_transcript(&mut renderer, session.transcript());
                            }
                        }
                        ChatCommand::Stats => {
                            print_stats(&session.stats());
                        }
                        ChatCommand::ShowConfig => {
                            print_config(&session.stats());
                        }
                        ChatCommand::Invalid(message) => {
                            renderer.print_error(&message);
                        }
                    }
                    continue;
                }

                // Regular message - send to API
                renderer.print_role_header(Role::Assistant);
                if let Err(e) = session.send_streaming(line, &mut renderer).await {
                    if e.is_abort() {
                        renderer.print_interrupted();
                    } else {
                        renderer.print_error(&e.banner());
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

fn print_stats(stats: &SessionStats) {
    println!("    Session Statistics:");
    println!("      Model: {}", stats.model);
    println!("      Turns: {}", stats.turn_count);
    println!("      Max tokens: {}", describe_max_tokens(stats.max_tokens));
    println!("      Temperature: {}", describe_float(stats.temperature));
    println!("      Top-p: {}", describe_float(stats.top_p));
    if let Some(prompt) = stats.system_prompt.as_deref() {
        println!("      System prompt: {}", prompt);
    } else {
        println!("      System prompt: (none)");
    }
    print_stop_sequences(&stats.stop_sequences);
    println!(
        "      Total tokens: {} prompt / {} completion ({} requests)",
        stats.total_prompt_tokens, stats.total_completion_tokens, stats.total_requests
    );
    if let Some(prompt_tokens) = stats.last_turn_prompt_tokens {
        let completion_tokens = stats.last_turn_completion_tokens.unwrap_or(0);
        println!("      Last turn tokens: {prompt_tokens} prompt / {completion_tokens} completion");
    }
}

fn print_config(stats: &SessionStats) {
    println!("    Current Configuration:");
    println!("      Model: {}", stats.model);
    println!("      Max tokens: {}", describe_max_tokens(stats.max_tokens));
    println!("      Temperature: {}", describe_float(stats.temperature));
    println!("      Top-p: {}", describe_float(stats.top_p));
    if let Some(prompt) = stats.system_prompt.as_deref() {
        println!("      System prompt: {}", prompt);
    } else {
        println!("      System prompt: (none)");
    }
    print_stop_sequences(&stats.stop_sequences);
}

fn print_stop_sequences(stop_sequences: &[String]) {
    if stop_sequences.is_empty() {
        println!("      Stop sequences: (none)");
    } else {
        println!("      Stop sequences:");
        for seq in stop_sequences {
            println!("        - {}", seq);
        }
    }
}

fn describe_float(value: Option<f32>) -> String {
    value
        .map(|v| format!("{v:.2}"))
        .unwrap_or_else(|| "default".to_string())
}

fn describe_max_tokens(value: Option<u32>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "default".to_string())
}
