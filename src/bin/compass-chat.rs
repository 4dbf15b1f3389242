//! Interactive Parenting Compass chat in the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage with default settings (toddler, 2-5 years)
//! compass-chat
//!
//! # Start with another age group
//! compass-chat --age school-age
//!
//! # Use different models
//! compass-chat --text-model gemini-2.5-flash --image-model gemini-2.5-pro
//!
//! # Disable colors (useful for piping output)
//! compass-chat --no-color
//! ```
//!
//! The API key is read from `GEMINI_API_KEY`.
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/age [group]` - Select or show the child's age group
//! - `/image <path>` - Attach an image to the next message
//! - `/unstage` - Remove the attached image
//! - `/suggest [n]` - List suggestions, or start a message from one
//! - `/history` - Show the conversation so far
//! - `/view` - Show the full screen
//! - `/stats` - Show session statistics
//! - `/quit` - Exit the application

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use compass::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatSession, PendingInput, PlainTextRenderer, Renderer,
    TurnOutcome, help_text, parse_command,
};
use compass::{API_KEY_ENV, Gemini};

/// Main entry point for the compass-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("compass-chat [OPTIONS]");
    let config = match ChatConfig::try_from(args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("compass-chat: {err}");
            std::process::exit(2);
        }
    };
    let use_color = config.use_color;

    // A missing or malformed credential is fatal: no send could succeed.
    let client = match Gemini::with_options(
        None,
        Some(config.base_url.clone()),
        Some(config.timeout),
    ) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("compass-chat: {err}");
            if err.is_configuration() {
                eprintln!("Set {API_KEY_ENV} to a valid API key and try again.");
            }
            std::process::exit(1);
        }
    };

    let mut session = ChatSession::new(client, config);
    let mut renderer = PlainTextRenderer::with_color(use_color);
    let mut input = PendingInput::new();
    let mut rl = DefaultEditor::new()?;

    // There is no way to cancel a response; Ctrl+C while streaming is only
    // acknowledged once the turn ends.
    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupted_clone = interrupted.clone();
    ctrlc::set_handler(move || {
        interrupted_clone.store(true, Ordering::Relaxed);
    })?;

    renderer.print_view(&session.view(&input));
    println!("Type /help for commands, /quit to exit\n");

    let mut prefill = String::new();
    loop {
        interrupted.store(false, Ordering::Relaxed);

        let prompt = format!(
            "[{}{}] You: ",
            session.age_group().label(),
            if input.image().is_some() { " +image" } else { "" }
        );
        let readline = if prefill.is_empty() {
            rl.readline(&prompt)
        } else {
            rl.readline_with_initial(&prompt, (&prefill, ""))
        };
        prefill.clear();

        match readline {
            Ok(line) => {
                if line.trim().is_empty() && input.image().is_none() {
                    continue;
                }
                if !line.trim().is_empty() {
                    let _ = rl.add_history_entry(line.as_str());
                }

                if let Some(cmd) = parse_command(&line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::Age(Some(age)) => {
                            session.set_age_group(age);
                            renderer.print_info(&format!("Age group set to {}.", age.label()));
                            print_suggestions(&mut renderer, session.suggestions());
                        }
                        ChatCommand::Age(None) => {
                            let tabs: Vec<String> = session
                                .view(&input)
                                .age_tabs
                                .iter()
                                .map(|tab| {
                                    let marker = if tab.selected { "*" } else { " " };
                                    format!("{marker}{} ({})", tab.label, tab.age_group.name())
                                })
                                .collect();
                            renderer.print_info(&tabs.join("\n"));
                        }
                        ChatCommand::Image(path) => match input.stage_image_from_path(&path) {
                            Ok(image) => {
                                let info = format!(
                                    "Attached {path} ({}, {} bytes).",
                                    image.mime_type,
                                    image.decoded_len()
                                );
                                renderer.print_info(&info);
                            }
                            Err(err) => renderer.print_error(&format!("Cannot attach image: {err}")),
                        },
                        ChatCommand::Unstage => match input.clear_image() {
                            Some(_) => renderer.print_info("Image removed."),
                            None => renderer.print_info("No image attached."),
                        },
                        ChatCommand::Suggestions => {
                            print_suggestions(&mut renderer, session.suggestions());
                        }
                        ChatCommand::UseSuggestion(n) => {
                            match n.checked_sub(1).and_then(|i| session.suggestions().get(i)) {
                                Some(suggestion) => prefill = suggestion.to_string(),
                                None => renderer.print_error(&format!(
                                    "There are only {} suggestions.",
                                    session.suggestions().len()
                                )),
                            }
                        }
                        ChatCommand::History => {
                            for message in session.messages() {
                                renderer.print_message(message);
                            }
                        }
                        ChatCommand::View => {
                            renderer.print_view(&session.view(&input));
                        }
                        ChatCommand::Stats => {
                            print_stats(&session);
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Invalid(message) => {
                            renderer.print_error(&message);
                        }
                    }
                    continue;
                }

                input.set_draft(line);
                match session.send(&mut input, &mut renderer).await {
                    Ok(TurnOutcome::Failed { error, .. }) if error.is_fatal() => {
                        renderer.print_info(&format!(
                            "The API refused the credential; check {API_KEY_ENV}."
                        ));
                    }
                    Ok(_) => {}
                    Err(rejection) => renderer.print_info(&rejection.to_string()),
                }
                if interrupted.swap(false, Ordering::Relaxed) {
                    renderer.print_info("(responses cannot be interrupted)");
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

fn print_suggestions(renderer: &mut dyn Renderer, suggestions: &[&str]) {
    let lines: Vec<String> = suggestions
        .iter()
        .enumerate()
        .map(|(index, suggestion)| format!("  {}. {suggestion}", index + 1))
        .collect();
    renderer.print_info(&format!(
        "Try one with /suggest <n>:\n{}",
        lines.join("\n")
    ));
}

fn print_stats(session: &ChatSession<Gemini>) {
    let stats = session.stats();
    println!("    Session Statistics:");
    println!("      Age group: {}", stats.age_group.label());
    println!("      Text model: {}", stats.text_model);
    println!("      Image model: {}", stats.image_model);
    println!("      Messages: {}", stats.message_count);
    println!(
        "      Turns: {} started, {} completed, {} failed",
        stats.turns_started, stats.turns_completed, stats.turns_failed
    );
    println!("      Rejected sends: {}", stats.rejected_sends);
    println!(
        "      Response in progress: {}",
        if stats.active { "yes" } else { "no" }
    );
}
