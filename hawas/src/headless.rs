//! Headless mode for Hawas.
//!
//! A line-oriented interface for scripted runs and agents: onboarding answers
//! first, then game commands.

use anyhow::Result;
use hawas_core::{
    headless::HELP, HeadlessGame, Loader, OnboardingFlow, OnboardingProfile, OnboardingProgress,
};
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use crate::Setup;

/// Run the game in headless mode.
///
/// Protocol:
/// - During onboarding, each line is the number of an option
/// - Afterwards, lines are game commands (see `help`)
/// - `quit` or `exit` stops at any point
pub async fn run_headless(setup: Setup) -> Result<()> {
    let mut flow = Some(
        OnboardingFlow::new(setup.username, setup.note_generator).with_loader(Arc::new(PrintLoader)),
    );
    let mut game = HeadlessGame::new(setup.session, setup.fact_checker);

    println!("=== هَوَسْ Headless Mode ===");
    if let Some(flow) = &flow {
        println!("{}", flow.greeting());
        print_onboarding_step(flow);
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Error reading input: {e}");
                break;
            }
        };
        let line = line.trim();

        if matches!(line, "quit" | "exit") {
            println!("Goodbye!");
            break;
        }

        if let Some(current) = flow.as_mut() {
            if line.is_empty() {
                continue;
            }
            let Some(option) = line.parse::<usize>().ok().and_then(|n| n.checked_sub(1)) else {
                println!("[ERROR] Answer with the number of an option.");
                continue;
            };
            match current.choose(option).await {
                Ok(OnboardingProgress::Next { .. }) => print_onboarding_step(current),
                Ok(OnboardingProgress::Complete(profile)) => {
                    print_profile(&profile);
                    flow = None;
                    println!("{HELP}");
                    println!();
                }
                Ok(OnboardingProgress::ReadyToFinish) => {}
                Err(e) => println!("[ERROR] {e}"),
            }
            stdout.flush().ok();
            continue;
        }

        match game.send(line).await {
            Ok(response) => {
                println!("{response}");
                println!();
            }
            Err(e) => println!("[ERROR] {e}"),
        }
        stdout.flush().ok();
    }

    Ok(())
}

/// Prints the loader message as a status line.
struct PrintLoader;

impl Loader for PrintLoader {
    fn show(&self, message: &str) {
        println!("[LOADING] {message}");
    }

    fn hide(&self) {}
}

fn print_onboarding_step(flow: &OnboardingFlow) {
    let Some(question) = flow.current_question() else {
        return;
    };
    println!();
    println!("{}", flow.subtitle());
    println!("{}", question.prompt);
    for (i, option) in question.options.iter().enumerate() {
        println!("  {}. {}", i + 1, option.text);
    }
}

fn print_profile(profile: &OnboardingProfile) {
    println!();
    println!("[NOTE] {}", profile.personalized_note);
    println!();
}
