//! Line-oriented interactive session. Plain lines are typed into the
//! response; lines starting with `:` are commands.

use colored::*;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::api::ScoringApi;
use crate::render;
use crate::trainer::{GenerateOutcome, Trainer};

pub const HELP: &str = "\
Commands:
  :generate, :g        new scenario
  :evaluate, :e        score the current response
  :reset               clear the response
  :show                show scenario, response and meter
  :meta key=value ...  set industry, department, stakeholder or mode
  :history, :h         list recent attempts
  :restore N           show attempt N again (0 = most recent)
  :forget              delete all stored attempts
  :help                this text
  :quit, :q            leave
Any other line is added to your response.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Text(String),
    Generate,
    Evaluate,
    Reset,
    Show,
    Meta(Vec<(String, String)>),
    History,
    Restore(usize),
    Forget,
    Help,
    Quit,
    Unknown(String),
}

pub fn parse_line(line: &str) -> Input {
    let trimmed = line.trim();
    let Some(command) = trimmed.strip_prefix(':') else {
        return Input::Text(line.trim_end_matches(['\r', '\n']).to_string());
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or("").to_lowercase();
    match name.as_str() {
        "generate" | "g" => Input::Generate,
        "evaluate" | "e" => Input::Evaluate,
        "reset" => Input::Reset,
        "show" => Input::Show,
        "history" | "h" => Input::History,
        "forget" => Input::Forget,
        "help" | "?" => Input::Help,
        "quit" | "q" | "exit" => Input::Quit,
        "restore" => match parts.next().map(str::parse::<usize>) {
            Some(Ok(n)) => Input::Restore(n),
            _ => Input::Unknown(trimmed.to_string()),
        },
        "meta" => {
            let mut pairs = Vec::new();
            for part in parts {
                match part.split_once('=') {
                    Some((k, v)) => pairs.push((k.to_string(), v.to_string())),
                    None => return Input::Unknown(trimmed.to_string()),
                }
            }
            Input::Meta(pairs)
        }
        _ => Input::Unknown(trimmed.to_string()),
    }
}

/// Apply one input. Returns false when the session should end.
pub async fn handle<A: ScoringApi>(trainer: &mut Trainer<A>, input: Input) -> bool {
    match input {
        Input::Quit => return false,
        Input::Help => println!("{HELP}"),
        Input::Text(line) => {
            trainer.ui_mut().push_response_line(&line);
            render::print_meter(&trainer.ui().meter);
        }
        Input::Generate => {
            eprintln!("{}", "Generating...".dimmed());
            if trainer.generate_scenario().await != GenerateOutcome::Busy {
                render::print_scenario(trainer.ui());
            }
        }
        Input::Evaluate => {
            eprintln!("{}", "Evaluating...".dimmed());
            if let Err(err) = trainer.evaluate_response().await {
                tracing::debug!(error = %err, "evaluation did not complete");
            }
        }
        Input::Reset => {
            trainer.set_response("");
            render::print_meter(&trainer.ui().meter);
        }
        Input::Show => {
            render::print_scenario(trainer.ui());
            if !trainer.ui().response.is_empty() {
                println!("{}", "Response".bright_cyan().bold());
                println!("  {}", trainer.ui().response);
            }
            render::print_meter(&trainer.ui().meter);
        }
        Input::Meta(pairs) => {
            let mut meta = trainer.ui().meta.clone();
            for (key, value) in &pairs {
                if !meta.set(key, value) {
                    trainer.ui_mut().alert(format!("Unknown filter '{key}'"));
                }
            }
            println!("  {}", meta.to_string().dimmed());
            trainer.set_meta(meta);
        }
        Input::History => render::print_history(&trainer.history().entries().to_vec()),
        Input::Restore(index) => {
            if trainer.restore_from_history(index).is_ok() {
                render::print_scenario(trainer.ui());
                println!("{}", "Response".bright_cyan().bold());
                println!("  {}", trainer.ui().response);
            } else {
                trainer
                    .ui_mut()
                    .alert(format!("No stored attempt at position {index}."));
            }
        }
        Input::Forget => {
            if let Err(err) = trainer.clear_history() {
                trainer.ui_mut().alert(err.to_string());
            }
        }
        Input::Unknown(text) => {
            trainer
                .ui_mut()
                .alert(format!("Unknown command: {text} (try :help)"));
        }
    }
    render::render(trainer.ui_mut());
    true
}

pub async fn run<A: ScoringApi>(trainer: &mut Trainer<A>) -> std::io::Result<()> {
    println!("{}", "Consulting Trainer".bright_cyan().bold());
    println!("{}", "Type :generate to begin, :help for commands.".dimmed());
    render::print_scenario(trainer.ui());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if !handle(trainer, parse_line(&line)).await {
            break;
        }
    }
    Ok(())
}
