use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::TrainerConfig;
use crate::scenario::Meta;

#[derive(Parser, Debug)]
#[command(name = "consulting-trainer")]
#[command(version)]
#[command(about = "Practise consulting negotiation answers against a remote scoring API")]
pub struct Args {
    /// Base URL of the scoring API (overrides config and TRAINER_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Path of the evaluation endpoint, e.g. /evaluate or /api/evaluate
    #[arg(long, global = true)]
    pub evaluate_path: Option<String>,

    /// TOML config file (defaults to ~/.consulting-trainer/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Key-value file that stores attempt history
    #[arg(long, global = true)]
    pub storage: Option<PathBuf>,

    /// Industry filter
    #[arg(long, global = true)]
    pub industry: Option<String>,

    /// Department filter
    #[arg(long, global = true)]
    pub department: Option<String>,

    /// Stakeholder filter
    #[arg(long, global = true)]
    pub stakeholder: Option<String>,

    /// Scenario mode
    #[arg(long, global = true)]
    pub mode: Option<String>,

    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Interactive session (default)
    Interactive,
    /// Fetch one scenario and print it
    Generate,
    /// Score a response to a scenario
    Evaluate {
        #[arg(long)]
        scenario: String,
        #[arg(long)]
        response: String,
    },
    /// Show the conciseness meter for a piece of text
    Meter {
        text: Vec<String>,
    },
    /// Inspect or manage stored attempts
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,
    },
    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum HistoryAction {
    /// List stored attempts, most recent first (default)
    List,
    /// Show a stored attempt again (0 = most recent)
    Restore { index: usize },
    /// Delete all stored attempts
    Clear,
}

impl Args {
    pub fn meta(&self) -> Meta {
        Meta::from_controls(
            self.industry.as_deref(),
            self.department.as_deref(),
            self.stakeholder.as_deref(),
            self.mode.as_deref(),
        )
    }

    /// Apply command-line overrides on top of a loaded config.
    pub fn apply_to(&self, config: &mut TrainerConfig) {
        if let Some(url) = &self.api_url {
            config.api_url = url.clone();
        }
        if let Some(path) = &self.evaluate_path {
            config.evaluate_path = path.clone();
        }
        if let Some(storage) = &self.storage {
            config.storage_path = storage.clone();
        }
    }

    pub fn resolved_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Interactive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse_minimal_defaults_to_interactive() {
        let args = Args::parse_from(["trainer"]);
        assert_eq!(args.resolved_command(), Command::Interactive);
        assert!(args.api_url.is_none());
        assert!(!args.verbose);
        assert_eq!(args.meta(), Meta::default());
    }

    #[test]
    fn test_args_parse_filters() {
        let args = Args::parse_from([
            "trainer",
            "--industry",
            "Tech",
            "--stakeholder",
            "CFO",
            "generate",
        ]);
        assert_eq!(args.resolved_command(), Command::Generate);
        let meta = args.meta();
        assert_eq!(meta.industry, "Tech");
        assert_eq!(meta.stakeholder, "CFO");
        assert_eq!(meta.department, "Any");
    }

    #[test]
    fn test_args_global_flags_after_subcommand() {
        let args = Args::parse_from(["trainer", "generate", "--api-url", "http://localhost:1"]);
        assert_eq!(args.api_url.as_deref(), Some("http://localhost:1"));
    }

    #[test]
    fn test_args_parse_evaluate() {
        let args = Args::parse_from([
            "trainer",
            "evaluate",
            "--scenario",
            "Your fees are higher.",
            "--response",
            "Let's talk value.",
        ]);
        assert_eq!(
            args.resolved_command(),
            Command::Evaluate {
                scenario: "Your fees are higher.".to_string(),
                response: "Let's talk value.".to_string(),
            }
        );
    }

    #[test]
    fn test_args_parse_history_actions() {
        let args = Args::parse_from(["trainer", "history"]);
        assert_eq!(args.resolved_command(), Command::History { action: None });
        let args = Args::parse_from(["trainer", "history", "restore", "2"]);
        assert_eq!(
            args.resolved_command(),
            Command::History {
                action: Some(HistoryAction::Restore { index: 2 })
            }
        );
        let args = Args::parse_from(["trainer", "history", "clear"]);
        assert_eq!(
            args.resolved_command(),
            Command::History {
                action: Some(HistoryAction::Clear)
            }
        );
    }

    #[test]
    fn test_args_parse_meter_words() {
        let args = Args::parse_from(["trainer", "meter", "we", "can", "help"]);
        assert_eq!(
            args.resolved_command(),
            Command::Meter {
                text: vec!["we".into(), "can".into(), "help".into()]
            }
        );
    }

    #[test]
    fn test_apply_to_overrides_config() {
        let args = Args::parse_from([
            "trainer",
            "--api-url",
            "http://localhost:8787",
            "--evaluate-path",
            "/api/evaluate",
            "--storage",
            "/tmp/x.json",
        ]);
        let mut config = TrainerConfig::default();
        args.apply_to(&mut config);
        assert_eq!(config.api_url, "http://localhost:8787");
        assert_eq!(config.evaluate_path, "/api/evaluate");
        assert_eq!(config.storage_path, PathBuf::from("/tmp/x.json"));
    }

    #[test]
    fn test_args_short_verbose() {
        let args = Args::parse_from(["trainer", "-v"]);
        assert!(args.verbose);
    }
}
