use clap::{CommandFactory, Parser};
use colored::*;
use tracing_subscriber::EnvFilter;

use consulting_trainer::cli::{Args, Command, HistoryAction};
use consulting_trainer::meter::update_conciseness_meter;
use consulting_trainer::storage::KeyValueStore;
use consulting_trainer::{interactive, render};
use consulting_trainer::{HistoryStore, HttpScoringApi, Trainer, TrainerConfig};

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_restored(trainer: &Trainer<HttpScoringApi>) {
    render::print_scenario(trainer.ui());
    println!("{}", "Response".bright_cyan().bold());
    println!("  {}", trainer.ui().response);
}

async fn run_trainer(args: &Args, command: Command) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = TrainerConfig::load(args.config.as_deref())?;
    args.apply_to(&mut config);
    tracing::debug!(
        api_url = %config.api_url,
        storage = %config.storage_path.display(),
        "config resolved"
    );

    let history = HistoryStore::load(KeyValueStore::new(&config.storage_path));
    let api = HttpScoringApi::new(&config)?;
    let mut trainer = Trainer::new(api, history, args.meta(), &config);

    match command {
        Command::Generate => {
            trainer.generate_scenario().await;
            render::print_scenario(trainer.ui());
        }
        Command::Evaluate { scenario, response } => {
            trainer.ui_mut().scenario = scenario;
            trainer.set_response(response);
            let outcome = trainer.evaluate_response().await;
            render::render(trainer.ui_mut());
            outcome?;
            return Ok(());
        }
        Command::History { action } => match action.unwrap_or(HistoryAction::List) {
            HistoryAction::List => {
                render::print_history(&trainer.history().entries().to_vec());
            }
            HistoryAction::Restore { index } => {
                trainer.restore_from_history(index)?;
                print_restored(&trainer);
            }
            HistoryAction::Clear => trainer.clear_history()?,
        },
        _ => interactive::run(&mut trainer).await?,
    }

    render::render(trainer.ui_mut());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.verbose);

    match args.resolved_command() {
        Command::Completions { shell } => {
            let mut cmd = Args::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
        }
        Command::Meter { text } => {
            render::print_meter(&update_conciseness_meter(&text.join(" ")));
        }
        command => run_trainer(&args, command).await?,
    }

    Ok(())
}
