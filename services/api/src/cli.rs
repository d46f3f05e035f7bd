use crate::demo::{run_parse, run_score, ParseArgs, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use survey_ai::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Health Survey Orchestrator",
    about = "Run the health survey intake and risk assessment service from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Parse a survey transcript offline and show the validation outcome
    Parse(ParseArgs),
    /// Score a profile offline with the deterministic rubric
    Score(ScoreArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Parse(args) => run_parse(args),
        Command::Score(args) => run_score(args),
    }
}
