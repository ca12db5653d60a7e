use crate::commands::{
    run_batch, run_check_artifacts, run_predict, ArtifactArgs, BatchArgs, PredictArgs,
};
use crate::server;
use attrition::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Employee Attrition Insight",
    about = "Serve the attrition what-if form or score employees from the command line",
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
    /// Predict attrition for a single employee described by flags
    Predict(PredictArgs),
    /// Score every employee in a CSV export
    Batch(BatchArgs),
    /// Load and validate the model and scaler artifacts
    CheckArtifacts(ArtifactArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    #[command(flatten)]
    pub(crate) artifacts: ArtifactArgs,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Predict(args) => run_predict(args),
        Command::Batch(args) => run_batch(args),
        Command::CheckArtifacts(args) => run_check_artifacts(args),
    }
}
