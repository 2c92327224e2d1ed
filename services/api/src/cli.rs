use crate::demo::{run_demo, run_enrich, DemoArgs, EnrichArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use lead_enrich::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Lead Enrichment Service",
    about = "Enrich job-posting leads with a decision-maker, phone number and company facts",
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
    /// Enrich a single job payload and print the result as JSON
    Enrich(EnrichArgs),
    /// Run the bundled sample lead through the full enrichment flow
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Replay fixture answering collaborator calls (defaults to the bundled sample)
    #[arg(long)]
    pub(crate) fixtures: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Enrich(args) => run_enrich(args).await,
        Command::Demo(args) => run_demo(args).await,
    }
}
