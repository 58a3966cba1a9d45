use crate::commands::{run_analyze, run_crawl, AnalyzeArgs, CrawlArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use investor_routiner::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Investor Routiner",
    about = "Scrape financial statements and generate investment reports",
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
    /// Fetch a company's financial table and print the requested periods
    Crawl(CrawlArgs),
    /// Generate an investment report for a company
    Analyze(AnalyzeArgs),
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
        Command::Crawl(args) => run_crawl(args).await,
        Command::Analyze(args) => run_analyze(args).await,
    }
}
