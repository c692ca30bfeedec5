use crate::demo::{run_demo, run_report, run_score_import, DemoArgs, ReportArgs, ScoreImportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use outcome_rollup::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Outcome Rollup",
    about = "Serve and inspect learning-outcome and program-outcome achievement rollups",
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
    /// Print a student's course report from a gradebook snapshot
    Report(ReportArgs),
    /// Score entry utilities
    Scores {
        #[command(subcommand)]
        command: ScoresCommand,
    },
    /// Run an end-to-end demo against the bundled gradebook
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum ScoresCommand {
    /// Enter scores from an `assessment_id,student_id,score` CSV export
    Import(ScoreImportArgs),
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
        Command::Report(args) => run_report(args),
        Command::Scores {
            command: ScoresCommand::Import(args),
        } => run_score_import(args),
        Command::Demo(args) => run_demo(args),
    }
}
