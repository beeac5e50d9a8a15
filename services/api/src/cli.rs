use crate::demo::{run_analyze, run_demo, run_patterns, AnalyzeArgs, DemoArgs, PatternsArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use conflict_signal::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Conflict Signal Engine",
    about = "Analyse conflict incident signals and route alerts from the command line",
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
    /// Score a piece of text for conflict and peace signals
    Analyze(AnalyzeArgs),
    /// Detect conflict patterns in an incident CSV export
    Patterns(PatternsArgs),
    /// Run every analysis over the seeded demo data set
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
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Analyze(args) => run_analyze(args),
        Command::Patterns(args) => run_patterns(args),
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_is_optional_and_patterns_parses_flags() {
        let cli = Cli::try_parse_from(["conflict-signal-api"]).expect("no subcommand");
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from([
            "conflict-signal-api",
            "patterns",
            "--incidents-csv",
            "incidents.csv",
            "--timeframe-days",
            "60",
        ])
        .expect("patterns parses");
        match cli.command {
            Some(Command::Patterns(args)) => {
                assert_eq!(args.timeframe_days, 60);
                assert_eq!(args.incidents_csv.to_string_lossy(), "incidents.csv");
            }
            other => panic!("expected patterns command, got {other:?}"),
        }
    }
}
