use crate::evaluate::{run_evaluate, run_policy, EvaluateArgs, PolicyArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use delay_repay::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Delay Repay Eligibility",
    about = "Check UK rail Delay Repay eligibility and run the eligibility service",
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
    /// Evaluate an extracted ticket against live performance data
    Evaluate(EvaluateArgs),
    /// Print an operator's compensation brackets
    Policy(PolicyArgs),
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
        Command::Evaluate(args) => run_evaluate(args).await,
        Command::Policy(args) => run_policy(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["delay-repay-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn evaluate_accepts_ticket_and_today() {
        let cli = Cli::try_parse_from([
            "delay-repay-api",
            "evaluate",
            "--ticket",
            "ticket.json",
            "--today",
            "2026-10-18",
            "--json",
        ])
        .expect("parses");
        match cli.command {
            Some(Command::Evaluate(args)) => {
                assert_eq!(args.ticket.to_str(), Some("ticket.json"));
                assert!(args.json);
                assert!(args.today.is_some());
            }
            other => panic!("expected evaluate command, got {other:?}"),
        }
    }

    #[test]
    fn evaluate_rejects_malformed_today() {
        let result = Cli::try_parse_from([
            "delay-repay-api",
            "evaluate",
            "--ticket",
            "ticket.json",
            "--today",
            "18/10/2026",
        ]);
        assert!(result.is_err());
    }
}
