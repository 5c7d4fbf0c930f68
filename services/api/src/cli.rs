use crate::commands::{run_audit, run_rank, run_timeline, AuditArgs, RankArgs, TimelineArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use talent_audit::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Talent Audit",
    about = "Rank candidates and audit hiring decisions for group fairness",
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
    /// Rank candidates for a job described in a JSON file
    Rank(RankArgs),
    /// Audit a CSV export of hiring decisions
    Audit(AuditArgs),
    /// Show recorded audit events for a scope
    Timeline(TimelineArgs),
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
        Command::Rank(args) => run_rank(args),
        Command::Audit(args) => run_audit(args),
        Command::Timeline(args) => run_timeline(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["talent-audit-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn audit_arguments_parse() {
        let cli = Cli::try_parse_from([
            "talent-audit-api",
            "audit",
            "--input",
            "decisions.csv",
            "--attribute",
            "gender",
            "--privileged",
            "male",
            "--favorable-label",
            "hired",
            "--json",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Audit(args)) => {
                assert_eq!(args.attribute, "gender");
                assert_eq!(args.privileged.as_deref(), Some("male"));
                assert_eq!(args.favorable_label.as_deref(), Some("hired"));
                assert!(args.json);
            }
            other => panic!("expected audit command, got {other:?}"),
        }
    }

    #[test]
    fn rank_rejects_unknown_match_modes() {
        let result = Cli::try_parse_from([
            "talent-audit-api",
            "rank",
            "--input",
            "job.json",
            "--mode",
            "telepathic",
        ]);
        assert!(result.is_err());
    }
}
