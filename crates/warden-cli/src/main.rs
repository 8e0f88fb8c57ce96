//! Warden CLI binary entrypoint.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use warden_cli::cli::{Cli, Commands};
use warden_cli::commands::{FailingCommand, PreviewCommand, TriggerCommand};
use warden_cli::output::OutputFormat;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: Cli) -> Result<(), warden_cli::CliError> {
    let format = OutputFormat::new(cli.format);
    let mut stdout = io::stdout().lock();

    match cli.command {
        Commands::Trigger(args) => {
            let cmd = TriggerCommand::new(&cli.config, &cli.policies, &cli.state);
            cmd.execute(&mut stdout, &format, &args).await?;
        }
        Commands::Preview { policy_id } => {
            let cmd = PreviewCommand::new(&cli.config, &cli.policies, &cli.state);
            cmd.execute(&mut stdout, &format, policy_id).await?;
        }
        Commands::Failing { command } => {
            let cmd = FailingCommand::new(&cli.state);
            cmd.execute(&mut stdout, &format, &command).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_cli::cli::{FailingCommands, Format};
    use warden_policy::{HostId, PolicyId};

    #[test]
    fn cli_parses_trigger_with_now() {
        let cli = Cli::parse_from(["warden", "trigger", "--now", "2021-10-22T12:00:00Z"]);
        let Commands::Trigger(args) = cli.command else {
            unreachable!("expected trigger command");
        };
        assert_eq!(args.now.map(|t| t.to_rfc3339()).as_deref(), Some("2021-10-22T12:00:00+00:00"));
    }

    #[test]
    fn cli_parses_failing_remove() {
        let cli = Cli::parse_from(["warden", "failing", "remove", "7", "101", "102"]);
        assert!(matches!(
            cli.command,
            Commands::Failing {
                command: FailingCommands::Remove { policy_id, ref host_ids }
            } if policy_id == PolicyId::new(7) && *host_ids == [HostId::new(101), HostId::new(102)]
        ));
    }

    #[test]
    fn cli_remove_requires_hosts() {
        assert!(Cli::try_parse_from(["warden", "failing", "remove", "7"]).is_err());
    }

    #[test]
    fn cli_rejects_non_numeric_policy() {
        assert!(Cli::try_parse_from(["warden", "preview", "seven"]).is_err());
    }

    #[test]
    fn cli_respects_format_and_paths() {
        let cli = Cli::parse_from([
            "warden",
            "--format",
            "json",
            "--state",
            "/tmp/state.json",
            "failing",
            "list",
        ]);
        assert_eq!(cli.format, Format::Json);
        assert_eq!(cli.state, std::path::PathBuf::from("/tmp/state.json"));
    }
}
