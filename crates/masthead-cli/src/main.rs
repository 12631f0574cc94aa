use clap::{Parser, Subcommand};
use masthead_core::MastheadConfig;
use masthead_token::TokenEngine;
use std::io;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::token::{TokenArgs, DEFAULT_SERVER};

#[derive(Parser, Debug)]
#[command(name = "masthead", version, about = "Masthead admin token tooling")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print today's admin token for one role, or for every role.
    Token {
        /// developer, designer, marketing or pm. Omit to list every role.
        role: Option<String>,

        /// Cross-check the tokens against a running development server.
        #[arg(long, default_value_t = false)]
        verify: bool,

        /// Base URL of the server used for cross-checks.
        #[arg(long, env = "MASTHEAD_SERVER", default_value = DEFAULT_SERVER)]
        server: String,

        /// Print tokens for another UTC day (YYYYMMDD) instead of today.
        #[arg(long, conflicts_with = "verify")]
        date: Option<String>,
    },

    /// Look up your role from your birth date and phone number and print its token.
    Interactive,

    /// Report where each team secret comes from and flag unsafe setups.
    Check,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let usage_error = err.use_stderr();
            let _ = err.print();
            return if usage_error {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(cli).await {
        Ok(outcome) => outcome.into(),
        Err(err) => {
            eprintln!("✖ {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<commands::Outcome> {
    let config = MastheadConfig::load()?;
    let team = config.team.resolve_from_env();

    match cli.cmd {
        Command::Token {
            role,
            verify,
            server,
            date,
        } => {
            let engine = TokenEngine::sha256(team.registry);
            let args = TokenArgs {
                role,
                verify,
                server,
                date,
            };
            commands::token::run(&engine, &args, &mut io::stdout()).await
        }
        Command::Interactive => {
            let engine = TokenEngine::sha256(team.registry);
            commands::interactive::run(&engine, io::stdin().lock(), io::stdout())
        }
        Command::Check => commands::check::run(&config, &team, &mut io::stdout()),
    }
}
