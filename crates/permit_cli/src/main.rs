//! PERMIT CLI
//!
//! Inspect and check authorization rules from the command line.

#![warn(missing_docs)]
#![warn(clippy::all)]

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use permit_core::Token;
use permit_policy::{facts, parse, tokenize};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "permit")]
#[command(about = "PERMIT - authorization rule checker", long_about = None)]
struct Cli {
    /// Log output format
    #[arg(long, value_enum, global = true, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the tokens of a rule
    Tokenize {
        /// Rule text
        rule: String,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Show the postfix program of a rule
    Parse {
        /// Rule text
        rule: String,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// List the names a binding may provide for a rule
    Names {
        /// Rule text
        rule: String,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Evaluate a rule against a fact file
    Check {
        /// Rule text
        rule: String,
        /// Path to the JSON fact file
        #[arg(short, long)]
        bindings: PathBuf,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

/// How a command finished.
///
/// Errors leave through `main` with status 1, so denial gets its own status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Done,
    Permitted,
    Denied,
}

impl Outcome {
    fn status(self) -> u8 {
        match self {
            Self::Done | Self::Permitted => 0,
            Self::Denied => 2,
        }
    }
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        ExitCode::from(outcome.status())
    }
}

#[derive(Serialize)]
struct CheckReport<'a> {
    rule: &'a str,
    permitted: bool,
}

fn init_tracing(format: LogFormat, verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("permit_policy={level},permit_cli={level}"))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn token_kind(token: &Token) -> &'static str {
    match token {
        Token::Bool(_) => "bool",
        Token::Int(_) => "int",
        Token::Str(_) => "str",
    }
}

fn write_json<T: Serialize>(out: &mut impl Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn run(command: Commands, out: &mut impl Write) -> Result<Outcome> {
    match command {
        Commands::Tokenize { rule, format } => {
            let tokens = tokenize(&rule);
            match format {
                Format::Text => {
                    for token in &tokens {
                        writeln!(out, "{:<4} {}", token_kind(token), token)?;
                    }
                }
                Format::Json => write_json(out, &tokens)?,
            }
            Ok(Outcome::Done)
        }
        Commands::Parse { rule, format } => {
            let program = parse(tokenize(&rule))?;
            match format {
                Format::Text => writeln!(out, "{}", program)?,
                Format::Json => write_json(out, &program)?,
            }
            Ok(Outcome::Done)
        }
        Commands::Names { rule, format } => {
            let program = parse(tokenize(&rule))?;
            let names = program.names();
            match format {
                Format::Text => {
                    for name in &names {
                        writeln!(out, "{}", name)?;
                    }
                }
                Format::Json => write_json(out, &names)?,
            }
            Ok(Outcome::Done)
        }
        Commands::Check {
            rule,
            bindings,
            format,
        } => {
            let binding = facts::from_path(&bindings)
                .wrap_err_with(|| format!("loading facts from {}", bindings.display()))?;
            let permitted = permit_policy::permitted(&rule, &binding)
                .wrap_err_with(|| format!("evaluating rule `{}`", rule))?;
            tracing::info!(rule = %rule, permitted, "checked rule");

            match format {
                Format::Text => {
                    writeln!(out, "{}", if permitted { "permitted" } else { "denied" })?;
                }
                Format::Json => write_json(
                    out,
                    &CheckReport {
                        rule: &rule,
                        permitted,
                    },
                )?,
            }
            Ok(if permitted {
                Outcome::Permitted
            } else {
                Outcome::Denied
            })
        }
    }
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.log_format, cli.verbose);

    let stdout = std::io::stdout();
    let outcome = run(cli.command, &mut stdout.lock())?;
    Ok(outcome.into())
}
