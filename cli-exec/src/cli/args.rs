//! CLI argument definitions.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

/// Run a program and stream its stdout and stderr line by line
#[derive(Parser, Debug)]
#[command(name = "cli-exec")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Reap the program without waiting for its output streams to close
    #[arg(long)]
    pub no_sync: bool,

    /// How to print output lines
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Plain)]
    pub format: OutputFormat,

    /// Directory to run the program in
    #[arg(short = 'C', long)]
    pub dir: Option<PathBuf>,

    /// Environment variable for the program (KEY=VALUE, repeatable)
    #[arg(short, long = "env", value_name = "KEY=VALUE", value_parser = parse_env_pair)]
    pub env: Vec<(String, String)>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Program to run (path or name on PATH)
    pub program: String,

    /// Arguments passed to the program unchanged
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Output formats for captured lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Lines exactly as the program wrote them
    Plain,
    /// Lines tagged with the stream they came from
    Prefixed,
    /// One JSON object per line
    Json,
}

fn parse_env_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_program_args_pass_through() {
        let cli = Cli::try_parse_from(["cli-exec", "--format", "json", "ls", "-la", "--color"])
            .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.program, "ls");
        assert_eq!(cli.args, vec!["-la", "--color"]);
        assert!(!cli.no_sync);
    }

    #[test]
    fn test_env_pairs() {
        let cli = Cli::try_parse_from(["cli-exec", "-e", "A=1", "--env", "B=x=y", "env"]).unwrap();
        assert_eq!(
            cli.env,
            vec![("A".into(), "1".into()), ("B".into(), "x=y".into())]
        );

        assert!(Cli::try_parse_from(["cli-exec", "-e", "novalue", "env"]).is_err());
        assert!(Cli::try_parse_from(["cli-exec", "-e", "=1", "env"]).is_err());
    }

    #[test]
    fn test_program_is_required() {
        assert!(Cli::try_parse_from(["cli-exec", "--no-sync"]).is_err());
    }
}
