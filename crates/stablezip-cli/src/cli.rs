//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stablezip")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a reproducible archive from glob patterns
    Create(CreateArgs),
    /// Print the digest of an existing file
    Hash(HashArgs),
    /// Generate shell completions
    Completion(CompletionArgs),
}

#[derive(clap::Args)]
pub struct CreateArgs {
    /// Glob pattern of files to archive (repeatable; newlines separate
    /// patterns within one value, `!` excludes)
    #[arg(short, long = "paths", value_name = "PATTERN", env = "INPUT_PATHS")]
    pub paths: Vec<String>,

    /// Destination archive path
    #[arg(short, long, value_name = "FILE", env = "INPUT_OUTPUTFILE")]
    pub output_file: PathBuf,

    /// Create the output directory if it does not exist
    #[arg(
        long,
        value_name = "BOOL",
        env = "INPUT_AUTOCREATEOUTPUTDIR",
        action = clap::ArgAction::Set,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true",
        value_parser = parse_bool_input
    )]
    pub auto_create_output_dir: bool,

    /// Compression level (1-9)
    #[arg(short = 'l', long, default_value_t = 9, value_parser = clap::value_parser!(u8).range(1..=9))]
    pub compression_level: u8,

    /// Fail when two files share a base name instead of keeping the last
    #[arg(long)]
    pub strict_names: bool,

    /// Write through a temporary file and rename it into place
    #[arg(long)]
    pub atomic: bool,

    /// Directory patterns are resolved against (default: current directory)
    #[arg(short = 'C', long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Reserved; accepted and ignored
    #[arg(long, value_name = "MS", env = "INPUT_MILLISECONDS")]
    pub milliseconds: Option<String>,

    /// Append `hash=` and `time=` lines to this file
    #[arg(long, value_name = "FILE", env = "GITHUB_OUTPUT")]
    pub outputs_file: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct HashArgs {
    /// File to hash
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Expected digest; fail if the file's digest differs
    #[arg(long, value_name = "HEX")]
    pub expect: Option<String>,
}

#[derive(clap::Args)]
pub struct CompletionArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Parse a boolean-ish value (true/false, 1/0, yes/no, on/off, y/n)
fn parse_bool_input(s: &str) -> Result<bool, String> {
    stablezip_core::config::parse_bool("auto-create-output-dir", s).map_err(|e| e.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_bool_input() {
        assert!(parse_bool_input("true").unwrap());
        assert!(parse_bool_input("1").unwrap());
        assert!(!parse_bool_input("0").unwrap());
        assert!(!parse_bool_input("").unwrap());
        assert!(parse_bool_input("sometimes").is_err());
    }

    #[test]
    fn test_create_args() {
        let cli = Cli::try_parse_from([
            "stablezip",
            "create",
            "--paths",
            "a.txt",
            "-p",
            "b/*.md",
            "--output-file",
            "out.zip",
            "--auto-create-output-dir",
            "--atomic",
            "-l",
            "6",
        ])
        .unwrap();

        let Commands::Create(args) = cli.command else {
            panic!("expected create");
        };
        assert_eq!(args.paths, vec!["a.txt", "b/*.md"]);
        assert_eq!(args.output_file, PathBuf::from("out.zip"));
        assert!(args.auto_create_output_dir);
        assert!(args.atomic);
        assert!(!args.strict_names);
        assert_eq!(args.compression_level, 6);
    }

    #[test]
    fn test_auto_create_explicit_value() {
        let cli = Cli::try_parse_from([
            "stablezip",
            "create",
            "-p",
            "a",
            "-o",
            "out.zip",
            "--auto-create-output-dir=false",
        ])
        .unwrap();
        let Commands::Create(args) = cli.command else {
            panic!("expected create");
        };
        assert!(!args.auto_create_output_dir);
    }

    #[test]
    fn test_compression_level_range() {
        let result = Cli::try_parse_from([
            "stablezip", "create", "-p", "a", "-o", "out.zip", "-l", "10",
        ]);
        assert!(result.is_err());
    }
}
