use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "medf",
    about = "MEDF: machine-verifiable documents and hash-linked file histories",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Directory that paths are resolved against
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print a template document
    Init,
    /// Seal a document: write block hashes and doc_hash
    Hash(FileArgs),
    /// Verify a document's block hashes and doc_hash
    Verify(FileArgs),
    /// Sign a sealed document's doc_hash with an Ed25519 key
    Sign(SignArgs),
    /// Check a document's signature
    VerifySignature(FileArgs),
    /// Write a new random signing key
    Keygen(KeygenArgs),
    /// Record the current content of a file in its history
    Commit(CommitArgs),
    /// Check a file against its latest record and verify its history
    Check(FileArgs),
    /// Show the history of a file
    Log(LogArgs),
}

#[derive(Args)]
pub struct FileArgs {
    /// Path of the file
    pub file: String,
}

#[derive(Args)]
pub struct SignArgs {
    /// Path of the document
    pub file: String,
    /// Key file holding a hex-encoded 32-byte seed
    #[arg(long)]
    pub key: PathBuf,
}

#[derive(Args)]
pub struct KeygenArgs {
    /// Where to write the key file
    pub out: PathBuf,
    /// Overwrite an existing key file
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct CommitArgs {
    /// Path of the file to commit
    pub file: String,
    #[arg(long, default_value = "")]
    pub author: String,
    #[arg(long, default_value = "")]
    pub intent: String,
    #[arg(long)]
    pub content_type: Option<String>,
}

#[derive(Args)]
pub struct LogArgs {
    /// Path of the file
    pub file: String,
    #[arg(long)]
    pub oneline: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_commit() {
        let cli = Cli::parse_from([
            "medf", "commit", "notes.md", "--author", "alice", "--intent", "draft",
            "--content-type", "text/markdown",
        ]);
        match cli.command {
            Command::Commit(args) => {
                assert_eq!(args.file, "notes.md");
                assert_eq!(args.author, "alice");
                assert_eq!(args.content_type.as_deref(), Some("text/markdown"));
            }
            _ => panic!("expected commit"),
        }
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::parse_from(["medf", "verify-signature", "doc.json", "-v", "--format", "json"]);
        assert!(cli.verbose);
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Command::VerifySignature(_)));
    }
}
