use std::process::ExitCode;

use anyhow::{bail, Context};
use chrono::Utc;
use colored::Colorize;
use medf::core::commit::format_timestamp;
use medf::{verify, verify_blocks, ChainBreak, Document, FsStore, Keypair, Workspace, WorkspaceConfig};
use serde_json::json;
use tracing::debug;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<ExitCode> {
    let format = cli.format;
    let mut config = WorkspaceConfig::default();
    if let Command::Commit(args) = &cli.command {
        if let Some(content_type) = &args.content_type {
            config.content_type = content_type.clone();
        }
    }
    debug!(root = %cli.root.display(), ?config, "opening workspace");
    let ws = Workspace::new(FsStore::open(&cli.root), config);

    match cli.command {
        Command::Init => cmd_init(),
        Command::Hash(args) => cmd_hash(&ws, args, format).await,
        Command::Verify(args) => cmd_verify(&ws, args, format).await,
        Command::Sign(args) => cmd_sign(&ws, args).await,
        Command::VerifySignature(args) => cmd_verify_signature(&ws, args, format).await,
        Command::Keygen(args) => cmd_keygen(args).await,
        Command::Commit(args) => cmd_commit(&ws, args, format).await,
        Command::Check(args) => cmd_check(&ws, args, format).await,
        Command::Log(args) => cmd_log(&ws, args, format).await,
    }
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn status(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn break_summary(broken: &ChainBreak) -> String {
    format!("record {} no longer matches its successor's link", broken.index)
}

fn cmd_init() -> anyhow::Result<ExitCode> {
    let template = Document::template(format_timestamp(Utc::now()));
    println!("{}", template.to_json_pretty()?);
    Ok(ExitCode::SUCCESS)
}

async fn cmd_hash(
    ws: &Workspace<FsStore>,
    args: FileArgs,
    format: OutputFormat,
) -> anyhow::Result<ExitCode> {
    let value = ws
        .seal_document(&args.file)
        .await
        .with_context(|| format!("cannot seal {}", args.file))?;

    match format {
        OutputFormat::Json => print_json(&json!({ "file": args.file, "doc_hash": value }))?,
        OutputFormat::Text => {
            println!("{} sealed {}", "[OK]".green().bold(), args.file.bold());
            println!("  doc_hash: {}", value.cyan());
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn cmd_verify(
    ws: &Workspace<FsStore>,
    args: FileArgs,
    format: OutputFormat,
) -> anyhow::Result<ExitCode> {
    let document = ws
        .read_document(&args.file)
        .await
        .with_context(|| format!("cannot read {}", args.file))?;
    let blocks = verify_blocks(&document);
    let result = verify(&document);
    let ok = blocks.is_empty() && result.valid;

    if format == OutputFormat::Json {
        print_json(&json!({ "file": args.file, "blocks": blocks, "document": result }))?;
        return Ok(status(ok));
    }

    for mismatch in &blocks {
        println!("{} block {}", "[NG]".red().bold(), mismatch.block_id.yellow());
        println!("  Expected: {}", mismatch.expected);
        println!("  Actual:   {}", mismatch.actual);
    }

    if result.is_missing_envelope() {
        println!("{} No doc_hash found", "[NG]".red().bold());
    } else if !result.valid {
        println!("{} document hash", "[NG]".red().bold());
        println!("  Expected: {}", result.expected.unwrap_or_default());
        println!("  Actual:   {}", result.actual.unwrap_or_default());
    } else if ok {
        println!("{} verified", "[OK]".green().bold());
    }
    Ok(status(ok))
}

async fn cmd_sign(ws: &Workspace<FsStore>, args: SignArgs) -> anyhow::Result<ExitCode> {
    let seed = tokio::fs::read_to_string(&args.key)
        .await
        .with_context(|| format!("cannot read key file {}", args.key.display()))?;
    let keypair = Keypair::from_seed_hex(&seed)
        .with_context(|| format!("invalid key file {}", args.key.display()))?;

    ws.sign_document(&args.file, &keypair)
        .await
        .with_context(|| format!("cannot sign {} (run `medf hash` first?)", args.file))?;

    println!("{} signed: {}", "[OK]".green().bold(), args.file.bold());
    println!("  Algorithm: ed25519");
    println!("  Signer: {}", keypair.public_key().to_hex().cyan());
    Ok(ExitCode::SUCCESS)
}

async fn cmd_verify_signature(
    ws: &Workspace<FsStore>,
    args: FileArgs,
    format: OutputFormat,
) -> anyhow::Result<ExitCode> {
    let outcome = ws.verify_document_signature(&args.file).await;

    match (format, &outcome) {
        (OutputFormat::Json, Ok(signer)) => {
            print_json(&json!({ "file": args.file, "valid": true, "signer": signer.to_hex() }))?
        }
        (OutputFormat::Json, Err(e)) => {
            print_json(&json!({ "file": args.file, "valid": false, "error": e.to_string() }))?
        }
        (OutputFormat::Text, Ok(signer)) => {
            println!("{} signature valid", "[OK]".green().bold());
            println!("  Signer: {}", signer.to_hex().cyan());
        }
        (OutputFormat::Text, Err(e)) => println!("{} {}", "[NG]".red().bold(), e),
    }
    Ok(status(outcome.is_ok()))
}

async fn cmd_keygen(args: KeygenArgs) -> anyhow::Result<ExitCode> {
    if !args.force && tokio::fs::try_exists(&args.out).await? {
        bail!("{} already exists (use --force to overwrite)", args.out.display());
    }

    let keypair = Keypair::generate();
    tokio::fs::write(&args.out, format!("{}\n", keypair.seed_hex()))
        .await
        .with_context(|| format!("cannot write {}", args.out.display()))?;

    println!("{} wrote {}", "[OK]".green().bold(), args.out.display());
    println!("  Public key: {}", keypair.public_key().to_hex().cyan());
    Ok(ExitCode::SUCCESS)
}

async fn cmd_commit(
    ws: &Workspace<FsStore>,
    args: CommitArgs,
    format: OutputFormat,
) -> anyhow::Result<ExitCode> {
    let record = ws
        .commit_source(&args.file, &args.author, &args.intent)
        .await
        .with_context(|| format!("cannot commit {}", args.file))?;

    match format {
        OutputFormat::Json => print_json(&record)?,
        OutputFormat::Text => {
            println!("{} MEDF committed: {}.medf.json", "✓".green().bold(), args.file);
            println!("  Content: {}", record.document.content_hash.cyan());
            println!("  Record:  {}", record.record_digest().yellow());
            match &record.previous {
                Some(prev) => println!("  Previous: {}", prev.dimmed()),
                None => println!("  Previous: {}", "(first commit)".dimmed()),
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn cmd_check(
    ws: &Workspace<FsStore>,
    args: FileArgs,
    format: OutputFormat,
) -> anyhow::Result<ExitCode> {
    let check = ws
        .verify_source(&args.file)
        .await
        .with_context(|| format!("cannot check {}", args.file))?;
    let report = ws.verify_history(&args.file).await?;
    let ok = check.matches && report.is_intact();

    if format == OutputFormat::Json {
        print_json(&json!({
            "file": args.file,
            "content": {
                "valid": check.matches,
                "expected": check.record.document.content_hash,
                "actual": check.actual,
            },
            "chain": report,
        }))?;
        return Ok(status(ok));
    }

    if check.matches {
        println!("{} content hash OK", "✓".green().bold());
    } else {
        println!("{} content hash MISMATCH", "✗".red().bold());
        println!("  Expected: {}", check.record.document.content_hash);
        println!("  Actual:   {}", check.actual);
    }

    if report.is_intact() {
        println!(
            "{} history intact ({} records)",
            "✓".green().bold(),
            report.len
        );
    }
    if let Some(broken) = &report.broken {
        println!("{} {}", "✗".red().bold(), break_summary(broken));
        println!(
            "  Successor links to: {}",
            broken.expected.as_deref().unwrap_or("(nothing)")
        );
        println!("  Record digest:      {}", broken.actual);
    }
    if let Some(link) = &report.unresolved {
        println!(
            "{} history incomplete: oldest of {} records links to an unknown record",
            "✗".red().bold(),
            report.len
        );
        println!("  Missing: {}", link);
    }
    Ok(status(ok))
}

async fn cmd_log(
    ws: &Workspace<FsStore>,
    args: LogArgs,
    format: OutputFormat,
) -> anyhow::Result<ExitCode> {
    let history = ws.history(&args.file).await?;
    if history.is_empty() {
        bail!("no history for {}", args.file);
    }

    if format == OutputFormat::Json {
        print_json(&history)?;
        return Ok(ExitCode::SUCCESS);
    }

    for record in history.iter().rev() {
        let key = record.record_digest();
        let short = &key[key.len() - 12..];
        if args.oneline {
            println!(
                "{} {} {}",
                short.yellow(),
                record.timestamp.dimmed(),
                record.intent.description
            );
        } else {
            println!("{}  {}", key.yellow().bold(), record.timestamp.dimmed());
            println!("  Author:  {}", record.intent.author);
            println!("  Intent:  {}", record.intent.description);
            println!("  Content: {}", record.document.content_hash.cyan());
            println!();
        }
    }
    Ok(ExitCode::SUCCESS)
}
