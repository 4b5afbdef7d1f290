use std::path::Path;

use anyhow::bail;
use chrono::SecondsFormat;
use colored::Colorize;
use custody_ledger::{
    actions, ActionOutcome, FileStore, IntegrityVerifier, Ledger, LedgerError, LogFilter,
    QueryEngine,
};
use custody_types::{CaseId, ItemId};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Init(_) => cmd_init(&cli.store),
        Command::Add(args) => cmd_add(&cli.store, args),
        Command::Checkout(args) => cmd_checkout(&cli.store, args),
        Command::Checkin(args) => cmd_checkin(&cli.store, args),
        Command::Remove(args) => cmd_remove(&cli.store, args),
        Command::Status(args) => cmd_status(&cli.store, args),
        Command::Cases(_) => cmd_cases(&cli.store),
        Command::Log(args) => cmd_log(&cli.store, args),
        Command::Verify(_) => cmd_verify(&cli.store),
    }
}

fn open(store: &Path) -> anyhow::Result<(Ledger, bool)> {
    Ok(Ledger::load_or_init(FileStore::new(store))?)
}

fn print_applied(outcome: &ActionOutcome, verb: &str) {
    println!("Case: {}", outcome.record.case_id.to_string().bold());
    println!("{verb} item: {}", outcome.applied.item_id.to_string().yellow());
    println!("  Status: {}", outcome.applied.status.to_string().cyan());
    if let Some(owner) = &outcome.applied.owner_info {
        println!("  Owner info: {owner}");
    }
    println!(
        "  Time of action: {}",
        outcome
            .applied
            .action_time
            .to_rfc3339_opts(SecondsFormat::Micros, true)
    );
    for warning in &outcome.warnings {
        println!("  {} {warning}", "warning:".yellow().bold());
    }
}

fn cmd_init(store: &Path) -> anyhow::Result<()> {
    let (_, created) = open(store)?;
    if created {
        println!("Blockchain file not found. Created INITIAL block.");
    } else {
        println!("Blockchain file found with INITIAL block.");
    }
    Ok(())
}

fn cmd_add(store: &Path, args: AddArgs) -> anyhow::Result<()> {
    let (mut ledger, _) = open(store)?;
    let case_id = CaseId::new(args.case_id);

    // One entry per item; a rejected item does not block the rest, but
    // the command still exits nonzero if any item was rejected.
    let mut rejected = 0usize;
    for raw in args.item_id {
        let item_id = ItemId::new(raw);
        match actions::add_item(&ledger, &case_id, &item_id) {
            Ok(outcome) => {
                ledger.append(outcome.record.clone())?;
                print_applied(&outcome, "Added");
            }
            Err(LedgerError::IllegalTransition(violation)) => {
                println!("{} {violation}", "error:".red().bold());
                rejected += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
    if rejected > 0 {
        bail!("{rejected} item(s) could not be added");
    }
    Ok(())
}

fn cmd_checkout(store: &Path, args: ItemArgs) -> anyhow::Result<()> {
    let (mut ledger, _) = open(store)?;
    let outcome = actions::checkout(&ledger, &ItemId::new(args.item_id))?;
    ledger.append(outcome.record.clone())?;
    print_applied(&outcome, "Checked out");
    Ok(())
}

fn cmd_checkin(store: &Path, args: ItemArgs) -> anyhow::Result<()> {
    let (mut ledger, _) = open(store)?;
    let outcome = actions::checkin(&ledger, &ItemId::new(args.item_id))?;
    ledger.append(outcome.record.clone())?;
    print_applied(&outcome, "Checked in");
    Ok(())
}

fn cmd_remove(store: &Path, args: RemoveArgs) -> anyhow::Result<()> {
    let (mut ledger, _) = open(store)?;
    let outcome = actions::remove(&ledger, &ItemId::new(args.item_id), args.reason, args.owner)?;
    ledger.append(outcome.record.clone())?;
    print_applied(&outcome, "Removed");
    Ok(())
}

fn cmd_status(store: &Path, args: StatusArgs) -> anyhow::Result<()> {
    let (ledger, _) = open(store)?;
    let case_id = CaseId::new(args.case_id);
    let item_id = ItemId::new(args.item_id);

    match QueryEngine::current_status(&ledger, &case_id, &item_id) {
        Some(status) => {
            println!("Case: {}", case_id.to_string().bold());
            println!("Item: {}", item_id.to_string().yellow());
            println!("Status: {}", status.to_string().cyan());
        }
        None => println!("Item {item_id} has no history in case {case_id}."),
    }
    Ok(())
}

fn cmd_cases(store: &Path) -> anyhow::Result<()> {
    let (ledger, _) = open(store)?;
    let cases = QueryEngine::cases(&ledger);
    if cases.is_empty() {
        println!("No cases on the chain.");
    }
    for case in cases {
        println!("{case}");
    }
    Ok(())
}

fn cmd_log(store: &Path, args: LogArgs) -> anyhow::Result<()> {
    let (ledger, _) = open(store)?;
    let filter = LogFilter {
        item_id: args.item_id.map(ItemId::new),
        reverse: args.reverse,
        limit: args.limit,
    };

    let lines = QueryEngine::log(&ledger, &filter);
    let mut first = true;
    for line in lines {
        if !first {
            println!();
        }
        println!("{line}");
        first = false;
    }
    Ok(())
}

fn cmd_verify(store: &Path) -> anyhow::Result<()> {
    let (ledger, _) = open(store)?;
    let report = IntegrityVerifier::verify(&ledger)?;

    println!("Transactions in blockchain: {}", report.entry_count.to_string().bold());
    for finding in &report.findings {
        if finding.kind.is_warning() {
            println!("{} {finding}", "warning:".yellow().bold());
        } else {
            println!("{} {finding}", "error:".red().bold());
        }
    }

    if report.is_clean() {
        println!("State of blockchain: {}", "CLEAN".green().bold());
        return Ok(());
    }
    println!("State of blockchain: {}", "ERROR".red().bold());
    if report.warnings_only() {
        bail!("chain verification raised compliance warnings");
    }
    bail!("chain verification failed");
}
