use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use custody_types::RemovalReason;

#[derive(Parser)]
#[command(
    name = "custody",
    about = "Tamper-evident chain of custody for evidence items",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the chain store file
    #[arg(long, global = true, default_value = "blocks.bin")]
    pub store: PathBuf,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check the chain store, creating the initial entry if absent
    Init(InitArgs),
    /// Take one or more items into custody under a case
    Add(AddArgs),
    /// Check an item out of the evidence locker
    Checkout(ItemArgs),
    /// Check an item back in
    Checkin(ItemArgs),
    /// Remove an item from custody into a terminal disposition
    Remove(RemoveArgs),
    /// Show an item's current status within a case
    Status(StatusArgs),
    /// List every case seen on the chain
    Cases(CasesArgs),
    /// Show the audit log of custody actions
    Log(LogArgs),
    /// Verify the integrity of the whole chain
    Verify(VerifyArgs),
}

#[derive(Args)]
pub struct InitArgs {}

#[derive(Args)]
pub struct AddArgs {
    #[arg(short = 'c', long = "case-id")]
    pub case_id: String,
    /// Item to add; repeatable
    #[arg(short = 'i', long = "item-id", required = true)]
    pub item_id: Vec<String>,
}

#[derive(Args)]
pub struct ItemArgs {
    #[arg(short = 'i', long = "item-id")]
    pub item_id: String,
}

#[derive(Args)]
pub struct RemoveArgs {
    #[arg(short = 'i', long = "item-id")]
    pub item_id: String,
    /// Disposition: RELEASED, DISPOSED, or DESTROYED
    #[arg(short = 'y', long = "why")]
    pub reason: RemovalReason,
    /// Receiving owner, expected for a release
    #[arg(short = 'o', long)]
    pub owner: Option<String>,
}

#[derive(Args)]
pub struct StatusArgs {
    #[arg(short = 'c', long = "case-id")]
    pub case_id: String,
    #[arg(short = 'i', long = "item-id")]
    pub item_id: String,
}

#[derive(Args)]
pub struct CasesArgs {}

#[derive(Args)]
pub struct LogArgs {
    /// Only actions on this item
    #[arg(short = 'i', long = "item-id")]
    pub item_id: Option<String>,
    /// Newest first
    #[arg(short = 'r', long)]
    pub reverse: bool,
    /// Show at most this many entries (the most recent)
    #[arg(short = 'n', long = "num-entries")]
    pub limit: Option<usize>,
}

#[derive(Args)]
pub struct VerifyArgs {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_init() {
        let cli = Cli::try_parse_from(["custody", "init"]).unwrap();
        assert!(matches!(cli.command, Command::Init(_)));
        assert_eq!(cli.store, PathBuf::from("blocks.bin"));
    }

    #[test]
    fn parse_global_store_path() {
        let cli = Cli::try_parse_from(["custody", "--store", "/tmp/chain.bin", "init"]).unwrap();
        assert_eq!(cli.store, PathBuf::from("/tmp/chain.bin"));
    }

    #[test]
    fn parse_add_with_repeated_items() {
        let cli = Cli::try_parse_from([
            "custody", "add", "-c", "CASE1", "-i", "100", "-i", "200", "-i", "300",
        ])
        .unwrap();
        if let Command::Add(args) = cli.command {
            assert_eq!(args.case_id, "CASE1");
            assert_eq!(args.item_id, vec!["100", "200", "300"]);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_add_requires_item() {
        assert!(Cli::try_parse_from(["custody", "add", "-c", "CASE1"]).is_err());
    }

    #[test]
    fn parse_checkout() {
        let cli = Cli::try_parse_from(["custody", "checkout", "-i", "678"]).unwrap();
        if let Command::Checkout(args) = cli.command {
            assert_eq!(args.item_id, "678");
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_remove_with_reason_and_owner() {
        let cli = Cli::try_parse_from([
            "custody", "remove", "-i", "100", "-y", "released", "-o", "john doe",
        ])
        .unwrap();
        if let Command::Remove(args) = cli.command {
            assert_eq!(args.reason, RemovalReason::Released);
            assert_eq!(args.owner.as_deref(), Some("john doe"));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_remove_rejects_unknown_reason() {
        assert!(Cli::try_parse_from(["custody", "remove", "-i", "100", "-y", "LOST"]).is_err());
    }

    #[test]
    fn parse_log_filtered_reversed_limited() {
        let cli = Cli::try_parse_from(["custody", "log", "-i", "100", "-r", "-n", "5"]).unwrap();
        if let Command::Log(args) = cli.command {
            assert_eq!(args.item_id.as_deref(), Some("100"));
            assert!(args.reverse);
            assert_eq!(args.limit, Some(5));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_log_defaults() {
        let cli = Cli::try_parse_from(["custody", "log"]).unwrap();
        if let Command::Log(args) = cli.command {
            assert!(args.item_id.is_none());
            assert!(!args.reverse);
            assert!(args.limit.is_none());
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_status() {
        let cli = Cli::try_parse_from(["custody", "status", "-c", "CASE1", "-i", "7"]).unwrap();
        assert!(matches!(cli.command, Command::Status(_)));
    }

    #[test]
    fn parse_verify() {
        let cli = Cli::try_parse_from(["custody", "verify"]).unwrap();
        assert!(matches!(cli.command, Command::Verify(_)));
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["custody", "-v", "cases"]).unwrap();
        assert!(cli.verbose);
    }
}
