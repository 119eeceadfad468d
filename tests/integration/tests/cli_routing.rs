//! Command-line parsing tests.
//!
//! These verify that top-level command routing and flag handling work as
//! expected without touching a real vault.

use clap::Parser;
use vaultkeep_cli::{Cli, Commands};

#[test]
fn test_generate_flags() {
    let cli = Cli::try_parse_from(["vaultkeep", "generate", "--length", "20", "--no-symbols"])
        .unwrap();
    match cli.command {
        Commands::Generate(args) => {
            assert_eq!(args.length, Some(20));
            assert!(args.no_symbols);
            assert!(!args.no_digits);
            assert_eq!(args.count, 1);
        }
        _ => panic!("expected generate"),
    }
}

#[test]
fn test_add_with_options() {
    let cli = Cli::try_parse_from([
        "vaultkeep", "add", "GitHub", "-u", "alice", "--category", "Work", "--generate",
    ])
    .unwrap();
    match cli.command {
        Commands::Add(args) => {
            assert_eq!(args.title, "GitHub");
            assert_eq!(args.username, "alice");
            assert_eq!(args.category.as_deref(), Some("Work"));
            assert!(args.generate);
            assert!(args.password.is_none());
        }
        _ => panic!("expected add"),
    }
}

#[test]
fn test_add_password_conflicts_with_generate() {
    let result = Cli::try_parse_from([
        "vaultkeep", "add", "GitHub", "--password", "x", "--generate",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from(["vaultkeep", "list", "--search", "git", "-vv"]).unwrap();
    assert_eq!(cli.verbose, 2);
    match cli.command {
        Commands::List(args) => assert_eq!(args.search, "git"),
        _ => panic!("expected list"),
    }
}

#[test]
fn test_unknown_command_is_rejected() {
    assert!(Cli::try_parse_from(["vaultkeep", "nonexistent-command"]).is_err());
}

#[test]
fn test_version_command() {
    let cli = Cli::try_parse_from(["vaultkeep", "version"]).unwrap();
    assert!(matches!(cli.command, Commands::Version));
}
