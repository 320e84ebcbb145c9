//! Host-side CLI for the launcher disguise core.
//!
//! # Responsibility
//! - Drive the activation manager against a SQLite-backed registry file.
//! - Keep output deterministic `key=value` lines for scripting and smoke
//!   checks without a Flutter/FFI runtime.

use clap::{Parser, Subcommand};
use disguise_core::{
    default_log_level, init_logging, ActivationManager, HealOutcome, IdentitySet,
    SqliteComponentRegistry, SweepOrder,
};
use std::path::PathBuf;
use std::process::ExitCode;

/// Switch which launcher identity is enabled.
#[derive(Parser, Debug)]
#[command(name = "disguise")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Registry database file
    #[arg(long, env = "DISGUISE_REGISTRY_DB_PATH", default_value = "launcher_registry.sqlite3")]
    db: PathBuf,

    /// Absolute directory for rolling log files (logging is off when unset)
    #[arg(long, env = "DISGUISE_LOG_DIR")]
    log_dir: Option<String>,

    /// Enable the target before disabling the others
    #[arg(long)]
    enable_first: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the identity catalogue
    Identities,
    /// Show which identities are enabled
    Status,
    /// Activate one identity (no alias, or an unknown one, means default)
    Set { alias: Option<String> },
    /// Repair a registry with zero or several enabled identities
    Heal,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            println!("status=error message={message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    if let Some(log_dir) = &cli.log_dir {
        init_logging(default_log_level(), log_dir).map_err(|err| err.to_string())?;
    }

    let identities = IdentitySet::builtin().map_err(|err| err.to_string())?;
    if let Command::Identities = cli.command {
        for entry in identities.entries() {
            println!("identity={} component={}", entry.identity, entry.component);
        }
        return Ok(());
    }

    let registry = SqliteComponentRegistry::open(&cli.db).map_err(|err| err.to_string())?;
    registry
        .install(&identities)
        .map_err(|err| err.to_string())?;
    let sweep_order = if cli.enable_first {
        SweepOrder::EnableThenDisableOthers
    } else {
        SweepOrder::DisableAllThenEnable
    };
    let manager = ActivationManager::new(identities, registry).with_sweep_order(sweep_order);

    match cli.command {
        Command::Identities => Ok(()),
        Command::Status => {
            let snapshot = manager.snapshot().map_err(|err| err.to_string())?;
            for (identity, state) in &snapshot.states {
                println!("identity={identity} state={}", state.as_str());
            }
            match snapshot.active() {
                Some(active) => println!("active={active}"),
                None => println!("active=<inconsistent>"),
            }
            Ok(())
        }
        Command::Set { alias } => {
            let outcome = manager
                .activate(alias.as_deref())
                .map_err(|err| err.to_string())?;
            println!(
                "status=ok active={} order={}",
                outcome.identity,
                manager.sweep_order().as_str()
            );
            if let Some(note) = outcome.fallback {
                println!("note={note}");
            }
            Ok(())
        }
        Command::Heal => {
            match manager.self_heal().map_err(|err| err.to_string())? {
                HealOutcome::Consistent(active) => println!("status=ok action=none active={active}"),
                HealOutcome::Repaired {
                    previously_enabled,
                    outcome,
                } => println!(
                    "status=ok action=repaired previously_enabled={} active={}",
                    previously_enabled.len(),
                    outcome.identity
                ),
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::Parser;

    #[test]
    fn parses_set_with_and_without_alias() {
        let cli = Cli::try_parse_from(["disguise", "--db", "/tmp/r.db", "set", "notes"])
            .expect("set with alias");
        assert!(matches!(cli.command, Command::Set { alias: Some(ref a) } if a == "notes"));

        let cli = Cli::try_parse_from(["disguise", "set"]).expect("set without alias");
        assert!(matches!(cli.command, Command::Set { alias: None }));
    }

    #[test]
    fn rejects_unknown_subcommand() {
        assert!(Cli::try_parse_from(["disguise", "vault"]).is_err());
    }
}
