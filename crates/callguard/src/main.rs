//! `callguard` - administration CLI for the call-screening engine.
//!
//! Edits the blocking rules, screens test calls and shows the history of
//! blocked calls, all against the same database the screening service uses.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod cli;

use anyhow::{Context, Result, bail};
use callguard_core::call_log::{self, JsonCallHistory};
use callguard_core::{CallScreener, IncomingCall, RuleId, RuleRepository, ScreeningConfig};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Command, RuleInput, RuleKind};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "callguard=info,callguard_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let screener = CallScreener::from_config(&config)
        .await
        .context("Failed to open the CallGuard database")?;

    run(cli.command, &screener).await
}

fn load_config(cli: &Cli) -> Result<ScreeningConfig> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => ScreeningConfig::default_path().context("Could not find config directory")?,
    };

    let mut config = ScreeningConfig::load(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    if let Some(database) = &cli.database {
        config.database_path = Some(database.clone());
    }

    info!(
        config = %path.display(),
        spam_timeout = ?config.spam_timeout(),
        "Configuration loaded"
    );
    Ok(config)
}

async fn run(command: Command, screener: &CallScreener) -> Result<()> {
    let rules = screener.rules();

    match command {
        Command::Add(input) => add_rule(rules, input).await?,
        Command::Remove { kind, id } => remove_rule(rules, kind, id).await?,
        Command::List { kind } => list_rules(rules, kind).await?,
        Command::Summary => println!("{}", rules.summary().await?),
        Command::ClearRules => {
            rules.clear_all().await?;
            println!("All rules removed");
        }
        Command::Screen { handle } => {
            let response = screener.screen(&IncomingCall::new(handle)).await;
            if response.is_blocking() {
                println!("BLOCK (disallow, reject; logged)");
            } else {
                println!("ALLOW");
            }
        }
        Command::Check { number } => {
            let decision = screener.evaluate(&number).await;
            match decision.reason {
                Some(reason) if decision.should_block => println!("BLOCK: {reason}"),
                _ => println!("ALLOW"),
            }
        }
        Command::History { clear } => {
            if clear {
                screener.log().clear().await?;
                println!("History cleared");
            } else {
                show_history(screener).await?;
            }
        }
        Command::Calls { file, block } => {
            let calls = call_log::recent_calls(&JsonCallHistory::new(&file));
            match block {
                Some(index) => {
                    let Some(call) = calls.get(index) else {
                        bail!("No call at position {index} ({} recent calls)", calls.len());
                    };
                    report_added(call_log::block_caller(rules, call).await?, &call.number);
                }
                None => {
                    for (i, call) in calls.iter().enumerate() {
                        let when = call
                            .timestamp()
                            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                            .unwrap_or_default();
                        println!(
                            "{i:>3}  {when}  {:<10} {:<20} {}s",
                            call.kind.display_name(),
                            call.label(),
                            call.duration_secs
                        );
                    }
                }
            }
        }
    }

    Ok(())
}

async fn add_rule(rules: &RuleRepository, input: RuleInput) -> Result<()> {
    match input {
        RuleInput::Number { number } => report_added(rules.add_number(&number).await?, &number),
        RuleInput::Prefix { prefix } => report_added(rules.add_prefix(&prefix).await?, &prefix),
        RuleInput::Contact { number, name } => report_added(
            rules.add_contact(name.as_deref(), &number).await?,
            &number,
        ),
    }
    println!("{}", rules.summary().await?);
    Ok(())
}

fn report_added(added: bool, value: &str) {
    if added {
        println!("Blocked {value}");
    } else {
        println!("Not added: {value:?} is blank or already blocked");
    }
}

async fn remove_rule(rules: &RuleRepository, kind: RuleKind, id: i64) -> Result<()> {
    let id = RuleId::new(id);
    let found = match kind {
        RuleKind::Number => {
            let all = rules.list_all_numbers().await?;
            let rule = all.iter().find(|r| r.id == id);
            if let Some(rule) = rule {
                rules.remove_number(rule).await?;
            }
            rule.is_some()
        }
        RuleKind::Prefix => {
            let all = rules.list_all_prefixes().await?;
            let rule = all.iter().find(|r| r.id == id);
            if let Some(rule) = rule {
                rules.remove_prefix(rule).await?;
            }
            rule.is_some()
        }
        RuleKind::Contact => {
            let all = rules.list_all_contacts().await?;
            let rule = all.iter().find(|r| r.id == id);
            if let Some(rule) = rule {
                rules.remove_contact(rule).await?;
            }
            rule.is_some()
        }
    };

    if found {
        println!("Removed {kind:?} rule {id}");
    } else {
        println!("No {kind:?} rule with id {id}");
    }
    Ok(())
}

async fn list_rules(rules: &RuleRepository, kind: Option<RuleKind>) -> Result<()> {
    let wants = |k: RuleKind| kind.is_none_or(|only| only == k);

    if wants(RuleKind::Number) {
        println!("Numbers:");
        for rule in rules.list_all_numbers().await? {
            println!("  [{}] {}", rule.id, rule.phone_number);
        }
    }
    if wants(RuleKind::Prefix) {
        println!("Prefixes:");
        for rule in rules.list_all_prefixes().await? {
            println!("  [{}] {}", rule.id, rule.prefix);
        }
    }
    if wants(RuleKind::Contact) {
        println!("Contacts:");
        for rule in rules.list_all_contacts().await? {
            println!("  [{}] {}", rule.id, rule.display());
        }
    }
    Ok(())
}

async fn show_history(screener: &CallScreener) -> Result<()> {
    let entries = screener.log().list().await?;
    if entries.is_empty() {
        println!("No blocked calls");
        return Ok(());
    }

    for entry in entries {
        let when = entry
            .timestamp()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();
        println!("{when}  {:<20} {}", entry.phone_number, entry.reason);
    }
    Ok(())
}
