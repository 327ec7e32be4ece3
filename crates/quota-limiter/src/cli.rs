//! CLI module for quota-limiter.
//!
//! This module provides the command-line interface for inspecting stored
//! usage counters. It can be used either as a standalone binary or as a
//! subcommand of the main quota-rs CLI.
//!
//! Usage records are an audit trail, so no command here deletes or rewrites
//! them.
//!
//! # Usage
//!
//! ```bash
//! # Initialize database schema
//! quota-admin init -d sqlite:usage.db
//!
//! # One user's count for today
//! quota-admin show -d sqlite:usage.db -u coach-42
//!
//! # Everyone's counts for a given day
//! quota-admin list -d sqlite:usage.db --date 2026-10-19 -f csv
//!
//! # Effective policy table from a config file
//! quota-admin policy -c config.toml
//! ```

use clap::{Parser, Subcommand};
use serde::Serialize;
use tabled::{Table, Tabled};
use time::Date;
use time::macros::format_description;

use crate::clock::{Clock, SystemClock};
use crate::policy::PolicyTable;
use crate::sql::{SqlStoreConfig, SqlUsageStore};
use crate::store::{UsageRecord, UsageStore};
use crate::user::UserId;

/// Usage administration CLI arguments.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "quota-admin",
    version,
    about = "Inspect per-user daily usage counters"
)]
pub struct AdminArgs {
    #[command(subcommand)]
    pub command: AdminCommands,
}

/// Admin CLI subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum AdminCommands {
    /// Initialize database schema.
    Init {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,
    },

    /// Show one user's count for a day.
    Show {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// User ID.
        #[arg(short, long)]
        user_id: String,

        /// UTC day (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<String>,
    },

    /// List all counters for a day.
    List {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// UTC day (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<String>,

        /// Output format (table, json, csv).
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Print the effective policy table.
    Policy {
        /// Configuration file (JSON, YAML or TOML). Built-in defaults if omitted.
        #[arg(short, long)]
        config: Option<String>,
    },
}

/// Usage row for display.
#[derive(Tabled, Serialize)]
struct UsageDisplay {
    #[tabled(rename = "User ID")]
    user_id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Requests")]
    requests: u64,
}

impl From<&UsageRecord> for UsageDisplay {
    fn from(record: &UsageRecord) -> Self {
        Self {
            user_id: record.user_id.to_string(),
            date: record.request_date.to_string(),
            requests: record.request_count,
        }
    }
}

/// Policy row for display.
#[derive(Tabled)]
struct PolicyDisplay {
    #[tabled(rename = "Class")]
    class: String,
    #[tabled(rename = "Daily Allowance")]
    allowance: String,
}

/// Run the admin CLI with the given arguments.
///
/// This is the main entry point for the admin CLI, used by both the
/// standalone binary and the unified quota-rs CLI.
pub async fn run(args: AdminArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        AdminCommands::Init { database } => init_database(&database).await,
        AdminCommands::Show {
            database,
            user_id,
            date,
        } => show_usage(&database, &user_id, date.as_deref()).await,
        AdminCommands::List {
            database,
            date,
            format,
        } => list_usage(&database, date.as_deref(), &format).await,
        AdminCommands::Policy { config } => show_policy(config.as_deref()),
    }
}

/// Connect to database.
async fn connect(url: &str) -> Result<SqlUsageStore, Box<dyn std::error::Error>> {
    let store = SqlUsageStore::connect(SqlStoreConfig::new(url).max_connections(1)).await?;
    Ok(store)
}

/// Parse a `YYYY-MM-DD` argument, defaulting to today (UTC).
fn parse_day(s: Option<&str>) -> Result<Date, Box<dyn std::error::Error>> {
    match s.map(str::trim) {
        None | Some("") => Ok(SystemClock.today()),
        Some(s) => Date::parse(s, format_description!("[year]-[month]-[day]"))
            .map_err(|e| format!("Invalid date {s:?} (expected YYYY-MM-DD): {e}").into()),
    }
}

/// Initialize database schema.
async fn init_database(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = connect(url).await?;
    store.init_schema().await?;

    println!("Database schema initialized successfully.");
    Ok(())
}

/// Show one user's usage.
async fn show_usage(
    url: &str,
    user_id: &str,
    date: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let user_id = UserId::parse(user_id)?;
    let day = parse_day(date)?;
    let store = connect(url).await?;

    let count = store
        .get(&user_id, day)
        .await?
        .map(|r| r.request_count)
        .unwrap_or(0);

    println!("User: {}", user_id);
    println!("  Date: {}", day);
    println!("  Requests: {}", count);
    Ok(())
}

/// List all usage for a day.
async fn list_usage(
    url: &str,
    date: Option<&str>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let day = parse_day(date)?;
    let store = connect(url).await?;
    let records = store.list(day).await?;

    if records.is_empty() {
        println!("No usage recorded for {}.", day);
        return Ok(());
    }

    let rows: Vec<UsageDisplay> = records.iter().map(UsageDisplay::from).collect();
    println!("{}", render_usage(&rows, format)?);
    Ok(())
}

fn render_usage(rows: &[UsageDisplay], format: &str) -> Result<String, serde_json::Error> {
    match format {
        "json" => serde_json::to_string_pretty(rows),
        "csv" => {
            let mut out = String::from("user_id,date,requests");
            for row in rows {
                out.push_str(&format!("\n{},{},{}", row.user_id, row.date, row.requests));
            }
            Ok(out)
        }
        // Table format (default)
        _ => Ok(Table::new(rows).to_string()),
    }
}

/// Print the effective policy table.
fn show_policy(config: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let table = match config {
        Some(path) => {
            let config = quota_config::load_config(path)?;
            quota_config::validate_config(&config)?;
            PolicyTable::from_config(&config.policy.classes, config.policy.unknown_class)?
        }
        None => PolicyTable::default(),
    };

    println!("{}", render_policy(&table));
    Ok(())
}

fn render_policy(table: &PolicyTable) -> String {
    let mut rows: Vec<PolicyDisplay> = table
        .iter()
        .map(|(class, allowance)| PolicyDisplay {
            class: class.to_string(),
            allowance: allowance.to_string(),
        })
        .collect();
    rows.push(PolicyDisplay {
        class: "(unknown)".to_string(),
        allowance: table.unknown_class_allowance().to_string(),
    });
    Table::new(rows).to_string()
}
