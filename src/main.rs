mod balance;
#[cfg(test)]
mod balance_props;
mod dlq;
mod domain;
mod engine;
mod ingestion;
mod output_repository;

use std::{fs::File, io, path::PathBuf};

use clap::Parser;

use crate::domain::MemberId;
use crate::output_repository::{OutputFormat, Report, WriterOutput};

/// Computes net balances for a household from its recorded expenses.
#[derive(Parser, Debug)]
#[command(name = "balance_engine", version, about)]
struct Cli {
    /// Household snapshot as JSON (id, name, inviteCode, members).
    household: PathBuf,

    /// Expenses as CSV (id, description, amount, payer, participants, split, shares, created_at).
    expenses: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// Report to print: net balances, or the list of accepted expenses.
    #[arg(long, value_enum, default_value_t = Report::Balances)]
    show: Report,

    /// Only show what this member can see of the household.
    #[arg(long)]
    member: Option<String>,

    #[arg(long, env = "BALANCE_ENGINE_LOG", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // stdout carries the balances, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(format!("balance_engine={}", cli.log_level))
        .with_writer(io::stderr)
        .init();

    let household = ingestion::load_household(File::open(&cli.household)?)?;
    tracing::info!(
        household = %household.id,
        members = household.members.len(),
        "loaded household {}",
        household.name
    );

    let ingestion = ingestion::CsvReader::new(File::open(&cli.expenses)?)?;
    let output = WriterOutput::new(io::stdout().lock(), cli.format);
    let dlq = dlq::TracingDLQ::default();

    let mut engine = engine::Engine::new(household, ingestion, output, dlq);
    let summary = engine.process().await?;
    if summary.rejected > 0 {
        tracing::warn!(rejected = summary.rejected, "some expenses were not applied");
    }

    let member = cli.member.map(MemberId::new);
    engine.flush(cli.show, member.as_ref())?;

    Ok(())
}
