use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Args;
use serde_json::Value;

use salesbook_core::{EngineConfig, GroupBy, OwnerId};
use salesbook_revenue::{InMemoryRevenueStore, ReportQuery, RevenueAggregator, RowSnapshot};

use crate::input;

#[derive(Args)]
pub struct ReportArgs {
    /// Path to a JSON row snapshot (reads stdin when omitted)
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Owner to report on; required when the snapshot holds several owners
    #[arg(long)]
    pub owner: Option<OwnerId>,

    /// Range start (RFC 3339 or YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// Range end, inclusive (RFC 3339 or YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,

    /// Series bucket: day, week or month
    #[arg(long)]
    pub group_by: Option<GroupBy>,
}

pub fn run(args: ReportArgs, config: &EngineConfig) -> anyhow::Result<Value> {
    let snapshot: RowSnapshot = input::read_json(args.input.as_deref())?;
    let owner = match args.owner {
        Some(owner) => owner,
        None => sole_owner(&snapshot)?,
    };

    let query = ReportQuery {
        from: args.from,
        to: args.to,
        group_by: args.group_by,
    };
    let aggregator =
        RevenueAggregator::with_config(InMemoryRevenueStore::from_snapshot(snapshot), config);
    let report = aggregator
        .report(owner, &query)
        .with_context(|| format!("could not build revenue report for owner {owner}"))?;

    Ok(serde_json::to_value(report)?)
}

/// The only owner appearing in `snapshot`.
fn sole_owner(snapshot: &RowSnapshot) -> anyhow::Result<OwnerId> {
    let owners: BTreeSet<OwnerId> = snapshot
        .invoices
        .iter()
        .map(|r| r.owner_id)
        .chain(snapshot.payment_schedules.iter().map(|r| r.owner_id))
        .chain(snapshot.recurring_schedules.iter().map(|r| r.owner_id))
        .chain(snapshot.leads.iter().map(|r| r.owner_id))
        .collect();

    let mut iter = owners.into_iter();
    match (iter.next(), iter.next()) {
        (Some(owner), None) => Ok(owner),
        (None, _) => bail!("snapshot is empty; pass --owner"),
        (Some(_), Some(_)) => bail!("snapshot holds several owners; pass --owner"),
    }
}
