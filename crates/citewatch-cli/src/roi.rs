//! ROI reporting from stored investments and metrics.

use clap::{Args, Subcommand};
use uuid::Uuid;

use citewatch_roi::{RoiInvestment, RoiMetric};

#[derive(Debug, Args)]
pub(crate) struct RoiArgs {
    #[command(subcommand)]
    command: RoiCommands,
}

#[derive(Debug, Subcommand)]
enum RoiCommands {
    /// Compute the ROI report for one investment.
    Report {
        /// Investment id.
        #[arg(long)]
        investment: Uuid,
    },
    /// List tracked investments.
    List {
        #[arg(long, default_value_t = 50)]
        limit: i64,
    },
}

pub(crate) async fn run(args: RoiArgs) -> anyhow::Result<()> {
    let pool = citewatch_db::connect_pool_from_env().await?;

    match args.command {
        RoiCommands::Report { investment } => {
            let row = citewatch_db::get_investment(&pool, investment).await?;
            let metrics = citewatch_db::list_metrics(&pool, investment).await?;

            let investment = RoiInvestment {
                investment_id: row.id,
                platform: row.platform,
                amount: row.amount,
                currency: row.currency,
                investment_date: row.investment_date,
                expected_roi: row.expected_roi,
            };
            let metrics: Vec<RoiMetric> = metrics
                .into_iter()
                .map(|m| RoiMetric {
                    metric_date: m.metric_date,
                    mentions_generated: m.mentions_generated,
                    estimated_traffic_value: m.estimated_traffic_value,
                })
                .collect();

            let report = citewatch_roi::calculate(&investment, &metrics);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        RoiCommands::List { limit } => {
            let rows = citewatch_db::list_investments(&pool, limit).await?;
            for row in rows {
                println!(
                    "{}  {:12}  {} {}  ({})",
                    row.id, row.platform, row.amount, row.currency, row.investment_date
                );
            }
        }
    }

    Ok(())
}
