//! Atlas Engine - maintenance entry point.
//!
//! ```text
//! atlas-engine audit <campaign-id>   integrity report for one campaign
//! atlas-engine tree <campaign-id>    nested JSON view of one campaign
//! atlas-engine path <location-id>    rendered path from root to location
//! atlas-engine find <campaign-id> <name>
//!                                    location with exactly that name
//! ```

use std::sync::Arc;

use anyhow::{bail, Context};
use atlas_domain::{CampaignId, LocationId};
use atlas_engine::infrastructure::{config::EngineConfig, sqlite::SqliteLocationRepo};
use atlas_engine::use_cases::locations::LocationNavigation;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str =
    "usage: atlas-engine <audit|tree> <campaign-id> | path <location-id> | find <campaign-id> <name>";

enum Command {
    Audit(CampaignId),
    Tree(CampaignId),
    Path(LocationId),
    Find(CampaignId, String),
}

fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let (Some(command), Some(id)) = (args.first(), args.get(1)) else {
        bail!(USAGE);
    };
    let command = match command.as_str() {
        "audit" => Command::Audit(id.parse().context("invalid campaign id")?),
        "tree" => Command::Tree(id.parse().context("invalid campaign id")?),
        "path" => Command::Path(id.parse().context("invalid location id")?),
        "find" => {
            let Some(name) = args.get(2) else {
                bail!(USAGE);
            };
            Command::Find(id.parse().context("invalid campaign id")?, name.clone())
        }
        other => bail!("unknown command '{}'\n{}", other, USAGE),
    };
    Ok(command)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let config = EngineConfig::from_env()?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_args(&args)?;

    tracing::info!(database = %config.database_path, "Opening location store");
    let repo = SqliteLocationRepo::new(&config.database_path).await?;
    let navigation = LocationNavigation::new(Arc::new(repo), config.max_depth);

    match command {
        Command::Audit(campaign_id) => {
            let issues = navigation.audit(campaign_id).await?;
            println!("{}", serde_json::to_string_pretty(&issues)?);
            if !issues.is_empty() {
                bail!("campaign {} has {} integrity issue(s)", campaign_id, issues.len());
            }
        }
        Command::Tree(campaign_id) => {
            let forest = navigation.tree(campaign_id).await?;
            println!("{}", serde_json::to_string_pretty(&forest)?);
        }
        Command::Path(location_id) => {
            let path = navigation.full_path(location_id).await?;
            println!("{}", path);
        }
        Command::Find(campaign_id, name) => {
            let location = navigation.find_by_name(campaign_id, &name).await?;
            println!("{}", serde_json::to_string_pretty(&location)?);
        }
    }

    Ok(())
}
