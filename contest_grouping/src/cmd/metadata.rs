use crate::cmd::build_service;
use anyhow::{bail, Result};
use clap::Args;
use contest_grouping_libs::ContestId;

#[derive(Debug, Args)]
pub struct MetadataArgs {
    /// Contest id (`1234`, `gym-100001`) or a link to a contest or problem page
    contest: String,
}

pub async fn run(args: MetadataArgs) -> Result<()> {
    let contest_id = match ContestId::parse(&args.contest) {
        Some(contest_id) => contest_id,
        None => {
            let message = format!("`{}` doesn't look like a contest id", args.contest);
            tracing::error!(message);
            bail!(message);
        }
    };

    let service = build_service().await?;
    match service.get_contest_metadata(&contest_id).await {
        Ok(record) => println!("{}", serde_json::to_string_pretty(&record)?),
        Err(e) => {
            let message = format!("couldn't resolve contest {}: {}", contest_id, e);
            tracing::error!(message);
            bail!(message);
        }
    }

    Ok(())
}
