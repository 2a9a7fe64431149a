use crate::cmd::build_service;
use anyhow::{Context, Result};
use clap::Args;
use contest_grouping_libs::grouping::SubmissionGroup;

#[derive(Debug, Args)]
pub struct GroupArgs {
    /// Codeforces handle whose submissions are grouped
    handle: String,
    /// Print the groups as JSON
    #[arg(long)]
    json: bool,
}

fn render(group: &SubmissionGroup) -> String {
    let mut header = format!("[{}] {}", group.label, group.contest_name);
    if let Some(window) = &group.window {
        header.push_str(&format!(" ({})", window));
    }
    let ids = group
        .submission_ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    format!("{}\n    {}", header, ids)
}

pub async fn run(args: GroupArgs) -> Result<()> {
    let service = build_service().await?;
    let groups = service
        .group_submissions(&args.handle)
        .await
        .with_context(|| {
            let message = format!("failed to group submissions of {}", args.handle);
            tracing::error!(message);
            message
        })?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&groups)?);
    } else {
        for group in groups.iter() {
            println!("{}", render(group));
        }
    }

    Ok(())
}
