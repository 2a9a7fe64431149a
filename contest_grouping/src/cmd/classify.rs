use crate::cmd::build_service;
use anyhow::{bail, Result};
use clap::Args;
use contest_grouping_libs::{ContestId, ParticipantType, SubmissionClassificationInput};

#[derive(Debug, Args)]
pub struct ClassifyArgs {
    /// Contest id or link. Omit for a submission outside any contest
    #[arg(long)]
    contest: Option<String>,
    /// Submission time in epoch seconds
    #[arg(long)]
    timestamp: Option<i64>,
    /// Participant type reported by Codeforces, e.g. CONTESTANT or VIRTUAL
    #[arg(long)]
    participant_type: Option<ParticipantType>,
}

pub async fn run(args: ClassifyArgs) -> Result<()> {
    let contest_id = match args.contest.as_deref() {
        Some(contest) => match ContestId::parse(contest) {
            Some(contest_id) => Some(contest_id),
            None => {
                let message = format!("`{}` doesn't look like a contest id", contest);
                tracing::error!(message);
                bail!(message);
            }
        },
        None => None,
    };

    let input = SubmissionClassificationInput {
        contest_id,
        timestamp: args.timestamp,
        participant_type: args.participant_type,
    };

    let service = build_service().await?;
    let label = service.classify_submission(&input).await;
    println!("{}", label);

    Ok(())
}
