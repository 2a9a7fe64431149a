use crate::cmd::build_service;
use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use contest_grouping_libs::options::Options;

#[derive(Debug, Args)]
pub struct OptionsArgs {
    #[command(subcommand)]
    command: OptionsCommand,
}

#[derive(Debug, Subcommand)]
enum OptionsCommand {
    /// Print the stored options
    Get,
    /// Change some of the stored options and keep the rest
    Set(SetArgs),
}

#[derive(Debug, Args)]
struct SetArgs {
    #[arg(long)]
    enabled: Option<bool>,
    #[arg(long)]
    use_remote_lookup: Option<bool>,
    #[arg(long)]
    cache_ttl_hours: Option<f64>,
    #[arg(long)]
    rate_limit_ms: Option<f64>,
}

impl SetArgs {
    fn apply(&self, options: Options) -> Options {
        Options {
            enabled: self.enabled.unwrap_or(options.enabled),
            use_remote_lookup: self.use_remote_lookup.unwrap_or(options.use_remote_lookup),
            cache_ttl_hours: self.cache_ttl_hours.unwrap_or(options.cache_ttl_hours),
            rate_limit_ms: self.rate_limit_ms.unwrap_or(options.rate_limit_ms),
        }
    }
}

pub async fn run(args: OptionsArgs) -> Result<()> {
    let service = build_service().await?;

    let options = match args.command {
        OptionsCommand::Get => service.get_options().await,
        OptionsCommand::Set(set) => {
            let options = set.apply(service.get_options().await);
            service.set_options(&options).await.with_context(|| {
                let message = "failed to save options";
                tracing::error!(message);
                message
            })?;
            options
        }
    };
    println!("{}", serde_json::to_string_pretty(&options)?);

    Ok(())
}
