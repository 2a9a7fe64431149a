mod cmd;
mod modules;

use crate::cmd::{
    classify::{self, ClassifyArgs},
    clear_cache::{self, ClearCacheArgs},
    group::{self, GroupArgs},
    metadata::{self, MetadataArgs},
    options::{self, OptionsArgs},
    server::{self, ServerArgs},
};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::{env, str::FromStr};
use tokio::runtime::Builder;
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt::{self, time::OffsetTime},
};

#[derive(Debug, Parser)]
#[command(name = "contest_grouping")]
#[command(about = "Group Codeforces submissions by contest")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show the cached or fetched metadata of a contest
    Metadata(MetadataArgs),
    /// Label a single submission
    Classify(ClassifyArgs),
    /// Show or change the stored options
    Options(OptionsArgs),
    /// Drop every cached contest
    ClearCache(ClearCacheArgs),
    /// Group the submissions of a user under contest headers
    Group(GroupArgs),
    /// Serve the message endpoint on localhost
    Server(ServerArgs),
}

fn main() {
    dotenv().ok();

    let log_level = env::var("RUST_LOG").unwrap_or(String::from("info"));
    let filter = EnvFilter::builder()
        .with_default_directive(
            LevelFilter::from_str(&log_level)
                .expect("couldn't parse specified log level")
                .into(),
        )
        .from_env_lossy();
    let format = fmt::format()
        .with_level(true)
        .with_target(true)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_timer(OffsetTime::local_rfc_3339().unwrap());
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .event_format(format)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("failed to set tracing subscriber");

    let runtime = Builder::new_multi_thread().enable_all().build().unwrap();

    match Cli::parse().command {
        Commands::Metadata(args) => runtime.block_on(metadata::run(args)),
        Commands::Classify(args) => runtime.block_on(classify::run(args)),
        Commands::Options(args) => runtime.block_on(options::run(args)),
        Commands::ClearCache(args) => runtime.block_on(clear_cache::run(args)),
        Commands::Group(args) => runtime.block_on(group::run(args)),
        Commands::Server(args) => runtime.block_on(server::run(args)),
    }
    .expect("command failed");
}
