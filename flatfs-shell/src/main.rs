//! Interactive front end for an in-memory flatfs volume.
//!
//! Reads one command per line from stdin and prints a notice for each. The
//! volume lives only as long as the process.

mod command;
mod session;

use std::io;

use clap::Parser;
use flatfs::{FullPolicy, Volume, DEFAULT_BLOCK_SIZE, DEFAULT_CAPACITY};
use log::info;

#[derive(Parser, Debug)]
#[command(name = "flatfs-shell")]
#[command(about = "Create, delete, read and write files on a simulated block volume")]
struct Args {
    /// Number of blocks in the pool
    #[arg(short = 'b', long, default_value_t = DEFAULT_CAPACITY)]
    blocks: usize,

    /// Bytes covered by each block
    #[arg(short = 's', long, default_value_t = DEFAULT_BLOCK_SIZE)]
    block_size: u64,

    /// Return blocks taken by a create that runs out of space instead of
    /// leaving them orphaned
    #[arg(long)]
    rollback: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let policy = if args.rollback {
        FullPolicy::Rollback
    } else {
        FullPolicy::Leak
    };
    let mut vol = Volume::builder()
        .with_capacity(args.blocks)
        .with_block_size(args.block_size)
        .with_full_policy(policy)
        .build()?;
    info!(
        "volume ready: {} blocks of {} bytes, {:?} on disk full",
        vol.capacity(),
        vol.block_size(),
        policy
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    session::run(&mut vol, stdin.lock(), stdout.lock())?;
    Ok(())
}
