use std::io::Write;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::Parser;

use parlor::types::{
    BotKind, DEFAULT_BOT_DELAY_MS, DEFAULT_CLOCK_SECS, DEFAULT_DEPTH, EngineConfig, MAX_DEPTH,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Search depth of the minimax bot, in plies
    #[arg(long, default_value_t = DEFAULT_DEPTH)]
    depth: u8,

    /// Bot move selector: minimax or random
    #[arg(long, default_value = "minimax")]
    bot: String,

    /// Time per side in seconds
    #[arg(long, default_value_t = DEFAULT_CLOCK_SECS)]
    clock: u64,

    /// Pause before the bot replies, in milliseconds
    #[arg(long, default_value_t = DEFAULT_BOT_DELAY_MS)]
    delay: u64,

    /// Seed for the random bot and room codes
    #[arg(long)]
    seed: Option<u64>,
}

fn main() {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, log_level),
    )
    .format(|buf, record| {
        writeln!(buf, "[{}] {}: {}", record.level(), record.target(), record.args())
    })
    .target(env_logger::Target::Stderr)
    .init();

    if let Err(e) = run(args) {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let Some(bot) = BotKind::parse(&args.bot) else {
        bail!("unknown bot `{}` (expected minimax or random)", args.bot);
    };
    if args.depth == 0 || args.depth > MAX_DEPTH {
        bail!("depth must be between 1 and {}", MAX_DEPTH);
    }
    if args.clock == 0 {
        bail!("clock must be at least one second");
    }

    let config = EngineConfig {
        depth: args.depth,
        bot,
        clock: Duration::from_secs(args.clock),
        bot_delay: Duration::from_millis(args.delay),
        seed: args.seed,
    };
    log::info!("starting with {:?}", config);
    parlor::console::run(config);
    Ok(())
}
