pub mod completions;
pub mod config;
pub mod progress;
pub mod relapse;
pub mod stats;
pub mod watch;

use std::sync::Arc;

use regrow_core::{Config, Database, EngineContext, ProgressTables, SystemClock};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

pub type Context = EngineContext<Database, SystemClock>;

/// Open the on-disk store, starting the journey on first use.
pub fn open_context() -> Result<Context, Box<dyn std::error::Error>> {
    let ctx = EngineContext::new(
        Arc::new(ProgressTables::builtin()),
        Database::open()?,
        SystemClock,
    );
    ctx.ensure_journey_started()?;
    Ok(ctx)
}

/// `--json` on the command line, or `display.json` in the config.
pub fn wants_json(flag: bool) -> Result<bool, Box<dyn std::error::Error>> {
    Ok(flag || Config::load()?.display.json)
}
