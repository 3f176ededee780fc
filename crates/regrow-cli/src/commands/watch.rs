use std::ops::ControlFlow;
use std::time::Duration;

use clap::Args;
use regrow_core::progress::{format_duration_ms, format_percent};
use regrow_core::{Config, Database, ProgressSession, SystemClock, TickOutcome, Ticker};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use super::{open_context, CliResult};

#[derive(Args)]
pub struct WatchArgs {
    /// Tick period in milliseconds (defaults to ticker.interval_ms)
    #[arg(long)]
    interval_ms: Option<u64>,
    /// Print one JSON object per tick
    #[arg(long)]
    json: bool,
    /// Stop after this many ticks instead of waiting for Ctrl-C
    #[arg(long)]
    ticks: Option<u64>,
}

pub fn run(args: WatchArgs) -> CliResult {
    let config = Config::load()?;
    let interval_ms = args.interval_ms.unwrap_or(config.ticker.interval_ms);
    if interval_ms == 0 {
        return Err("--interval-ms must be greater than zero".into());
    }
    let json = args.json || config.display.json;

    let session =
        ProgressSession::new(open_context()?).with_celebrations(config.celebrations.enabled);

    let runtime = tokio::runtime::Runtime::new()?;
    let ticks = runtime.block_on(watch(
        session,
        Duration::from_millis(interval_ms),
        json,
        args.ticks,
    ));
    debug!(ticks, "watch stopped");
    Ok(())
}

async fn watch(
    mut session: ProgressSession<Database, SystemClock>,
    period: Duration,
    json: bool,
    limit: Option<u64>,
) -> u64 {
    let (done_tx, done_rx) = oneshot::channel::<()>();
    let mut done_tx = Some(done_tx);
    let mut count = 0u64;

    let ticker = Ticker::spawn(period, move || {
        count += 1;
        match session.tick() {
            Ok(outcome) => {
                render(&outcome, json);
                // Terminal celebrations dismiss themselves.
                if outcome.celebration.is_some() {
                    session.dismiss_celebration();
                }
            }
            Err(e) => warn!(error = %e, "tick failed"),
        }

        if limit.is_some_and(|n| count >= n) {
            if let Some(tx) = done_tx.take() {
                let _ = tx.send(());
            }
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    });

    tokio::select! {
        res = tokio::signal::ctrl_c() => {
            if let Err(e) = res {
                warn!(error = %e, "cannot listen for Ctrl-C");
            }
        }
        _ = done_rx => {}
    }
    ticker.cancel().await
}

fn render(outcome: &TickOutcome, json: bool) {
    if json {
        match serde_json::to_string(outcome) {
            Ok(line) => println!("{line}"),
            Err(e) => warn!(error = %e, "cannot serialize tick"),
        }
        return;
    }

    if let Some(achievement) = &outcome.celebration {
        println!("*** Achievement unlocked: {} ***", achievement.title);
        println!("    {}", achievement.description);
    }

    let report = &outcome.report;
    let next = match &report.checkpoint.next_checkpoint {
        Some(next) => format!(
            "{} to {}",
            format_percent(report.checkpoint.progress),
            next.label
        ),
        None => "all checkpoints reached".to_string(),
    };
    println!(
        "{} | {} | {}",
        format_duration_ms(report.streak.elapsed_ms),
        report.growth_stage.label,
        next
    );
}
