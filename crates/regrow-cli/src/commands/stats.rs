use regrow_core::progress::format_duration_ms;

use super::{open_context, wants_json, CliResult};

pub fn run(json: bool) -> CliResult {
    let ctx = open_context()?;
    let streak = ctx.resolve_streak()?;

    if wants_json(json)? {
        println!("{}", serde_json::to_string_pretty(&streak)?);
        return Ok(());
    }

    println!("Current streak: {}", format_duration_ms(streak.elapsed_ms));
    println!("Best streak:    {}", format_duration_ms(streak.best_streak_ms));
    println!("Relapses:       {}", streak.total_attempts);
    if streak.is_personal_best() {
        println!("You are on your best streak so far.");
    }
    for warning in &streak.warnings {
        eprintln!("warning: {warning}");
    }
    Ok(())
}
