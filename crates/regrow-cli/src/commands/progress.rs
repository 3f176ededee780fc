use clap::Subcommand;
use regrow_core::progress::{format_duration_ms, format_percent, next_locked};
use regrow_core::{Config, ProgressReport};

use super::{open_context, wants_json, CliResult};

#[derive(Subcommand)]
pub enum ProgressAction {
    /// Current streak, checkpoint and growth stage
    Show {
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// Achievement list with unlock status
    Achievements {
        /// Print JSON
        #[arg(long)]
        json: bool,
        /// Include locked achievements even if display.show_locked_achievements is off
        #[arg(long)]
        all: bool,
    },
}

pub fn run(action: ProgressAction) -> CliResult {
    let ctx = open_context()?;
    let report = ctx.report()?;

    match action {
        ProgressAction::Show { json } => {
            if wants_json(json)? {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
                if let Some(next) = next_locked(ctx.tables().achievements(), report.streak.elapsed_ms) {
                    println!(
                        "Next achievement: {} in {}",
                        next.title,
                        format_duration_ms(next.threshold_ms - report.streak.elapsed_ms)
                    );
                }
            }
        }
        ProgressAction::Achievements { json, all } => {
            let show_locked = all || Config::load()?.display.show_locked_achievements;
            let shown: Vec<_> = report
                .achievements
                .iter()
                .filter(|status| show_locked || status.unlocked)
                .collect();

            if wants_json(json)? {
                println!("{}", serde_json::to_string_pretty(&shown)?);
                return Ok(());
            }
            println!(
                "{}/{} unlocked",
                report.unlocked_count,
                report.achievements.len()
            );
            for status in shown {
                let mark = if status.unlocked { "[x]" } else { "[ ]" };
                println!(
                    "{mark} {:<20} {:>10}  {}",
                    status.achievement.title,
                    format_duration_ms(status.achievement.threshold_ms),
                    status.achievement.description
                );
            }
        }
    }
    Ok(())
}

/// Text rendering shared by `progress show` and `watch`.
pub fn print_report(report: &ProgressReport) {
    let streak = &report.streak;
    if streak.streak_start_timestamp.is_none() {
        println!("Journey not started.");
        return;
    }

    println!("Streak:      {}", format_duration_ms(streak.elapsed_ms));
    println!("Stage:       {}", report.growth_stage.label);

    let checkpoint = &report.checkpoint;
    let current = checkpoint
        .current_checkpoint
        .as_ref()
        .map_or("none yet", |c| c.label.as_str());
    match &checkpoint.next_checkpoint {
        Some(next) => println!(
            "Checkpoint:  {current} -> {} ({}, {} left)",
            next.label,
            format_percent(checkpoint.progress),
            format_duration_ms(checkpoint.remaining_ms)
        ),
        None => println!("Checkpoint:  {current} (all checkpoints reached)"),
    }

    println!(
        "Achievements: {}/{}",
        report.unlocked_count,
        report.achievements.len()
    );
    for warning in &streak.warnings {
        eprintln!("warning: {warning}");
    }
}
