use chrono::{DateTime, Utc};
use clap::Subcommand;
use regrow_core::progress::format_duration_ms;
use regrow_core::progress::tables::MINUTE_MS;
use regrow_core::{EventStore, NewRelapse, NotificationGuard, RelapsePatch};

use super::{open_context, wants_json, CliResult};

#[derive(Subcommand)]
pub enum RelapseAction {
    /// Record a relapse (now, unless --at is given)
    Record {
        /// When it happened, RFC 3339 (e.g. "2024-05-01T21:30:00Z")
        #[arg(long, value_parser = parse_at)]
        at: Option<DateTime<Utc>>,
        /// Free-form note
        #[arg(long)]
        note: Option<String>,
        /// Tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Edit the note or tags of a relapse
    Edit {
        /// Relapse ID
        id: String,
        /// Replace the note; an empty string clears it
        #[arg(long)]
        note: Option<String>,
        /// Replace tags with these (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Remove all tags
        #[arg(long, conflicts_with = "tags")]
        clear_tags: bool,
    },
    /// List relapses, oldest first
    List {
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_at(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("invalid timestamp '{raw}': {e}"))
}

pub fn run(action: RelapseAction) -> CliResult {
    let ctx = open_context()?;

    match action {
        RelapseAction::Record { at, note, tags } => {
            let mut event = NewRelapse::at(at.unwrap_or_else(Utc::now));
            if let Some(note) = note {
                event = event.with_note(note);
            }
            for tag in tags {
                event = event.with_tag(tag);
            }
            // One-shot command: the guard lives only for this process.
            let mut guard = NotificationGuard::new();
            let id = ctx.record_relapse(&mut guard, event)?;
            println!("Relapse recorded: {id}");

            let streak = ctx.resolve_streak()?;
            if streak.latest_event_id.as_deref() != Some(id.as_str()) {
                println!(
                    "Logged as a past relapse. Your current streak of {} continues.",
                    format_duration_ms(streak.elapsed_ms)
                );
            } else if streak.elapsed_ms < MINUTE_MS {
                println!("A new streak starts now. Every hour counts.");
            } else {
                println!(
                    "A new streak started {} ago.",
                    format_duration_ms(streak.elapsed_ms)
                );
            }
        }
        RelapseAction::Edit {
            id,
            note,
            tags,
            clear_tags,
        } => {
            let patch = RelapsePatch {
                note: note.map(|n| if n.is_empty() { None } else { Some(n) }),
                tags: if clear_tags {
                    Some(Default::default())
                } else if tags.is_empty() {
                    None
                } else {
                    Some(tags.into_iter().collect())
                },
            };
            if patch.is_empty() {
                return Err("nothing to change: pass --note, --tag or --clear-tags".into());
            }
            ctx.edit_relapse(&id, &patch)?;
            println!("Relapse updated: {id}");
        }
        RelapseAction::List { json } => {
            let events = ctx.store().list()?;
            if wants_json(json)? {
                println!("{}", serde_json::to_string_pretty(&events)?);
                return Ok(());
            }
            if events.is_empty() {
                println!("No relapses recorded.");
            }
            for event in &events {
                let mut line = format!("{}  {}", event.id, event.timestamp);
                if !event.tags.is_empty() {
                    let tags: Vec<&str> = event.tags.iter().map(String::as_str).collect();
                    line.push_str(&format!("  [{}]", tags.join(", ")));
                }
                if let Some(note) = &event.note {
                    line.push_str(&format!("  {note}"));
                }
                println!("{line}");
            }
        }
    }
    Ok(())
}
