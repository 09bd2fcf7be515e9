// KAlarm scheduling core
// Command-line entry point

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};

use kalarm_core::models::collection::version_string;
use kalarm_core::models::event::{Alarm, AlarmAction, AlarmEvent};
use kalarm_core::services::collection::CollectionService;
use kalarm_core::services::database::Database;
use kalarm_core::services::occurrence::{occurrences_from, parse_rrule_builder};
use kalarm_core::services::settings::{self, SettingsService};
use kalarm_core::services::status;

#[derive(Parser)]
#[command(name = "kalarm-core")]
#[command(about = "Evaluate alarm recurrences and inspect alarm collections")]
struct Cli {
    /// Settings file to use instead of the per-user default
    #[arg(long, global = true)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List upcoming occurrences of a recurrence rule
    Next {
        /// RRULE text (e.g. "FREQ=WEEKLY;BYDAY=MO,WE")
        #[arg(short, long)]
        rule: String,

        /// Rule start (e.g. "2025-03-20" or "2025-03-20T15:00")
        #[arg(short, long)]
        start: String,

        /// List occurrences at or after this time (defaults to the start)
        #[arg(short, long)]
        from: Option<String>,

        /// Number of occurrences (defaults to preview_count from settings)
        #[arg(short, long)]
        count: Option<usize>,

        /// Treat the rule as date-only
        #[arg(long)]
        all_day: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// List stored collections and their alarm type policies
    Collections,
    /// Show the status an event would be classified with
    Classify {
        /// Event UID
        #[arg(short, long)]
        uid: String,

        /// Value of the X-KDE-KALARM-TYPE property
        #[arg(short, long)]
        property: Option<String>,

        /// Describe an event without any alarms
        #[arg(long)]
        no_alarms: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let settings_service = match cli.config {
        Some(path) => SettingsService::new(path),
        None => SettingsService::from_default_location()?,
    };

    match cli.command {
        Commands::Next {
            rule,
            start,
            from,
            count,
            all_day,
            json,
        } => cmd_next(&settings_service, &rule, &start, from.as_deref(), count, all_day, json),
        Commands::Collections => cmd_collections(&settings_service),
        Commands::Classify {
            uid,
            property,
            no_alarms,
        } => cmd_classify(&uid, property, no_alarms),
    }
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM` or `YYYY-MM-DDTHH:MM:SS`.
fn parse_datetime(text: &str) -> Result<NaiveDateTime> {
    let text = text.trim();
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(parsed);
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .with_context(|| format!("Invalid date/time '{}'", text))
}

fn cmd_next(
    settings_service: &SettingsService,
    rule: &str,
    start: &str,
    from: Option<&str>,
    count: Option<usize>,
    all_day: bool,
    json: bool,
) -> Result<()> {
    let settings = settings_service.load()?;
    let start = parse_datetime(start)?;
    let from = match from {
        Some(text) => parse_datetime(text)?,
        None => start,
    };

    let rule = parse_rrule_builder(rule, start, settings.default_feb29_policy)?
        .all_day(all_day)
        .build()?;
    let count = count.unwrap_or(settings.preview_count);

    let occurrences: Vec<_> = occurrences_from(&rule, from, Some(count))?.collect();
    log::debug!("Rule {} produced {} occurrences", rule.to_rrule(), occurrences.len());

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&occurrences).context("Failed to encode occurrences")?
        );
        return Ok(());
    }

    if occurrences.is_empty() {
        println!("No occurrences.");
    }
    for occurrence in &occurrences {
        println!("{}", occurrence);
    }
    Ok(())
}

fn cmd_collections(settings_service: &SettingsService) -> Result<()> {
    let settings = settings_service.load()?;
    let path = settings::database_path(&settings)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create data directory at {}", parent.display()))?;
    }

    let db = Database::new(&path.to_string_lossy())?;
    db.initialize_schema()?;
    let service = CollectionService::new(db.connection());

    let collections = service.list_all()?;
    if collections.is_empty() {
        println!("No collections in {}", path.display());
        return Ok(());
    }

    for collection in collections {
        println!("{}", collection.name);
        if let Some(location) = &collection.location {
            println!("  location:      {}", location);
        }
        println!("  enabled:       {}", collection.policy.enabled_types());
        println!("  standard for:  {}", collection.policy.standard_types());
        println!(
            "  compatibility: {:?} {}",
            collection.compatibility.compatibility,
            version_string(collection.compatibility.version)
        );
        if let Some(color) = collection.policy.background_color() {
            println!("  color:         {}", color.to_hex());
        }
    }
    Ok(())
}

fn cmd_classify(uid: &str, property: Option<String>, no_alarms: bool) -> Result<()> {
    let mut builder = AlarmEvent::builder()
        .uid(uid)
        .start(chrono::Local::now().naive_local());
    if !no_alarms {
        builder = builder.alarm(Alarm::new(AlarmAction::Display, ""));
    }
    if let Some(value) = property {
        builder = builder.custom_property(status::STATUS_PROPERTY, value);
    }
    let event = builder.build().map_err(|e| anyhow::anyhow!("{}", e))?;

    let event_status = status::classify(&event);
    match event_status.parameter {
        Some(param) => println!("{:?} ({})", event_status.kind, param),
        None => println!("{:?}", event_status.kind),
    }
    Ok(())
}
