use std::fmt::Write as _;
use std::io::{self, Read};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use time::{Date, Duration};

use crate::app::App;
use crate::calendar::{today, DateKey, MonthKey};
use crate::config::AppConfig;
use crate::diary::{DiaryEntry, DiaryIndex};
use crate::stats::MonthlyStats;
use crate::storage::DiaryStore;

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// Title for the entry (prompted if omitted)
    #[arg()]
    pub title: Option<String>,
    /// Emotion tag for the entry (prompted if omitted)
    #[arg(long)]
    pub emotion: Option<String>,
    /// Entry date as YYYY-MM-DD (defaults to today)
    #[arg(long)]
    pub date: Option<String>,
    /// Provide the entry content inline. If omitted, reads from stdin.
    #[arg(long)]
    pub content: Option<String>,
    /// Attach an image path or URL (repeatable)
    #[arg(long = "image")]
    pub images: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct EditArgs {
    /// Id of the diary entry to revise
    #[arg()]
    pub id: String,
    /// Replace the entry title
    #[arg(long)]
    pub title: Option<String>,
    /// Replace the emotion tag
    #[arg(long)]
    pub emotion: Option<String>,
    /// Replace the entry date as YYYY-MM-DD
    #[arg(long)]
    pub date: Option<String>,
    /// Replace the entry content
    #[arg(long)]
    pub content: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// How many days back to list
    #[arg(long, default_value_t = 7)]
    pub days: u32,
}

#[derive(Args, Debug, Clone)]
pub struct StatsArgs {
    /// Month to summarise as YYYY-MM (defaults to the current month)
    #[arg(long)]
    pub month: Option<String>,
}

pub fn run_tui(app: &mut App) -> Result<()> {
    app.run()
}

pub fn add_entry(config: Arc<AppConfig>, store: DiaryStore, args: AddArgs) -> Result<()> {
    let mut title = match args.title {
        Some(t) => t,
        None => prompt("Title")?,
    };
    title = title.trim().to_owned();
    if title.is_empty() {
        bail!("diary title cannot be empty");
    }

    let mut emotion = match args.emotion {
        Some(e) => e,
        None => prompt("Emotion")?,
    };
    emotion = emotion.trim().to_lowercase();
    if emotion.is_empty() {
        bail!("emotion cannot be empty");
    }
    let registry = config.emotion_registry();
    if !registry.contains(&emotion) {
        let known = registry.known_tags().collect::<Vec<_>>().join(", ");
        bail!("unknown emotion '{emotion}' (expected one of: {known})");
    }

    let date = args
        .date
        .unwrap_or_else(|| DateKey::from_date(today()).to_string());
    let date_key = match DateKey::normalize(&date) {
        Some(key) => key,
        None => bail!("invalid date '{date}' (expected YYYY-MM-DD)"),
    };

    let content = if let Some(content) = args.content {
        content
    } else {
        read_stdin()?.unwrap_or_else(|| String::from(""))
    };

    let entry = store
        .create_entry(&title, &emotion, &date_key.to_string(), &content, args.images)
        .context("recording diary entry")?;
    println!(
        "Recorded {} entry '{}' for {}",
        entry.emotion, entry.title, date_key
    );
    Ok(())
}

pub fn edit_entry(config: Arc<AppConfig>, store: DiaryStore, args: EditArgs) -> Result<()> {
    if args.title.is_none()
        && args.emotion.is_none()
        && args.date.is_none()
        && args.content.is_none()
    {
        bail!("nothing to change (pass --title, --emotion, --date, or --content)");
    }

    let entries = store.fetch_all()?;
    let Some(mut entry) = entries.into_iter().find(|entry| entry.id == args.id) else {
        bail!("no diary entry with id '{}'", args.id);
    };

    if let Some(title) = args.title {
        let title = title.trim().to_owned();
        if title.is_empty() {
            bail!("diary title cannot be empty");
        }
        entry.title = title;
    }
    if let Some(emotion) = args.emotion {
        let emotion = emotion.trim().to_lowercase();
        if emotion.is_empty() {
            bail!("emotion cannot be empty");
        }
        let registry = config.emotion_registry();
        if !registry.contains(&emotion) {
            let known = registry.known_tags().collect::<Vec<_>>().join(", ");
            bail!("unknown emotion '{emotion}' (expected one of: {known})");
        }
        entry.emotion = emotion;
    }
    if let Some(date) = args.date {
        let date_key = match DateKey::normalize(&date) {
            Some(key) => key,
            None => bail!("invalid date '{date}' (expected YYYY-MM-DD)"),
        };
        entry.date = Some(date_key.to_string());
    }
    if let Some(content) = args.content {
        entry.content = content;
    }

    let entry = store.update_entry(entry).context("revising diary entry")?;
    println!(
        "Revised {} entry '{}' ({})",
        entry.emotion, entry.title, entry.id
    );
    Ok(())
}

pub fn list_entries(config: Arc<AppConfig>, store: DiaryStore, args: ListArgs) -> Result<()> {
    let output = run_list(&config, &store, &args)?;
    print!("{output}");
    Ok(())
}

fn run_list(config: &AppConfig, store: &DiaryStore, args: &ListArgs) -> Result<String> {
    if args.days == 0 {
        bail!("listing window cannot be zero days");
    }
    let entries = store.fetch_all()?;
    let index = DiaryIndex::build(&entries);

    let end = today();
    let start = end
        .checked_sub(Duration::days(i64::from(args.days) - 1))
        .unwrap_or(Date::MIN);
    let window: Vec<_> = index
        .between(DateKey::from_date(start), DateKey::from_date(end))
        .rev()
        .collect();

    if window.is_empty() {
        return Ok(format!(
            "No diary entries in the last {} day{}.\n",
            args.days,
            if args.days == 1 { "" } else { "s" }
        ));
    }

    let registry = config.emotion_registry();
    let mut out = String::new();
    for (date, bucket) in window {
        let count = bucket.len();
        let noun = if count == 1 { "entry" } else { "entries" };
        let _ = writeln!(&mut out, "{date}  ({count} {noun})");
        for entry in bucket {
            let style = registry.style_or_default(&entry.emotion);
            let _ = writeln!(&mut out, "  {} {}", style.glyph, entry.title);
            if let Some(snippet) = content_snippet(entry) {
                let _ = writeln!(&mut out, "     {snippet}");
            }
        }
        out.push('\n');
    }
    Ok(out)
}

pub fn month_stats(config: Arc<AppConfig>, store: DiaryStore, args: StatsArgs) -> Result<()> {
    let output = run_month_stats(&config, &store, &args)?;
    print!("{output}");
    Ok(())
}

fn run_month_stats(config: &AppConfig, store: &DiaryStore, args: &StatsArgs) -> Result<String> {
    let month = match args.month.as_deref() {
        Some(raw) => match MonthKey::parse(raw) {
            Some(month) => month,
            None => bail!("invalid month '{raw}' (expected YYYY-MM)"),
        },
        None => MonthKey::from_date(today()),
    };

    let entries = store.fetch_all()?;
    let index = DiaryIndex::build(&entries);
    let stats = MonthlyStats::aggregate(&index, month);

    let mut out = String::new();
    let _ = writeln!(&mut out, "Diary stats for {month}");
    if stats.total == 0 {
        let _ = writeln!(&mut out, "(no diary entries this month)");
        return Ok(out);
    }

    let registry = config.emotion_registry();
    for stat in &stats.stats {
        let label = registry
            .style(&stat.emotion)
            .map(|style| style.label)
            .unwrap_or(stat.emotion.as_str());
        let percent = stat.count as f64 / stats.total as f64 * 100.0;
        let _ = writeln!(&mut out, "{label:<14} {:>3}  {percent:>5.1}%", stat.count);
    }
    let _ = writeln!(&mut out, "{:<14} {:>3}", "total", stats.total);
    Ok(out)
}

fn prompt(label: &str) -> Result<String> {
    use std::io::Write;
    let mut stdout = io::stdout();
    write!(stdout, "{}: ", label)?;
    stdout.flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim_end().to_owned())
}

fn read_stdin() -> Result<Option<String>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(Some(buf))
}

fn content_snippet(entry: &DiaryEntry) -> Option<String> {
    let line = entry.content.lines().find(|line| !line.trim().is_empty())?;
    Some(line.trim().chars().take(80).collect())
}
