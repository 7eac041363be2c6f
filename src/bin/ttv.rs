use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, FixedOffset, Local, NaiveDate};
use clap::{Parser, Subcommand};
use timetable_view::{
    CalendarEvent, ResourceLimiter, Timetable, TtvConfig, TtvError, ViewCompiled, ViewPolicy,
};
use tracing::{info, Level};

#[derive(Parser)]
#[command(author, version, about = "Timetable View renderer")]
struct Cli {
    /// Log more; repeat for trace output.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse, validate and compile a view definition.
    Check {
        view: PathBuf,
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
    /// Render one day of events through a view as an HTML fragment.
    Render {
        #[arg(long)]
        view: PathBuf,
        #[arg(long)]
        events: PathBuf,
        /// Day to list, `YYYY-MM-DD`; defaults to the day of `--now`.
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Instant used for event progress, RFC 3339; defaults to the current time.
        #[arg(long)]
        now: Option<DateTime<FixedOffset>>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        strict: bool,
        /// Leave URLs in event text as plain text.
        #[arg(long, default_value_t = false)]
        no_links: bool,
    },
    /// Print the proxied address the calendar feed is fetched from.
    FeedUrl {
        #[arg(long, default_value = "ttv.toml")]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Command::Check { view, strict } => check_view(&view, strict),
        Command::Render {
            view,
            events,
            date,
            now,
            output,
            strict,
            no_links,
        } => {
            let policy = ViewPolicy {
                strict_tokens: strict,
                link_urls: !no_links,
            };
            render_day(&view, &events, date, now, output.as_deref(), policy)
        }
        Command::FeedUrl { config } => print_feed_url(&config),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
}

/// Library errors keep their diagnostic rendering (code, help, source window).
fn diagnostic(err: TtvError) -> anyhow::Error {
    anyhow!("{:?}", miette::Report::new(err))
}

fn load_view(path: &Path, policy: ViewPolicy) -> Result<ViewCompiled> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    ViewCompiled::from_json(&raw, policy, ResourceLimiter::default())
        .map_err(diagnostic)
        .with_context(|| format!("compile view {}", path.display()))
}

fn check_view(path: &Path, strict: bool) -> Result<()> {
    let policy = ViewPolicy {
        strict_tokens: strict,
        ..ViewPolicy::default()
    };
    let view = load_view(path, policy)?;
    println!(
        "{}: ok ({} lines, {} shaders)",
        view.title(),
        view.lines().len(),
        view.shaders().len()
    );
    Ok(())
}

fn render_day(
    view_path: &Path,
    events_path: &Path,
    date: Option<NaiveDate>,
    now: Option<DateTime<FixedOffset>>,
    output: Option<&Path>,
    policy: ViewPolicy,
) -> Result<()> {
    let view = load_view(view_path, policy)?;
    let raw = fs::read_to_string(events_path)
        .with_context(|| format!("read {}", events_path.display()))?;
    let events = CalendarEvent::list_from_json(&raw)
        .map_err(diagnostic)
        .with_context(|| format!("parse events {}", events_path.display()))?;

    let now = now.unwrap_or_else(|| Local::now().into());
    let day = date.unwrap_or_else(|| now.date_naive());
    let timetable = Timetable::new(view, events);
    let listing = timetable.render_day(day, now);
    info!(day = %day, events = listing.items.len(), "rendered listing");

    let html = listing.to_fragment();
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, html).with_context(|| format!("write {}", path.display()))?;
        }
        None => print!("{html}"),
    }
    Ok(())
}

fn print_feed_url(path: &Path) -> Result<()> {
    let config = TtvConfig::load(path).with_context(|| format!("load {}", path.display()))?;
    let url = config
        .feed_url()
        .ok_or_else(|| anyhow!("{} has no ical_href", path.display()))?;
    println!("{url}");
    Ok(())
}
