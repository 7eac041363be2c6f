//! One day of a calendar rendered through a compiled view.

use std::fmt::Write as _;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate};
use tracing::{debug, instrument};

use crate::escape::push_encoded;
use crate::evaluator::ArticleState;
use crate::event::CalendarEvent;
use crate::markup::Article;
use crate::view::ViewCompiled;

/// A compiled view together with the events it renders, sorted by start.
#[derive(Debug)]
pub struct Timetable {
    view: ViewCompiled,
    events: Vec<CalendarEvent>,
}

impl Timetable {
    pub fn new(view: ViewCompiled, mut events: Vec<CalendarEvent>) -> Self {
        events.sort_by_key(|event| event.start);
        Self { view, events }
    }

    pub fn view(&self) -> &ViewCompiled {
        &self.view
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    /// Events running at any point of `day`, compared in each event's own offset.
    pub fn events_on(&self, day: NaiveDate) -> impl Iterator<Item = &CalendarEvent> {
        self.events
            .iter()
            .filter(move |event| event.start.date_naive() <= day && day <= event.end.date_naive())
    }

    #[instrument(skip(self), fields(view = self.view.title()))]
    pub fn render_day(&self, day: NaiveDate, now: DateTime<FixedOffset>) -> DayListing {
        let items: Vec<ListItem> = self
            .events_on(day)
            .map(|event| ListItem {
                progress: progress(event, now),
                article: self.view.build_article(&ArticleState { event }),
            })
            .collect();
        debug!(events = items.len(), "rendered day");
        DayListing {
            heading: day_heading(day),
            title: self.view.title().to_string(),
            items,
        }
    }
}

/// How far through `event` the instant `now` is, from 0 to 1.
pub fn progress(event: &CalendarEvent, now: DateTime<FixedOffset>) -> f64 {
    let length = (event.end - event.start).num_milliseconds();
    let elapsed = (now - event.start).num_milliseconds();
    if length <= 0 {
        return if elapsed >= 0 { 1.0 } else { 0.0 };
    }
    (elapsed as f64 / length as f64).clamp(0.0, 1.0)
}

/// `Events - D/M/YYYY`
pub fn day_heading(day: NaiveDate) -> String {
    format!("Events - {}/{}/{}", day.day(), day.month(), day.year())
}

#[derive(Clone, Debug, PartialEq)]
pub struct ListItem {
    pub progress: f64,
    pub article: Article,
}

/// The rendered events of one day.
#[derive(Clone, Debug, PartialEq)]
pub struct DayListing {
    pub heading: String,
    pub title: String,
    pub items: Vec<ListItem>,
}

impl DayListing {
    /// The `<ol id="events">` list, one `<li>` per event.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_list(&mut out);
        out
    }

    /// View title, day heading and event list.
    pub fn to_fragment(&self) -> String {
        let mut out = String::new();
        out.push_str("<h1 id=\"view-title\">");
        push_encoded(&mut out, &self.title);
        out.push_str("</h1>\n<h2 id=\"ttv-events-heading\">");
        push_encoded(&mut out, &self.heading);
        out.push_str("</h2>\n");
        self.write_list(&mut out);
        out.push('\n');
        out
    }

    fn write_list(&self, out: &mut String) {
        out.push_str("<ol id=\"events\">");
        for item in &self.items {
            let _ = write!(out, "<li style=\"--event-progress: {:.2}\">", item.progress);
            item.article.write_html(out);
            out.push_str("</li>");
        }
        out.push_str("</ol>");
    }
}
