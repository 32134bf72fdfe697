use std::sync::{Mutex, PoisonError};

use crate::spotify::Track;

pub const PROMPT_MESSAGE: &str = "Please describe your mood first! 😊";
pub const THINKING_MESSAGE: &str = "Analyzing your mood...";
pub const NOT_FOUND_MESSAGE: &str = "No matching track found 😢";

/// Shown for every failure, whatever the cause. Details only go to the log.
pub const GENERIC_ERROR: &str = "Something went wrong! Please check that your API keys are correct. 🧩";

/// What the result region should show right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Prompt,
    Thinking,
    Searching { mood: String },
    Found { mood: String, track: Track },
    NotFound { mood: String },
    Error { message: String },
}

pub trait Presenter: Send + Sync {
    fn present(&self, view: &View);
}

pub fn render_text(view: &View) -> String {
    match view {
        View::Prompt => PROMPT_MESSAGE.to_string(),
        View::Thinking => THINKING_MESSAGE.to_string(),
        View::Searching { mood } => format!("{}\nSearching for music...", mood_line(mood)),
        View::Found { mood, track } => format!(
            "{}\nRecommended track: {} - {}\n🎵 Listen: {}",
            mood_line(mood),
            track.name,
            track.artist,
            track.url
        ),
        View::NotFound { mood } => format!("{}\n{}", mood_line(mood), NOT_FOUND_MESSAGE),
        View::Error { message } => message.clone(),
    }
}

fn mood_line(mood: &str) -> String {
    format!("Detected mood: {} 🎯", mood)
}

pub fn render_html(view: &View) -> String {
    match view {
        View::Prompt => paragraph(PROMPT_MESSAGE),
        View::Thinking => paragraph(THINKING_MESSAGE),
        View::Searching { mood } => mood_html(mood),
        View::Found { mood, track } => format!(
            "{}\n<p>Recommended track:</p>\n<p><strong>{}</strong> - {}</p>\n<p><a href=\"{}\" target=\"_blank\">🎵 Listen now</a></p>",
            mood_html(mood),
            escape_html(&track.name),
            escape_html(&track.artist),
            escape_html(&track.url)
        ),
        View::NotFound { mood } => format!("{}\n{}", mood_html(mood), paragraph(NOT_FOUND_MESSAGE)),
        View::Error { message } => paragraph(message),
    }
}

fn paragraph(text: &str) -> String {
    format!("<p>{}</p>", escape_html(text))
}

fn mood_html(mood: &str) -> String {
    format!(
        "<p>Detected mood: <strong>{}</strong> 🎯<br>Searching for music...</p>",
        escape_html(mood)
    )
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Prints every view as it arrives.
pub struct TerminalPresenter;

impl Presenter for TerminalPresenter {
    fn present(&self, view: &View) {
        println!("{}", render_text(view));
    }
}

/// Holds the HTML of the latest view, overwriting it on every update.
#[derive(Default)]
pub struct HtmlPresenter {
    region: Mutex<String>,
}

impl HtmlPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn html(&self) -> String {
        self.region
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Presenter for HtmlPresenter {
    fn present(&self, view: &View) {
        *self.region.lock().unwrap_or_else(PoisonError::into_inner) = render_html(view);
    }
}
