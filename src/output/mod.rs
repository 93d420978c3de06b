pub mod report;

use std::io::Write;

use colored::{Color, Colorize};
use serde::Serialize;

use crate::catalog::{CatalogError, EntityDetail, EntitySummary, SortKey, ViewMode};
use crate::controller::PaginationState;
use crate::session::{PageEntry, PageView};
use crate::utils;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }
}

// one rendered card
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CardRecord {
    pub id: u32,
    pub label: String,
    pub name: String,
    pub sprite_url: String,
    pub categories: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PageRecord {
    pub pagination: PaginationState,
    pub mode: ViewMode,
    pub sort: SortKey,
    pub cards: Vec<CardRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub fn build_records(entries: &[PageEntry], sprite_base: &str) -> Vec<CardRecord> {
    entries
        .iter()
        .map(|entry| CardRecord {
            id: entry.summary.id,
            label: utils::format_id(entry.summary.id),
            name: utils::capitalize(&entry.summary.name),
            sprite_url: utils::sprite_url(sprite_base, entry.summary.id),
            categories: entry
                .detail
                .as_ref()
                .map(|d| d.categories.clone())
                .unwrap_or_default(),
        })
        .collect()
}

pub fn build_page_record(view: &PageView, sprite_base: &str) -> PageRecord {
    let (cards, message) = match view.results() {
        Ok(entries) => (build_records(entries, sprite_base), None),
        Err(e) => (Vec::new(), Some(e.to_string())),
    };
    PageRecord {
        pagination: view.pagination,
        mode: view.mode.clone(),
        sort: view.sort,
        cards,
        message,
    }
}

pub fn badge_color(category: &str) -> Color {
    match category.to_lowercase().as_str() {
        "fire" => Color::Red,
        "water" | "ice" => Color::Blue,
        "grass" | "bug" => Color::Green,
        "electric" => Color::Yellow,
        "psychic" | "fairy" => Color::Magenta,
        "ghost" | "poison" | "dragon" => Color::BrightMagenta,
        "ground" | "rock" | "fighting" => Color::BrightYellow,
        "flying" => Color::Cyan,
        "dark" | "steel" => Color::BrightBlack,
        _ => Color::White,
    }
}

fn render_badges(categories: &[String]) -> String {
    categories
        .iter()
        .map(|c| format!("[{}]", c).color(badge_color(c)).to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn render_card(card: &CardRecord) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}  {}\n",
        card.label.bold().white(),
        card.name.bold().green()
    ));
    if !card.categories.is_empty() {
        out.push_str(&format!("       {}\n", render_badges(&card.categories)));
    }
    out.push_str(&format!("       {}\n", card.sprite_url.dimmed()));
    out
}

pub fn render_pagination(state: &PaginationState) -> String {
    let control = |label: &str, disabled: bool| {
        if disabled {
            label.dimmed().to_string()
        } else {
            label.bold().blue().to_string()
        }
    };
    format!(
        "{} {}  Page {} of {}  {} {}",
        control("« first", state.first_disabled),
        control("‹ prev", state.prev_disabled),
        state.current_page,
        state.total_pages,
        control("next ›", state.next_disabled),
        control("last »", state.last_disabled),
    )
}

pub fn render_text(view: &PageView, sprite_base: &str) -> String {
    let record = build_page_record(view, sprite_base);
    let mut out = String::new();
    out.push_str(&format!(
        ":: {} :: sorted {} :: {} match(es)\n\n",
        view.mode.describe(),
        view.sort.label(),
        view.pagination.total_items
    ));
    match record.message {
        Some(message) => {
            out.push_str(&format!("{}\n", message.bold().yellow()));
        }
        None => {
            for card in record.cards.iter() {
                out.push_str(&render_card(card));
            }
        }
    }
    out.push('\n');
    out.push_str(&render_pagination(&view.pagination));
    out.push('\n');
    out
}

pub fn render_json(view: &PageView, sprite_base: &str) -> Vec<u8> {
    let record = build_page_record(view, sprite_base);
    let mut out = serde_json::to_vec_pretty(&record).unwrap_or_else(|_| b"{}".to_vec());
    out.push(b'\n');
    out
}

pub fn render_html(view: &PageView, sprite_base: &str) -> Vec<u8> {
    report::render_html(&build_page_record(view, sprite_base))
}

pub fn render_detail_text(summary: &EntitySummary, detail: &EntityDetail) -> String {
    let mut out = String::new();
    let mut line = |label: &str, value: String| {
        out.push_str(&format!(":: {:<10}: {}\n", label, value));
    };
    line("Name", utils::capitalize(&summary.name));
    line("ID", utils::format_id(summary.id));
    if let Some(weight) = detail.weight {
        line("Weight", format!("{weight} hg"));
    }
    if let Some(height) = detail.height {
        line("Height", format!("{height} dm"));
    }
    line("Types", render_badges(&detail.categories));
    line("Abilities", detail.abilities.join(", "));
    if let Some(sprite) = detail.sprite_url.as_deref() {
        line("Sprite", sprite.to_string());
    }
    out
}

/// Receives the pages and messages produced by a session.
pub trait RenderSink {
    fn render_page(&mut self, view: &PageView) -> std::io::Result<()>;

    fn render_detail(
        &mut self,
        summary: &EntitySummary,
        detail: &EntityDetail,
    ) -> std::io::Result<()>;

    fn render_notice(&mut self, message: &str) -> std::io::Result<()>;
}

pub struct WriterSink<W> {
    out: W,
    format: OutputFormat,
    sprite_base: String,
}

impl<W: Write> WriterSink<W> {
    pub fn new(out: W, format: OutputFormat, sprite_base: &str) -> Self {
        Self {
            out,
            format,
            sprite_base: sprite_base.to_string(),
        }
    }
}

impl<W: Write> RenderSink for WriterSink<W> {
    fn render_page(&mut self, view: &PageView) -> std::io::Result<()> {
        let bytes = match self.format {
            OutputFormat::Text => render_text(view, &self.sprite_base).into_bytes(),
            OutputFormat::Json => render_json(view, &self.sprite_base),
            OutputFormat::Html => render_html(view, &self.sprite_base),
        };
        self.out.write_all(&bytes)?;
        self.out.flush()
    }

    fn render_detail(
        &mut self,
        summary: &EntitySummary,
        detail: &EntityDetail,
    ) -> std::io::Result<()> {
        match self.format {
            OutputFormat::Text | OutputFormat::Html => {
                self.out
                    .write_all(render_detail_text(summary, detail).as_bytes())?;
            }
            OutputFormat::Json => {
                #[derive(Serialize)]
                struct DetailRecord<'a> {
                    name: &'a str,
                    #[serde(flatten)]
                    detail: &'a EntityDetail,
                }
                let record = DetailRecord {
                    name: &summary.name,
                    detail,
                };
                let mut bytes =
                    serde_json::to_vec_pretty(&record).unwrap_or_else(|_| b"{}".to_vec());
                bytes.push(b'\n');
                self.out.write_all(&bytes)?;
            }
        }
        self.out.flush()
    }

    fn render_notice(&mut self, message: &str) -> std::io::Result<()> {
        // keep machine-readable output clean
        if self.format != OutputFormat::Text {
            eprintln!("{message}");
            return Ok(());
        }
        writeln!(self.out, "{}", message.yellow())?;
        self.out.flush()
    }
}

pub fn describe_error(e: &CatalogError) -> String {
    format!("{} {}", "error:".bold().red(), e)
}
