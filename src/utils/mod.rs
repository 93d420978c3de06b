use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::catalog::EntitySummary;

pub const DEFAULT_API_BASE: &str = "https://pokeapi.co/api/v2";
pub const DEFAULT_SPRITE_BASE: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/other/home";

// the API lists alternate forms with ids from 10001 upwards
pub const DEFAULT_MAX_ID: u32 = 10000;
pub const DEFAULT_LIST_LIMIT: u32 = 20000;

pub fn parse_id_from_url(url: &str) -> Option<u32> {
    let segment = url.split('/').filter(|s| !s.is_empty()).last()?;
    match segment.parse::<u32>() {
        Ok(0) => None,
        Ok(id) => Some(id),
        Err(_) => None,
    }
}

pub fn format_id(id: u32) -> String {
    format!("#{id:04}")
}

pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn sprite_url(base: &str, id: u32) -> String {
    format!("{}/{id}.png", base.trim_end_matches('/'))
}

pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

// `needle` must already be lowercase
pub fn matches_search(entity: &EntitySummary, needle: &str) -> bool {
    entity.name.to_lowercase().contains(needle) || entity.id.to_string().contains(needle)
}

pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().tick_chars("◐◓◑◒ "));
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}
