//! Plain-text rendering of views and notifications

use std::fmt::Write as _;
use studio_core::{
    AccountView, GalleryView, ImageAsset, NavEntry, Notification, PromptFormView, UploadView,
    View,
};

pub(crate) fn view(view: &View) -> String {
    match view {
        View::Generate(form) => prompt_form(form),
        View::Upload(form) => upload_form(form),
        View::History(gallery) | View::Favorites(gallery) => gallery_grid(gallery),
        View::Account(account) => account_panel(account),
    }
}

fn prompt_form(form: &PromptFormView) -> String {
    let mut out = format!("{}\n", form.heading);
    let _ = writeln!(out, "  prompt: {}", quoted(&form.prompt));
    let _ = writeln!(out, "  [Generate]{}", button_state(form.submit_enabled, form.loading));
    out
}

fn upload_form(form: &UploadView) -> String {
    let mut out = format!("{}\n", form.heading);
    let _ = writeln!(out, "  [{}]", form.dropzone_caption);
    if form.file_selected {
        let _ = writeln!(out, "  instructions: {}", quoted(&form.prompt));
        let _ = writeln!(out, "  [Upload]{}", button_state(form.submit_enabled, form.loading));
    }
    out
}

fn gallery_grid(gallery: &GalleryView) -> String {
    let mut out = format!("{} ({})\n", gallery.heading, gallery.cards.len());
    if gallery.cards.is_empty() {
        out.push_str("  (no images)\n");
    }
    for card in &gallery.cards {
        let star = if card.is_favorite { '*' } else { ' ' };
        let title = if card.title.is_empty() { &card.alt } else { &card.title };
        let _ = writeln!(
            out,
            "  {star} {}  {}  {}  [{}]",
            card.id, card.created_on, title, card.operation_type
        );
        if let Some(prompt) = &card.prompt {
            let _ = writeln!(out, "      prompt: {prompt}");
        }
        let _ = writeln!(out, "      {}", card.image_url);
    }
    out
}

fn account_panel(account: &AccountView) -> String {
    let mut out = format!("{}\n", account.heading);
    let _ = writeln!(out, "  email: {}", account.email.as_deref().unwrap_or("-"));
    match account.member_since {
        Some(date) => {
            let _ = writeln!(out, "  member since: {date}");
        }
        None => out.push_str("  member since: -\n"),
    }
    out
}

pub(crate) fn navigation(entries: &[NavEntry]) -> String {
    entries
        .iter()
        .map(|e| {
            if e.active {
                format!("[{}]", e.label)
            } else {
                e.label.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

pub(crate) fn notifications(notes: &[Notification]) -> String {
    notes.iter().map(|n| format!("{n}\n")).collect()
}

pub(crate) fn assets_json(images: &[ImageAsset]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(images)
}

fn quoted(text: &str) -> String {
    if text.is_empty() {
        "-".to_string()
    } else {
        format!("\"{text}\"")
    }
}

fn button_state(enabled: bool, loading: bool) -> &'static str {
    match (enabled, loading) {
        (_, true) => " (working...)",
        (true, false) => "",
        (false, false) => " (disabled)",
    }
}
