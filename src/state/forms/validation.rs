//! Field validation and server error remapping

use super::field::Field;
use super::form_state::{parse_tags, FieldErrors, ProjectForm};
use crate::editor::text_length;

pub const MIN_TEXT_LEN: usize = 3;
pub const MAX_TEXT_LEN: usize = 100;
pub const MIN_BODY_LEN: usize = 20;

/// Keyword scanned for in lower-cased server messages, in priority order
const SERVER_KEYWORDS: [(&str, Field); 6] = [
    ("name", Field::Name),
    ("description", Field::Description),
    ("body", Field::Body),
    ("tag", Field::Tags),
    ("industry", Field::Industry),
    ("banner", Field::Banner),
];

fn within_bounds(value: &str) -> bool {
    let len = value.trim().chars().count();
    (MIN_TEXT_LEN..=MAX_TEXT_LEN).contains(&len)
}

/// Check every rule against the form. An empty result means the form is valid.
pub fn validate(form: &ProjectForm) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if !within_bounds(&form.name) {
        errors.set(Field::Name, "Name must be between 3 and 100 characters.");
    }
    if !within_bounds(&form.description) {
        errors.set(
            Field::Description,
            "Description must be between 3 and 100 characters.",
        );
    }
    if text_length(&form.body) < MIN_BODY_LEN {
        errors.set(Field::Body, "Body must be at least 20 characters.");
    }
    if parse_tags(&form.tags_input).is_empty() {
        errors.set(Field::Tags, "Add at least one tag.");
    }
    if form.industry.is_none() {
        errors.set(Field::Industry, "Industry is required.");
    }
    if form.banner.is_empty() {
        errors.set(Field::Banner, "Banner is required.");
    }

    errors
}

/// Guess which field a free-form server message refers to
pub fn field_for_message(message: &str) -> Option<Field> {
    let lower = message.to_lowercase();
    SERVER_KEYWORDS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, field)| *field)
}

/// Assign server messages to fields; unmatched messages are left for the alert.
/// When two messages land on the same field the later one wins.
pub fn remap_server_errors(messages: &[String]) -> FieldErrors {
    messages
        .iter()
        .filter_map(|msg| field_for_message(msg).map(|field| (field, msg.clone())))
        .collect()
}
