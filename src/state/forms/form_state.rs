//! Project form state and field errors

use super::field::Field;
use crate::state::{Industry, Project};
use serde::Serialize;
use std::collections::BTreeMap;

/// Banner used until the author picks one
pub const DEFAULT_BANNER: &str = "https://placehold.co/600x400";

/// Split raw comma separated input into tags, trimming and dropping empties
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Mutable snapshot of the authoring form
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectForm {
    pub name: String,
    pub description: String,
    pub industry: Option<Industry>,
    /// Raw comma separated text, parsed on every submit
    pub tags_input: String,
    pub banner: String,
    /// Serialized rich-text markup, written only by the editor or a load
    pub body: String,
}

impl Default for ProjectForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            industry: None,
            tags_input: String::new(),
            banner: DEFAULT_BANNER.to_string(),
            body: String::new(),
        }
    }
}

impl ProjectForm {
    /// Seed a form from a persisted project
    pub fn from_project(project: &Project) -> Self {
        Self {
            name: project.name.clone(),
            description: project.description.clone(),
            industry: Some(project.industry),
            tags_input: project.tags_display(),
            banner: project.banner.clone(),
            body: project.body.clone(),
        }
    }

    /// Text of a plain input field; `None` for the select and the editor
    pub fn text(&self, field: Field) -> Option<&str> {
        match field {
            Field::Name => Some(&self.name),
            Field::Description => Some(&self.description),
            Field::Tags => Some(&self.tags_input),
            Field::Banner => Some(&self.banner),
            _ => None,
        }
    }

    fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Name => Some(&mut self.name),
            Field::Description => Some(&mut self.description),
            Field::Tags => Some(&mut self.tags_input),
            Field::Banner => Some(&mut self.banner),
            _ => None,
        }
    }

    /// Replace a plain input's text. Returns false for non-text fields.
    pub fn set_text(&mut self, field: Field, value: String) -> bool {
        match self.text_mut(field) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Append a character to a plain input
    pub fn push_char(&mut self, field: Field, c: char) -> bool {
        match self.text_mut(field) {
            Some(slot) => {
                slot.push(c);
                true
            }
            None => false,
        }
    }

    /// Remove the last character of a plain input
    pub fn pop_char(&mut self, field: Field) -> bool {
        match self.text_mut(field) {
            Some(slot) => slot.pop().is_some(),
            None => false,
        }
    }

    /// Build the request body sent to the API
    pub fn to_payload(&self) -> ProjectPayload {
        ProjectPayload {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            body: self.body.clone(),
            tags: parse_tags(&self.tags_input),
            industry: self.industry.unwrap_or(Industry::Other),
            banner: self.banner.clone(),
        }
    }
}

/// JSON body of create and update requests
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectPayload {
    pub name: String,
    pub description: String,
    pub body: String,
    pub tags: Vec<String>,
    pub industry: Industry,
    pub banner: String,
}

/// Field-level error messages; any entry blocks submission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn set(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// Drop the error for one field, returning whether one was present
    pub fn clear(&mut self, field: Field) -> bool {
        self.0.remove(&field).is_some()
    }

    pub fn clear_all(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    /// Overlay another set of errors on top of this one
    pub fn merge(&mut self, other: FieldErrors) {
        self.0.extend(other.0);
    }
}

impl FromIterator<(Field, String)> for FieldErrors {
    fn from_iter<T: IntoIterator<Item = (Field, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
