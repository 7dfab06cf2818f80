//! Form field identifiers

use std::fmt;

/// Identifies one input of the project form, plus the `General` error slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Description,
    Industry,
    Tags,
    Banner,
    Body,
    /// Errors not tied to a single input
    General,
}

impl Field {
    /// Inputs in the order they are focused
    pub const INPUTS: [Field; 6] = [
        Field::Name,
        Field::Description,
        Field::Industry,
        Field::Tags,
        Field::Banner,
        Field::Body,
    ];

    /// Wire/form name of the field
    pub fn name(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Description => "description",
            Self::Industry => "industry",
            Self::Tags => "tagsInput",
            Self::Banner => "banner",
            Self::Body => "body",
            Self::General => "general",
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "Project Name",
            Self::Description => "Short Description",
            Self::Industry => "Industry",
            Self::Tags => "Tags (comma separated)",
            Self::Banner => "Banner URL",
            Self::Body => "Project Details",
            Self::General => "General",
        }
    }

    /// Resolve a field from its wire name; `tags` is accepted for `tagsInput`
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "name" => Some(Self::Name),
            "description" => Some(Self::Description),
            "industry" => Some(Self::Industry),
            "tags" | "tagsInput" => Some(Self::Tags),
            "banner" => Some(Self::Banner),
            "body" => Some(Self::Body),
            "general" => Some(Self::General),
            _ => None,
        }
    }

    /// Whether typed characters go straight into the field's text
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            Self::Name | Self::Description | Self::Tags | Self::Banner
        )
    }

    pub fn next(&self) -> Self {
        let idx = Self::INPUTS.iter().position(|f| f == self).unwrap_or(0);
        Self::INPUTS[(idx + 1) % Self::INPUTS.len()]
    }

    pub fn prev(&self) -> Self {
        let idx = Self::INPUTS.iter().position(|f| f == self).unwrap_or(0);
        Self::INPUTS[(idx + Self::INPUTS.len() - 1) % Self::INPUTS.len()]
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
