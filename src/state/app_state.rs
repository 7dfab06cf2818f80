//! Application state definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Industry a project belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Industry {
    Tech,
    Finance,
    Health,
    Education,
    Retail,
    Entertainment,
    /// Anything the server sends that this client does not know about
    #[serde(other)]
    Other,
}

impl Industry {
    pub const ALL: [Industry; 7] = [
        Industry::Tech,
        Industry::Finance,
        Industry::Health,
        Industry::Education,
        Industry::Retail,
        Industry::Entertainment,
        Industry::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Tech => "Tech",
            Self::Finance => "Finance",
            Self::Health => "Health",
            Self::Education => "Education",
            Self::Retail => "Retail",
            Self::Entertainment => "Entertainment",
            Self::Other => "Other",
        }
    }

    /// Cycle forward through the selectable values
    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|i| i == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Cycle backward through the selectable values
    pub fn prev(&self) -> Self {
        let idx = Self::ALL.iter().position(|i| i == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Industry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Industry {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|i| i.label().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| format!("unknown industry: {s}"))
    }
}

/// Project as persisted by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub industry: Industry,
    pub banner: String,
    #[serde(default)]
    pub author_id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Project {
    /// Tags as shown in an editable text input
    pub fn tags_display(&self) -> String {
        self.tags.join(", ")
    }
}

/// Tab shown on the profile page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfileTab {
    #[default]
    Info,
    Projects,
}

impl ProfileTab {
    /// Resolve a raw `tab` query value, defaulting to `Info`
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("projects") => Self::Projects,
            _ => Self::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Projects => "projects",
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            Self::Info => Self::Projects,
            Self::Projects => Self::Info,
        }
    }
}

/// Client-side route
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Home,
    ProjectCreate,
    ProjectDetail { id: String },
    ProjectEdit { id: String },
    Profile { tab: ProfileTab },
}

impl Route {
    /// Path form used as a `returnTo` continuation target
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::ProjectCreate => "/project/create".to_string(),
            Self::ProjectDetail { id } => format!("/project/{id}"),
            Self::ProjectEdit { id } => format!("/project/{id}/edit"),
            Self::Profile { tab } => format!("/profile?tab={}", tab.as_str()),
        }
    }

    /// Parse a path back into a route; unknown paths resolve to `Home`
    pub fn parse(path: &str) -> Self {
        let (path, query) = match path.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (path, None),
        };
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            ["project", "create"] => Self::ProjectCreate,
            ["project", id, "edit"] => Self::ProjectEdit { id: id.to_string() },
            ["project", id] => Self::ProjectDetail { id: id.to_string() },
            ["profile"] => {
                let tab = query.and_then(|q| {
                    url::form_urlencoded::parse(q.as_bytes())
                        .find(|(key, _)| key == "tab")
                        .map(|(_, value)| value.into_owned())
                });
                Self::Profile {
                    tab: ProfileTab::from_query(tab.as_deref()),
                }
            }
            _ => Self::Home,
        }
    }

    /// Whether this route hosts an authoring form
    pub fn is_authoring(&self) -> bool {
        matches!(self, Self::ProjectCreate | Self::ProjectEdit { .. })
    }
}

/// Authenticated user as reported by the identity provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub sub: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub email_verified: Option<bool>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    mod industry {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_next_wraps() {
            assert_eq!(Industry::Other.next(), Industry::Tech);
            assert_eq!(Industry::Tech.prev(), Industry::Other);
        }

        #[test]
        fn test_from_str_is_case_insensitive() {
            assert_eq!("finance".parse::<Industry>(), Ok(Industry::Finance));
            assert!("Mining".parse::<Industry>().is_err());
        }

        #[test]
        fn test_unknown_value_deserializes_as_other() {
            let parsed: Industry = serde_json::from_str("\"AI\"").unwrap();
            assert_eq!(parsed, Industry::Other);
        }
    }

    mod project {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_deserialize_camel_case() {
            let json = r#"{
                "id": "p1",
                "name": "Networking App",
                "description": "For developers",
                "body": "<p>hello</p>",
                "tags": ["React", "Node.js"],
                "industry": "Tech",
                "banner": "https://placehold.co/600x400",
                "authorId": "auth0|123",
                "createdAt": "2024-01-02T03:04:05Z",
                "updatedAt": "2024-01-03T03:04:05Z"
            }"#;
            let project: Project = serde_json::from_str(json).unwrap();
            assert_eq!(project.author_id, "auth0|123");
            assert_eq!(project.tags_display(), "React, Node.js");
            assert!(project.updated_at.is_some());
        }
    }

    mod route {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_authoring_paths() {
            assert_eq!(Route::ProjectCreate.path(), "/project/create");
            assert_eq!(
                Route::ProjectEdit { id: "42".into() }.path(),
                "/project/42/edit"
            );
        }

        #[test]
        fn test_parse_round_trips_known_routes() {
            for route in [
                Route::Home,
                Route::ProjectCreate,
                Route::ProjectDetail { id: "7".into() },
                Route::ProjectEdit { id: "7".into() },
                Route::Profile {
                    tab: ProfileTab::Projects,
                },
            ] {
                assert_eq!(Route::parse(&route.path()), route);
            }
        }

        #[test]
        fn test_profile_tab_defaults_to_info() {
            assert_eq!(
                Route::parse("/profile"),
                Route::Profile {
                    tab: ProfileTab::Info
                }
            );
            assert_eq!(
                Route::parse("/profile?tab=bogus"),
                Route::Profile {
                    tab: ProfileTab::Info
                }
            );
        }

        #[test]
        fn test_profile_tab_is_percent_decoded() {
            let projects = Route::Profile {
                tab: ProfileTab::Projects,
            };
            assert_eq!(Route::parse("/profile?tab=%70rojects"), projects);
            assert_eq!(Route::parse("/profile?sort=new&tab=projects"), projects);
        }

        #[test]
        fn test_unknown_path_is_home() {
            assert_eq!(Route::parse("/nowhere/at/all"), Route::Home);
        }
    }
}
