use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGroup {
    pub title: String,
    pub slug: String,
    pub description: String,
}

/// Short form of a group embedded in post rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupRef {
    pub id: i64,
    pub slug: String,
    pub title: String,
}

fn slug_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("slug regex is valid"))
}

/// Slugs are used as URL path segments.
pub fn is_valid_slug(slug: &str) -> bool {
    slug_re().is_match(slug)
}

impl NewGroup {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Group title cannot be empty".to_string());
        }
        if !is_valid_slug(&self.slug) {
            return Err(format!("Invalid slug: '{}'", self.slug));
        }
        Ok(())
    }
}

impl From<&Group> for GroupRef {
    fn from(g: &Group) -> Self {
        GroupRef { id: g.id, slug: g.slug.clone(), title: g.title.clone() }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}
