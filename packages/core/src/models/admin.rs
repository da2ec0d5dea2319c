use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::role::Role;

/// Outcome of one read in a concurrent batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Section<T> {
    /// Data returned by the backend.
    Live(T),
    /// Placeholder data, only produced when demo fallback is enabled.
    Demo(T),
    /// The read failed and no fallback applied. Carries the error text.
    Unavailable(String),
}

impl<T> Section<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            Section::Live(data) | Section::Demo(data) => Some(data),
            Section::Unavailable(_) => None,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Section::Live(_))
    }

    pub fn is_demo(&self) -> bool {
        matches!(self, Section::Demo(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Section::Live(_) => "live",
            Section::Demo(_) => "demo data (API unavailable)",
            Section::Unavailable(_) => "unavailable",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdminOverview {
    pub users: Section<Vec<Value>>,
    pub volunteers: Section<Vec<Value>>,
    pub ngos: Section<Vec<Value>>,
    pub postings: Section<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCount {
    pub role: String,
    pub count: u64,
}

impl RoleCount {
    pub fn new(role: Role, count: u64) -> Self {
        RoleCount {
            role: role.to_string(),
            count,
        }
    }

    /// Counts shown when the analytics service cannot be reached.
    pub fn demo() -> Vec<RoleCount> {
        vec![
            RoleCount::new(Role::Admin, 1),
            RoleCount::new(Role::Volunteer, 3),
            RoleCount::new(Role::Ngo, 3),
        ]
    }
}

pub fn total_users(counts: &[RoleCount]) -> u64 {
    counts.iter().map(|c| c.count).sum()
}

pub fn count_for(counts: &[RoleCount], role: Role) -> u64 {
    counts
        .iter()
        .find(|c| c.role.trim().eq_ignore_ascii_case(role.as_str()))
        .map(|c| c.count)
        .unwrap_or(0)
}
