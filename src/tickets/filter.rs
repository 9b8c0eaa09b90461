//! List filtering and sorting, shared by both ticket lists and the API.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

use crate::core::shared::enums::{TicketPriority, TicketStatus};
use crate::core::shared::models::Ticket;

/// Raw query string of a list screen. Empty values and `all` mean no filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TicketListQuery {
    pub q: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub department: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketSort {
    #[default]
    Newest,
    Oldest,
    Updated,
    Priority,
}

impl TicketSort {
    pub const ALL: [TicketSort; 4] = [Self::Newest, Self::Oldest, Self::Updated, Self::Priority];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::Updated => "updated",
            Self::Priority => "priority",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Newest => "Newest first",
            Self::Oldest => "Oldest first",
            Self::Updated => "Recently updated",
            Self::Priority => "Highest priority",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|sort| sort.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicketFilter {
    pub search: String,
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
    pub department: Option<String>,
    pub sort: TicketSort,
}

fn selected(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

impl From<&TicketListQuery> for TicketFilter {
    /// Unrecognised values fall back to "all" rather than failing the page.
    fn from(query: &TicketListQuery) -> Self {
        Self {
            search: query.q.as_deref().unwrap_or_default().trim().to_string(),
            status: selected(&query.status).and_then(|s| s.parse().ok()),
            priority: selected(&query.priority).and_then(|p| p.parse().ok()),
            department: selected(&query.department).map(str::to_string),
            sort: query
                .sort
                .as_deref()
                .and_then(TicketSort::parse)
                .unwrap_or_default(),
        }
    }
}

impl TicketFilter {
    pub fn matches(&self, ticket: &Ticket) -> bool {
        let search_ok = self.search.is_empty() || {
            let needle = self.search.to_lowercase();
            ticket.subject.to_lowercase().contains(&needle)
                || ticket.description.to_lowercase().contains(&needle)
        };
        let status_ok = self.status.map_or(true, |s| ticket.status == s);
        let priority_ok = self.priority.map_or(true, |p| ticket.priority == p);
        let department_ok = self
            .department
            .as_deref()
            .map_or(true, |d| ticket.department == d);
        search_ok && status_ok && priority_ok && department_ok
    }

    pub fn is_active(&self) -> bool {
        !self.search.is_empty()
            || self.status.is_some()
            || self.priority.is_some()
            || self.department.is_some()
    }

    /// Keeps matching tickets and orders them by `sort`.
    pub fn apply(&self, tickets: &[Ticket]) -> Vec<Ticket> {
        let mut kept: Vec<Ticket> = tickets.iter().filter(|t| self.matches(t)).cloned().collect();
        sort_tickets(&mut kept, self.sort);
        kept
    }

    /// Query string that reproduces this filter, for links and redirects.
    pub fn to_query(&self) -> String {
        let mut parts = Vec::new();
        if !self.search.is_empty() {
            parts.push(format!("q={}", urlencoding::encode(&self.search)));
        }
        if let Some(status) = self.status {
            parts.push(format!("status={}", status.as_str()));
        }
        if let Some(priority) = self.priority {
            parts.push(format!("priority={}", priority.as_str()));
        }
        if let Some(department) = &self.department {
            parts.push(format!("department={}", urlencoding::encode(department)));
        }
        if self.sort != TicketSort::Newest {
            parts.push(format!("sort={}", self.sort.as_str()));
        }
        parts.join("&")
    }
}

pub fn sort_tickets(tickets: &mut [Ticket], sort: TicketSort) {
    match sort {
        TicketSort::Newest => tickets.sort_by_key(|t| Reverse(t.created_at)),
        TicketSort::Oldest => tickets.sort_by_key(|t| t.created_at),
        TicketSort::Updated => tickets.sort_by_key(|t| Reverse(t.updated_at)),
        TicketSort::Priority => {
            tickets.sort_by_key(|t| (Reverse(t.priority.rank()), Reverse(t.created_at)))
        }
    }
}

/// Distinct department names present in `tickets`, in order of first
/// appearance.
pub fn department_options(tickets: &[Ticket]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for ticket in tickets {
        if !seen.iter().any(|d| *d == ticket.department) {
            seen.push(ticket.department.clone());
        }
    }
    seen
}
