//! Dashboard figures, computed from a ticket list already scoped to the viewer.

use serde::Serialize;
use std::cmp::Reverse;

use crate::core::shared::enums::{TicketPriority, TicketStatus};
use crate::core::shared::models::Ticket;

pub const RECENT_LIMIT: usize = 5;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDashboardStats {
    pub open: usize,
    pub in_progress: usize,
    pub resolved: usize,
    pub total: usize,
    pub recent: Vec<Ticket>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountEntry {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboardStats {
    pub total: usize,
    pub unassigned: usize,
    pub by_status: Vec<CountEntry>,
    pub by_priority: Vec<CountEntry>,
    pub by_department: Vec<CountEntry>,
    pub recent_activity: Vec<Ticket>,
}

impl AdminDashboardStats {
    pub fn status_count(&self, status: TicketStatus) -> usize {
        self.by_status
            .iter()
            .find(|entry| entry.label == status.label())
            .map_or(0, |entry| entry.count)
    }
}

fn count_status(tickets: &[Ticket], status: TicketStatus) -> usize {
    tickets.iter().filter(|t| t.status == status).count()
}

fn count_priority(tickets: &[Ticket], priority: TicketPriority) -> usize {
    tickets.iter().filter(|t| t.priority == priority).count()
}

/// `tickets` must already be the user's own list.
pub fn user_dashboard(tickets: &[Ticket]) -> UserDashboardStats {
    let mut recent = tickets.to_vec();
    recent.sort_by_key(|t| Reverse(t.created_at));
    recent.truncate(RECENT_LIMIT);

    UserDashboardStats {
        open: count_status(tickets, TicketStatus::Open),
        in_progress: count_status(tickets, TicketStatus::InProgress),
        resolved: count_status(tickets, TicketStatus::Resolved),
        total: tickets.len(),
        recent,
    }
}

pub fn admin_dashboard(tickets: &[Ticket]) -> AdminDashboardStats {
    let by_status = TicketStatus::ALL
        .iter()
        .map(|status| CountEntry {
            label: status.label().to_string(),
            count: count_status(tickets, *status),
        })
        .collect();

    let by_priority = TicketPriority::ALL
        .iter()
        .rev()
        .map(|priority| CountEntry {
            label: priority.label().to_string(),
            count: count_priority(tickets, *priority),
        })
        .collect();

    let mut by_department: Vec<CountEntry> = Vec::new();
    for ticket in tickets {
        match by_department.iter_mut().find(|e| e.label == ticket.department) {
            Some(entry) => entry.count += 1,
            None => by_department.push(CountEntry {
                label: ticket.department.clone(),
                count: 1,
            }),
        }
    }
    by_department.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));

    let mut recent_activity = tickets.to_vec();
    recent_activity.sort_by_key(|t| Reverse(t.updated_at));
    recent_activity.truncate(RECENT_LIMIT);

    AdminDashboardStats {
        total: tickets.len(),
        unassigned: tickets.iter().filter(|t| t.assigned_to.is_none()).count(),
        by_status,
        by_priority,
        by_department,
        recent_activity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shared::models::TicketRow;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn ticket(status: TicketStatus, priority: TicketPriority, department: &str, age: i64, touched: i64) -> Ticket {
        let now = Utc::now();
        Ticket::from_row(
            TicketRow {
                id: Uuid::new_v4(),
                subject: format!("ticket aged {age}"),
                description: "Something is broken somewhere".to_string(),
                priority,
                status,
                department_id: Uuid::new_v4(),
                created_by: Uuid::new_v4(),
                assigned_to: None,
                created_at: now - Duration::minutes(age),
                updated_at: now - Duration::minutes(touched),
            },
            department.to_string(),
            "Requester".to_string(),
            None,
        )
    }

    #[test]
    fn test_user_dashboard_counts_and_recent() {
        let tickets: Vec<Ticket> = (0..7)
            .map(|i| {
                let status = match i % 3 {
                    0 => TicketStatus::Open,
                    1 => TicketStatus::InProgress,
                    _ => TicketStatus::Closed,
                };
                ticket(status, TicketPriority::Low, "IT", i * 10, i * 10)
            })
            .collect();

        let stats = user_dashboard(&tickets);
        assert_eq!(stats.open, 3);
        assert_eq!(stats.in_progress, 2);
        assert_eq!(stats.resolved, 0);
        assert_eq!(stats.total, 7);
        assert_eq!(stats.recent.len(), RECENT_LIMIT);
        assert_eq!(stats.recent[0].subject, "ticket aged 0");
    }

    #[test]
    fn test_admin_dashboard_breakdowns() {
        let tickets = vec![
            ticket(TicketStatus::Open, TicketPriority::High, "IT", 50, 1),
            ticket(TicketStatus::Open, TicketPriority::Low, "HR", 40, 40),
            ticket(TicketStatus::Resolved, TicketPriority::High, "IT", 30, 30),
        ];
        let stats = admin_dashboard(&tickets);

        assert_eq!(stats.total, 3);
        assert_eq!(stats.unassigned, 3);
        assert_eq!(stats.status_count(TicketStatus::Open), 2);
        assert_eq!(stats.status_count(TicketStatus::Closed), 0);
        assert_eq!(stats.by_priority[0].label, "High");
        assert_eq!(stats.by_priority[0].count, 2);
        assert_eq!(stats.by_department[0].label, "IT");
        assert_eq!(stats.by_department[0].count, 2);
        assert_eq!(stats.recent_activity[0].subject, "ticket aged 50");
    }

    #[test]
    fn test_empty_lists() {
        let stats = admin_dashboard(&[]);
        assert_eq!(stats.total, 0);
        assert!(stats.by_department.is_empty());
        assert!(stats.recent_activity.is_empty());
        assert!(user_dashboard(&[]).recent.is_empty());
    }
}
