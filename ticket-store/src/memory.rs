//! In-memory implementation of [`TicketRepository`].
//!
//! Used by tests and local development runs without a MongoDB instance.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::StoreResult;
use crate::models::{
    CreateTicket, Status, Ticket, TicketFilter, TicketPage, TicketText, UpdateTicket,
    compose_ticket_id,
};
use crate::repository::TicketRepository;

/// HashMap-backed ticket store guarded by an async RwLock.
#[derive(Default)]
pub struct InMemoryTicketStore {
    inner: RwLock<HashMap<String, Ticket>>,
}

impl InMemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with pre-built tickets (test setup helper).
    pub async fn seed(&self, tickets: impl IntoIterator<Item = Ticket>) {
        let mut map = self.inner.write().await;
        for t in tickets {
            map.insert(t.id.clone(), t);
        }
    }

    fn matches(filter: &TicketFilter, ticket: &Ticket) -> bool {
        if let Some(v) = filter.system_source {
            if ticket.system_source != v {
                return false;
            }
        }
        if let Some(v) = filter.category {
            if ticket.category != v {
                return false;
            }
        }
        if let Some(v) = filter.status {
            if ticket.status != v {
                return false;
            }
        }
        if let Some(v) = filter.priority {
            if ticket.priority != v {
                return false;
            }
        }
        if let Some(ref search) = filter.search {
            if !ticket
                .description
                .to_lowercase()
                .contains(&search.to_lowercase())
            {
                return false;
            }
        }
        true
    }
}

#[async_trait]
impl TicketRepository for InMemoryTicketStore {
    async fn create(&self, input: CreateTicket) -> StoreResult<Ticket> {
        let mut map = self.inner.write().await;

        let now = Utc::now();
        let prefix = format!("AS-{}-", now.format("%Y%m%d"));
        let seq = map.keys().filter(|id| id.starts_with(&prefix)).count() as u64 + 1;

        let ticket = Ticket::new(compose_ticket_id(now, seq), input);
        map.insert(ticket.id.clone(), ticket.clone());
        Ok(ticket)
    }

    async fn get_by_id(&self, id: &str) -> StoreResult<Option<Ticket>> {
        Ok(self.inner.read().await.get(id).cloned())
    }

    async fn list(&self, filter: TicketFilter) -> StoreResult<TicketPage> {
        let map = self.inner.read().await;

        let mut items: Vec<Ticket> = map
            .values()
            .filter(|t| Self::matches(&filter, t))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = items.len() as u64;
        let page = filter.page.max(1);
        let start = ((page - 1) * filter.page_size) as usize;
        let items = items
            .into_iter()
            .skip(start)
            .take(filter.page_size as usize)
            .collect();

        Ok(TicketPage { items, total })
    }

    async fn update(&self, id: &str, input: UpdateTicket) -> StoreResult<Option<Ticket>> {
        let mut map = self.inner.write().await;
        let Some(ticket) = map.get_mut(id) else {
            return Ok(None);
        };
        ticket.apply_update(input);
        Ok(Some(ticket.clone()))
    }

    async fn close(&self, id: &str) -> StoreResult<Option<Ticket>> {
        let mut map = self.inner.write().await;
        let Some(ticket) = map.get_mut(id) else {
            return Ok(None);
        };
        let now = Utc::now();
        ticket.status = Status::Completed;
        ticket.closed_at = Some(now);
        ticket.updated_at = now;
        Ok(Some(ticket.clone()))
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        Ok(self.inner.write().await.remove(id).is_some())
    }

    async fn find_resolved_in(&self, ids: &[String], limit: usize) -> StoreResult<Vec<Ticket>> {
        let map = self.inner.read().await;
        let tickets = ids
            .iter()
            .filter_map(|id| map.get(id))
            .filter(|t| t.is_eligible_source())
            .take(limit)
            .cloned()
            .collect();
        Ok(tickets)
    }

    async fn all_descriptions(&self) -> StoreResult<Vec<TicketText>> {
        let map = self.inner.read().await;
        Ok(map
            .values()
            .map(|t| TicketText {
                id: t.id.clone(),
                description: t.description.clone(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, HandleType, Priority, SystemSource};

    fn create_input(description: &str) -> CreateTicket {
        CreateTicket {
            system_source: SystemSource::OMS,
            category: Category::SystemFailure,
            description: description.into(),
            handle_type: HandleType::Dev,
            handle_detail: String::new(),
            priority: Priority::P1,
            tags: vec![],
            solution_template: None,
            assigned_to: None,
            created_by: None,
        }
    }

    #[tokio::test]
    async fn create_assigns_sequential_daily_ids() {
        let store = InMemoryTicketStore::new();
        let a = store.create(create_input("first")).await.unwrap();
        let b = store.create(create_input("second")).await.unwrap();

        let prefix = format!("AS-{}-", Utc::now().format("%Y%m%d"));
        assert!(a.id.starts_with(&prefix));
        assert!(b.id.starts_with(&prefix));
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn find_resolved_in_filters_eligibility_and_caps() {
        let store = InMemoryTicketStore::new();

        let open = store.create(create_input("still open")).await.unwrap();
        let mut ids = vec![open.id.clone()];

        for i in 0..3 {
            let t = store
                .create(create_input(&format!("resolved {i}")))
                .await
                .unwrap();
            store
                .update(
                    &t.id,
                    UpdateTicket {
                        status: Some(Status::Completed),
                        handle_detail: Some("restarted the sync job".into()),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
            ids.push(t.id);
        }

        let hits = store.find_resolved_in(&ids, 2).await.unwrap();
        assert_eq!(hits.len(), 2, "capped at limit");
        assert!(hits.iter().all(|t| t.is_eligible_source()));
        assert!(hits.iter().all(|t| t.id != open.id));
    }

    #[tokio::test]
    async fn list_paginates_and_counts() {
        let store = InMemoryTicketStore::new();
        for i in 0..5 {
            store.create(create_input(&format!("t{i}"))).await.unwrap();
        }

        let page = store
            .list(TicketFilter {
                page: 2,
                page_size: 2,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.items.len(), 2);
    }
}
