//! MongoDB implementation of [`TicketRepository`].

use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{
    Collection, Database,
    bson::{Document, doc},
};
use serde::Serialize;
use tracing::{info, instrument};

use crate::error::StoreResult;
use crate::models::{
    CreateTicket, Status, Ticket, TicketFilter, TicketPage, TicketText, UpdateTicket,
    compose_ticket_id,
};
use crate::repository::TicketRepository;

/// MongoDB-backed ticket store over a typed `tickets` collection.
pub struct MongoTicketStore {
    collection: Collection<Ticket>,
}

impl MongoTicketStore {
    /// Creates a store over the default `tickets` collection.
    pub fn new(db: Database) -> Self {
        let collection = db.collection::<Ticket>("tickets");
        Self { collection }
    }

    /// Creates a store over a custom collection name.
    pub fn with_collection(db: Database, collection_name: &str) -> Self {
        let collection = db.collection::<Ticket>(collection_name);
        Self { collection }
    }

    /// Builds a MongoDB filter document from [`TicketFilter`].
    fn build_filter(filter: &TicketFilter) -> Document {
        let mut doc = doc! {};

        if let Some(source) = filter.system_source {
            doc.insert("systemSource", wire_str(&source));
        }
        if let Some(category) = filter.category {
            doc.insert("category", wire_str(&category));
        }
        if let Some(status) = filter.status {
            doc.insert("status", wire_str(&status));
        }
        if let Some(priority) = filter.priority {
            doc.insert("priority", wire_str(&priority));
        }
        if let Some(ref search) = filter.search {
            doc.insert(
                "description",
                doc! { "$regex": regex_escape(search), "$options": "i" },
            );
        }

        doc
    }

    /// Generates the next `AS-YYYYMMDD-NN` id by counting today's tickets.
    async fn next_ticket_id(&self) -> StoreResult<String> {
        let now = Utc::now();
        let prefix = format!("AS-{}-", now.format("%Y%m%d"));
        let count = self
            .collection
            .count_documents(doc! { "id": { "$regex": format!("^{prefix}") } })
            .await?;
        Ok(compose_ticket_id(now, count + 1))
    }
}

/// Serializes an enum to its wire (JSON string) form for bson filters.
fn wire_str<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(|s| s.to_owned()))
        .unwrap_or_default()
}

/// Escapes regex metacharacters so user search text matches literally.
fn regex_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if "\\.+*?()|[]{}^$".contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[async_trait]
impl TicketRepository for MongoTicketStore {
    #[instrument(skip(self, input))]
    async fn create(&self, input: CreateTicket) -> StoreResult<Ticket> {
        let id = self.next_ticket_id().await?;
        let ticket = Ticket::new(id, input);

        self.collection.insert_one(&ticket).await?;

        info!(ticket_id = %ticket.id, "ticket created");
        Ok(ticket)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: &str) -> StoreResult<Option<Ticket>> {
        let ticket = self.collection.find_one(doc! { "id": id }).await?;
        Ok(ticket)
    }

    #[instrument(skip(self, filter))]
    async fn list(&self, filter: TicketFilter) -> StoreResult<TicketPage> {
        let mongo_filter = Self::build_filter(&filter);

        let total = self
            .collection
            .count_documents(mongo_filter.clone())
            .await?;

        let page = filter.page.max(1);
        let options = mongodb::options::FindOptions::builder()
            .limit(filter.page_size as i64)
            .skip((page - 1) * filter.page_size)
            .sort(doc! { "createdAt": -1 })
            .build();

        let cursor = self
            .collection
            .find(mongo_filter)
            .with_options(options)
            .await?;
        let items: Vec<Ticket> = cursor.try_collect().await?;

        Ok(TicketPage { items, total })
    }

    #[instrument(skip(self, input))]
    async fn update(&self, id: &str, input: UpdateTicket) -> StoreResult<Option<Ticket>> {
        let filter = doc! { "id": id };
        let Some(mut ticket) = self.collection.find_one(filter.clone()).await? else {
            return Ok(None);
        };

        ticket.apply_update(input);
        self.collection.replace_one(filter, &ticket).await?;

        info!(ticket_id = %id, "ticket updated");
        Ok(Some(ticket))
    }

    #[instrument(skip(self))]
    async fn close(&self, id: &str) -> StoreResult<Option<Ticket>> {
        let filter = doc! { "id": id };
        let Some(mut ticket) = self.collection.find_one(filter.clone()).await? else {
            return Ok(None);
        };

        let now = Utc::now();
        ticket.status = Status::Completed;
        ticket.closed_at = Some(now);
        ticket.updated_at = now;
        self.collection.replace_one(filter, &ticket).await?;

        info!(ticket_id = %id, "ticket closed");
        Ok(Some(ticket))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> StoreResult<bool> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;
        if result.deleted_count > 0 {
            info!(ticket_id = %id, "ticket deleted");
        }
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self, ids))]
    async fn find_resolved_in(&self, ids: &[String], limit: usize) -> StoreResult<Vec<Ticket>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let filter = doc! {
            "id": { "$in": ids },
            "status": "COMPLETED",
            "handleDetail": { "$exists": true, "$ne": "" },
        };

        let options = mongodb::options::FindOptions::builder()
            .limit(limit as i64)
            .build();

        let cursor = self.collection.find(filter).with_options(options).await?;
        let tickets: Vec<Ticket> = cursor.try_collect().await?;
        Ok(tickets)
    }

    #[instrument(skip(self))]
    async fn all_descriptions(&self) -> StoreResult<Vec<TicketText>> {
        let options = mongodb::options::FindOptions::builder()
            .projection(doc! { "id": 1, "description": 1 })
            .build();

        let cursor = self
            .collection
            .clone_with_type::<TicketText>()
            .find(doc! {})
            .with_options(options)
            .await?;
        let texts: Vec<TicketText> = cursor.try_collect().await?;
        Ok(texts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Priority, Status};

    #[test]
    fn build_filter_empty() {
        let doc = MongoTicketStore::build_filter(&TicketFilter::default());
        assert!(doc.is_empty());
    }

    #[test]
    fn build_filter_uses_wire_names() {
        let filter = TicketFilter {
            category: Some(Category::SystemFailure),
            status: Some(Status::Completed),
            priority: Some(Priority::P0),
            ..Default::default()
        };
        let doc = MongoTicketStore::build_filter(&filter);
        assert_eq!(doc.get_str("category").unwrap(), "SYSTEM_FAILURE");
        assert_eq!(doc.get_str("status").unwrap(), "COMPLETED");
        assert_eq!(doc.get_str("priority").unwrap(), "P0");
    }

    #[test]
    fn build_filter_with_search() {
        let filter = TicketFilter {
            search: Some("sync (OMS)".into()),
            ..Default::default()
        };
        let doc = MongoTicketStore::build_filter(&filter);
        let desc = doc.get_document("description").unwrap();
        assert_eq!(desc.get_str("$regex").unwrap(), "sync \\(OMS\\)");
        assert_eq!(desc.get_str("$options").unwrap(), "i");
    }
}
