use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// System where the reported issue originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SystemSource {
    TMS,
    OMS,
    WMS,
}

impl SystemSource {
    /// Wire name, as stored and exchanged with clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            SystemSource::TMS => "TMS",
            SystemSource::OMS => "OMS",
            SystemSource::WMS => "WMS",
        }
    }
}

/// Category of the ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    TicketProcess,
    SystemFailure,
    CostOptimization,
}

impl Category {
    /// Wire name, as stored and exchanged with clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::TicketProcess => "TICKET_PROCESS",
            Category::SystemFailure => "SYSTEM_FAILURE",
            Category::CostOptimization => "COST_OPTIMIZATION",
        }
    }
}

/// Type of handling required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HandleType {
    Product,
    Dev,
    ProductDev,
}

/// Priority level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    P0,
    P1,
    P2,
    P3,
}

/// Lifecycle status. Only `Completed` tickets with a non-empty
/// `handle_detail` are eligible as recommendation sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    #[default]
    Open,
    Processing,
    Completed,
}

/// After-sales ticket record as stored in the `tickets` collection.
///
/// The external identifier (`AS-YYYYMMDD-NN`) lives in the `id` field; the
/// collection keeps its own `_id` which this model never touches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    pub system_source: SystemSource,
    pub category: Category,
    pub description: String,
    pub handle_type: HandleType,
    /// Resolution detail filled in while the ticket is worked on.
    #[serde(default)]
    pub handle_detail: String,
    pub priority: Priority,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
}

impl Ticket {
    /// Builds a fresh ticket from a create request and a generated id.
    pub fn new(id: String, input: CreateTicket) -> Self {
        let now = Utc::now();
        Self {
            id,
            system_source: input.system_source,
            category: input.category,
            description: input.description,
            handle_type: input.handle_type,
            handle_detail: input.handle_detail,
            priority: input.priority,
            status: Status::Open,
            tags: input.tags,
            solution_template: input.solution_template,
            created_by: input.created_by,
            assigned_to: input.assigned_to,
            created_at: now,
            updated_at: now,
            closed_at: None,
        }
    }

    /// Applies the non-`None` fields of an update request in place.
    pub fn apply_update(&mut self, input: UpdateTicket) {
        if let Some(v) = input.system_source {
            self.system_source = v;
        }
        if let Some(v) = input.category {
            self.category = v;
        }
        if let Some(v) = input.description {
            self.description = v;
        }
        if let Some(v) = input.handle_type {
            self.handle_type = v;
        }
        if let Some(v) = input.handle_detail {
            self.handle_detail = v;
        }
        if let Some(v) = input.priority {
            self.priority = v;
        }
        if let Some(v) = input.status {
            self.status = v;
        }
        if let Some(v) = input.tags {
            self.tags = v;
        }
        if let Some(v) = input.solution_template {
            self.solution_template = Some(v);
        }
        if let Some(v) = input.assigned_to {
            self.assigned_to = Some(v);
        }
        self.updated_at = Utc::now();
    }

    /// Whether this ticket may serve as a recommendation source.
    pub fn is_eligible_source(&self) -> bool {
        self.status == Status::Completed && !self.handle_detail.trim().is_empty()
    }
}

/// DTO for creating a ticket.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicket {
    pub system_source: SystemSource,
    pub category: Category,
    pub description: String,
    pub handle_type: HandleType,
    #[serde(default)]
    pub handle_detail: String,
    pub priority: Priority,
    #[serde(default)]
    pub tags: Vec<String>,
    pub solution_template: Option<String>,
    pub assigned_to: Option<String>,
    pub created_by: Option<String>,
}

/// DTO for updating a ticket; only present fields are applied.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicket {
    pub system_source: Option<SystemSource>,
    pub category: Option<Category>,
    pub description: Option<String>,
    pub handle_type: Option<HandleType>,
    pub handle_detail: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub tags: Option<Vec<String>>,
    pub solution_template: Option<String>,
    pub assigned_to: Option<String>,
}

/// Query filters for listing tickets.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketFilter {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    pub system_source: Option<SystemSource>,
    pub category: Option<Category>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    /// Case-insensitive substring match on the description.
    pub search: Option<String>,
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    10
}

impl Default for TicketFilter {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
            system_source: None,
            category: None,
            status: None,
            priority: None,
            search: None,
        }
    }
}

/// One page of tickets plus the total match count.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketPage {
    pub items: Vec<Ticket>,
    pub total: u64,
}

/// Composes the external ticket id for the `seq`-th ticket of a day.
pub fn compose_ticket_id(now: DateTime<Utc>, seq: u64) -> String {
    format!("AS-{}-{:02}", now.format("%Y%m%d"), seq)
}

/// Minimal projection used by the bulk reindex scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketText {
    pub id: String,
    #[serde(default)]
    pub description: String,
}
