pub mod ai_routes;
pub mod ticket_routes;
