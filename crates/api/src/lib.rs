//! HTTP API: server, routing, and the request authorization/audit gateway.

pub mod app;
pub mod context;
pub mod middleware;
pub mod route_table;
