//! Inbound adapters that translate external requests into domain service
//! calls while keeping framework details at the edge.
//!
//! [`http`] serves the REST API; [`ws`] carries presence and live message
//! delivery over `/ws`.

pub mod http;
pub mod ws;
