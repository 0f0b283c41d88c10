//! API Module
//!
//! HTTP handlers and routing for embedding the object cache in a service.
//!
//! # Endpoints
//! - `PUT /objects/:key` - Store an object
//! - `GET /objects/:key` - Read an object
//! - `DELETE /objects/:key` - Delete an object
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
