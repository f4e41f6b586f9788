//! REST API server: routes, DTOs, OpenAPI documentation and the background sweep.

pub mod config;
pub mod dto;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;
