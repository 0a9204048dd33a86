//! # IO Module
//!
//! Adapter layer between HTTP clients and the domain services.
//!
//! ## Key Responsibilities
//!
//! - **API Endpoints**: JSON endpoints under `/api`, plus one CSV download
//! - **Session Guard**: every protected request passes the idle and
//!   single-session checks before reaching a handler
//! - **Error Translation**: domain errors become status codes with a JSON body
//! - **DTO Mapping**: domain models are mapped to the `shared` crate types

pub mod rest;

pub use rest::*;
