//! Youth attendance tracker server.
//!
//! The binary in `main.rs` is a thin wrapper around [`cli::execute_command`];
//! integration tests build the router through [`backend::create_router`].

pub mod backend;
pub mod cli;

pub use backend::{create_router, initialize_backend, AppState};
