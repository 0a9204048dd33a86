//! # Storage Module
//!
//! Handles all data persistence for the attendance tracker.
//!
//! The domain layer only depends on the traits in [`traits`]; the SQLite
//! repositories here implement them on top of a shared [`DbConnection`].
//!
//! ## Tables
//!
//! - **users**: accounts, their role and the token of their single live session
//! - **barrios**: neighborhoods youth belong to
//! - **youth**: registered young people, keyed by cédula
//! - **services**: scheduled meetings attendance is taken for
//! - **attendance**: one row per (service, youth) pair

pub mod connection;
pub mod repositories;
pub mod traits;

// Re-export the main types that other modules need
pub use connection::DbConnection;
pub use repositories::{
    AttendanceRepository,
    BarrioRepository,
    ServiceRepository,
    UserRepository,
    YouthRepository,
};
pub use traits::{AttendanceStorage, BarrioStorage, ServiceStorage, UserStorage, YouthStorage};
