//! SQLite-backed inventory manager for a small vehicle dealership.
//!
//! Two entities, owners and vehicles, live in one SQLite database behind
//! the [`db::OwnerStore`] and [`db::VehicleStore`] traits; the [`report`]
//! module derives the grouped, filtered and exportable inventory views.

pub mod app;
pub mod cli;
pub mod configuration;
pub mod db;
pub mod error;
pub mod report;
pub mod tracing;
pub mod types;
