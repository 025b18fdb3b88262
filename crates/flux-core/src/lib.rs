//! Core of the Flux multi-tenant Kanban application: workspaces with
//! role-based membership, boards, fractionally ordered tasks, access
//! requests, an append-only activity feed, and the optimistic client
//! reducer. The web/UI layer invokes these operations in-process; there
//! is no wire protocol here.

pub mod activity;
pub mod config;
pub mod db;
pub mod error;
pub mod identity;
pub mod mailer;
pub mod ops;
pub mod optimistic;
pub mod ordering;
pub mod roles;
pub mod util;

pub use error::{Error, Result};
pub use identity::Identity;
