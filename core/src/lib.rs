//! Fraud Case Desk — client-side case state and request orchestration.
//!
//! Module layout (leaf-first):
//!   risk          — score → display category
//!   model         — wire records (Transaction, Signal, Case, Summary)
//!   request       — allowlisted summarize payload
//!   gateway       — analysis / summary service contracts + HTTP client
//!   case_store    — the single source of truth for cases and selection
//!   case_list     — list projection
//!   case_detail   — detail projection + summarize workflow
//!   session       — single-writer orchestrator over all of the above

pub mod case_detail;
pub mod case_list;
pub mod case_store;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod gateway;
pub mod model;
pub mod request;
pub mod risk;
pub mod sample_data;
pub mod session;
pub mod snapshot;
pub mod types;
