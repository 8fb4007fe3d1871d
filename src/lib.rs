//! Leave Entitlement Engine
//!
//! This crate provides the core of an HR leave management service: it
//! validates leave windows against weekends and organization holidays, keeps
//! a per-employee, per-leave-type, per-year ledger of allowed and used days,
//! drives leave requests through approval, manages leave rules and their
//! assignment to employees, and rolls balances over into each new year with
//! capped carry-forward.
//!
//! The engine is a library. Storage, the employee directory, notifications,
//! attachments and the clock are reached through traits in [`store`] and
//! [`external`], bundled in an [`context::EngineContext`].

#![warn(missing_docs)]

pub mod calendar;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod external;
pub mod models;
pub mod outcome;
pub mod store;
