//! Household chore tracking: recurrence evaluation, occurrence buckets, a
//! shared shopping list, a JSON-backed store with demo fallback, and the
//! commands built on them.

pub mod activity;
pub mod agenda;
pub mod commands;
pub mod config;
pub mod demo;
pub mod error;
pub mod locale;
pub mod models;
pub mod schedule;
pub mod shopping;
pub mod storage;
pub mod tui;
