//! Move the open email into a mail folder picked from a
//! fuzzy-searchable, recency-biased folder list, over the Outlook
//! REST API. The picker core (`store`, `recent`, `search`, `select`,
//! `session`) has no rendering dependency; `commands` and the binary
//! are the console surface over it.

pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod panel;
pub mod recent;
pub mod rest;
pub mod search;
pub mod select;
pub mod session;
pub mod store;
