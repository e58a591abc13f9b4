//! UI-host bindings for the artifact vault core.
//!
//! Bindings are generated from `api`; keep exported functions sync and
//! panic-free.

pub mod api;
