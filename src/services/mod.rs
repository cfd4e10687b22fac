//! Gateway services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Services own backend access, session handling, and the aggregations the
//! screens need, so route handlers stay focused on HTTP translation and
//! cookie plumbing. Nothing here depends on axum except `session`, which
//! speaks the cookie jar.

pub mod auth_session;
pub mod backend;
pub mod budget;
pub mod documents;
pub mod evcs;
pub mod forms;
pub mod notification_rules;
pub mod providers;
pub mod rbac;
pub mod session;
pub mod storage;
