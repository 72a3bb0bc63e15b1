//! Login-attempt audit pipeline
//!
//! Every verification attempt handled by the sign-in orchestrator produces one
//! `LoginAttempt` record. This module decouples enrichment (best-effort IP
//! geolocation) and persistence of those records from the request path: the
//! orchestrator hands a record to the queue and returns immediately, and a
//! single background consumer drains the queue in arrival order.
//!
//! The pipeline is purely observational. It never gates a sign-in decision,
//! and a failing sink never surfaces to the authentication caller.

mod errors;
mod main;
mod sink;
mod types;

pub use errors::AuditError;
pub use main::{AuditHandle, AuditPipeline};
pub use sink::{AuditSink, GeoLocator};
pub use types::{AuthMethod, GeoPoint, LoginAttempt, SignInOutcome};
