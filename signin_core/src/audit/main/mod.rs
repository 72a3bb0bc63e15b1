mod pipeline;

pub use pipeline::{AuditHandle, AuditPipeline};
