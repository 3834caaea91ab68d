pub mod compliance_pipeline;

pub use compliance_pipeline::{CompliancePipeline, REPORT_ARCHIVE};
