//! Data models for accreditation certificates and uploaded reports.

pub mod certificate;
pub mod config;
pub mod report;
