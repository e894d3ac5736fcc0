//! Certificate validation against the accreditation registry.

mod validator;

pub use validator::{CertificateValidator, Verdict};

pub use crate::extraction::rules::dates::parse_date;
