//! Common regex patterns for certificate extraction.
//!
//! All patterns are written against upper-cased, whitespace-collapsed text.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Normalization
    pub static ref SPACED_HYPHEN: Regex = Regex::new(r"\s*-\s*").unwrap();

    pub static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();

    // Certificate numbers with a known accreditation prefix (T C, C C, M C, R C
    // tolerate an OCR-inserted space between the letters)
    pub static ref CERT_KNOWN_PREFIX: Regex = Regex::new(
        r"\b(T ?C|C ?C|M ?C|R ?C)[- ]?(\d{3,6})\b"
    ).unwrap();

    // Any two-letter prefix
    pub static ref CERT_GENERIC: Regex = Regex::new(
        r"\b([A-Z] ?[A-Z])[- ]?(\d{3,6})\b"
    ).unwrap();

    // ULR label; the value is read token by token after the match
    pub static ref ULR_LABEL: Regex = Regex::new(
        r"\bULR(?: ?NO\b\.?| ?NUMBER\b|\b)[: -]*"
    ).unwrap();

    // Decodable ULR layout: type, certificate digits, year, location, ledger, scope
    pub static ref ULR_STRUCTURE: Regex = Regex::new(
        r"^(TC|CC|RC)(\d{4})(\d{2})([0-9])([0-9A-F]{8})([FP])$"
    ).unwrap();

    // Issue dates, in priority order
    pub static ref DATE_NUMERIC: Regex = Regex::new(
        r"\b\d{2}/\d{2}/\d{4}\b"
    ).unwrap();

    pub static ref DATE_MONTH_ABBR: Regex = Regex::new(
        r"\b\d{2}\s+[A-Z]{3}\s+\d{4}\b"
    ).unwrap();
}
