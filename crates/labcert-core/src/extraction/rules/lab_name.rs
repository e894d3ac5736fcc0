//! Best-effort laboratory name matching against the registry.

use tracing::{debug, warn};

use crate::store::CertificateRegistry;

/// Find the first registry laboratory name that appears verbatim in the text.
///
/// Names are compared case-insensitively in the registry's iteration order.
/// A registry failure is logged and treated as "no match"; it never blocks
/// extraction.
pub fn match_laboratory_name<R>(normalized_text: &str, registry: &R) -> Option<String>
where
    R: CertificateRegistry + ?Sized,
{
    let names = match registry.laboratory_names() {
        Ok(names) => names,
        Err(e) => {
            warn!("Laboratory name lookup failed, continuing without it: {}", e);
            return None;
        }
    };

    let found = names.into_iter().find(|name| {
        let needle = name.trim().to_uppercase();
        !needle.is_empty() && normalized_text.contains(&needle)
    });

    if let Some(name) = &found {
        debug!("Matched laboratory name {:?}", name);
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::models::certificate::CertificateRecord;
    use crate::store::MemoryRegistry;

    #[test]
    fn test_first_registry_name_wins() {
        let registry = MemoryRegistry::new(vec![
            CertificateRecord::new("L1", "Acme Labs", "TC-1"),
            CertificateRecord::new("L2", "Acme Labs Pune", "TC-2"),
        ]);
        let text = "ISSUED TO ACME LABS PUNE";
        assert_eq!(match_laboratory_name(text, &registry), Some("Acme Labs".to_string()));
    }

    #[test]
    fn test_blank_names_are_skipped() {
        let registry = MemoryRegistry::new(vec![
            CertificateRecord::new("L1", "  ", "TC-1"),
            CertificateRecord::new("L2", "Delta Testing House", "TC-2"),
        ]);
        assert_eq!(
            match_laboratory_name("DELTA TESTING HOUSE", &registry),
            Some("Delta Testing House".to_string())
        );
        assert_eq!(match_laboratory_name("UNKNOWN LAB", &registry), None);
    }

    struct Unreachable;

    impl CertificateRegistry for Unreachable {
        fn find_by_certificate_number(&self, _: &str) -> Result<Vec<CertificateRecord>, StoreError> {
            Err(StoreError::Unavailable("offline".to_string()))
        }

        fn find_by_name(&self, _: &str) -> Result<Vec<CertificateRecord>, StoreError> {
            Err(StoreError::Unavailable("offline".to_string()))
        }

        fn laboratory_names(&self) -> Result<Vec<String>, StoreError> {
            Err(StoreError::Unavailable("offline".to_string()))
        }
    }

    #[test]
    fn test_registry_failure_degrades_to_none() {
        assert_eq!(match_laboratory_name("ANY TEXT", &Unreachable), None);
    }
}
