#![no_main]

use branding::domain::domain_lookup::{DomainClassifier, normalize_domain};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data)
        && s.is_ascii()
    {
        let normalized = normalize_domain(s);
        assert_eq!(normalize_domain(&normalized), normalized);

        let classifier = DomainClassifier::new(
            &["portal.example.com".to_owned()],
            &["localhost".to_owned()],
        );
        // Classification only depends on the normalized form.
        assert_eq!(classifier.is_custom(s), classifier.is_custom(&normalized));
    }
});
