//! Hostname syntax check used to tell a domain apart from an account name.

const MAX_DOMAIN_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// Returns true if `candidate` is a syntactically valid domain name.
///
/// A valid name is one or more dot-separated labels. Each label is 1 to 63
/// ASCII letters, digits or hyphens and neither starts nor ends with a
/// hyphen. The whole name is at most 253 characters.
pub fn is_valid_domain(candidate: &str) -> bool {
    if candidate.is_empty() || candidate.len() > MAX_DOMAIN_LEN {
        return false;
    }
    candidate.split('.').all(is_valid_label)
}

fn is_valid_label(label: &str) -> bool {
    let bytes = label.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) => {
            bytes.len() <= MAX_LABEL_LEN
                && first.is_ascii_alphanumeric()
                && last.is_ascii_alphanumeric()
                && bytes.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'-')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_domains() {
        assert!(is_valid_domain("example.com"));
        assert!(is_valid_domain("a.b.c"));
        assert!(is_valid_domain("sub-domain.Example.COM"));
        assert!(is_valid_domain("xn--bcher-kva.example"));
        assert!(is_valid_domain("123.example"));
    }

    #[test]
    fn single_label_is_a_domain() {
        // Plain account names pass the syntax check too.
        assert!(is_valid_domain("bob"));
    }

    #[test]
    fn rejects_edge_hyphens() {
        assert!(!is_valid_domain("-bad.com"));
        assert!(!is_valid_domain("bad-.com"));
        assert!(!is_valid_domain("example.-com"));
    }

    #[test]
    fn rejects_empty_labels() {
        assert!(!is_valid_domain(""));
        assert!(!is_valid_domain(".com"));
        assert!(!is_valid_domain("example..com"));
        assert!(!is_valid_domain("example.com."));
    }

    #[test]
    fn rejects_invalid_characters() {
        assert!(!is_valid_domain("bob_smith"));
        assert!(!is_valid_domain("user@example.com"));
        assert!(!is_valid_domain("exämple.com"));
    }

    #[test]
    fn enforces_label_length() {
        let label = "a".repeat(63);
        assert!(is_valid_domain(&format!("{label}.com")));
        let label = "a".repeat(64);
        assert!(!is_valid_domain(&format!("{label}.com")));
    }

    #[test]
    fn enforces_total_length() {
        assert!(!is_valid_domain(&"a".repeat(254)));

        // 4 labels of 63 plus 3 dots is 255 characters.
        let long = vec!["a".repeat(63); 4].join(".");
        assert!(!is_valid_domain(&long));

        let fits = format!("{}.{}", vec!["a".repeat(63); 3].join("."), "a".repeat(61));
        assert_eq!(fits.len(), 253);
        assert!(is_valid_domain(&fits));
    }
}
