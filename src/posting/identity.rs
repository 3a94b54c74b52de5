use ring::digest::{digest, SHA1_FOR_LEGACY_USE_ONLY};
use url::Url;

/// Query parameter carrying the site-assigned job key.
pub const JOB_KEY_PARAM: &str = "jk";

/// Stable identity for a posting: the link's job key when present, otherwise a SHA-1
/// digest of the already normalized title.
pub fn derive_id(link: &str, normalized_title: &str) -> String {
    job_key(link).unwrap_or_else(|| title_digest(normalized_title))
}

/// Returns the first `jk` query value of `link` if it is non-empty. Links that do not
/// parse are treated as having no query at all.
pub fn job_key(link: &str) -> Option<String> {
    let parsed = Url::parse(link).ok()?;
    let (_, value) = parsed
        .query_pairs()
        .find(|(key, _)| key == JOB_KEY_PARAM)?;

    if value.is_empty() {
        None
    } else {
        Some(value.into_owned())
    }
}

/// Lowercase hex SHA-1 of `title`.
pub fn title_digest(title: &str) -> String {
    digest(&SHA1_FOR_LEGACY_USE_ONLY, title.as_bytes())
        .as_ref()
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_key_wins() {
        let link = "https://www.indeed.com.br/viewjob?jk=abc123&from=rss";
        assert_eq!(derive_id(link, "Desenvolvedor PHP"), "abc123");
        assert_eq!(derive_id(link, "Something else entirely"), "abc123");
    }

    #[test]
    fn test_digest_fallback() {
        assert_eq!(title_digest("abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
        assert_eq!(title_digest(""), "da39a3ee5e6b4b0d3255bfef95601890afd80709");

        let link = "https://www.indeed.com.br/viewjob?from=rss";
        assert_eq!(derive_id(link, "abc"), title_digest("abc"));
    }

    #[test]
    fn test_empty_job_key_falls_back() {
        let link = "https://www.indeed.com.br/viewjob?jk=&from=rss";
        assert_eq!(job_key(link), None);
        assert_eq!(derive_id(link, "Programador"), title_digest("Programador"));
    }

    #[test]
    fn test_first_job_key_is_used() {
        let link = "https://example.com/job?jk=first&jk=second";
        assert_eq!(job_key(link).as_deref(), Some("first"));
    }

    #[test]
    fn test_malformed_url_does_not_fail() {
        assert_eq!(job_key("not a url ?jk=abc"), None);
        assert_eq!(job_key("/relative/path?jk=abc"), None);
        assert_eq!(derive_id("::::", "Analista"), title_digest("Analista"));
    }

    #[test]
    fn test_identity_is_deterministic() {
        let a = derive_id("https://example.com/a", "Desenvolvedor Java");
        let b = derive_id("https://example.com/b", "Desenvolvedor Java");
        let c = derive_id("https://example.com/a", "Desenvolvedor PHP");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
