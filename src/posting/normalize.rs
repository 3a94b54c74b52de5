use regex::{Regex, RegexBuilder};

use crate::error::{Error, Result};

/// A single title cleanup rule. Every match is removed.
#[derive(Debug, Clone)]
pub enum CleanupRule {
    Literal(String),
    Pattern(Regex),
}

impl CleanupRule {
    /// `/source/flags` becomes a pattern, anything else is taken literally.
    pub fn parse(raw: &str) -> Result<Self> {
        match split_pattern(raw) {
            Some((source, flags)) => Ok(CleanupRule::Pattern(build_pattern(source, flags)?)),
            None => Ok(CleanupRule::Literal(raw.to_string())),
        }
    }

    fn remove_from(&self, title: &str) -> String {
        match self {
            CleanupRule::Literal(text) if text.is_empty() => title.to_string(),
            CleanupRule::Literal(text) => title.replace(text.as_str(), ""),
            CleanupRule::Pattern(re) => re.replace_all(title, "").into_owned(),
        }
    }
}

/// Ordered list of cleanup rules applied to every incoming title.
#[derive(Debug, Clone, Default)]
pub struct TitleCleanup {
    rules: Vec<CleanupRule>,
}

impl TitleCleanup {
    pub fn new(rules: Vec<CleanupRule>) -> Self {
        Self { rules }
    }

    pub fn from_strs<S: AsRef<str>>(raw: &[S]) -> Result<Self> {
        let rules = raw
            .iter()
            .map(|r| CleanupRule::parse(r.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(rules))
    }

    pub fn rules(&self) -> &[CleanupRule] {
        &self.rules
    }

    /// Removes every rule match in order, then collapses whitespace. Repeats until the
    /// title stops changing so that normalizing twice is a no-op. Rules only ever
    /// delete text, so every extra pass is strictly shorter and the loop ends.
    /// An empty result is returned as is.
    pub fn apply(&self, title: &str) -> String {
        let mut current = collapse_whitespace(title);
        loop {
            let mut next = current.clone();
            for rule in &self.rules {
                next = rule.remove_from(&next);
            }
            let next = collapse_whitespace(&next);
            if next == current {
                return current;
            }
            current = next;
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits `/source/flags` into its parts. Returns `None` for plain text.
pub(crate) fn split_pattern(raw: &str) -> Option<(&str, &str)> {
    let rest = raw.strip_prefix('/')?;
    let end = rest.rfind('/')?;
    if end == 0 {
        return None;
    }
    Some((&rest[..end], &rest[end + 1..]))
}

/// Compiles a pattern honoring JavaScript-style flags. `g` and `u` are accepted and
/// ignored: matching is always global and Unicode aware.
pub(crate) fn build_pattern(source: &str, flags: &str) -> Result<Regex> {
    let mut builder = RegexBuilder::new(source);
    for flag in flags.chars() {
        match flag {
            'i' => {
                builder.case_insensitive(true);
            }
            'm' => {
                builder.multi_line(true);
            }
            's' => {
                builder.dot_matches_new_line(true);
            }
            'g' | 'u' => {}
            other => {
                return Err(Error::Config(format!(
                    "unsupported flag '{}' in pattern /{}/{}",
                    other, source, flags
                )))
            }
        }
    }
    builder
        .build()
        .map_err(|e| Error::Config(format!("invalid pattern /{}/: {}", source, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn londrina() -> TitleCleanup {
        TitleCleanup::from_strs(&["- Londrina, PR", "(Londrina PR)", "em Londrina/PR", "()"])
            .unwrap()
    }

    #[test]
    fn test_removes_location_suffixes() {
        let cleanup = londrina();
        assert_eq!(cleanup.apply("Desenvolvedor PHP - Londrina, PR"), "Desenvolvedor PHP");
        assert_eq!(cleanup.apply("Programador Java (Londrina PR)"), "Programador Java");
        assert_eq!(cleanup.apply("Vaga de Front-end em Londrina/PR"), "Vaga de Front-end");
        assert_eq!(cleanup.apply("Analista ()"), "Analista");
    }

    #[test]
    fn test_all_occurrences_removed() {
        let cleanup = londrina();
        assert_eq!(
            cleanup.apply("Dev - Londrina, PR Senior - Londrina, PR"),
            "Dev Senior"
        );
    }

    #[test]
    fn test_pattern_rules() {
        let cleanup = TitleCleanup::from_strs(&[r"/\s*-\s*[A-Za-z ]+, [A-Z]{2}$/"]).unwrap();
        assert_eq!(cleanup.apply("Desenvolvedor Java - Maringá, PR"), "Desenvolvedor Java - Maringá, PR");
        assert_eq!(cleanup.apply("Desenvolvedor Java - Curitiba, PR"), "Desenvolvedor Java");
    }

    #[test]
    fn test_rules_apply_in_order() {
        let first = TitleCleanup::from_strs(&["ab", "b"]).unwrap();
        let second = TitleCleanup::from_strs(&["b", "ab"]).unwrap();
        assert_eq!(first.apply("aab"), "a");
        assert_eq!(second.apply("aab"), "aa");
    }

    #[test]
    fn test_idempotent() {
        let cleanup = londrina();
        for title in [
            "Desenvolvedor PHP - Londrina, PR",
            "Dev -  Londrina, PR",
            "Programador   Java (Londrina PR) ",
            "Vendedor Externo",
            "",
        ] {
            let once = cleanup.apply(title);
            assert_eq!(cleanup.apply(&once), once, "title {:?}", title);
        }
    }

    #[test]
    fn test_empty_result_passes_through() {
        let cleanup = londrina();
        assert_eq!(cleanup.apply("- Londrina, PR"), "");
        assert_eq!(cleanup.apply("   "), "");
    }

    #[test]
    fn test_split_pattern() {
        assert_eq!(split_pattern("/venda?s/ig"), Some(("venda?s", "ig")));
        assert_eq!(split_pattern("/a/b/"), Some(("a/b", "")));
        assert_eq!(split_pattern("torno"), None);
        assert_eq!(split_pattern("/"), None);
        assert_eq!(split_pattern("//i"), None);
    }

    #[test]
    fn test_bad_flag_is_config_error() {
        assert!(matches!(build_pattern("x", "q"), Err(Error::Config(_))));
        assert!(matches!(build_pattern("(", ""), Err(Error::Config(_))));
    }
}
