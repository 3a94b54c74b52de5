use std::collections::HashSet;

use super::types::Posting;

/// Keeps the first posting seen for each id, in first-occurrence order.
pub fn dedupe_by_id(postings: Vec<Posting>) -> Vec<Posting> {
    let mut seen = HashSet::new();
    postings
        .into_iter()
        .filter(|posting| seen.insert(posting.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(id: &str, title: &str) -> Posting {
        Posting {
            id: id.to_string(),
            title: title.to_string(),
            date: 0,
            company: String::new(),
            date_processed: 0,
            description: String::new(),
            url: String::new(),
            delivered: false,
            delivered_date: None,
        }
    }

    #[test]
    fn test_first_occurrence_wins() {
        let out = dedupe_by_id(vec![
            posting("a", "first a"),
            posting("b", "first b"),
            posting("a", "second a"),
            posting("c", "first c"),
            posting("b", "second b"),
        ]);

        let summary: Vec<_> = out.iter().map(|p| (p.id.as_str(), p.title.as_str())).collect();
        assert_eq!(
            summary,
            vec![("a", "first a"), ("b", "first b"), ("c", "first c")]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(dedupe_by_id(Vec::new()).is_empty());
    }
}
