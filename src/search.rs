//! Name search over borrow history.
//!
//! Matching is case-insensitive and token based: the query is split on
//! whitespace and a record matches when any token is a substring of the
//! student's full name. A blank query matches nothing.

use crate::models::StudentRecord;

/// Lower-cased query tokens, or `None` for a blank query.
fn tokens(query: &str) -> Option<Vec<String>> {
    let lowered = query.to_lowercase();
    let tokens: Vec<String> = lowered.split_whitespace().map(str::to_string).collect();
    if tokens.is_empty() {
        None
    } else {
        Some(tokens)
    }
}

fn matches(record: &StudentRecord, tokens: &[String]) -> bool {
    let full_name = record.full_name().to_lowercase();
    tokens.iter().any(|token| full_name.contains(token.as_str()))
}

/// Records whose name matches `query`, in their original order.
pub fn search(query: &str, records: &[StudentRecord]) -> Vec<StudentRecord> {
    search_refs(query, records).into_iter().cloned().collect()
}

/// Borrowing variant of [`search`] used by list views.
pub fn search_refs<'a>(query: &str, records: &'a [StudentRecord]) -> Vec<&'a StudentRecord> {
    let Some(tokens) = tokens(query) else {
        return Vec::new();
    };
    records
        .iter()
        .filter(|record| matches(record, &tokens))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Book, BorrowRequest};
    use pretty_assertions::assert_eq;

    fn student(first: &str, middle: &str, last: &str) -> StudentRecord {
        let book = Book::new("Noli Me Tangere", "Jose Rizal").unwrap();
        let request = BorrowRequest {
            first_name: first.into(),
            middle_name: middle.into(),
            last_name: last.into(),
            grade_section: "10-A".into(),
            book_id: book.id.clone(),
        };
        StudentRecord::borrow(&request, &book, "03/15/2025, 02:30 PM".into()).unwrap()
    }

    fn roster() -> Vec<StudentRecord> {
        vec![student("Maria", "", "Cruz"), student("Jose", "", "Rizal")]
    }

    #[test]
    fn blank_query_returns_nothing() {
        let records = roster();
        assert!(search("", &records).is_empty());
        assert!(search("   \t", &records).is_empty());
    }

    #[test]
    fn single_token_is_case_insensitive() {
        let records = roster();
        assert_eq!(search("maria", &records), vec![records[0].clone()]);
        assert_eq!(search("RIZ", &records), vec![records[1].clone()]);
    }

    #[test]
    fn tokens_are_ored() {
        let records = roster();
        assert_eq!(search("cruz rizal", &records), records);
    }

    #[test]
    fn middle_name_participates() {
        let records = vec![student("Ana", "Santos", "Reyes"), student("Ben", "", "Lim")];
        let hits = search_refs("santos", &records);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].last_name, "Reyes");
    }

    #[test]
    fn no_match_is_empty() {
        assert!(search("bonifacio", &roster()).is_empty());
    }
}
