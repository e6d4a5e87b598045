//! The fixed list of practice exams offered on the home screen.

use crate::model::ExamId;

/// Number of practice exams in the catalog.
pub const EXAM_COUNT: u32 = 23;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub number: u32,
    pub id: ExamId,
    pub name: String,
}

#[must_use]
pub fn catalog() -> Vec<CatalogEntry> {
    (1..=EXAM_COUNT)
        .map(|number| CatalogEntry {
            number,
            id: ExamId::numbered(number),
            name: format!("Exam {number}"),
        })
        .collect()
}

/// Catalog entry for `exam_id`, if it is one of the numbered exams.
#[must_use]
pub fn lookup(exam_id: &ExamId) -> Option<CatalogEntry> {
    exam_id
        .number()
        .filter(|n| (1..=EXAM_COUNT).contains(n))
        .map(|number| CatalogEntry {
            number,
            id: exam_id.clone(),
            name: format!("Exam {number}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lists_twenty_three_exams() {
        let entries = catalog();
        assert_eq!(entries.len(), 23);
        assert_eq!(entries[0].id.as_str(), "exam-1.json");
        assert_eq!(entries[22].name, "Exam 23");
    }

    #[test]
    fn lookup_only_matches_catalog_numbers() {
        assert!(lookup(&ExamId::numbered(5)).is_some());
        assert!(lookup(&ExamId::numbered(24)).is_none());
        assert!(lookup(&ExamId::new("custom.json").unwrap()).is_none());
    }
}
