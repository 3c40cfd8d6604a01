//! Differential classification against a reference document
//!
//! A finding is pre-existing when the reference has a finding with the same
//! part and message. Matching counts occurrences: two identical findings
//! against one in the reference leave one introduced.

use std::collections::HashMap;

use crate::issue::{IssueOrigin, ReportedIssue, ValidationIssue};

pub fn classify(current: Vec<ValidationIssue>, reference: &[ValidationIssue]) -> Vec<ReportedIssue> {
    let mut budget: HashMap<(String, String), usize> = HashMap::new();
    for issue in reference {
        *budget.entry(owned_key(issue)).or_default() += 1;
    }

    current
        .into_iter()
        .map(|issue| {
            let origin = match budget.get_mut(&owned_key(&issue)) {
                Some(left) if *left > 0 => {
                    *left -= 1;
                    IssueOrigin::PreExisting
                }
                _ => IssueOrigin::Introduced,
            };
            ReportedIssue { issue, origin }
        })
        .collect()
}

fn owned_key(issue: &ValidationIssue) -> (String, String) {
    let (part, message) = issue.key();
    (part.to_string(), message.to_string())
}

/// Every finding is introduced when there is no reference
pub fn all_introduced(current: Vec<ValidationIssue>) -> Vec<ReportedIssue> {
    current
        .into_iter()
        .map(|issue| ReportedIssue {
            issue,
            origin: IssueOrigin::Introduced,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(part: &str, message: &str, line: u32) -> ValidationIssue {
        ValidationIssue::error(part, message).at(line, 1)
    }

    #[test]
    fn test_same_part_and_message_is_pre_existing() {
        let reference = vec![issue("ppt/slides/slide1.xml", "bad", 10)];
        let current = vec![
            issue("ppt/slides/slide1.xml", "bad", 14),
            issue("ppt/slides/slide2.xml", "bad", 10),
        ];
        let out = classify(current, &reference);
        assert_eq!(out[0].origin, IssueOrigin::PreExisting);
        assert_eq!(out[1].origin, IssueOrigin::Introduced);
    }

    #[test]
    fn test_occurrences_are_counted() {
        let reference = vec![issue("a.xml", "dup", 1)];
        let current = vec![issue("a.xml", "dup", 1), issue("a.xml", "dup", 2)];
        let origins: Vec<IssueOrigin> = classify(current, &reference)
            .into_iter()
            .map(|r| r.origin)
            .collect();
        assert_eq!(origins, vec![IssueOrigin::PreExisting, IssueOrigin::Introduced]);
    }

    #[test]
    fn test_fixed_reference_issues_are_not_reported() {
        let reference = vec![issue("a.xml", "gone", 1)];
        assert!(classify(Vec::new(), &reference).is_empty());
    }
}
