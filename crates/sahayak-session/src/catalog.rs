//! Fixed question-group catalog for the eligibility questionnaire.
//!
//! Progression is by group, not by individual prompt: one conversational
//! turn consumes one group. The content here is data, not logic.

use serde::{Deserialize, Serialize};

/// Static definition of one question group.
#[derive(Debug, Clone, Copy)]
pub struct GroupSpec {
    pub title: &'static str,
    pub intro: &'static str,
    pub prompts: &'static [&'static str],
}

const GROUPS: [GroupSpec; 4] = [
    GroupSpec {
        title: "Personal Details - Part 1",
        intro: "Let's start with some basic information.",
        prompts: &[
            "What is your full name?",
            "What is your gender? (Male, Female, or Others)",
            "Which state do you belong to? (full name, like DELHI or KARNATAKA)",
            "What is your religion? (Hindu, Muslim, Christian, Sikh, etc.)",
        ],
    },
    GroupSpec {
        title: "Personal & Family Details - Part 2",
        intro: "Thank you. Now some more personal and family details.",
        prompts: &[
            "What is your date of birth? (DD/MM/YYYY)",
            "Are you married? (Married / Unmarried / Divorced / Widowed)",
            "Do you live in a hostel right now? (Yes / No)",
            "What is your family's annual income? (only number, example 360000)",
            "What category do you belong to? (General / OBC / SC / ST)",
        ],
    },
    GroupSpec {
        title: "Education Details",
        intro: "Great. Now let's talk about your education.",
        prompts: &[
            "Which course are you studying or have completed? (example: Class 12, B.Tech, MBBS)",
            "What was your 10th class roll number?",
            "What percentage did you get in 10th?",
            "What was your 12th class roll number? (if applicable)",
            "What percentage did you get in 12th? (if applicable)",
        ],
    },
    GroupSpec {
        title: "Additional / Special Information",
        intro: "Almost done. Just a few more details.",
        prompts: &[
            "What is your parent's or guardian's profession? (or say None)",
            "Are you applying through any competitive exam? (example: NMMS, or say No)",
            "If yes, what is the roll number of that exam?",
            "Is there anything else important you want to tell me?",
        ],
    },
];

/// One question group as presented to a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionGroup {
    pub title: String,
    pub intro: String,
    pub questions: Vec<String>,
    pub group_index: usize,
    pub is_last: bool,
}

/// Immutable ordered sequence of question groups.
#[derive(Debug, Clone, Copy)]
pub struct QuestionCatalog {
    groups: &'static [GroupSpec],
}

impl Default for QuestionCatalog {
    fn default() -> Self {
        Self { groups: &GROUPS }
    }
}

impl QuestionCatalog {
    /// The standard four-group eligibility questionnaire.
    pub fn standard() -> Self {
        Self::default()
    }

    /// Number of groups in the catalog.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Group at `index`, or None once the catalog is exhausted.
    ///
    /// An out-of-range index means "no more groups", not an error: session
    /// group indices are allowed to run past the catalog length.
    pub fn group_at(&self, index: usize) -> Option<QuestionGroup> {
        let spec = self.groups.get(index)?;
        Some(QuestionGroup {
            title: spec.title.to_string(),
            intro: spec.intro.to_string(),
            questions: spec.prompts.iter().map(|p| p.to_string()).collect(),
            group_index: index,
            is_last: index == self.groups.len() - 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_has_four_groups() {
        let catalog = QuestionCatalog::standard();
        assert_eq!(catalog.len(), 4);
        assert!(!catalog.is_empty());
    }

    #[test]
    fn test_every_group_has_four_or_five_prompts() {
        let catalog = QuestionCatalog::standard();
        for index in 0..catalog.len() {
            let group = catalog.group_at(index).unwrap();
            assert!(
                (4..=5).contains(&group.questions.len()),
                "group {index} has {} prompts",
                group.questions.len()
            );
            assert!(!group.title.is_empty());
            assert!(!group.intro.is_empty());
        }
    }

    #[test]
    fn test_group_at_sets_index_and_is_last() {
        let catalog = QuestionCatalog::standard();
        let first = catalog.group_at(0).unwrap();
        assert_eq!(first.group_index, 0);
        assert!(!first.is_last);

        let last = catalog.group_at(3).unwrap();
        assert_eq!(last.group_index, 3);
        assert!(last.is_last);
    }

    #[test]
    fn test_group_at_out_of_range_is_none() {
        let catalog = QuestionCatalog::standard();
        assert!(catalog.group_at(4).is_none());
        assert!(catalog.group_at(100).is_none());
    }

    #[test]
    fn test_first_group_asks_for_name() {
        let catalog = QuestionCatalog::standard();
        let group = catalog.group_at(0).unwrap();
        assert!(group.questions[0].contains("full name"));
    }
}
