//! Employment classification: the single place that decides whether an
//! experience entry is an internship.

use std::str::FromStr;

/// Default vocabulary. Matched against whole words of `designation` and `employeeType`.
pub const DEFAULT_INTERNSHIP_KEYWORDS: &[&str] = &["intern", "internship", "trainee", "apprentice"];

/// Classifies experience entries by keyword match against a fixed vocabulary table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmploymentClassifier {
    internship_keywords: Vec<String>,
}

impl Default for EmploymentClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_INTERNSHIP_KEYWORDS.iter().copied())
    }
}

impl EmploymentClassifier {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut internship_keywords: Vec<String> = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        internship_keywords.sort();
        internship_keywords.dedup();
        Self {
            internship_keywords,
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.internship_keywords
    }

    /// True when any word of `designation` or `employee_type` is in the vocabulary.
    /// Whole-word matching keeps "International Sales" from reading as "intern".
    pub fn is_internship(&self, designation: &str, employee_type: &str) -> bool {
        [designation, employee_type]
            .iter()
            .flat_map(|field| field.split(|c: char| !c.is_alphanumeric()))
            .filter(|word| !word.is_empty())
            .any(|word| {
                let word = word.to_lowercase();
                self.internship_keywords.iter().any(|k| *k == word)
            })
    }
}

/// Whether internship entries stay in `experienceDetails`.
/// They never count towards `experienceInYears` either way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InternshipPolicy {
    #[default]
    Retain,
    Drop,
}

impl FromStr for InternshipPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "retain" | "keep" => Ok(Self::Retain),
            "drop" | "exclude" => Ok(Self::Drop),
            other => Err(format!(
                "unknown internship policy '{other}' (expected 'retain' or 'drop')"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_designation_keyword_matches() {
        let c = EmploymentClassifier::default();
        assert!(c.is_internship("Summer Intern", ""));
        assert!(c.is_internship("Software Engineering Internship", ""));
        assert!(c.is_internship("Graduate Trainee", "Full-time"));
        assert!(c.is_internship("Electrician Apprentice", ""));
    }

    #[test]
    fn test_employee_type_keyword_matches() {
        let c = EmploymentClassifier::default();
        assert!(c.is_internship("Backend Developer", "Internship"));
        assert!(c.is_internship("Data Analyst", "intern/part-time"));
    }

    #[test]
    fn test_substrings_do_not_match() {
        let c = EmploymentClassifier::default();
        assert!(!c.is_internship("International Sales Manager", "Full-time"));
        assert!(!c.is_internship("Internal Tools Engineer", ""));
        assert!(!c.is_internship("Senior Engineer", "Contract"));
    }

    #[test]
    fn test_custom_vocabulary_replaces_default() {
        let c = EmploymentClassifier::new(["Werkstudent", " praktikum "]);
        assert!(c.is_internship("Werkstudent Backend", ""));
        assert!(c.is_internship("", "Praktikum"));
        assert!(!c.is_internship("Summer Intern", ""));
        assert_eq!(c.keywords(), ["praktikum", "werkstudent"]);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("drop".parse::<InternshipPolicy>(), Ok(InternshipPolicy::Drop));
        assert_eq!(" Retain ".parse::<InternshipPolicy>(), Ok(InternshipPolicy::Retain));
        assert!("sometimes".parse::<InternshipPolicy>().is_err());
    }
}
