//! Normalized resume record returned to callers.
//!
//! Every field is defaulted so a completion that omits keys still deserializes.
//! String fields accept numbers/booleans/null from the model and coerce them,
//! since models regularly emit `"year": 2019` or `"experienceInYears": 2.5`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeRecord {
    pub personal_info: PersonalInfo,
    pub work: WorkSummary,
    #[serde(deserialize_with = "lenient_list")]
    pub experience_details: Vec<ExperienceEntry>,
    #[serde(deserialize_with = "lenient_list")]
    pub education_details: Vec<EducationEntry>,
    #[serde(deserialize_with = "lenient_string")]
    pub notice_period: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    #[serde(deserialize_with = "lenient_string")]
    pub full_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub first_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub middle_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub last_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub gender: String,
    #[serde(deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(deserialize_with = "lenient_string")]
    pub phone_number: String,
    #[serde(deserialize_with = "lenient_string")]
    pub linkedin_profile: String,
    #[serde(deserialize_with = "lenient_string")]
    pub country: String,
    #[serde(deserialize_with = "lenient_string")]
    pub state: String,
    #[serde(deserialize_with = "lenient_string")]
    pub city: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkSummary {
    #[serde(deserialize_with = "lenient_string")]
    pub current_status: String,
    #[serde(deserialize_with = "lenient_string")]
    pub experience_in_years: String,
    #[serde(deserialize_with = "lenient_string")]
    pub source: String,
    #[serde(deserialize_with = "lenient_string")]
    pub expected_cost: String,
    #[serde(deserialize_with = "lenient_strings")]
    pub skills: Vec<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub current_location: String,
    #[serde(deserialize_with = "lenient_string")]
    pub current_employer: String,
    #[serde(deserialize_with = "lenient_string")]
    pub department: String,
    #[serde(deserialize_with = "lenient_string")]
    pub designation: String,
    #[serde(deserialize_with = "lenient_strings")]
    pub preferred_locations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperienceEntry {
    #[serde(deserialize_with = "lenient_string")]
    pub organization: String,
    #[serde(deserialize_with = "lenient_string")]
    pub designation: String,
    #[serde(deserialize_with = "lenient_string")]
    pub country: String,
    #[serde(deserialize_with = "lenient_string")]
    pub state: String,
    #[serde(deserialize_with = "lenient_string")]
    pub employee_type: String,
    #[serde(deserialize_with = "lenient_string")]
    pub from_date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub to_date: String,
    #[serde(deserialize_with = "lenient_strings")]
    pub skills_used: Vec<String>,
    /// Set once an open `toDate` has been materialized to a concrete month,
    /// so re-resolving the in-memory record still reads this entry as ongoing.
    /// Not serialized: a record parsed back from its JSON output sees a closed job.
    #[serde(skip)]
    pub ongoing: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationEntry {
    #[serde(deserialize_with = "lenient_string")]
    pub degree: String,
    #[serde(deserialize_with = "lenient_string")]
    pub specialization: String,
    #[serde(deserialize_with = "lenient_string")]
    pub institution: String,
    #[serde(deserialize_with = "lenient_string")]
    pub year: String,
    #[serde(deserialize_with = "lenient_string")]
    pub grade_or_score: String,
    /// Same as `ExperienceEntry::ongoing`, for an open `year`.
    #[serde(skip)]
    pub ongoing: bool,
}

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        // nested structures have no sensible scalar form
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_to_string(Value::deserialize(deserializer)?).unwrap_or_default())
}

/// Accepts an array of scalars, a single comma-separated string, or null.
fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let strings = match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().filter_map(value_to_string).collect(),
        Value::String(s) => s.split(',').map(|part| part.trim().to_string()).collect(),
        _ => Vec::new(),
    };
    Ok(strings.into_iter().filter(|s| !s.is_empty()).collect())
}

/// Null becomes an empty list; anything else must be a list of objects.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
