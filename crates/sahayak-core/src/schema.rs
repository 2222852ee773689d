//! Canonical applicant field schema and the field-merge policy.
//!
//! The scholarship eligibility form has a fixed set of 17 fields. Values are
//! opaque free text: the extraction model upstream is responsible for any
//! semantic normalization, so merging only trims and compares literally.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Number of canonical applicant fields.
pub const FIELD_COUNT: usize = 17;

/// Canonical field keys in declaration order. The names match the wire keys
/// the extraction model is prompted to emit, including the camelCase ones
/// inherited from the target portal.
pub const FIELD_KEYS: [&str; FIELD_COUNT] = [
    "name",
    "gender",
    "d_state_id",
    "religion",
    "community",
    "annual_family_income",
    "c_course_id",
    "maritalStatus",
    "hosteler",
    "dob",
    "xii_roll_no",
    "twelfthPercentage",
    "x_roll_no",
    "tenthPercentage",
    "parent_profession",
    "competitiveExam",
    "competitiveRollno",
];

/// The 17 applicant fields, each absent or a non-empty trimmed string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantFields {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub d_state_id: Option<String>,
    pub religion: Option<String>,
    pub community: Option<String>,
    pub annual_family_income: Option<String>,
    pub c_course_id: Option<String>,
    #[serde(rename = "maritalStatus")]
    pub marital_status: Option<String>,
    pub hosteler: Option<String>,
    pub dob: Option<String>,
    pub xii_roll_no: Option<String>,
    #[serde(rename = "twelfthPercentage")]
    pub twelfth_percentage: Option<String>,
    pub x_roll_no: Option<String>,
    #[serde(rename = "tenthPercentage")]
    pub tenth_percentage: Option<String>,
    pub parent_profession: Option<String>,
    #[serde(rename = "competitiveExam")]
    pub competitive_exam: Option<String>,
    #[serde(rename = "competitiveRollno")]
    pub competitive_rollno: Option<String>,
}

impl ApplicantFields {
    fn slot(&self, key: &str) -> Option<&Option<String>> {
        match key {
            "name" => Some(&self.name),
            "gender" => Some(&self.gender),
            "d_state_id" => Some(&self.d_state_id),
            "religion" => Some(&self.religion),
            "community" => Some(&self.community),
            "annual_family_income" => Some(&self.annual_family_income),
            "c_course_id" => Some(&self.c_course_id),
            "maritalStatus" => Some(&self.marital_status),
            "hosteler" => Some(&self.hosteler),
            "dob" => Some(&self.dob),
            "xii_roll_no" => Some(&self.xii_roll_no),
            "twelfthPercentage" => Some(&self.twelfth_percentage),
            "x_roll_no" => Some(&self.x_roll_no),
            "tenthPercentage" => Some(&self.tenth_percentage),
            "parent_profession" => Some(&self.parent_profession),
            "competitiveExam" => Some(&self.competitive_exam),
            "competitiveRollno" => Some(&self.competitive_rollno),
            _ => None,
        }
    }

    fn slot_mut(&mut self, key: &str) -> Option<&mut Option<String>> {
        match key {
            "name" => Some(&mut self.name),
            "gender" => Some(&mut self.gender),
            "d_state_id" => Some(&mut self.d_state_id),
            "religion" => Some(&mut self.religion),
            "community" => Some(&mut self.community),
            "annual_family_income" => Some(&mut self.annual_family_income),
            "c_course_id" => Some(&mut self.c_course_id),
            "maritalStatus" => Some(&mut self.marital_status),
            "hosteler" => Some(&mut self.hosteler),
            "dob" => Some(&mut self.dob),
            "xii_roll_no" => Some(&mut self.xii_roll_no),
            "twelfthPercentage" => Some(&mut self.twelfth_percentage),
            "x_roll_no" => Some(&mut self.x_roll_no),
            "tenthPercentage" => Some(&mut self.tenth_percentage),
            "parent_profession" => Some(&mut self.parent_profession),
            "competitiveExam" => Some(&mut self.competitive_exam),
            "competitiveRollno" => Some(&mut self.competitive_rollno),
            _ => None,
        }
    }

    /// Look up a field value by its canonical key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.slot(key).and_then(|v| v.as_deref())
    }

    /// Fold a candidate map into the fields.
    ///
    /// For each candidate entry whose key is canonical, the value is
    /// stringified and trimmed; JSON nulls and the literals "null"/"NULL"
    /// count as absent. A non-empty value that differs from the stored one
    /// overwrites it. Unknown keys are ignored. Returns the keys that
    /// changed, in candidate iteration order.
    pub fn merge(&mut self, candidate: &Map<String, Value>) -> Vec<String> {
        let mut changed = Vec::new();
        for (key, value) in candidate {
            let Some(slot) = self.slot_mut(key) else {
                continue;
            };
            let Some(raw) = stringify(value) else {
                continue;
            };
            let clean = raw.trim();
            if clean.is_empty() || clean == "null" || clean == "NULL" {
                continue;
            }
            if slot.as_deref() != Some(clean) {
                *slot = Some(clean.to_string());
                changed.push(key.clone());
            }
        }
        changed
    }

    /// Present fields as `(key, value)` pairs in canonical order.
    pub fn filled(&self) -> Vec<(&'static str, &str)> {
        FIELD_KEYS
            .iter()
            .filter_map(|key| self.get(key).map(|v| (*key, v)))
            .collect()
    }

    /// Number of present fields.
    pub fn filled_count(&self) -> usize {
        FIELD_KEYS.iter().filter(|key| self.get(key).is_some()).count()
    }

    /// Percentage of fields filled, rounded to one decimal place.
    pub fn completion_percentage(&self) -> f64 {
        let pct = self.filled_count() as f64 * 100.0 / FIELD_COUNT as f64;
        (pct * 10.0).round() / 10.0
    }
}

/// Convert a scalar JSON value to a string; structured values and nulls
/// yield None.
fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
