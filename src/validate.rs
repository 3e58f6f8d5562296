//! # Request Schema Validation
//!
//! The exclusive entry point for user-provided records. The schema is
//! strict and not configurable: field names, enumerations and ranges are
//! fixed, which eliminates a class of configuration errors and keeps the
//! validated record independent of any artifact state. Vocabulary checks
//! against the frozen category maps happen later, in the encoder.
//!
//! Failures are assumed to be user-input errors, so the validator is
//! exhaustive rather than fail-fast: every violated field is reported in a
//! single [`ValidationError`], with an actionable message per field.

use itertools::Itertools;
use serde::Deserialize;
use thiserror::Error;

/// Every field of the request schema, i.e. every name an artifact's
/// feature order may reference.
pub(crate) const SCHEMA_FIELDS: &[&str] = &[
    "age",
    "gender",
    "course",
    "year",
    "marital_status",
    "depression",
    "anxiety",
    "panic_attack",
    "treatment",
];

/// The subset of schema fields that encode as plain numbers instead of
/// going through a category map.
pub(crate) const NUMERIC_FIELDS: &[&str] = &["age"];

pub const MIN_AGE: i64 = 18;
pub const MAX_AGE: i64 = 30;
pub const MIN_COURSE_CHARS: usize = 2;
pub const MAX_COURSE_CHARS: usize = 100;

/// A raw, untyped request record as it arrives off the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct RawStudentRecord {
    pub age: i64,
    pub gender: String,
    pub course: String,
    pub year: String,
    pub marital_status: String,
    pub depression: String,
    pub anxiety: String,
    pub panic_attack: String,
    pub treatment: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// The canonical category string, as it appears in the frozen
    /// vocabulary.
    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "Male" => Some(Gender::Male),
            "Female" => Some(Gender::Female),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudyYear {
    Year1,
    Year2,
    Year3,
    Year4,
}

impl StudyYear {
    pub fn label(self) -> &'static str {
        match self {
            StudyYear::Year1 => "year 1",
            StudyYear::Year2 => "year 2",
            StudyYear::Year3 => "year 3",
            StudyYear::Year4 => "year 4",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "year 1" => Some(StudyYear::Year1),
            "year 2" => Some(StudyYear::Year2),
            "year 3" => Some(StudyYear::Year3),
            "year 4" => Some(StudyYear::Year4),
            _ => None,
        }
    }
}

/// A Yes/No indicator field (marital status and the four mental-health
/// questions).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    pub fn label(self) -> &'static str {
        match self {
            YesNo::Yes => "Yes",
            YesNo::No => "No",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "Yes" => Some(YesNo::Yes),
            "No" => Some(YesNo::No),
            _ => None,
        }
    }
}

/// A record that passed schema validation. Immutable from here on; the
/// encoder reads category labels off it without further checks.
#[derive(Debug, Clone)]
pub struct StudentRecord {
    pub age: u8,
    pub gender: Gender,
    pub course: String,
    pub year: StudyYear,
    pub marital_status: YesNo,
    pub depression: YesNo,
    pub anxiety: YesNo,
    pub panic_attack: YesNo,
    pub treatment: YesNo,
}

/// One violated field with an actionable message.
#[derive(Debug, Clone)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

/// The request violates the schema. Carries every violation, not just the
/// first one found.
#[derive(Error, Debug, Clone)]
#[error("Request failed schema validation: {}", summarize(.violations))]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .join("; ")
}

/// Checks a raw record against the schema, returning a typed record or the
/// full list of violations. Total and side-effect-free; never consults
/// artifact state.
pub fn validate(raw: &RawStudentRecord) -> Result<StudentRecord, ValidationError> {
    let mut violations = Vec::new();

    let age = if (MIN_AGE..=MAX_AGE).contains(&raw.age) {
        Some(raw.age as u8)
    } else {
        violations.push(FieldViolation {
            field: "age",
            message: format!("must be between {MIN_AGE} and {MAX_AGE} (got {})", raw.age),
        });
        None
    };

    let gender = parse_enum("gender", &raw.gender, Gender::parse, "Male, Female", &mut violations);

    let course_chars = raw.course.chars().count();
    if !(MIN_COURSE_CHARS..=MAX_COURSE_CHARS).contains(&course_chars) {
        violations.push(FieldViolation {
            field: "course",
            message: format!(
                "must be between {MIN_COURSE_CHARS} and {MAX_COURSE_CHARS} characters \
                 (got {course_chars})"
            ),
        });
    }

    let year = parse_enum(
        "year",
        &raw.year,
        StudyYear::parse,
        "year 1, year 2, year 3, year 4",
        &mut violations,
    );
    let marital_status = parse_yes_no("marital_status", &raw.marital_status, &mut violations);
    let depression = parse_yes_no("depression", &raw.depression, &mut violations);
    let anxiety = parse_yes_no("anxiety", &raw.anxiety, &mut violations);
    let panic_attack = parse_yes_no("panic_attack", &raw.panic_attack, &mut violations);
    let treatment = parse_yes_no("treatment", &raw.treatment, &mut violations);

    match (
        age,
        gender,
        year,
        marital_status,
        depression,
        anxiety,
        panic_attack,
        treatment,
    ) {
        (
            Some(age),
            Some(gender),
            Some(year),
            Some(marital_status),
            Some(depression),
            Some(anxiety),
            Some(panic_attack),
            Some(treatment),
        ) if violations.is_empty() => Ok(StudentRecord {
            age,
            gender,
            course: raw.course.clone(),
            year,
            marital_status,
            depression,
            anxiety,
            panic_attack,
            treatment,
        }),
        _ => Err(ValidationError { violations }),
    }
}

fn parse_enum<T>(
    field: &'static str,
    value: &str,
    parse: fn(&str) -> Option<T>,
    expected: &str,
    violations: &mut Vec<FieldViolation>,
) -> Option<T> {
    let parsed = parse(value);
    if parsed.is_none() {
        violations.push(FieldViolation {
            field,
            message: format!("must be one of: {expected} (got '{value}')"),
        });
    }
    parsed
}

fn parse_yes_no(
    field: &'static str,
    value: &str,
    violations: &mut Vec<FieldViolation>,
) -> Option<YesNo> {
    parse_enum(field, value, YesNo::parse, "Yes, No", violations)
}
