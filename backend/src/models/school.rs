//! Classes, subjects and grades.

use std::cmp::Ordering;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ClassId, GradeId, StudentId, SubjectId};

/// School years that have classes.
pub const CLASS_NUMBERS: RangeInclusive<i32> = 8..=12;

/// Lowest and highest mark on the six-point scale.
pub const GRADE_VALUES: RangeInclusive<i32> = 2..=6;

/// Parallel class letter, the Bulgarian А, Б, В, Г transliterated as A, B, V, G.
///
/// Letters order by their stored text (A, B, G, V), matching `ORDER BY letter`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassLetter {
    A,
    B,
    V,
    G,
}

impl ClassLetter {
    pub const ALL: [ClassLetter; 4] = [ClassLetter::A, ClassLetter::B, ClassLetter::V, ClassLetter::G];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassLetter::A => "A",
            ClassLetter::B => "B",
            ClassLetter::V => "V",
            ClassLetter::G => "G",
        }
    }
}

impl Ord for ClassLetter {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for ClassLetter {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ClassLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassLetter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(ClassLetter::A),
            "B" => Ok(ClassLetter::B),
            "V" => Ok(ClassLetter::V),
            "G" => Ok(ClassLetter::G),
            other => Err(format!("\"{}\" is not a valid class letter.", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    pub id: ClassId,
    pub number: i32,
    pub letter: ClassLetter,
}

impl Class {
    /// Short label such as `10A`.
    pub fn label(&self) -> String {
        format!("{}{}", self.number, self.letter)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    pub id: GradeId,
    pub value: i32,
    pub subject_id: SubjectId,
    pub student_id: StudentId,
    pub posted_on: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewGrade {
    pub value: i32,
    pub subject_id: SubjectId,
    pub student_id: StudentId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_label() {
        let class = Class {
            id: ClassId(1),
            number: 10,
            letter: ClassLetter::V,
        };
        assert_eq!(class.label(), "10V");
    }

    #[test]
    fn test_class_letter_parse() {
        assert_eq!("G".parse::<ClassLetter>().unwrap(), ClassLetter::G);
        assert!("Z".parse::<ClassLetter>().is_err());
        assert!("a".parse::<ClassLetter>().is_err());
    }

    #[test]
    fn test_letters_sort_alphabetically() {
        let mut letters = ClassLetter::ALL.to_vec();
        letters.sort();
        assert_eq!(
            letters,
            vec![ClassLetter::A, ClassLetter::B, ClassLetter::G, ClassLetter::V]
        );
    }
}
