//! Student answer data produced by the recognizer

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `{"students": [...]}` as returned by the recognizer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentData {
    pub students: Vec<StudentRecord>,
}

/// One scanned answer sheet.
///
/// `answers` maps question keys to a single value, a list of values, or `null`,
/// in the order the recognizer emitted them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    #[serde(rename = "studentID", default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answers: Option<Map<String, Value>>,
}

impl StudentData {
    pub fn new(students: Vec<StudentRecord>) -> Self {
        Self { students }
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }
}

impl StudentRecord {
    pub fn new(student_id: impl Into<String>, answers: Map<String, Value>) -> Self {
        Self {
            student_id: Some(Value::String(student_id.into())),
            answers: Some(answers),
        }
    }
}
