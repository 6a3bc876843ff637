//! Student answers to CSV conversion
//!
//! The header is `studentID` followed by the *first* student's answer keys in
//! their original order. Every student (the first included) becomes one row.
//! Keys that only appear in later students are not added as columns and are
//! dropped from those rows; recognizers are expected to emit the same question
//! set for every sheet of a batch. A later student without any `answers`
//! still gets a row, with every question field empty, instead of failing the
//! whole conversion.
//!
//! Values are written verbatim: list answers are joined with `|`, `null` and
//! missing answers become empty fields, and nothing is quoted or escaped.
//! Every row, including the last, ends with `\n`.

use serde_json::Value;
use tracing::debug;

use crate::models::StudentData;

/// Separator placed between the elements of a multi-valued answer
pub const MULTI_VALUE_SEPARATOR: &str = "|";

/// Convert raw recognizer JSON to CSV text.
///
/// Returns an empty string when the input is not an object with a non-empty
/// `students` list whose first entry carries `answers`.
pub fn json_to_csv(value: &Value) -> String {
    let Some(students) = value.as_object().and_then(|obj| obj.get("students")) else {
        debug!("Invalid JSON data format, no students key");
        return String::new();
    };

    let has_header = students
        .as_array()
        .and_then(|list| list.first())
        .and_then(|first| first.get("answers"))
        .is_some();
    if !has_header {
        debug!("No student answers to derive a header from");
        return String::new();
    }

    match serde_json::from_value::<StudentData>(value.clone()) {
        Ok(data) => students_to_csv(&data),
        Err(e) => {
            debug!(error = %e, "Student data does not match the expected shape");
            String::new()
        }
    }
}

/// Convert parsed student data to CSV text.
pub fn students_to_csv(data: &StudentData) -> String {
    let Some(first) = data.students.first() else {
        debug!("No student data found");
        return String::new();
    };
    let Some(header_answers) = first.answers.as_ref() else {
        debug!("No 'answers' key found in first student");
        return String::new();
    };

    let keys: Vec<&str> = header_answers.keys().map(String::as_str).collect();

    let mut csv = String::from("studentID");
    for key in &keys {
        csv.push(',');
        csv.push_str(key);
    }
    csv.push('\n');

    for student in &data.students {
        if let Some(id) = &student.student_id {
            csv.push_str(&render_value(id));
        }
        for key in &keys {
            csv.push(',');
            if let Some(answer) = student.answers.as_ref().and_then(|answers| answers.get(*key)) {
                csv.push_str(&render_value(answer));
            }
        }
        csv.push('\n');
    }

    debug!(columns = keys.len() + 1, rows = data.len(), "Converted student data to CSV");
    csv
}

/// Render a single answer as a CSV field.
fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(render_value)
            .collect::<Vec<_>>()
            .join(MULTI_VALUE_SEPARATOR),
        other => other.to_string(),
    }
}
