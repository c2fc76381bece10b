use serde_json::Value;

use crate::detection::{ViolationCategory, ViolationSet};
use crate::error::RemoteError;

const NO_VIOLATION_MARKER: &str = "no violation";

/// Task labels understood by the multi-probe endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskType {
    HelmetViolation,
    TripleRiding,
    WrongRoute,
    Pothole,
}

impl TaskType {
    pub const ALL: [TaskType; 4] = [
        Self::HelmetViolation,
        Self::TripleRiding,
        Self::WrongRoute,
        Self::Pothole,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::HelmetViolation => "Helmet Violation",
            Self::TripleRiding => "Triple Riding",
            Self::WrongRoute => "Wrong Route",
            Self::Pothole => "Pothole",
        }
    }

    fn keyword(&self) -> &'static str {
        match self {
            Self::HelmetViolation => "helmet",
            Self::TripleRiding => "triple",
            Self::WrongRoute => "wrong",
            Self::Pothole => "pothole",
        }
    }

    pub fn category(&self) -> ViolationCategory {
        match self {
            Self::HelmetViolation => ViolationCategory::NoHelmet,
            Self::TripleRiding => ViolationCategory::TripleRiding,
            Self::WrongRoute => ViolationCategory::WrongSide,
            Self::Pothole => ViolationCategory::Pothole,
        }
    }
}

/// Classifies the free-text answer for one task. Blank answers and answers
/// mentioning "no violation" never match.
pub fn match_task_text(task: TaskType, text: &str) -> Option<ViolationCategory> {
    let lowered = text.to_lowercase();
    if lowered.trim().is_empty() || lowered.contains(NO_VIOLATION_MARKER) {
        return None;
    }
    lowered.contains(task.keyword()).then_some(task.category())
}

/// Reads `{"data": ["<text>", ...]}`. Any other shape carries no violation.
pub fn match_task_payload(task: TaskType, payload: &Value) -> Option<ViolationCategory> {
    let text = payload
        .get("data")
        .and_then(Value::as_array)
        .and_then(|data| data.first())
        .and_then(Value::as_str)?;
    match_task_text(task, text)
}

const FLAG_KEYS: [(&str, ViolationCategory); 4] = [
    ("helmet_violation", ViolationCategory::NoHelmet),
    ("triple_riding", ViolationCategory::TripleRiding),
    ("wrong_route", ViolationCategory::WrongSide),
    ("pothole", ViolationCategory::Pothole),
];

/// Reads the single-probe object of `{"<key>": {"detected": bool}}` entries.
/// Missing keys and non-boolean flags count as not detected.
pub fn violations_from_flags(payload: &Value) -> Result<ViolationSet, RemoteError> {
    let object = payload.as_object().ok_or_else(|| {
        RemoteError::MalformedPayload("expected a JSON object of detection flags".to_string())
    })?;
    Ok(FLAG_KEYS
        .iter()
        .filter(|(key, _)| {
            object
                .get(*key)
                .and_then(|entry| entry.get("detected"))
                .and_then(Value::as_bool)
                .unwrap_or(false)
        })
        .map(|(_, category)| *category)
        .collect())
}
