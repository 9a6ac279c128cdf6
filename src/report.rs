use serde::Serialize;
use serde_json::{json, Value};

use crate::error::{ServiceError, Stage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Ok,
    Skipped,
    Failed,
}

impl StageStatus {
    fn label(&self) -> &'static str {
        match self {
            StageStatus::Ok => "ok",
            StageStatus::Skipped => "skipped",
            StageStatus::Failed => "failed",
        }
    }
}

impl Serialize for StageStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

#[derive(Debug, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    pub status: StageStatus,
    pub detail: Value,
}

///
/// Summarises the outcome of one pipeline stage.
///
/// A stage that succeeded without producing anything (e.g. nothing to save)
/// reports `Value::Null` and is marked as skipped.
///
pub fn make_stage_report(stage: Stage, result: Result<Value, ServiceError>) -> StageReport {
    match result {
        Err(err) => StageReport {
            stage: err.stage,
            status: StageStatus::Failed,
            detail: Value::String(err.msg),
        },
        Ok(Value::Null) => StageReport {
            stage,
            status: StageStatus::Skipped,
            detail: Value::Null,
        },
        Ok(detail) => StageReport {
            stage,
            status: StageStatus::Ok,
            detail,
        },
    }
}

impl StageReport {
    pub fn succeeded(&self) -> bool {
        self.status == StageStatus::Ok
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| json!({ "stage": self.stage }).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_stage_keeps_error_stage_and_message() {
        let report = make_stage_report(Stage::Store, Err(ServiceError::store("locked")));
        assert_eq!(report.status, StageStatus::Failed);
        assert_eq!(report.detail, json!("locked"));
        assert!(!report.succeeded());
    }

    #[test]
    fn null_detail_is_skipped() {
        let report = make_stage_report(Stage::Serialize, Ok(Value::Null));
        assert_eq!(report.status, StageStatus::Skipped);
        assert_eq!(
            report.to_json(),
            r#"{"stage":"serialize","status":"skipped","detail":null}"#
        );
    }

    #[test]
    fn ok_detail_is_passed_through() {
        let report = make_stage_report(Stage::Merge, Ok(json!({ "rows": 4 })));
        assert!(report.succeeded());
        assert_eq!(report.detail["rows"], 4);
    }
}
