use crate::merge::DataManager;
use crate::reader::FileHandler;
use crate::store::{DatabaseManager, SaveOutcome};
use csv_merge_service::dto::{Dataset, InputFile, PipelineConfig};
use csv_merge_service::error::{ServiceError, Stage};
use csv_merge_service::report::{make_stage_report, StageReport};
use serde_json::{json, Value};
use tracing::{error, info};

pub struct RunSummary {
    pub reports: Vec<StageReport>,
    /// What the store did with the payload, `None` if the store failed
    pub saved: Option<SaveOutcome>,
}

///
/// Reads both inputs, sorts the merged rows, writes the JSON file and stores
/// the JSON text unless an identical payload is already stored.
///
/// Stage failures are logged and reported, never returned: an unreadable
/// input counts as empty, and a failed write leaves nothing to store.
///
pub fn run(config: &PipelineConfig) -> RunSummary {
    let mut reports = Vec::with_capacity(5);

    let first = read_input(&config.first, &mut reports);
    let second = read_input(&config.second, &mut reports);

    let mut manager = DataManager::new(first, second);
    manager.merge_and_sort();
    let sorted = manager.sorted_data().len();
    reports.push(make_stage_report(
        Stage::Merge,
        Ok(json!({ "rows": manager.data().len(), "sorted": sorted })),
    ));

    let payload = match manager.save_to_json(&config.output_json) {
        Ok(payload) => {
            let detail = match payload {
                Some(ref json) => json!({ "path": config.output_json, "bytes": json.len() }),
                None => Value::Null,
            };
            reports.push(make_stage_report(Stage::Serialize, Ok(detail)));
            payload
        }
        Err(err) => {
            error!(stage = %err.stage, "Error saving JSON: {}", err.msg);
            reports.push(make_stage_report(Stage::Serialize, Err(err)));
            None
        }
    };

    let stored = persist(&config.db_path, payload.as_deref().unwrap_or_default());
    let saved = match stored {
        Ok((outcome, stored_rows)) => {
            reports.push(make_stage_report(
                Stage::Store,
                Ok(outcome_detail(outcome, stored_rows)),
            ));
            Some(outcome)
        }
        Err(err) => {
            error!(stage = %err.stage, "{}", err.msg);
            reports.push(make_stage_report(Stage::Store, Err(err)));
            None
        }
    };

    RunSummary { reports, saved }
}

fn read_input(input: &InputFile, reports: &mut Vec<StageReport>) -> Dataset {
    let handler = FileHandler::from_input(input);
    match handler.read_file() {
        Ok(data) => {
            info!(path = %handler.path().display(), rows = data.len(), "Read input file");
            reports.push(make_stage_report(
                Stage::Read,
                Ok(json!({ "path": input.path, "rows": data.len() })),
            ));
            data
        }
        Err(err) => {
            error!(stage = %err.stage, "{}", err.msg);
            reports.push(make_stage_report(Stage::Read, Err(err)));
            Vec::new()
        }
    }
}

/// Saves the payload and returns the outcome with the number of stored rows.
fn persist(db_path: &str, payload: &str) -> Result<(SaveOutcome, i64), ServiceError> {
    let db = DatabaseManager::open(db_path)?;
    let saved = db
        .save_json(payload)
        .and_then(|outcome| Ok((outcome, db.count()?)));
    let closed = db.close();
    let saved = saved?;
    closed?;
    Ok(saved)
}

fn outcome_detail(outcome: SaveOutcome, stored_rows: i64) -> Value {
    match outcome {
        SaveOutcome::Inserted(id) => json!({ "inserted": id, "stored": stored_rows }),
        SaveOutcome::AlreadyExists => {
            json!({ "inserted": null, "duplicate": true, "stored": stored_rows })
        }
        SaveOutcome::NoData => Value::Null,
    }
}
