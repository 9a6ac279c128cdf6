use serde::{Deserialize, Serialize};

/// One parsed line: an ordered list of trimmed cells.
pub type Row = Vec<String>;

/// All rows read from one source, in parse order.
pub type Dataset = Vec<Row>;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct InputFile {
    pub path: String,
    pub delimiter: u8,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    pub first: InputFile,
    pub second: InputFile,
    pub output_json: String,
    pub db_path: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            first: InputFile {
                path: String::from("Тестовый файл1.txt"),
                delimiter: b',',
            },
            second: InputFile {
                path: String::from("Тестовый файл2.txt"),
                delimiter: b';',
            },
            output_json: String::from("data.json"),
            db_path: String::from("data.db"),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct StoredRecord {
    pub id: i64,
    pub data: String,
}
