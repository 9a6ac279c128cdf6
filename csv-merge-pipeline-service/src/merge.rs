use csv_merge_service::dto::Dataset;
use csv_merge_service::error::ServiceError;
use csv_merge_service::util::write_file_bytes;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::path::Path;
use tracing::{debug, info};

const JSON_INDENT: &[u8] = b"    ";

///
/// Holds the concatenation of two datasets and the result of sorting it.
///
pub struct DataManager {
    /// Rows of the first dataset followed by rows of the second
    data: Dataset,
    /// Rows with at least two cells, ordered by their second cell
    sorted_data: Dataset,
}

impl DataManager {
    pub fn new(first: Dataset, second: Dataset) -> Self {
        let mut data = first;
        data.extend(second);
        DataManager {
            data,
            sorted_data: Vec::new(),
        }
    }

    pub fn data(&self) -> &Dataset {
        &self.data
    }

    pub fn sorted_data(&self) -> &Dataset {
        &self.sorted_data
    }

    ///
    /// Drops rows with fewer than two cells and stable-sorts the rest by the
    /// second cell. Always recomputed from the concatenated rows.
    ///
    pub fn merge_and_sort(&mut self) -> &Dataset {
        let mut sorted: Dataset = self
            .data
            .iter()
            .filter(|row| row.len() > 1)
            .cloned()
            .collect();
        sorted.sort_by(|a, b| a[1].cmp(&b[1]));
        debug!(
            rows = self.data.len(),
            dropped = self.data.len() - sorted.len(),
            "merged and sorted rows"
        );
        self.sorted_data = sorted;
        &self.sorted_data
    }

    /// Renders the sorted rows as a 4-space indented JSON array of arrays.
    pub fn to_json(&self) -> Result<String, ServiceError> {
        render_json(&self.sorted_data)
    }

    ///
    /// Writes the sorted rows as JSON to `path` and returns the written text.
    ///
    /// Returns `Ok(None)` without touching the file when there is nothing sorted.
    ///
    pub fn save_to_json<P: AsRef<Path>>(&self, path: P) -> Result<Option<String>, ServiceError> {
        if self.sorted_data.is_empty() {
            info!("No sorted data to save to JSON");
            return Ok(None);
        }
        let json = self.to_json()?;
        write_file_bytes(path.as_ref(), json.as_bytes())?;
        Ok(Some(json))
    }
}

fn render_json(rows: &Dataset) -> Result<String, ServiceError> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(JSON_INDENT);
    let mut serializer = Serializer::with_formatter(&mut buf, formatter);
    rows.serialize(&mut serializer)
        .map_err(ServiceError::serialize)?;
    String::from_utf8(buf).map_err(ServiceError::serialize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn rows(data: &[&[&str]]) -> Dataset {
        data.iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn sorts_by_second_cell_across_files() {
        let mut manager = DataManager::new(
            rows(&[&["a", "2"], &["b", "1"]]),
            rows(&[&["c", "3"], &["d", "0"]]),
        );
        let sorted = manager.merge_and_sort().clone();
        assert_eq!(
            sorted,
            rows(&[&["d", "0"], &["b", "1"], &["a", "2"], &["c", "3"]])
        );
    }

    #[test]
    fn short_rows_are_dropped() {
        let mut manager = DataManager::new(
            rows(&[&["x"], &["a", "1"], &[]]),
            rows(&[&["y"], &["b", "0", "extra"]]),
        );
        manager.merge_and_sort();
        assert_eq!(manager.data().len(), 5);
        assert_eq!(
            manager.sorted_data(),
            &rows(&[&["b", "0", "extra"], &["a", "1"]])
        );
    }

    #[test]
    fn ties_keep_first_then_second_order() {
        let mut manager = DataManager::new(
            rows(&[&["a1", "k"], &["a2", "j"], &["a3", "k"]]),
            rows(&[&["b1", "k"], &["b2", "j"]]),
        );
        manager.merge_and_sort();
        assert_eq!(
            manager.sorted_data(),
            &rows(&[
                &["a2", "j"],
                &["b2", "j"],
                &["a1", "k"],
                &["a3", "k"],
                &["b1", "k"],
            ])
        );
    }

    #[test]
    fn comparison_is_lexicographic() {
        let mut manager = DataManager::new(
            rows(&[&["a", "10"], &["b", "9"], &["c", "Z"], &["d", "a"], &["e", "я"]]),
            Vec::new(),
        );
        manager.merge_and_sort();
        let keys: Vec<&str> = manager.sorted_data().iter().map(|r| r[1].as_str()).collect();
        assert_eq!(keys, vec!["10", "9", "Z", "a", "я"]);
    }

    #[test]
    fn merge_and_sort_is_idempotent() {
        let mut manager = DataManager::new(rows(&[&["a", "2"], &["b", "1"]]), Vec::new());
        let first = manager.merge_and_sort().clone();
        let second = manager.merge_and_sort().clone();
        assert_eq!(first, second);
    }

    #[test]
    fn json_is_pretty_with_literal_unicode() {
        let mut manager = DataManager::new(rows(&[&["Иван", "1"]]), Vec::new());
        manager.merge_and_sort();
        assert_eq!(
            manager.to_json().unwrap(),
            "[\n    [\n        \"Иван\",\n        \"1\"\n    ]\n]"
        );
    }

    #[test]
    fn save_writes_and_returns_same_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "stale").unwrap();
        let mut manager = DataManager::new(
            rows(&[&["a", "2"], &["b", "1"]]),
            rows(&[&["c", "3"], &["d", "0"]]),
        );
        manager.merge_and_sort();

        let json = manager.save_to_json(&path).unwrap().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), json);
        assert_eq!(manager.save_to_json(&path).unwrap().unwrap(), json);
        let parsed: Dataset = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, manager.sorted_data().clone());
    }

    #[test]
    fn nothing_to_save_writes_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        let mut manager = DataManager::new(rows(&[&["only"]]), Vec::new());
        manager.merge_and_sort();
        assert_eq!(manager.save_to_json(&path).unwrap(), None);
        assert!(!path.exists());
    }

    #[test]
    fn unwritable_path_is_a_serialize_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("data.json");
        let mut manager = DataManager::new(rows(&[&["a", "1"]]), Vec::new());
        manager.merge_and_sort();
        let err = manager.save_to_json(&path).unwrap_err();
        assert_eq!(err.stage, csv_merge_service::error::Stage::Serialize);
    }
}
