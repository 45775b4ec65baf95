//! # Archivist Exporter Crate
//!
//! The export phase of a run: query every configured target in order and
//! write its snapshot. A target that fails is logged, recorded in the
//! `ExportReport`, and skipped; the remaining targets still run.

use chrono::NaiveDate;
use configuration::ExportTarget;
use database::ViewSource;
use snapshot::SnapshotWriter;
use std::path::PathBuf;

pub mod error;

pub use error::ExportError;

/// A target whose export was abandoned.
#[derive(Debug)]
pub struct ExportFailure {
    pub export: String,
    pub error: ExportError,
}

/// What one export phase produced.
#[derive(Debug)]
pub struct ExportReport {
    /// The date stamped into every snapshot of this run.
    pub export_date: NaiveDate,
    /// `(export name, file path)` in target order.
    pub written: Vec<(String, PathBuf)>,
    pub failed: Vec<ExportFailure>,
}

impl ExportReport {
    fn new(export_date: NaiveDate) -> Self {
        Self {
            export_date,
            written: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// True when every target was written.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Names of the targets that failed, in target order.
    pub fn failed_names(&self) -> Vec<&str> {
        self.failed.iter().map(|f| f.export.as_str()).collect()
    }
}

/// Exports every target through `source` into `writer`'s directory.
pub async fn run_exports<S>(
    source: &mut S,
    targets: &[ExportTarget],
    writer: &SnapshotWriter,
    export_date: NaiveDate,
) -> ExportReport
where
    S: ViewSource + ?Sized,
{
    let mut report = ExportReport::new(export_date);

    for target in targets {
        match export_one(source, target, writer, export_date).await {
            Ok(path) => {
                tracing::info!(
                    export = %target.name,
                    path = %path.display(),
                    "Successfully exported."
                );
                report.written.push((target.name.clone(), path));
            }
            Err(error) => {
                tracing::error!(export = %target.name, error = %error, "Export failed, skipping.");
                report.failed.push(ExportFailure {
                    export: target.name.clone(),
                    error,
                });
            }
        }
    }

    report
}

async fn export_one<S>(
    source: &mut S,
    target: &ExportTarget,
    writer: &SnapshotWriter,
    export_date: NaiveDate,
) -> Result<PathBuf, ExportError>
where
    S: ViewSource + ?Sized,
{
    let rows = source.fetch_rows(target).await?;
    let path = writer.write(&target.name, &rows, export_date)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use database::DbError;
    use serde_json::Value;
    use serde_json::value::RawValue;
    use std::collections::HashMap;
    use std::fs;

    /// Serves canned aggregates. `None` stands for a `json_agg` over no rows;
    /// targets missing from the map fail like a missing relation.
    struct FakeSource {
        rows: HashMap<String, Option<&'static str>>,
        queried: Vec<String>,
    }

    impl FakeSource {
        fn new(rows: &[(&str, Option<&'static str>)]) -> Self {
            Self {
                rows: rows.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
                queried: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl ViewSource for FakeSource {
        async fn fetch_rows(&mut self, target: &ExportTarget) -> Result<Box<RawValue>, DbError> {
            self.queried.push(target.name.clone());
            match self.rows.get(&target.name) {
                Some(text) => database::views::rows_fragment(&target.name, text.map(String::from)),
                None => Err(DbError::QueryError {
                    target: target.name.clone(),
                    source: sqlx::Error::Protocol(format!(
                        "relation \"{}\" does not exist",
                        target.name
                    )),
                }),
            }
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 9).unwrap()
    }

    fn read(path: &std::path::Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn every_default_view_gets_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SnapshotWriter::create(dir.path()).unwrap();
        let mut source = FakeSource::new(&[
            ("hospital_seven_avg_change", Some(r#"[{"hospital":"North","change":-1.5}]"#)),
            ("daily_wait_time_stats", Some(r#"[{"day":"2025-03-08","avg":27.25}]"#)),
            ("monthly_avg_wait_times", Some(r#"[{"month":"2025-02","avg":31}]"#)),
        ]);

        let report = run_exports(&mut source, &ExportTarget::defaults(), &writer, date()).await;

        assert!(report.is_complete());
        assert_eq!(report.export_date, date());
        let names: Vec<_> = report.written.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, configuration::DEFAULT_VIEWS);
        for (name, path) in &report.written {
            assert_eq!(path, &dir.path().join(format!("{}.json", name)));
            let doc = read(path);
            let mut keys: Vec<_> = doc.as_object().unwrap().keys().cloned().collect();
            keys.sort();
            assert_eq!(keys, ["data", "export_date"]);
            assert_eq!(doc["export_date"], "2025-03-09");
        }
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 3);
    }

    #[tokio::test]
    async fn a_failing_view_does_not_stop_the_others() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SnapshotWriter::create(dir.path()).unwrap();
        let mut source = FakeSource::new(&[
            ("hospital_seven_avg_change", Some(r#"[{"id":1}]"#)),
            ("monthly_avg_wait_times", Some(r#"[{"id":3}]"#)),
        ]);

        let report = run_exports(&mut source, &ExportTarget::defaults(), &writer, date()).await;

        assert!(!report.is_complete());
        assert_eq!(report.failed_names(), ["daily_wait_time_stats"]);
        assert!(matches!(report.failed[0].error, ExportError::Query(_)));
        assert_eq!(source.queried.len(), 3);
        assert_eq!(report.written.len(), 2);
        assert!(!dir.path().join("daily_wait_time_stats.json").exists());
        assert_eq!(
            read(&dir.path().join("monthly_avg_wait_times.json"))["data"],
            serde_json::json!([{ "id": 3 }])
        );
    }

    #[tokio::test]
    async fn a_view_without_rows_exports_an_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SnapshotWriter::create(dir.path()).unwrap();
        let mut source = FakeSource::new(&[("empty_view", None)]);

        let report = run_exports(
            &mut source,
            &[ExportTarget::view("empty_view")],
            &writer,
            date(),
        )
        .await;

        assert!(report.is_complete());
        assert_eq!(read(&report.written[0].1)["data"], Value::Array(vec![]));
    }

    #[tokio::test]
    async fn write_failures_are_isolated_per_target() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("exports");
        let writer = SnapshotWriter::create(&output).unwrap();
        fs::remove_dir(&output).unwrap();
        let mut source = FakeSource::new(&[("a", Some("[]")), ("b", Some("[]"))]);

        let report = run_exports(
            &mut source,
            &[ExportTarget::view("a"), ExportTarget::view("b")],
            &writer,
            date(),
        )
        .await;

        assert_eq!(report.failed_names(), ["a", "b"]);
        assert!(report
            .failed
            .iter()
            .all(|f| matches!(f.error, ExportError::Snapshot(_))));
    }

    #[tokio::test]
    async fn exported_rows_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SnapshotWriter::create(dir.path()).unwrap();
        let rows = r#"[{"day":"2025-03-08","visits":310,"avg_wait":27.25,"note":null},
 {"day":"2025-03-09","visits":0,"avg_wait":null,"note":"closed, \"storm\""}]"#;
        let mut source = FakeSource::new(&[("daily_wait_time_stats", Some(rows))]);

        let report = run_exports(
            &mut source,
            &[ExportTarget::view("daily_wait_time_stats")],
            &writer,
            date(),
        )
        .await;

        let doc = read(&report.written[0].1);
        assert_eq!(doc["data"], serde_json::from_str::<Value>(rows).unwrap());
    }
}
