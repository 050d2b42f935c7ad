use std::path::{Path, PathBuf};

use rollup_config::RollupConfig;
use rollup_core::Value;
use rollup_runtime::{load_records, render_json, render_table, run_job};

/// Twelve Pacific-time samples across Feb-Mar 2017, all before the DST
/// change, so every offset is -08:00.
const SAMPLES: [&str; 12] = [
    "2017-02-02T10:00:00-08:00",
    "2017-02-02T11:15:00-08:00",
    "2017-02-10T09:00:00-08:00",
    "2017-02-11T17:15:00-08:00",
    "2017-02-13T11:30:00-08:00",
    "2017-02-13T16:45:00-08:00",
    "2017-03-02T09:00:00-08:00",
    "2017-03-04T11:15:00-08:00",
    "2017-03-04T22:10:00-08:00",
    "2017-03-07T03:16:27-08:00",
    "2017-03-07T03:17:03-08:00",
    "2017-03-07T03:17:19-08:00",
];

const WEEKLY: &str = r#"
[rollup]
tz = "America/Los_Angeles"
interval = "week"
fill = 0
indicate_generated = "generated"
start = "2017-02-01"
end = "2017-04-01"
"#;

fn write_jsonl(dir: &Path) -> PathBuf {
    let path = dir.join("points.jsonl");
    let body: String = SAMPLES
        .iter()
        .map(|ts| format!("{{\"timestamp\": \"{ts}\", \"value\": 10}}\n"))
        .collect();
    std::fs::write(&path, body).unwrap();
    path
}

fn write_json_array(dir: &Path) -> PathBuf {
    let path = dir.join("points.json");
    let items: Vec<String> = SAMPLES
        .iter()
        .enumerate()
        .map(|(i, ts)| {
            format!(
                "{{\"when\": \"{ts}\", \"v1\": {}, \"v2\": {}, \"s\": \"a string\"}}",
                i + 1,
                i + 20
            )
        })
        .collect();
    std::fs::write(&path, format!("[{}]", items.join(",\n"))).unwrap();
    path
}

#[tokio::test]
async fn weekly_rollup_from_jsonl() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_jsonl(dir.path());
    let config: RollupConfig = WEEKLY.parse().unwrap();

    let bins = run_job(&data, &config.rollup).await.unwrap();
    let values: Vec<f64> = bins.iter().map(|b| b.number("value").unwrap()).collect();
    assert_eq!(
        values,
        vec![20.0, 20.0, 20.0, 0.0, 30.0, 30.0, 0.0, 0.0, 0.0]
    );
    let generated: Vec<bool> = bins.iter().map(|b| b.generated).collect();
    assert_eq!(
        generated,
        vec![false, false, false, true, false, false, true, true, true]
    );
    assert_eq!(bins[3].get("generated"), Some(&Value::Bool(true)));

    let table = render_table(&bins, "America/Los_Angeles".parse().unwrap());
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines.len(), 2 + 9);
    assert!(lines[2].contains("2017-01-29 00:00:00 PST"));
    assert!(lines[8].contains("2017-03-12 00:00:00 PDT"));
}

#[tokio::test]
async fn custom_timestamp_field_and_field_selection() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_json_array(dir.path());
    let config: RollupConfig = r#"
[rollup]
timestamp_field = "when"
tz = "America/Los_Angeles"
interval = "week"
fields = ["v1"]
fcn = { v1 = "max" }
"#
    .parse()
    .unwrap();

    let bins = run_job(&data, &config.rollup).await.unwrap();
    let v1: Vec<f64> = bins.iter().map(|b| b.number("v1").unwrap()).collect();
    assert_eq!(v1, vec![2.0, 4.0, 6.0, 9.0, 12.0]);
    for bin in &bins {
        assert_eq!(bin.record.keys().collect::<Vec<_>>(), vec!["v1", "when"]);
    }

    let json = render_json(&bins).unwrap();
    let first = json.lines().next().unwrap();
    assert_eq!(first, r#"{"v1":2,"when":"2017-01-29T00:00:00-08:00"}"#);
}

#[tokio::test]
async fn whole_range_without_interval() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_jsonl(dir.path());
    let config: RollupConfig = "[rollup]\nfcn = \"count\"\n".parse().unwrap();

    let bins = run_job(&data, &config.rollup).await.unwrap();
    assert_eq!(bins.len(), 1);
    assert_eq!(bins[0].number("value"), Some(12.0));
}

#[tokio::test]
async fn unreadable_timestamp_fails_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("bad.jsonl");
    std::fs::write(
        &data,
        "{\"timestamp\": 0, \"value\": 1}\n{\"timestamp\": \"soon\", \"value\": 2}\n",
    )
    .unwrap();
    assert!(load_records(&data, "timestamp").is_ok());
    assert!(run_job(&data, &Default::default()).await.is_err());
}

#[tokio::test]
async fn missing_data_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = RollupConfig::default();
    assert!(
        run_job(&dir.path().join("absent.jsonl"), &config.rollup)
            .await
            .is_err()
    );
}
