use std::fs;
use std::io::Write;
use std::process::{Command, Stdio};

use chartopts::csv_reader::{self, CsvOptions};
use chartopts::ingest::IngestOptions;
use chartopts::series::{BubbleSeries, DataAccessor, LineSeries, SeriesNode};
use chartopts::{
    AnySeries, Chart, ChartError, DataInput, Frame, HighchartsOptions, LiteralOptions, Node, Value,
};

/// Helper function to run chartopts with arguments, CSV input and extra
/// environment variables
fn run_chartopts(args: &[&str], csv_content: &str, envs: &[(&str, &str)]) -> Result<Vec<u8>, String> {
    let mut command = Command::new(env!("CARGO_BIN_EXE_chartopts"));
    command
        .args(args)
        .env_remove("CHARTOPTS_MODULE_URL")
        .env_remove("CHARTOPTS_EXPORT_DOMAIN")
        .env_remove("CHARTOPTS_EXPORT_PORT")
        .envs(envs.iter().copied())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let mut child = command
        .spawn()
        .map_err(|e| format!("Failed to spawn process: {}", e))?;

    // Write CSV to stdin
    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(csv_content.as_bytes())
            .map_err(|e| format!("Failed to write to stdin: {}", e))?;
    }

    let output = child
        .wait_with_output()
        .map_err(|e| format!("Failed to wait for process: {}", e))?;

    if output.status.success() {
        Ok(output.stdout)
    } else {
        Err(String::from_utf8_lossy(&output.stderr).to_string())
    }
}

fn run_json(args: &[&str], csv_content: &str) -> serde_json::Value {
    let mut all = vec!["--format", "json"];
    all.extend_from_slice(args);
    let stdout = run_chartopts(&all, csv_content, &[]).expect("chartopts failed");
    serde_json::from_slice(&stdout).expect("output is not JSON")
}

fn table(text: &str, has_header: bool) -> chartopts::Table {
    let options = CsvOptions {
        has_header,
        ..Default::default()
    };
    csv_reader::read_str(text, &options).unwrap()
}

#[test]
fn test_end_to_end_script() {
    let csv = fs::read_to_string("test/sales.csv").expect("Failed to read test CSV");
    let stdout = run_chartopts(&["--title", "Sales", "--validate"], &csv, &[]).unwrap();
    let script = String::from_utf8(stdout).unwrap();
    assert!(script.starts_with("document.addEventListener('DOMContentLoaded', function() {"));
    assert!(script.contains("Highcharts.chart(\"container\""));

    let chart = Chart::from_js_literal(&script).unwrap();
    assert_eq!(chart.series_count(), 3);
    assert_eq!(chart.series()[2].name(), Some("east"));
}

#[test]
fn test_end_to_end_json_shared_index() {
    let csv = fs::read_to_string("test/sales.csv").expect("Failed to read test CSV");
    let json = run_json(&[], &csv);
    let series = json["series"].as_array().unwrap();
    assert_eq!(series.len(), 3);
    assert_eq!(series[0]["type"], "line");
    assert_eq!(series[0]["name"], "north");
    assert_eq!(series[1]["data"][0], serde_json::json!([2020, 12]));
}

#[test]
fn test_end_to_end_range_series() {
    let csv = fs::read_to_string("test/ranges.csv").expect("Failed to read test CSV");
    let json = run_json(&["-t", "arearange"], &csv);
    let series = json["series"].as_array().unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series[0]["data"][2], serde_json::json!([3, 2.4, 11.5]));
}

#[test]
fn test_end_to_end_pie_with_missing_value() {
    let csv = fs::read_to_string("test/shares.csv").expect("Failed to read test CSV");
    let json = run_json(&["-t", "pie"], &csv);
    let data = json["series"][0]["data"].as_array().unwrap();
    assert_eq!(data.len(), 4);
    assert_eq!(data[0], serde_json::json!(["Chrome", 63.5]));
    assert_eq!(data[3], serde_json::json!({ "name": "Firefox" }));
}

#[test]
fn test_end_to_end_property_map() {
    let csv = fs::read_to_string("test/sales.csv").expect("Failed to read test CSV");
    let json = run_json(&["--map", "x=year", "--map", "y=north,east", "-t", "column"], &csv);
    let series = json["series"].as_array().unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(series[1]["data"][3], serde_json::json!([2023, 11]));
}

#[test]
fn test_end_to_end_headerless_with_series_names() {
    let csv = fs::read_to_string("test/headerless.csv").expect("Failed to read test CSV");
    let json = run_json(&["--no-header", "--series-name", "letters"], &csv);
    assert_eq!(json["series"][0]["name"], "letters");
    assert_eq!(json["series"][0]["data"].as_array().unwrap().len(), 2);
}

#[test]
fn test_end_to_end_custom_delimiter() {
    let json = run_json(&["--delimiter", ";", "--null-text", "NA"], "a;b\n1;2\n3;NA\n");
    assert_eq!(json["series"][0]["data"][1], serde_json::json!({ "x": 3 }));
}

#[test]
fn test_end_to_end_html_uses_module_url() {
    let csv = fs::read_to_string("test/ranges.csv").expect("Failed to read test CSV");
    let stdout = run_chartopts(
        &["--format", "html", "-t", "columnrange", "--container", "chart"],
        &csv,
        &[("CHARTOPTS_MODULE_URL", "https://cdn.example.com/hc/")],
    )
    .unwrap();
    let html = String::from_utf8(stdout).unwrap();
    assert!(html.contains("<script src=\"https://cdn.example.com/hc/highcharts.js\"></script>"));
    assert!(html.contains("highcharts-more.js"));
    assert!(html.contains("<div id=\"chart\"></div>"));
}

#[test]
fn test_invalid_series_type() {
    let csv = fs::read_to_string("test/sales.csv").expect("Failed to read test CSV");
    let result = run_chartopts(&["-t", "sunburst"], &csv, &[]);
    assert!(result.is_err(), "Should fail with unknown series type");
    assert!(result.unwrap_err().contains("sunburst"));
}

#[test]
fn test_invalid_property_map_argument() {
    let result = run_chartopts(&["--map", "nocolumns"], "a,b\n1,2\n", &[]);
    assert!(result.is_err());
}

#[test]
fn test_export_to_unreachable_server_fails() {
    let csv = fs::read_to_string("test/sales.csv").expect("Failed to read test CSV");
    let result = run_chartopts(
        &["--format", "png", "--timeout", "2"],
        &csv,
        &[
            ("CHARTOPTS_EXPORT_PROTOCOL", "http"),
            ("CHARTOPTS_EXPORT_DOMAIN", "127.0.0.1"),
            ("CHARTOPTS_EXPORT_PORT", "9"),
        ],
    );
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("Failed to export chart"));
}

#[test]
fn test_headerless_heuristic_fixture() {
    let loaded = LineSeries::from_table(&table("A,1,2\nB,3,4\n", false), &IngestOptions::default())
        .unwrap()
        .into_vec();
    assert_eq!(loaded.len(), 1);
    let series = &loaded[0];
    assert_eq!(series.point_count(), 2);
    assert_eq!(series.get_attr("x").unwrap(), Value::from(vec![1, 3]));
    assert_eq!(series.get_attr("y").unwrap(), Value::from(vec![2, 4]));
    let names = series.data().unwrap().get_field("name").unwrap();
    assert_eq!(names, vec![Value::from("A"), Value::from("B")]);
}

#[test]
fn test_property_map_shares_x() {
    let options = IngestOptions::default()
        .with_property("x", 0usize)
        .with_property("y", vec![1usize, 2, 3]);
    let loaded = LineSeries::from_table(&table("1,2,3,4\n5,6,7,8\n", false), &options)
        .unwrap()
        .into_vec();
    assert_eq!(loaded.len(), 3);
    for series in &loaded {
        assert_eq!(series.get_attr("x").unwrap(), Value::from(vec![1, 5]));
    }
    assert_eq!(loaded[2].get_attr("y").unwrap(), Value::from(vec![4, 8]));
}

#[test]
fn test_label_reference_without_header() {
    let options = IngestOptions::default().with_property("y", "sales");
    let err = LineSeries::from_table(&table("1,2\n", false), &options).unwrap_err();
    assert!(matches!(err, ChartError::Deserialization(_)));
}

#[test]
fn test_frame_to_chart() {
    let frame = Frame::from_json_str(
        r#"[{"size": 1, "x": 1, "y": 2, "z": 3}, {"size": 2, "x": 4, "y": 5, "z": 6}]"#,
    )
    .unwrap();
    let chart = Chart::builder().data(&frame).series_type("bubble").build().unwrap();
    assert_eq!(chart.series_count(), 1);
    match &chart.series()[0] {
        AnySeries::Bubble(series) => {
            assert_eq!(series.get_attr("z").unwrap(), Value::from(vec![3, 6]));
            let names = series.data().unwrap().get_field("name").unwrap();
            assert_eq!(names, vec![Value::from("1"), Value::from("2")]);
        }
        other => panic!("expected a bubble series, got {other:?}"),
    }
}

#[test]
fn test_bubble_points_and_collection_agree() {
    let mut by_points = BubbleSeries::default();
    by_points
        .set_data(DataInput::Values(vec![
            Value::from(vec![1, 2, 3]),
            Value::from(vec![4, 5, 6]),
        ]))
        .unwrap();

    let mut by_columns = BubbleSeries::default();
    for (field, values) in [("x", vec![1, 4]), ("y", vec![2, 5]), ("z", vec![3, 6])] {
        by_columns.set_attr(field, Value::from(values)).unwrap();
    }

    assert_eq!(by_points.to_mapping(), by_columns.to_mapping());
    assert_eq!(by_points.get_attr("z").unwrap(), by_columns.get_attr("z").unwrap());
}

#[test]
fn test_options_literal_round_trip() {
    let text = r#"{
        chart: { type: 'column', zoomType: 'x' },
        title: { text: 'Fruit' },
        xAxis: { categories: ['Apples', 'Pears'] },
        tooltip: { valueDecimals: 2 },
        series: [{ type: 'column', name: 'Jane', data: [1, 0] }]
    }"#;
    let options = HighchartsOptions::from_literal_text(text).unwrap();
    let literal = options.to_literal_text(true).unwrap();
    assert_eq!(HighchartsOptions::from_literal_text(&literal).unwrap(), options);
    assert_eq!(
        HighchartsOptions::from_mapping(Value::Object(options.to_untrimmed())).unwrap(),
        options
    );
}

#[test]
fn test_chart_script_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chart.js");
    let mut chart = Chart::default();
    chart
        .add_series(vec![chartopts::object! { "type" => "spline", "id" => "s", "data" => vec![1, 2] }])
        .unwrap();
    chart
        .to_js_literal(&LiteralOptions {
            careful_validation: true,
            filename: Some(path.clone()),
        })
        .unwrap();
    let script = fs::read_to_string(&path).unwrap();
    let parsed = Chart::from_js_literal(&script).unwrap();
    assert_eq!(parsed.get_series("s").unwrap().point_count(), 2);
}
