mod common;

use lifechart::{
    aggregate, render_chart, ChartExportFormat, ChartKind, ChartStyle, SortDirection, SortSpec,
};

#[test]
fn bar_chart_written_to_disk() {
    let df = common::lifestyle_df();
    let result = aggregate(
        &df,
        "City",
        "Sunshine hours(City)",
        SortSpec::by_value(SortDirection::Descending),
        Some(10),
    )
    .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sunshine.eps");
    let style = ChartStyle::new("Average Sunshine Hours by City", "City", "Hours");
    render_chart(&path, &result, ChartKind::Bar, &style, ChartExportFormat::Eps).unwrap();

    let metadata = std::fs::metadata(&path).unwrap();
    assert!(metadata.len() > 0, "chart file should not be empty");
}

#[test]
fn line_chart_with_numeric_keys_draws_a_line() {
    let df = common::lifestyle_df();
    let result = aggregate(
        &df,
        "Happiness levels(Country)",
        "Sunshine hours(City)",
        SortSpec::by_key(SortDirection::Ascending),
        None,
    )
    .unwrap();
    assert!(!result.is_empty());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("line.eps");
    let style = ChartStyle::new("Sunshine by Happiness", "Happiness", "Hours");
    render_chart(
        &path,
        &result,
        ChartKind::Line,
        &style,
        ChartExportFormat::Eps,
    )
    .unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("lineto"), "line series drawn");
}

#[test]
fn horizontal_chart_contains_group_labels() {
    let df = common::lifestyle_df();
    let result = aggregate(
        &df,
        "City",
        "Happiness levels(Country)",
        SortSpec::by_value(SortDirection::Descending),
        Some(3),
    )
    .unwrap();
    assert_eq!(result.len(), 3);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("top.eps");
    let style = ChartStyle::new("Top 3 Happiest Cities", "Happiness", "City");
    render_chart(
        &path,
        &result,
        ChartKind::BarHorizontal,
        &style,
        ChartExportFormat::Eps,
    )
    .unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    for row in &result.rows {
        assert!(
            content.contains(&format!("({})", row.key.label())),
            "missing label for {:?}",
            row.key
        );
    }
    assert!(content.contains("rectfill"));
}

#[test]
fn format_extensions() {
    assert_eq!(ChartExportFormat::Png.extension(), "png");
    assert_eq!(ChartExportFormat::Eps.extension(), "eps");
    assert_eq!(ChartExportFormat::ALL.len(), 2);
}
