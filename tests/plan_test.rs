use lifechart::{write_default_plan, ChartKind, ChartPlan, SortDirection, SortKey};

#[test]
fn load_plan_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("charts.toml");
    std::fs::write(
        &path,
        r#"
        [[charts]]
        name = "life_expectancy"
        title = "Life Expectancy by Country"
        group_by = "Country"
        value = "Life expectancy(years) (Country)"
        kind = "barh"
        sort_by = "value"
        direction = "descending"
        limit = 5
        "#,
    )
    .unwrap();

    let plan = ChartPlan::load(&path).unwrap();
    assert_eq!(plan.charts.len(), 1);
    let chart = &plan.charts[0];
    assert_eq!(chart.kind, ChartKind::BarHorizontal);
    assert_eq!(chart.sort_by, SortKey::AggregateValue);
    assert_eq!(chart.direction, SortDirection::Descending);
    assert_eq!(chart.limit, Some(5));
    assert_eq!(chart.x_label, None);
}

#[test]
fn load_rejects_invalid_plan() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[[charts]]\nname = \"x\"\n").unwrap();
    assert!(ChartPlan::load(&path).is_err());
}

#[test]
fn load_missing_plan_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(ChartPlan::load(&dir.path().join("absent.toml")).is_err());
}

#[test]
fn init_plan_respects_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("charts.toml");

    let written = write_default_plan(&path, false).unwrap();
    assert_eq!(written, path);
    let plan = ChartPlan::load(&path).unwrap();
    assert_eq!(plan, ChartPlan::default());

    // Second write without --force refuses; with force it succeeds.
    assert!(write_default_plan(&path, false).is_err());
    assert!(write_default_plan(&path, true).is_ok());
}
