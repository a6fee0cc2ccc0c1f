//! Chart plans: which aggregations to run and how to draw them.
//!
//! A plan is a TOML document with one `[[charts]]` block per chart. The
//! built-in default reproduces the lifestyle-dataset charts: sunshine and
//! outdoor activity by happiness level, and the top-10 city rankings.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::aggregate::{SortDirection, SortKey, SortSpec};
use crate::chart_export::ChartKind;

/// One chart: an aggregation request plus presentation hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSpec {
    /// Output file stem, e.g. "sunshine_by_city" -> sunshine_by_city.png
    pub name: String,
    pub title: String,
    /// Column whose distinct values become the groups
    pub group_by: String,
    /// Column whose per-group mean is charted
    pub value: String,
    pub kind: ChartKind,
    pub sort_by: SortKey,
    pub direction: SortDirection,
    /// Keep at most this many groups after sorting
    pub limit: Option<usize>,
    /// Axis labels; the column names are used when omitted
    pub x_label: Option<String>,
    pub y_label: Option<String>,
}

impl Default for ChartSpec {
    fn default() -> Self {
        Self {
            name: String::new(),
            title: String::new(),
            group_by: String::new(),
            value: String::new(),
            kind: ChartKind::Bar,
            sort_by: SortKey::GroupKey,
            direction: SortDirection::Ascending,
            limit: None,
            x_label: None,
            y_label: None,
        }
    }
}

impl ChartSpec {
    pub fn sort_spec(&self) -> SortSpec {
        SortSpec {
            key: self.sort_by,
            direction: self.direction,
        }
    }

    fn validate(&self, index: usize) -> Result<()> {
        if self.name.is_empty() {
            return Err(eyre!("chart #{}: 'name' must not be empty", index + 1));
        }
        if self.group_by.is_empty() {
            return Err(eyre!("chart '{}': 'group_by' must not be empty", self.name));
        }
        if self.value.is_empty() {
            return Err(eyre!("chart '{}': 'value' must not be empty", self.name));
        }
        Ok(())
    }
}

/// A list of charts to render from one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPlan {
    pub charts: Vec<ChartSpec>,
}

impl Default for ChartPlan {
    /// The four lifestyle-dataset charts.
    fn default() -> Self {
        let happiness = "Happiness levels(Country)";
        let sunshine = "Sunshine hours(City)";
        let outdoor = "Outdoor activities(City)";
        Self {
            charts: vec![
                ChartSpec {
                    name: "sunshine_by_happiness".to_string(),
                    title: "Average Sunshine Hours by Happiness Level".to_string(),
                    group_by: happiness.to_string(),
                    value: sunshine.to_string(),
                    kind: ChartKind::Line,
                    x_label: Some("Happiness level (0-10)".to_string()),
                    y_label: Some("Average sunshine hours".to_string()),
                    ..ChartSpec::default()
                },
                ChartSpec {
                    name: "happiest_cities".to_string(),
                    title: "Top 10 Happiest Cities".to_string(),
                    group_by: "City".to_string(),
                    value: happiness.to_string(),
                    kind: ChartKind::BarHorizontal,
                    sort_by: SortKey::AggregateValue,
                    direction: SortDirection::Descending,
                    limit: Some(10),
                    x_label: Some("Happiness level (0-10)".to_string()),
                    y_label: Some("City".to_string()),
                    ..ChartSpec::default()
                },
                ChartSpec {
                    name: "sunshine_by_city".to_string(),
                    title: "Average Sunshine Hours by City".to_string(),
                    group_by: "City".to_string(),
                    value: sunshine.to_string(),
                    kind: ChartKind::Bar,
                    sort_by: SortKey::AggregateValue,
                    direction: SortDirection::Descending,
                    limit: Some(10),
                    x_label: Some("City".to_string()),
                    y_label: Some("Average sunshine hours".to_string()),
                    ..ChartSpec::default()
                },
                ChartSpec {
                    name: "outdoor_by_happiness".to_string(),
                    title: "Average Outdoor Activities by Happiness Level".to_string(),
                    group_by: happiness.to_string(),
                    value: outdoor.to_string(),
                    kind: ChartKind::Line,
                    x_label: Some("Happiness level (0-10)".to_string()),
                    y_label: Some("Average outdoor activities".to_string()),
                    ..ChartSpec::default()
                },
            ],
        }
    }
}

impl ChartPlan {
    /// Parse a plan from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let plan: ChartPlan = toml::from_str(text)?;
        for (index, chart) in plan.charts.iter().enumerate() {
            chart.validate(index)?;
        }
        Ok(plan)
    }

    /// Load a plan file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
            .map_err(|e| eyre!("invalid chart plan {}: {}", path.display(), e))
    }
}

/// Default plan as a commented template for --init-plan. Must stay in sync
/// with `ChartPlan::default()`; a test enforces the equivalence.
pub const DEFAULT_PLAN_TEMPLATE: &str = r#"# lifechart plan
#
# Each [[charts]] block renders one image named <name>.<format> in the output
# directory.
#
#   group_by   column whose distinct values become the groups
#   value      column whose per-group mean is charted
#   kind       "line", "bar", or "barh"
#   sort_by    "key" (the group value) or "value" (the computed mean)
#   direction  "ascending" or "descending"
#   limit      optional; keep at most this many groups after sorting

[[charts]]
name = "sunshine_by_happiness"
title = "Average Sunshine Hours by Happiness Level"
group_by = "Happiness levels(Country)"
value = "Sunshine hours(City)"
kind = "line"
sort_by = "key"
direction = "ascending"
x_label = "Happiness level (0-10)"
y_label = "Average sunshine hours"

[[charts]]
name = "happiest_cities"
title = "Top 10 Happiest Cities"
group_by = "City"
value = "Happiness levels(Country)"
kind = "barh"
sort_by = "value"
direction = "descending"
limit = 10
x_label = "Happiness level (0-10)"
y_label = "City"

[[charts]]
name = "sunshine_by_city"
title = "Average Sunshine Hours by City"
group_by = "City"
value = "Sunshine hours(City)"
kind = "bar"
sort_by = "value"
direction = "descending"
limit = 10
x_label = "City"
y_label = "Average sunshine hours"

[[charts]]
name = "outdoor_by_happiness"
title = "Average Outdoor Activities by Happiness Level"
group_by = "Happiness levels(Country)"
value = "Outdoor activities(City)"
kind = "line"
sort_by = "key"
direction = "ascending"
x_label = "Happiness level (0-10)"
y_label = "Average outdoor activities"
"#;

/// Write the default plan template to `path`. Refuses to overwrite an
/// existing file unless `force` is set.
pub fn write_default_plan(path: &Path, force: bool) -> Result<PathBuf> {
    if path.exists() && !force {
        return Err(eyre!(
            "Plan file already exists at {}. Use --force to overwrite.",
            path.display()
        ));
    }
    std::fs::write(path, DEFAULT_PLAN_TEMPLATE)?;
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_matches_default_plan() {
        let from_template = ChartPlan::from_toml(DEFAULT_PLAN_TEMPLATE).unwrap();
        assert_eq!(from_template, ChartPlan::default());
    }

    #[test]
    fn parse_minimal_chart() {
        let plan = ChartPlan::from_toml(
            r#"
            [[charts]]
            name = "obesity_by_country"
            group_by = "Country"
            value = "Obesity levels(Country)"
            "#,
        )
        .unwrap();
        assert_eq!(plan.charts.len(), 1);
        let chart = &plan.charts[0];
        assert_eq!(chart.kind, ChartKind::Bar);
        assert_eq!(chart.sort_by, SortKey::GroupKey);
        assert_eq!(chart.direction, SortDirection::Ascending);
        assert_eq!(chart.limit, None);
    }

    #[test]
    fn unknown_kind_is_an_error() {
        let result = ChartPlan::from_toml(
            r#"
            [[charts]]
            name = "x"
            group_by = "a"
            value = "b"
            kind = "pie"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn missing_group_by_fails_validation() {
        let result = ChartPlan::from_toml(
            r#"
            [[charts]]
            name = "x"
            value = "b"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn missing_name_fails_validation() {
        let result = ChartPlan::from_toml(
            r#"
            [[charts]]
            group_by = "a"
            value = "b"
            "#,
        );
        assert!(result.is_err());
    }
}
