pub mod aggregate;
pub mod chart_export;
pub mod cli;
pub mod error_display;
pub mod loader;
pub mod plan;

pub use aggregate::{
    aggregate, coerce_numeric, parse_numeric, AggregateError, AggregatedRow, GroupKey,
    RankedResult, SortDirection, SortKey, SortSpec,
};
pub use chart_export::{render_chart, ChartExportFormat, ChartKind, ChartStyle};
pub use cli::{Args, CompressionFormat};
pub use error_display::user_message_from_report;
pub use loader::{load_table, LoadOptions};
pub use plan::{write_default_plan, ChartPlan, ChartSpec};
