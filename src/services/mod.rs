pub mod assignment_service;
pub mod draft;
pub mod registry;
pub mod series;
pub mod stats;
pub mod views;

pub use assignment_service::AssignmentService;
pub use draft::{DraftStatus, RowDraft};
pub use registry::NameRegistry;
pub use series::{GradeSeries, SeriesPoint, TimeRange, grade_series};
pub use stats::{Summary, summarize};
pub use views::{AssignmentView, ViewClock, ViewCounts};
