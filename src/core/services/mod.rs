pub mod calendar_service;
pub mod location_service;
pub mod summary_service;

pub use calendar_service::CalendarService;
pub use location_service::LocationService;
pub use summary_service::{CategoryShare, DashboardSummary, MonthComparison, SummaryService};
