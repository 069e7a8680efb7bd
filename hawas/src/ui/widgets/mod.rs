//! TUI widgets for the Hawas game

pub mod aids;
pub mod chart;
pub mod results;
pub mod statements;

pub use aids::AidBarWidget;
pub use chart::PerformanceChartWidget;
pub use results::ResultsWidget;
pub use statements::StatementsWidget;
