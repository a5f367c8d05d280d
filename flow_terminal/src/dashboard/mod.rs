//! Presenters for a finished analysis.
//!
//! Both presenters only read a [`DashboardView`]; they never run the detector
//! or the classifier themselves.

pub mod chart;
pub mod text;

pub use chart::ChartExport;
pub use text::TextDashboard;

use order_flow::{Bar, BarSeries, sentiment::Barometer};
use thiserror::Error;

pub const TITLE: &str = "AI Market Intelligence & Institutional Flow";
pub const EMPTY_ACTIVITY: &str = "No major institutional footprint in the last 24 hours.";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write dashboard output")]
    Io(#[from] std::io::Error),

    #[error("failed to encode chart payload")]
    Encode(#[from] serde_json::Error),
}

/// Everything a presenter needs, borrowed from the pipeline's report.
#[derive(Debug, Clone, Copy)]
pub struct DashboardView<'a> {
    pub series: &'a BarSeries,
    pub order_blocks: &'a [Bar],
    pub barometer: &'a Barometer,
    /// Only the most recent `table_rows` order blocks are listed.
    pub table_rows: usize,
}

impl<'a> DashboardView<'a> {
    /// The trailing `table_rows` order blocks, oldest first.
    pub fn recent_blocks(&self) -> &'a [Bar] {
        let skip = self.order_blocks.len().saturating_sub(self.table_rows);
        &self.order_blocks[skip..]
    }
}

pub trait Dashboard {
    fn render(&mut self, view: &DashboardView<'_>) -> Result<(), RenderError>;
}
