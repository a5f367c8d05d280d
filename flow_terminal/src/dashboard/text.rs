use std::io::Write;

use order_flow::{Bar, BarSeries, TimeFrame, sentiment::Barometer};

use super::{Dashboard, DashboardView, EMPTY_ACTIVITY, RenderError, TITLE};

/// Plain-text dashboard written to any [`Write`] sink, usually stdout.
pub struct TextDashboard<W: Write> {
    out: W,
}

impl<W: Write> TextDashboard<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn trajectory(&mut self, series: &BarSeries) -> Result<(), RenderError> {
        writeln!(self.out, "== Trajectory: {} ({}) ==", series.symbol, series.timeframe)?;
        let (Some(first), Some(last)) = (series.first(), series.last()) else {
            writeln!(self.out, "No bars received.")?;
            return Ok(());
        };

        let high = series.bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let low = series.bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        let change = last.close - first.close;

        writeln!(
            self.out,
            "Bars: {}  ({} .. {})",
            series.len(),
            format_time(&series.timeframe, first),
            format_time(&series.timeframe, last)
        )?;
        writeln!(self.out, "Last close: {:.4}", last.close)?;
        writeln!(self.out, "Range: {low:.4} - {high:.4}")?;
        if first.close != 0.0 {
            writeln!(
                self.out,
                "Change: {change:+.4} ({:+.2}%)",
                change / first.close * 100.0
            )?;
        } else {
            writeln!(self.out, "Change: {change:+.4}")?;
        }
        Ok(())
    }

    fn barometer(&mut self, barometer: &Barometer) -> Result<(), RenderError> {
        writeln!(self.out, "== AI Barometer ==")?;
        writeln!(self.out, "{}", barometer.stance.headline())?;
        writeln!(self.out, "Latest Catalysts:")?;
        for catalyst in &barometer.catalysts {
            writeln!(
                self.out,
                "  * {} [{} {:.2}]",
                catalyst.text, catalyst.sentiment.label, catalyst.sentiment.score
            )?;
        }
        Ok(())
    }

    fn activity(&mut self, view: &DashboardView<'_>) -> Result<(), RenderError> {
        writeln!(self.out, "== Institutional Activity detected ==")?;
        let blocks = view.recent_blocks();
        if blocks.is_empty() {
            writeln!(self.out, "{EMPTY_ACTIVITY}")?;
            return Ok(());
        }
        writeln!(self.out, "{:<20} {:>14} {:>16}", "Date", "Close", "Volume")?;
        for bar in blocks {
            writeln!(
                self.out,
                "{:<20} {:>14.4} {:>16.0}",
                format_time(&view.series.timeframe, bar),
                bar.close,
                bar.volume
            )?;
        }
        Ok(())
    }
}

impl<W: Write> Dashboard for TextDashboard<W> {
    fn render(&mut self, view: &DashboardView<'_>) -> Result<(), RenderError> {
        writeln!(self.out, "{TITLE}")?;
        writeln!(self.out)?;
        self.trajectory(view.series)?;
        writeln!(self.out)?;
        self.barometer(view.barometer)?;
        writeln!(self.out)?;
        self.activity(view)?;
        self.out.flush()?;
        Ok(())
    }
}

fn format_time(timeframe: &TimeFrame, bar: &Bar) -> String {
    if timeframe.is_intraday() {
        bar.timestamp.format("%Y-%m-%d %H:%M").to_string()
    } else {
        bar.timestamp.format("%Y-%m-%d").to_string()
    }
}
