use std::io::{self, Write};

use chrono::{DateTime, Utc};
use crossterm::cursor::{MoveToColumn, MoveUp};
use crossterm::queue;
use crossterm::terminal::{self, Clear, ClearType};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use hpwatch_core::cycle::sort_rows;
use hpwatch_core::{CycleFailure, CycleOutcome, CycleReport};

use crate::table::TableFormatter;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";
const FALLBACK_COLUMNS: u16 = 80;

/// Redraws a block of lines in place, replacing whatever it drew last.
///
/// Lines wider than the terminal wrap, so the cursor moves back over
/// terminal rows rather than lines.
pub struct LiveWriter<W: Write> {
    out: W,
    // Fixed width; `None` asks the terminal on every draw.
    columns: Option<u16>,
    drawn_rows: u16,
}

impl<W: Write> LiveWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            columns: None,
            drawn_rows: 0,
        }
    }

    #[cfg(test)]
    fn with_columns(out: W, columns: u16) -> Self {
        Self {
            out,
            columns: Some(columns),
            drawn_rows: 0,
        }
    }

    pub fn draw(&mut self, lines: &[String]) -> io::Result<()> {
        if self.drawn_rows > 0 {
            queue!(self.out, MoveUp(self.drawn_rows), MoveToColumn(0))?;
        }
        queue!(self.out, Clear(ClearType::FromCursorDown))?;

        for line in lines {
            writeln!(self.out, "{}", line)?;
        }
        self.out.flush()?;

        let columns = self.columns();
        let rows: usize = lines.iter().map(|line| rows_for(line, columns)).sum();
        self.drawn_rows = u16::try_from(rows).unwrap_or(u16::MAX);
        Ok(())
    }

    fn columns(&self) -> u16 {
        self.columns.unwrap_or_else(|| match terminal::size() {
            Ok((columns, _)) if columns > 0 => columns,
            _ => FALLBACK_COLUMNS,
        })
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

/// How the watch loop ended.
#[derive(Debug)]
pub enum PresenterExit {
    /// The scheduler stopped and every outcome was shown.
    Drained,
    /// The user asked to stop.
    Interrupted,
    /// A failed cycle ended the watch because `exit_on_error` was set.
    Failed(CycleFailure),
}

/// Renders cycle outcomes one at a time, in arrival order.
pub struct Presenter<W: Write> {
    writer: LiveWriter<W>,
    exit_on_error: bool,
    last_table: Vec<String>,
    newest_cycle: u64,
}

impl<W: Write> Presenter<W> {
    pub fn new(out: W, exit_on_error: bool) -> Self {
        Self {
            writer: LiveWriter::new(out),
            exit_on_error,
            last_table: Vec::new(),
            newest_cycle: 0,
        }
    }

    /// Consume outcomes until the channel closes or a failure ends the watch.
    pub async fn run(
        &mut self,
        mut outcomes: mpsc::Receiver<CycleOutcome>,
    ) -> io::Result<PresenterExit> {
        while let Some(outcome) = outcomes.recv().await {
            match outcome {
                Ok(report) => self.show_report(report)?,
                Err(failure) => {
                    self.show_failure(&failure)?;
                    if self.exit_on_error {
                        return Ok(PresenterExit::Failed(failure));
                    }
                }
            }
        }

        Ok(PresenterExit::Drained)
    }

    pub fn show_report(&mut self, mut report: CycleReport) -> io::Result<()> {
        self.note_arrival(report.cycle);
        sort_rows(&mut report.rows);

        let table = TableFormatter::new(&report.rows, &report.campaign_name);
        self.last_table = table.render(&report.rows, &report.campaign_name);

        info!(
            event = "cli.watch.render_completed",
            cycle = report.cycle,
            rows = report.rows.len(),
            unavailable = report.unavailable_count()
        );

        let status = format!(
            "Updated {} (cycle {})",
            format_time(report.started_at),
            report.cycle
        );
        self.redraw(status)
    }

    pub fn show_failure(&mut self, failure: &CycleFailure) -> io::Result<()> {
        self.note_arrival(failure.cycle);

        warn!(
            event = "cli.watch.cycle_failed",
            cycle = failure.cycle,
            error = %failure.error
        );

        let status = format!(
            "Refresh failed (cycle {}, {}): {}",
            failure.cycle,
            format_time(failure.started_at),
            failure.error
        );
        self.redraw(status)
    }

    fn note_arrival(&mut self, cycle: u64) {
        if cycle < self.newest_cycle {
            debug!(
                event = "cli.watch.stale_cycle",
                cycle = cycle,
                newest_cycle = self.newest_cycle
            );
        } else {
            self.newest_cycle = cycle;
        }
    }

    fn redraw(&mut self, status: String) -> io::Result<()> {
        let mut frame = self.last_table.clone();
        frame.push(status);
        self.writer.draw(&frame)
    }

    #[cfg(test)]
    fn into_output(self) -> W {
        self.writer.into_inner()
    }
}

/// Terminal rows a line occupies once wrapped at `columns`.
fn rows_for(line: &str, columns: u16) -> usize {
    let columns = usize::from(columns.max(1));
    line.chars().count().div_ceil(columns).max(1)
}

fn format_time(at: DateTime<Utc>) -> String {
    at.format(TIME_FORMAT).to_string()
}
