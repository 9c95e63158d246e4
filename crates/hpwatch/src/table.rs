use hpwatch_core::ResultRow;

const HEADERS: [&str; 3] = ["Name", "CurrentHP", "MaxHP"];
const FOOTER_LABEL: &str = "Campaign Name";
const MAX_NAME_WIDTH: usize = 40;

pub struct TableFormatter {
    name_width: usize,
    current_width: usize,
    max_width: usize,
}

impl TableFormatter {
    pub fn new(rows: &[ResultRow], campaign_name: &str) -> Self {
        let has_footer = !campaign_name.is_empty();

        let name_width = rows
            .iter()
            .map(|r| r.name.chars().count())
            .chain(has_footer.then(|| FOOTER_LABEL.chars().count()))
            .max()
            .unwrap_or(0)
            .clamp(HEADERS[0].len(), MAX_NAME_WIDTH);

        let current_width = rows
            .iter()
            .map(|r| r.current_hp.chars().count())
            .max()
            .unwrap_or(0)
            .max(HEADERS[1].len());

        let max_width = rows
            .iter()
            .map(|r| r.max_hp.chars().count())
            .chain(has_footer.then(|| campaign_name.chars().count()))
            .max()
            .unwrap_or(0)
            .clamp(HEADERS[2].len(), MAX_NAME_WIDTH);

        Self {
            name_width,
            current_width,
            max_width,
        }
    }

    /// Render the full table, one line per element, without trailing newlines.
    pub fn render(&self, rows: &[ResultRow], campaign_name: &str) -> Vec<String> {
        let mut lines = Vec::with_capacity(rows.len() + 6);

        lines.push(self.border('┌', '┬', '┐'));
        lines.push(self.row(HEADERS[0], HEADERS[1], HEADERS[2]));
        lines.push(self.border('├', '┼', '┤'));
        for row in rows {
            lines.push(self.row(&row.name, &row.current_hp, &row.max_hp));
        }
        if !campaign_name.is_empty() {
            lines.push(self.border('├', '┼', '┤'));
            lines.push(self.row(FOOTER_LABEL, "", campaign_name));
        }
        lines.push(self.border('└', '┴', '┘'));

        lines
    }

    fn row(&self, name: &str, current: &str, max: &str) -> String {
        format!(
            "│ {} │ {} │ {} │",
            truncate(name, self.name_width),
            truncate(current, self.current_width),
            truncate(max, self.max_width),
        )
    }

    fn border(&self, left: char, mid: char, right: char) -> String {
        format!(
            "{}{}{}{}{}{}{}",
            left,
            "─".repeat(self.name_width + 2),
            mid,
            "─".repeat(self.current_width + 2),
            mid,
            "─".repeat(self.max_width + 2),
            right,
        )
    }
}

/// Truncate a string to a maximum display width, adding "..." if truncated.
///
/// Uses character count (not byte count) to safely handle UTF-8 strings
/// including emoji and multi-byte characters.
pub fn truncate(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        format!("{:<width$}", s, width = max_len)
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{:<width$}", format!("{}...", truncated), width = max_len)
    }
}
