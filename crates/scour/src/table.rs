use scour_core::{KindReport, KindStatus, ResourceKind};

/// Box-drawn table of registered kinds.
pub struct KindTable {
    order_width: usize,
    kind_width: usize,
    scope_width: usize,
    workers_width: usize,
    confirm_width: usize,
}

impl KindTable {
    pub fn new(kinds: &[&ResourceKind]) -> Self {
        let kind_width = kinds
            .iter()
            .map(|k| k.key().chars().count())
            .max()
            .unwrap_or(16)
            .clamp(4, 40);

        Self {
            order_width: 5,
            kind_width,
            scope_width: 12,
            workers_width: 7,
            confirm_width: 7,
        }
    }

    pub fn print_table(&self, kinds: &[&ResourceKind]) {
        let widths = self.widths();
        println!("{}", border('┌', '┬', '┐', &widths));
        println!(
            "{}",
            row(&["Order", "Kind", "Scope", "Workers", "Confirm"], &widths)
        );
        println!("{}", border('├', '┼', '┤', &widths));
        for kind in kinds {
            let confirm = if kind.synchronized_deletion { "sync" } else { "poll" };
            let order = kind.order.to_string();
            let key = kind.key();
            let workers = kind.workers.to_string();
            println!(
                "{}",
                row(
                    &[order.as_str(), key.as_str(), scope_label(kind), workers.as_str(), confirm],
                    &widths
                )
            );
        }
        println!("{}", border('└', '┴', '┘', &widths));
    }

    fn widths(&self) -> [usize; 5] {
        [
            self.order_width,
            self.kind_width,
            self.scope_width,
            self.workers_width,
            self.confirm_width,
        ]
    }
}

fn scope_label(kind: &ResourceKind) -> &'static str {
    match (kind.perform_for_admin_only, kind.admin_required, kind.tenant_scoped) {
        (true, _, _) => "admin-only",
        (false, true, true) => "admin+tenant",
        (false, true, false) => "admin",
        (false, false, true) => "tenant",
        (false, false, false) => "user",
    }
}

/// Box-drawn table of per-kind run outcomes.
pub struct ReportTable {
    kind_width: usize,
    status_width: usize,
    count_width: usize,
}

impl ReportTable {
    pub fn new(kinds: &[&KindReport]) -> Self {
        let kind_width = kinds
            .iter()
            .map(|k| k.key().chars().count())
            .max()
            .unwrap_or(16)
            .clamp(4, 40);

        Self {
            kind_width,
            status_width: 30,
            count_width: 7,
        }
    }

    pub fn print_table(&self, kinds: &[&KindReport]) {
        let widths = self.widths();
        println!("{}", border('┌', '┬', '┐', &widths));
        println!(
            "{}",
            row(
                &["Kind", "Status", "Deleted", "Gone", "Failed", "Timeout", "Pending"],
                &widths
            )
        );
        println!("{}", border('├', '┼', '┤', &widths));
        for kind in kinds {
            let cells = [
                kind.key(),
                status_label(&kind.status),
                kind.counts.deleted.to_string(),
                kind.counts.already_gone.to_string(),
                kind.counts.failed.to_string(),
                kind.counts.timed_out.to_string(),
                kind.undispatched.to_string(),
            ];
            let cells: Vec<&str> = cells.iter().map(String::as_str).collect();
            println!("{}", row(&cells, &widths));
        }
        println!("{}", border('└', '┴', '┘', &widths));
    }

    fn widths(&self) -> [usize; 7] {
        [
            self.kind_width,
            self.status_width,
            self.count_width,
            self.count_width,
            self.count_width,
            self.count_width,
            self.count_width,
        ]
    }
}

fn status_label(status: &KindStatus) -> String {
    match status {
        KindStatus::Completed => "completed".to_string(),
        KindStatus::Skipped(reason) => format!("skipped: {reason}"),
        KindStatus::Failed(reason) => format!("failed: {reason}"),
        KindStatus::Cancelled => "cancelled".to_string(),
    }
}

fn border(left: char, middle: char, right: char, widths: &[usize]) -> String {
    let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
    format!("{left}{}{right}", segments.join(&middle.to_string()))
}

fn row(cells: &[&str], widths: &[usize]) -> String {
    let cells: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!(" {} ", truncate(cell, *width)))
        .collect();
    format!("│{}│", cells.join("│"))
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
        // Safely truncate at character boundaries, not byte boundaries
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{:<width$}", format!("{}...", truncated), width = max_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_pads_short_strings() {
        assert_eq!(truncate("nova", 6), "nova  ");
    }

    #[test]
    fn test_truncate_long_strings() {
        assert_eq!(truncate("neutron.security_group", 10), "neutron...");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("ßßßßßß", 5), "ßß...");
    }

    #[test]
    fn test_row_and_border_align() {
        let widths = [3, 5];
        let line = row(&["a", "bcdefgh"], &widths);
        assert_eq!(line, "│ a   │ bc... │");
        assert_eq!(
            border('┌', '┬', '┐', &widths).chars().count(),
            line.chars().count()
        );
    }

    #[test]
    fn test_scope_labels() {
        let kind = ResourceKind::new("nova", "quotas", 203).admin_required().tenant();
        assert_eq!(scope_label(&kind), "admin+tenant");
        let kind = ResourceKind::new("nova", "flavors", 204).admin_only();
        assert_eq!(scope_label(&kind), "admin-only");
    }
}
