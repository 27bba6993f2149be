//! Plain-text rendering of an [`ActivityReport`].

use playstats_analytics::{ActivityReport, CycleStatus, RankedEntry, ReportSection};
use playstats_common::{format_timestamp, truncate_string};
use std::io::{self, Write};

const NO_DATA: &str = "No data available";
/// Longest item or category label printed before it is clipped.
const MAX_LABEL: usize = 40;
const SWATCH: &str = "\u{25A0}";

/// Writes reports to a terminal.
#[derive(Debug, Clone)]
pub struct Presenter {
    palette: Vec<String>,
    color: bool,
}

impl Presenter {
    /// Creates a presenter assigning `palette` colors to categories in order.
    pub const fn new(palette: Vec<String>, color: bool) -> Self {
        Self { palette, color }
    }

    /// Palette color of the category at `index`, cycling through the palette.
    pub fn color_for(&self, index: usize) -> Option<&str> {
        if self.palette.is_empty() {
            None
        } else {
            Some(self.palette[index % self.palette.len()].as_str())
        }
    }

    fn swatch(&self, index: usize) -> String {
        match self.color_for(index) {
            Some(hex) if self.color => ansi_rgb(hex).map_or_else(
                || format!("[{hex}]"),
                |(r, g, b)| format!("\x1b[38;2;{r};{g};{b}m{SWATCH}\x1b[0m"),
            ),
            Some(hex) => format!("[{hex}]"),
            None => SWATCH.to_string(),
        }
    }

    /// Writes `report` to `out`.
    pub fn write_report<W: Write>(&self, report: &ActivityReport, out: &mut W) -> io::Result<()> {
        match &report.identifier {
            Some(identifier) => writeln!(out, "Playtime for {identifier}")?,
            None => writeln!(out, "Playtime")?,
        }
        if let Some(completed_at) = report.completed_at {
            writeln!(out, "Updated {}", format_timestamp(completed_at))?;
        }

        if let CycleStatus::Failed { failures } = &report.status {
            for failure in failures {
                writeln!(
                    out,
                    "Warning: {} retrieval failed: {}",
                    failure.kind, failure.message
                )?;
            }
        }
        writeln!(out)?;

        writeln!(out, "Total playtime: {}", report.total)?;
        writeln!(out)?;

        write_ranking(out, "Most played recently", &report.recent)?;
        write_ranking(out, "Most played all-time", &report.all_time)?;

        writeln!(out, "Playtime by category")?;
        match &report.categories {
            ReportSection::Entries(entries) => {
                for (i, entry) in entries.iter().enumerate() {
                    writeln!(
                        out,
                        "  {} {}: {} ({} of total)",
                        self.swatch(i),
                        truncate_string(&entry.category, MAX_LABEL),
                        entry.value,
                        entry.share
                    )?;
                }
            }
            ReportSection::NoData => writeln!(out, "  {NO_DATA}")?,
        }

        Ok(())
    }
}

fn write_ranking<W: Write>(
    out: &mut W,
    title: &str,
    section: &ReportSection<RankedEntry>,
) -> io::Result<()> {
    writeln!(out, "{title}")?;
    match section {
        ReportSection::Entries(entries) => {
            for entry in entries {
                writeln!(
                    out,
                    "  {:>2}. {}: {}",
                    entry.rank,
                    truncate_string(&entry.label, MAX_LABEL),
                    entry.value
                )?;
            }
        }
        ReportSection::NoData => writeln!(out, "  {NO_DATA}")?,
    }
    writeln!(out)
}

/// Parses `#RRGGBB`.
fn ansi_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use playstats_analytics::Snapshot;
    use playstats_common::{
        test_utils::record_fixtures, AccountId, CategorizedEntry, DisplayUnit, ItemId,
    };
    use std::num::NonZeroUsize;

    fn render(report: &ActivityReport, presenter: &Presenter) -> String {
        let mut out = Vec::new();
        presenter.write_report(report, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn plain() -> Presenter {
        Presenter::new(vec!["#0088FE".to_string(), "#00C49F".to_string()], false)
    }

    #[test]
    fn test_renders_sections() {
        let snapshot = Snapshot::build(
            AccountId::new("player"),
            1,
            &record_fixtures::recent_entries(),
            &record_fixtures::categorized_entries(),
            NonZeroUsize::new(5).unwrap(),
        );
        let report = ActivityReport::build(&snapshot, CycleStatus::Ready, DisplayUnit::Hours);
        let text = render(&report, &plain());

        assert!(text.starts_with("Playtime for player\n"));
        assert!(text.contains("Total playtime: 15.00 hours"));
        assert!(text.contains("   1. Y: 1.58 hours"));
        assert!(text.contains("   1. X: 10.00 hours"));
        assert!(text.contains("  [#0088FE] RPG: 15.00 hours (100.00% of total)"));
        assert!(text.contains("  [#00C49F] Action: 5.00 hours (33.33% of total)"));
        assert!(!text.contains(NO_DATA));
    }

    #[test]
    fn test_renders_placeholders() {
        let report =
            ActivityReport::build(&Snapshot::empty(0), CycleStatus::Idle, DisplayUnit::Minutes);
        let text = render(&report, &plain());

        assert_eq!(text.matches(NO_DATA).count(), 3);
        assert!(text.contains("Total playtime: 0 minutes"));
    }

    #[test]
    fn test_header_shows_completion_time() {
        let mut report =
            ActivityReport::build(&Snapshot::empty(0), CycleStatus::Idle, DisplayUnit::Minutes);
        report.completed_at = Some("2024-01-01T12:00:00Z".parse().unwrap());
        let text = render(&report, &plain());

        assert!(text.starts_with("Playtime\nUpdated 2024-01-01 12:00:00 UTC\n"));
    }

    #[test]
    fn test_long_labels_are_clipped() {
        let long = "A".repeat(60);
        let snapshot = Snapshot::build(
            AccountId::new("player"),
            1,
            &[],
            &[CategorizedEntry {
                id: ItemId::from(1_u64),
                label: long.clone(),
                total_minutes: 60,
                categories: vec![long.clone()],
            }],
            NonZeroUsize::new(5).unwrap(),
        );
        let report = ActivityReport::build(&snapshot, CycleStatus::Ready, DisplayUnit::Minutes);
        let text = render(&report, &plain());

        let clipped = format!("{}...", "A".repeat(MAX_LABEL - 3));
        assert!(text.contains(&format!("   1. {clipped}: 60 minutes")));
        assert!(text.contains(&format!("[#0088FE] {clipped}: 60 minutes")));
        assert!(!text.contains(&long));
    }

    #[test]
    fn test_palette_cycles() {
        let presenter = plain();
        assert_eq!(presenter.color_for(0), Some("#0088FE"));
        assert_eq!(presenter.color_for(3), Some("#00C49F"));
        assert_eq!(Presenter::new(Vec::new(), true).color_for(0), None);
    }

    #[test]
    fn test_colored_swatch() {
        let presenter = Presenter::new(vec!["#FF8042".to_string()], true);
        assert_eq!(presenter.swatch(0), "\x1b[38;2;255;128;66m\u{25A0}\x1b[0m");
    }

    #[test]
    fn test_ansi_rgb() {
        assert_eq!(ansi_rgb("#0088FE"), Some((0, 136, 254)));
        assert_eq!(ansi_rgb("0088FE"), None);
        assert_eq!(ansi_rgb("#00"), None);
    }
}
