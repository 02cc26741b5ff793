//! Plain-text rendering helpers shared by the CLI commands.

use crate::{config::app::Settings, core::report::format_currency};
use chrono::NaiveDate;

/// Renders rows as a left-aligned table with a header and a rule under it.
///
/// Column widths are measured in characters so accented labels line up.
#[must_use]
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(i) {
                Some(width) => *width = (*width).max(len),
                None => widths.push(len),
            }
        }
    }

    let mut out = render_row(&widths, headers.iter().copied());
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in rows {
        out.push('\n');
        out.push_str(&render_row(&widths, row.iter().map(String::as_str)));
    }
    out
}

fn render_row<'a>(widths: &[usize], cells: impl Iterator<Item = &'a str>) -> String {
    cells
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// Amount with the configured currency symbol.
#[must_use]
pub fn money(amount: f64, settings: &Settings) -> String {
    format_currency(amount, &settings.currency_symbol)
}

/// `dd-mm-yyyy`, or a dash when absent.
#[must_use]
pub fn date_or_dash(date: Option<NaiveDate>) -> String {
    date.map_or_else(|| "-".to_string(), |d| d.format("%d-%m-%Y").to_string())
}

/// Optional text, or a dash when absent.
#[must_use]
pub fn text_or_dash(value: Option<&str>) -> String {
    value.filter(|v| !v.is_empty()).unwrap_or("-").to_string()
}

/// Quantity without trailing zeros (`1000`, `2.5`).
#[must_use]
pub fn quantity(value: f64) -> String {
    let formatted = format!("{value:.3}");
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::date;

    #[test]
    fn test_table_aligns_columns() {
        let rendered = table(
            &["ID", "Nombre"],
            &[
                vec!["1".to_string(), "Lechería".to_string()],
                vec!["12".to_string(), "Sal".to_string()],
            ],
        );
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "ID  Nombre");
        assert_eq!(lines[1], "--  --------");
        assert_eq!(lines[2], "1   Lechería");
        assert_eq!(lines[3], "12  Sal");
    }

    #[test]
    fn test_table_without_rows() {
        assert_eq!(table(&["A", "B"], &[]), "A  B\n-  -");
    }

    #[test]
    fn test_small_formatters() {
        assert_eq!(date_or_dash(Some(date(2024, 2, 9))), "09-02-2024");
        assert_eq!(date_or_dash(None), "-");
        assert_eq!(text_or_dash(Some("")), "-");
        assert_eq!(text_or_dash(Some("OC")), "OC");
        assert_eq!(quantity(1000.0), "1000");
        assert_eq!(quantity(2.5), "2.5");
        assert_eq!(money(1_500_000.0, &Settings::default()), "$1.500.000");
    }
}
