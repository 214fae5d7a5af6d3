#[derive(Clone, Copy, Debug, Default)]
pub struct TableOptions {
    pub max_width: Option<usize>,
    pub color: bool,
}

const MIN_COLUMN: usize = 6;
const GAP: &str = "  ";

/// Render an aligned plain-text table. Numeric cells are right-aligned.
#[must_use]
pub fn render_rows(headers: &[&str], rows: &[Vec<String>], options: TableOptions) -> String {
    let mut widths = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            rows.iter()
                .filter_map(|row| row.get(index))
                .map(|cell| cell.chars().count())
                .chain([header.chars().count(), MIN_COLUMN])
                .max()
                .unwrap_or(MIN_COLUMN)
        })
        .collect::<Vec<_>>();
    shrink_to_fit(&mut widths, options.max_width);

    let header_line = headers
        .iter()
        .zip(&widths)
        .map(|(header, width)| pad(&clip(header, *width), *width, false))
        .collect::<Vec<_>>()
        .join(GAP);
    let divider = "-".repeat(header_line.chars().count());

    let mut lines = vec![header_line, divider];
    for row in rows {
        let cells = widths
            .iter()
            .enumerate()
            .map(|(index, width)| {
                let cell = clip(row.get(index).map_or("-", String::as_str), *width);
                let padded = pad(&cell, *width, looks_numeric(&cell));
                if options.color {
                    paint(&cell, padded)
                } else {
                    padded
                }
            })
            .collect::<Vec<_>>();
        lines.push(cells.join(GAP));
    }
    lines.join("\n")
}

/// Narrow the widest column one character at a time until the row fits.
fn shrink_to_fit(widths: &mut [usize], max_width: Option<usize>) {
    let Some(max_width) = max_width else {
        return;
    };
    let gaps = widths.len().saturating_sub(1) * GAP.len();
    while widths.iter().sum::<usize>() + gaps > max_width {
        let widest = widths
            .iter_mut()
            .filter(|width| **width > MIN_COLUMN)
            .max_by_key(|width| **width);
        match widest {
            Some(width) => *width -= 1,
            None => break,
        }
    }
}

fn clip(value: &str, width: usize) -> String {
    // Multi-line answers collapse onto one row.
    let flat = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= width {
        return flat;
    }
    let mut out = flat.chars().take(width.saturating_sub(1)).collect::<String>();
    out.push('…');
    out
}

fn pad(value: &str, width: usize, right_align: bool) -> String {
    let fill = " ".repeat(width.saturating_sub(value.chars().count()));
    if right_align {
        format!("{fill}{value}")
    } else {
        format!("{value}{fill}")
    }
}

fn looks_numeric(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty()
        && trimmed.parse::<f64>().is_ok()
        && trimmed.chars().all(|ch| ch.is_ascii_digit() || matches!(ch, '-' | '+' | '.'))
}

/// Wrap a padded cell in an ANSI color chosen from its unpadded text.
fn paint(cell: &str, padded: String) -> String {
    let code = match cell.to_ascii_lowercase().as_str() {
        "true" | "success" | "completed" | "deducted" | "durable" => "32",
        "pending" | "skipped" | "ephemeral" | "cookie" => "33",
        "false" | "failure" | "failed" | "cancelled" => "31",
        _ => return padded,
    };
    format!("\u{1b}[{code}m{padded}\u{1b}[0m")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn columns_align_and_numbers_right_align() {
        let table = render_rows(
            &["id", "amount", "status"],
            &[row(&["t-1", "500.00", "completed"]), row(&["t-22", "12", "pending"])],
            TableOptions::default(),
        );
        let lines = table.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].chars().all(|c| c == '-'));
        assert_eq!(lines[2].chars().count(), lines[3].chars().count());
        assert!(lines[3].contains("    12"));
    }

    #[test]
    fn narrow_terminal_truncates_long_cells() {
        let long = "a".repeat(200);
        let table = render_rows(
            &["key", "value"],
            &[row(&["answer", &long])],
            TableOptions {
                max_width: Some(40),
                color: false,
            },
        );
        for line in table.lines() {
            assert!(line.chars().count() <= 40, "{line}");
        }
        assert!(table.contains('…'));
    }

    #[test]
    fn multiline_cells_are_flattened() {
        assert_eq!(clip("first\nsecond", 20), "first second");
    }

    #[test]
    fn color_only_touches_known_words() {
        let options = TableOptions {
            max_width: None,
            color: true,
        };
        let table = render_rows(&["status"], &[row(&["failure"]), row(&["other"])], options);
        assert!(table.contains("\u{1b}[31m"));
        assert!(table.lines().last().is_some_and(|line| !line.contains('\u{1b}')));
    }
}
