/// Render an aligned plain-text table.
///
/// Columns are sized to their widest cell. When `max_width` is given, the
/// widest columns are shrunk (never below their header) and long cells are
/// cut with an ellipsis.
#[must_use]
pub fn render_table(headers: &[&str], rows: &[Vec<String>], max_width: Option<usize>) -> String {
    let mut widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            rows.iter()
                .filter_map(|row| row.get(index))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    if let Some(max_width) = max_width {
        shrink_to_fit(&mut widths, headers, max_width);
    }

    let header_line = render_row(&widths, headers.iter().copied());
    let divider_len = widths.iter().sum::<usize>() + widths.len().saturating_sub(1) * 2;

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(header_line);
    lines.push("-".repeat(divider_len));
    for row in rows {
        lines.push(render_row(&widths, row.iter().map(String::as_str)));
    }
    lines.join("\n")
}

fn render_row<'a>(widths: &[usize], cells: impl IntoIterator<Item = &'a str>) -> String {
    let mut cells = cells.into_iter();
    widths
        .iter()
        .map(|width| {
            let cell = cells.next().unwrap_or("-");
            format!("{:<width$}", truncate(cell, *width), width = *width)
        })
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

fn shrink_to_fit(widths: &mut [usize], headers: &[&str], max_width: usize) {
    let separators = widths.len().saturating_sub(1) * 2;
    while widths.iter().sum::<usize>() + separators > max_width {
        let widest = widths
            .iter()
            .enumerate()
            .filter(|(index, width)| **width > headers[*index].chars().count().max(6))
            .max_by_key(|(_, width)| **width)
            .map(|(index, _)| index);
        let Some(index) = widest else {
            break;
        };
        widths[index] -= 1;
    }
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    if width <= 1 {
        return "…".to_string();
    }
    let mut out: String = value.chars().take(width - 1).collect();
    out.push('…');
    out
}
