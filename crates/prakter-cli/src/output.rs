use prakter_core::types::Outcome;
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Print a finished command's result, or `Cancelled.` when the user backed
/// out. Cancellation is not a failure.
pub fn print_outcome<T>(
    outcome: Outcome<T>,
    json: bool,
    done: impl FnOnce(T) -> anyhow::Result<()>,
) -> anyhow::Result<()> {
    match outcome {
        Outcome::Done(value) => done(value),
        Outcome::Cancelled if json => print_json(&serde_json::json!({ "cancelled": true })),
        Outcome::Cancelled => {
            println!("Cancelled.");
            Ok(())
        }
    }
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    // Widths in chars; status glyphs are multi-byte
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let header_row: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| pad(h, widths[i]))
        .collect();
    println!("{}", header_row.join("  ").trim_end());

    let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep.join("  "));

    for row in &rows {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| pad(cell, widths.get(i).copied().unwrap_or(0)))
            .collect();
        println!("{}", cells.join("  ").trim_end());
    }
}

fn pad(cell: &str, width: usize) -> String {
    let fill = width.saturating_sub(cell.chars().count());
    format!("{cell}{}", " ".repeat(fill))
}
