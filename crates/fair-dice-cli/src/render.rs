//! Text rendering for the console: help and the probability table.

use fair_dice_core::{Die, ProbabilityMatrix};
use std::fmt::Write;

const CORNER: &str = "User die v";

/// Full pairwise table: cell (row, col) is P(row die beats col die).
///
/// Rows are the user's die, columns the computer's. Self pairs show `-`.
pub fn probability_table(dice: &[Die], matrix: &ProbabilityMatrix) -> String {
    let labels: Vec<String> = dice.iter().map(Die::to_string).collect();
    let cells: Vec<Vec<String>> = matrix
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Some(odds) => format!("{:.4}", odds.probability()),
                    None => "-".to_string(),
                })
                .collect()
        })
        .collect();

    let first_width = labels
        .iter()
        .map(String::len)
        .chain(std::iter::once(CORNER.len()))
        .max()
        .unwrap_or(CORNER.len());
    let widths: Vec<usize> = labels.iter().map(|l| l.len().max(6)).collect();

    let border = {
        let mut line = format!("+{}", "-".repeat(first_width + 2));
        for w in &widths {
            line.push_str(&format!("+{}", "-".repeat(w + 2)));
        }
        line.push('+');
        line
    };

    let mut out = String::new();
    let _ = writeln!(out, "{}", border);
    let _ = write!(out, "| {:<width$} ", CORNER, width = first_width);
    for (label, w) in labels.iter().zip(&widths) {
        let _ = write!(out, "| {:^width$} ", label, width = *w);
    }
    let _ = writeln!(out, "|");
    let _ = writeln!(out, "{}", border);

    for (label, row) in labels.iter().zip(&cells) {
        let _ = write!(out, "| {:<width$} ", label, width = first_width);
        for (cell, w) in row.iter().zip(&widths) {
            let _ = write!(out, "| {:^width$} ", cell, width = *w);
        }
        let _ = writeln!(out, "|");
    }
    let _ = write!(out, "{}", border);
    out
}

/// Help shown for `?` at any prompt
pub fn help(dice: &[Die], matrix: &ProbabilityMatrix) -> String {
    format!(
        "Each roll is fair: I commit to a secret number and show its HMAC-SHA3-256 \
         before you pick yours.\nThe result is (my number + your number) mod the face \
         count, and afterwards I reveal the key so you can check the HMAC.\n\n\
         Probability of the win for the user (rows) against the computer (columns):\n{}",
        probability_table(dice, matrix)
    )
}
