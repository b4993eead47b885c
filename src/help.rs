use crate::terminal::Terminal;
use crossterm::style::Color;

/// Lay out a boxed, centered help text. Returns (x, y, line) triples.
fn layout(width: u16, height: u16, help_text: &str) -> Vec<(usize, usize, String)> {
    let lines: Vec<&str> = help_text.lines().collect();
    let inner = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let box_width = inner + 4;
    let box_height = lines.len() + 2;

    let x0 = (width as usize).saturating_sub(box_width) / 2;
    let y0 = (height as usize).saturating_sub(box_height) / 2;

    let rule = "─".repeat(box_width - 2);
    let mut rows = Vec::with_capacity(box_height);
    rows.push((x0, y0, format!("┌{rule}┐")));
    for (i, line) in lines.iter().enumerate() {
        let pad = inner - line.chars().count();
        rows.push((x0, y0 + 1 + i, format!("│ {}{} │", line, " ".repeat(pad))));
    }
    rows.push((x0, y0 + box_height - 1, format!("└{rule}┘")));
    rows
}

/// Draw a centered help box into the back buffer
pub fn render_help_overlay(term: &mut Terminal, width: u16, height: u16, help_text: &str) {
    if help_text.is_empty() {
        return;
    }
    for (x, y, row) in layout(width, height, help_text) {
        term.set_str(x as i32, y as i32, &row, Some(Color::Grey), false);
    }
}
