//! Tape pane rendering
//!
//! Lists a window of cells centered on the pointer: address, value, and
//! printable character. The cell under the pointer is highlighted.

use crate::machine::Machine;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn printable(value: i64) -> String {
    match u32::try_from(value).ok().and_then(char::from_u32) {
        Some(character) if !character.is_control() => format!("'{}'", character),
        _ => String::from("  "),
    }
}

/// Render the tape pane. `scroll` offsets the window away from the
/// pointer when the pane is focused and the user scrolls (in cells,
/// signed).
pub fn render_tape_pane(
    frame: &mut Frame,
    area: Rect,
    machine: &Machine,
    is_focused: bool,
    scroll: &mut i64,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(format!(
            " Tape ({} cells touched) ",
            machine.tape().touched_count()
        ))
        .borders(Borders::ALL)
        .border_style(border_style);

    let visible_height = area.height.saturating_sub(2).max(1) as i64;
    let pointer = machine.pointer();

    // Window centered on the pointer, shifted by manual scroll
    let mut first = pointer - visible_height / 2 + *scroll;
    if !machine.config().allow_negative_pointer && first < 0 {
        // Without negative addressing there is nothing below zero to show
        *scroll -= first;
        first = 0;
    }

    let rows: Vec<Line> = (first..first + visible_height)
        .map(|address| {
            let value = machine.tape().get(address);
            let is_pointer = address == pointer;

            let marker = if is_pointer { "▶" } else { " " };
            let row = format!(
                "{} {:>6} │ {:>5} {}",
                marker,
                address,
                value,
                printable(value)
            );

            let style = if is_pointer {
                Style::default()
                    .bg(DEFAULT_THEME.pointer_bg)
                    .fg(DEFAULT_THEME.secondary)
                    .add_modifier(Modifier::BOLD)
            } else if value != 0 {
                Style::default().fg(DEFAULT_THEME.value)
            } else {
                Style::default().fg(DEFAULT_THEME.comment)
            };

            Line::from(Span::styled(row, style))
        })
        .collect();

    let paragraph = Paragraph::new(rows).block(block);
    frame.render_widget(paragraph, area);
}
