//! Source pane rendering
//!
//! Displays the program text with command-aware coloring. The command at
//! the current program counter is highlighted individually (programs in
//! this language are often a single long line, so a line highlight alone
//! would say little); its line also gets a background tint.

use crate::program::SourcePos;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn command_style(character: char) -> Style {
    match character {
        '+' | '-' => Style::default().fg(DEFAULT_THEME.arithmetic),
        '<' | '>' => Style::default().fg(DEFAULT_THEME.movement),
        '[' | ']' => Style::default().fg(DEFAULT_THEME.loop_bracket),
        '.' | ',' => Style::default().fg(DEFAULT_THEME.io),
        // Everything else is a comment
        _ => Style::default().fg(DEFAULT_THEME.comment),
    }
}

/// Render the source pane.
///
/// `current` is the position of the instruction at the program counter,
/// `None` when the machine sits on a synthetic bound.
pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    source_code: &str,
    current: Option<SourcePos>,
    is_focused: bool,
    scroll: &mut usize,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(" Source ")
        .borders(Borders::ALL)
        .border_style(border_style);

    let lines: Vec<&str> = source_code.lines().collect();
    let total_lines = lines.len().max(1);
    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    // Keep the current line in view
    if let Some(pos) = current {
        let current_line = pos.line.saturating_sub(1);
        if current_line < *scroll {
            *scroll = current_line;
        } else if current_line >= *scroll + visible_height {
            *scroll = current_line + 1 - visible_height;
        }
    }
    *scroll = (*scroll).min(total_lines.saturating_sub(visible_height));

    let visible_lines: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(*scroll)
        .take(visible_height)
        .map(|(idx, line)| {
            let line_num = idx + 1;
            let is_current_line = current.map(|pos| pos.line) == Some(line_num);

            let num_style = if is_current_line {
                Style::default()
                    .fg(DEFAULT_THEME.secondary)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(DEFAULT_THEME.comment)
            };

            let mut spans = vec![Span::styled(format!("{:4} ", line_num), num_style)];
            for (column, character) in line.chars().enumerate() {
                let mut style = command_style(character);
                if is_current_line {
                    style = style.bg(DEFAULT_THEME.current_line_bg);
                    // column is 1-based in SourcePos
                    if current.map(|pos| pos.column) == Some(column + 1) {
                        style = style
                            .bg(DEFAULT_THEME.secondary)
                            .fg(ratatui::style::Color::Black)
                            .add_modifier(Modifier::BOLD);
                    }
                }
                spans.push(Span::styled(character.to_string(), style));
            }
            Line::from(spans)
        })
        .collect();

    let paragraph = Paragraph::new(visible_lines).block(block);
    frame.render_widget(paragraph, area);
}
