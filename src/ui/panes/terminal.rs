//! Output pane rendering
//!
//! Shows everything the machine has emitted through its output hook,
//! plus the line currently being typed while the machine is suspended
//! waiting for input.

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render_output_pane(
    frame: &mut Frame,
    area: Rect,
    output: &str,
    pending_input: Option<&str>,
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
        .title(" Output ")
        .borders(Borders::ALL)
        .border_style(border_style);

    let mut lines: Vec<Line> = output
        .lines()
        .map(|line| Line::from(Span::styled(line.to_string(), Style::default().fg(DEFAULT_THEME.fg))))
        .collect();
    if output.ends_with('\n') || output.is_empty() {
        lines.push(Line::from(""));
    }

    // Echo the line being typed for the suspended input request
    if let Some(typed) = pending_input {
        let last = lines.len() - 1;
        lines[last].spans.push(Span::styled(
            format!("{}▏", typed),
            Style::default()
                .fg(DEFAULT_THEME.secondary)
                .add_modifier(Modifier::BOLD),
        ));
    }

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    let max_scroll = lines.len().saturating_sub(visible_height);
    // usize::MAX is the autoscroll request: pin to the bottom
    *scroll = (*scroll).min(max_scroll);

    let paragraph = Paragraph::new(lines)
        .block(block)
        .scroll((*scroll as u16, 0));
    frame.render_widget(paragraph, area);
}
