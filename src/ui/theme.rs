use ratatui::style::Color;

pub struct Theme {
    pub fg: Color,
    pub primary: Color,   // Blue
    pub secondary: Color, // Orange
    pub comment: Color,   // Grey
    pub success: Color,   // Green
    pub error: Color,     // Red
    pub border_focused: Color,
    pub border_normal: Color,
    pub current_line_bg: Color,
    pub arithmetic: Color,   // + and -
    pub movement: Color,     // < and >
    pub loop_bracket: Color, // [ and ]
    pub io: Color,           // . and ,
    pub value: Color,        // Cell values in the tape pane
    pub pointer_bg: Color,   // Background of the cell under the pointer
}

pub const DEFAULT_THEME: Theme = Theme {
    fg: Color::Rgb(205, 214, 244),
    primary: Color::Rgb(137, 180, 250),   // Blue
    secondary: Color::Rgb(250, 179, 135), // Orange
    comment: Color::Rgb(108, 112, 134),
    success: Color::Rgb(166, 227, 161),
    error: Color::Rgb(243, 139, 168),
    border_focused: Color::Rgb(249, 226, 175), // Yellow border for focus
    border_normal: Color::Rgb(108, 112, 134),  // Grey border for normal
    current_line_bg: Color::Rgb(50, 50, 70),   // Slightly lighter BG for current line
    arithmetic: Color::Rgb(166, 227, 161),     // Green for + -
    movement: Color::Rgb(137, 180, 250),       // Blue for < >
    loop_bracket: Color::Rgb(249, 226, 175),   // Yellow for [ ]
    io: Color::Rgb(245, 194, 231),             // Pink for . ,
    value: Color::Rgb(250, 179, 135),          // Orange for numbers
    pointer_bg: Color::Rgb(69, 71, 90),        // Highlight for the active cell
};
