//! Stateless render functions for each visible pane

pub mod source;
pub mod status;
pub mod tape;
pub mod terminal;

pub use source::render_source_pane;
pub use status::render_status_bar;
pub use tape::render_tape_pane;
pub use terminal::render_output_pane;
