//! Main TUI application state and logic

use crate::machine::{Input, Machine, StepOutcome};
use crate::program::Op;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Instructions executed per play-mode tick.
const PLAY_STEPS_PER_TICK: usize = 8;

/// Play-mode tick interval.
const PLAY_INTERVAL: Duration = Duration::from_millis(25);

/// Upper bound on instructions executed per run-to-end request, so a
/// non-terminating program keeps the UI responsive.
const MAX_RUN_STEPS: usize = 5_000_000;

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Source,
    Tape,
    Output,
}

impl FocusedPane {
    /// Move focus to the next pane (source -> tape -> output)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Tape,
            FocusedPane::Tape => FocusedPane::Output,
            FocusedPane::Output => FocusedPane::Source,
        }
    }
}

/// The main application state
pub struct App {
    /// The machine being driven
    pub machine: Machine,

    /// The source code being executed
    pub source_code: String,

    /// Everything the machine has written, mirrored by the output hook
    output: Rc<RefCell<String>>,

    /// Values waiting for the machine's input hook
    input_queue: Rc<RefCell<VecDeque<i64>>>,

    /// Currently focused pane
    pub focused_pane: FocusedPane,

    /// Per-pane scroll offsets
    pub source_scroll: usize,
    pub tape_scroll: i64,
    pub output_scroll: usize,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,

    /// Whether the last step failed fatally
    pub has_error: bool,

    /// Whether auto-play mode is active
    pub is_playing: bool,

    /// Whether the machine is suspended waiting for input
    pub awaiting_input: bool,

    /// The line being typed while suspended
    pub input_line: String,

    /// Last time a play-mode step was taken
    pub last_play_time: Instant,

    /// Last time space was pressed (for debouncing)
    pub last_space_press: Instant,
}

impl App {
    /// Create a new app driving `machine`, wiring its output and input
    /// hooks to the app's buffers.
    pub fn new(mut machine: Machine, source_code: String) -> Self {
        let output = Rc::new(RefCell::new(String::new()));
        let sink = Rc::clone(&output);
        machine.set_output_callback(move |character| sink.borrow_mut().push(character));

        let input_queue = Rc::new(RefCell::new(VecDeque::new()));
        let feed = Rc::clone(&input_queue);
        machine.set_input_callback(move || match feed.borrow_mut().pop_front() {
            Some(value) => Input::Value(value),
            None => Input::Pending,
        });

        App {
            machine,
            source_code,
            output,
            input_queue,
            focused_pane: FocusedPane::Source,
            source_scroll: 0,
            tape_scroll: 0,
            output_scroll: 0,
            should_quit: false,
            status_message: String::from("Ready!"),
            has_error: false,
            is_playing: false,
            awaiting_input: false,
            input_line: String::new(),
            last_play_time: Instant::now(),
            last_space_press: Instant::now()
                .checked_sub(Duration::from_secs(1))
                .unwrap_or_else(Instant::now),
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if self.is_playing && self.last_play_time.elapsed() >= PLAY_INTERVAL {
                for _ in 0..PLAY_STEPS_PER_TICK {
                    if self.machine.at_end() {
                        self.is_playing = false;
                        self.status_message = "Playback complete".to_string();
                        break;
                    }
                    self.step_forward();
                    if !self.is_playing {
                        break;
                    }
                }
                self.last_play_time = Instant::now();
            }

            // Use poll with timeout to allow auto-play to work
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // Panes on top, one-line status bar at the bottom
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let pane_area = main_chunks[0];
        let status_area = main_chunks[1];

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(pane_area);

        // Left column: Source (top) | Output (bottom). Right column: Tape.
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(columns[0]);

        super::panes::render_source_pane(
            frame,
            left_rows[0],
            &self.source_code,
            self.machine.current_pos(),
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
        );

        let output = self.output.borrow();
        super::panes::render_output_pane(
            frame,
            left_rows[1],
            output.as_str(),
            self.awaiting_input.then_some(self.input_line.as_str()),
            self.focused_pane == FocusedPane::Output,
            &mut self.output_scroll,
        );
        drop(output);

        super::panes::render_tape_pane(
            frame,
            columns[1],
            &self.machine,
            self.focused_pane == FocusedPane::Tape,
            &mut self.tape_scroll,
        );

        super::panes::render_status_bar(
            frame,
            status_area,
            &self.status_message,
            self.machine.program_counter(),
            self.machine.program().len(),
            self.machine.pointer(),
            self.has_error,
            self.is_playing,
            self.awaiting_input,
        );
    }

    /// Handle keyboard events
    fn handle_key_event(&mut self, key: KeyEvent) {
        if self.awaiting_input {
            self.handle_input_mode_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            // Number keys step forward N times directly
            KeyCode::Char(c @ '1'..='9') => {
                self.is_playing = false;
                let n = c.to_digit(10).unwrap() as usize;
                let mut stepped = 0;
                for _ in 0..n {
                    if self.machine.at_end() || self.awaiting_input || self.has_error {
                        break;
                    }
                    self.step_forward();
                    stepped += 1;
                }
                self.status_message = format!("Stepped forward {} step(s)", stepped);
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.is_playing = false;
                self.reset_to_start();
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::Left => {
                self.is_playing = false;
                self.step_backward();
            }
            KeyCode::Right => {
                self.is_playing = false;
                if self.machine.at_end() {
                    self.status_message = "At end of program".to_string();
                } else {
                    self.step_forward();
                }
            }
            KeyCode::Up => match self.focused_pane {
                FocusedPane::Source => {
                    self.source_scroll = self.source_scroll.saturating_sub(1);
                }
                FocusedPane::Tape => {
                    self.tape_scroll -= 1;
                }
                FocusedPane::Output => {
                    self.output_scroll = self.output_scroll.saturating_sub(1);
                }
            },
            KeyCode::Down => match self.focused_pane {
                FocusedPane::Source => {
                    self.source_scroll = self.source_scroll.saturating_add(1);
                }
                FocusedPane::Tape => {
                    self.tape_scroll += 1;
                }
                FocusedPane::Output => {
                    self.output_scroll = self.output_scroll.saturating_add(1);
                }
            },
            KeyCode::Char(' ') => {
                // Toggle auto-play mode (debounced against key repeat)
                if self.last_space_press.elapsed() >= Duration::from_millis(200) {
                    self.last_space_press = Instant::now();
                    self.is_playing = !self.is_playing;
                    if self.is_playing {
                        self.last_play_time = Instant::now()
                            .checked_sub(PLAY_INTERVAL)
                            .unwrap_or_else(Instant::now);
                        self.status_message = "Playing...".to_string();
                    } else {
                        self.status_message = "Paused".to_string();
                    }
                }
            }
            KeyCode::Enter => {
                self.is_playing = false;
                self.run_to_end();
            }
            KeyCode::Backspace => {
                self.is_playing = false;
                self.reset_to_start();
            }
            _ => {}
        }
    }

    /// Keys while the machine is suspended on an input request
    fn handle_input_mode_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) => {
                self.input_line.push(c);
            }
            KeyCode::Backspace => {
                self.input_line.pop();
            }
            KeyCode::Enter => {
                self.commit_input_line();
            }
            KeyCode::Esc => {
                // Leave the machine suspended; stepping forward will ask again
                self.awaiting_input = false;
                self.input_line.clear();
                self.status_message = "Input cancelled".to_string();
            }
            _ => {}
        }
    }

    /// Queue the typed line (newline-terminated) and retry the suspended
    /// step.
    fn commit_input_line(&mut self) {
        {
            let mut queue = self.input_queue.borrow_mut();
            for character in self.input_line.chars() {
                queue.push_back(character as i64);
            }
            queue.push_back('\n' as i64);
        }
        self.input_line.clear();
        self.awaiting_input = false;
        self.step_forward();
    }

    /// Step forward in execution
    fn step_forward(&mut self) {
        match self.machine.step_forward() {
            Ok(StepOutcome::Stepped) => {
                self.status_message = "Stepped forward".to_string();
                self.output_scroll = usize::MAX;
            }
            Ok(StepOutcome::NeedsInput) => {
                self.is_playing = false;
                self.awaiting_input = true;
                self.status_message = "Waiting for input: type a line and press Enter".to_string();
            }
            Err(e) => {
                self.is_playing = false;
                self.has_error = true;
                self.status_message = format!("Error: {}", e);
            }
        }
    }

    /// Step backward in execution
    fn step_backward(&mut self) {
        if self.machine.at_beginning() {
            self.status_message = "At beginning of program".to_string();
            return;
        }

        match self.machine.step_backward() {
            Ok(_) => {
                // The machine cannot unsend output; mirror the undo by
                // trimming the buffer when we stepped back over a '.'
                if let Some(instruction) = self.machine.program().get(self.machine.program_counter())
                {
                    if matches!(instruction.op, Op::Output) {
                        self.output.borrow_mut().pop();
                    }
                }
                self.has_error = false;
                self.status_message = "Stepped backward".to_string();
                self.output_scroll = usize::MAX;
            }
            Err(e) => {
                self.has_error = true;
                self.status_message = format!("Error: {}", e);
            }
        }
    }

    /// Run forward until the end, an input request, or an error
    fn run_to_end(&mut self) {
        let mut stepped = 0;
        while !self.machine.at_end() && stepped < MAX_RUN_STEPS {
            self.step_forward();
            if self.awaiting_input || self.has_error {
                return;
            }
            stepped += 1;
        }

        if stepped >= MAX_RUN_STEPS {
            self.status_message =
                format!("Still running after {} steps; press Enter to continue", stepped);
        } else {
            self.status_message = "Reached end of program".to_string();
        }
        self.output_scroll = usize::MAX;
    }

    /// Rewind everything to the initial state
    fn reset_to_start(&mut self) {
        self.machine.reset();
        self.output.borrow_mut().clear();
        self.input_queue.borrow_mut().clear();
        self.input_line.clear();
        self.awaiting_input = false;
        self.has_error = false;
        self.output_scroll = usize::MAX;
        self.status_message = "Reset to start".to_string();
    }
}
