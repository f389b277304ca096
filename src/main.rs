// Tapeback: reversible Brainfuck debugger with tape visualization

use std::fs;
use std::io;
use std::path::Path;
use std::process::ExitCode;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use tapeback::machine::{Machine, MachineConfig};
use tapeback::program::tokenize;
use tapeback::ui::App;

fn usage(program_name: &str) {
    eprintln!("Usage: {} [options] <file.bf>", program_name);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --no-optimize            keep every command as its own instruction");
    eprintln!("  --no-wrap                cell overflow is an error instead of wrapping");
    eprintln!("  --allow-negative-pointer let the pointer move below zero");
    eprintln!("  --cell-width <n>         cell modulus (default 256)");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} demos/hello.bf        # step through Hello World", program_name);
    eprintln!("  {} demos/echo.bf         # a program that reads input", program_name);
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let program_name = args.first().map(|s| s.as_str()).unwrap_or("tapeback");

    let mut config = MachineConfig::default();
    let mut file: Option<&str> = None;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--no-optimize" => config.optimize = false,
            "--no-wrap" => config.allow_wrapping = false,
            "--allow-negative-pointer" => config.allow_negative_pointer = true,
            "--cell-width" => match iter.next().and_then(|v| v.parse::<i64>().ok()) {
                Some(width) if width > 1 => config.cell_width = width,
                _ => {
                    eprintln!("Error: --cell-width expects an integer greater than 1");
                    return ExitCode::FAILURE;
                }
            },
            "--help" | "-h" => {
                usage(program_name);
                return ExitCode::SUCCESS;
            }
            other if file.is_none() && !other.starts_with('-') => file = Some(other),
            other => {
                eprintln!("Error: unrecognized argument '{}'", other);
                usage(program_name);
                return ExitCode::FAILURE;
            }
        }
    }

    let Some(file) = file else {
        eprintln!("Error: no input file provided");
        eprintln!();
        usage(program_name);
        return ExitCode::FAILURE;
    };

    if !Path::new(file).exists() {
        eprintln!("Error: file '{}' not found", file);
        return ExitCode::FAILURE;
    }

    let source = match fs::read_to_string(file) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: could not read '{}': {}", file, e);
            return ExitCode::FAILURE;
        }
    };

    eprintln!("Tokenizing {}...", file);
    let program = match tokenize(&source, config.optimize) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    eprintln!("Tokenized {} instructions.", program.len());

    let mut machine = Machine::new(config);
    machine.load_tokens(program);

    match run_tui(machine, source) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_tui(machine: Machine, source: String) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(machine, source);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}
