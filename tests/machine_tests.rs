// Machine scenario tests: stepping, bounds policies, suspension, hosts

use std::cell::RefCell;
use std::rc::Rc;
use tapeback::machine::{Input, Machine, MachineConfig, RuntimeError, StepOutcome};
use tapeback::program::tokenize;
use tapeback::runner::{RunStatus, Runner};

const HELLO: &str = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";

fn machine_for(source: &str, config: MachineConfig) -> Machine {
    let mut machine = Machine::new(config);
    machine.load(source).expect("tokenization failed");
    machine
}

/// Step forward until the machine reaches its end marker, returning the
/// number of steps taken.
fn run_to_end(machine: &mut Machine) -> usize {
    let mut steps = 0;
    while !machine.at_end() {
        assert_eq!(
            machine.step_forward().expect("step failed"),
            StepOutcome::Stepped
        );
        steps += 1;
        assert!(steps < 1_000_000, "program did not terminate");
    }
    steps
}

#[test]
fn test_transfer_loop_scenario() {
    let mut machine = machine_for("++>+++++[<+>-]", MachineConfig::default());
    run_to_end(&mut machine);

    assert_eq!(machine.tape().get(0), 7);
    assert_eq!(machine.tape().get(1), 0);
    assert_eq!(machine.pointer(), 1);
    assert!(machine.at_end());
}

#[test]
fn test_zero_idiom_executes_and_reverses() {
    let mut machine = machine_for("++[-]", MachineConfig::default());

    // Start, Add(2), Zero
    machine.step_forward().unwrap();
    machine.step_forward().unwrap();
    assert_eq!(machine.current_value(), 2);
    machine.step_forward().unwrap();
    assert_eq!(machine.current_value(), 0);
    assert!(machine.at_end());

    machine.step_backward().unwrap();
    assert_eq!(machine.current_value(), 2);
}

#[test]
fn test_wrap_keeps_cells_in_range() {
    let mut machine = machine_for("-", MachineConfig::default());
    run_to_end(&mut machine);
    assert_eq!(machine.current_value(), 255);

    let source = "+".repeat(260);
    let mut machine = machine_for(&source, MachineConfig::default());
    run_to_end(&mut machine);
    assert_eq!(machine.current_value(), 4);
    assert!((0..256).contains(&machine.current_value()));
}

#[test]
fn test_no_wrap_underflow_is_fatal_without_mutation() {
    let config = MachineConfig {
        allow_wrapping: false,
        ..MachineConfig::default()
    };
    let mut machine = machine_for("-", config);

    machine.step_forward().unwrap(); // Start
    let err = machine.step_forward().unwrap_err();

    match err {
        RuntimeError::CellOverflow { value, location } => {
            assert_eq!(value, -1);
            let location = location.expect("overflow carries a position");
            assert_eq!((location.line, location.column), (1, 1));
        }
        other => panic!("expected CellOverflow, got {:?}", other),
    }

    // The failing instruction left no mutation behind
    assert_eq!(machine.current_value(), 0);
    assert_eq!(machine.program_counter(), 1);
}

#[test]
fn test_no_wrap_positive_zero_idiom_is_fatal_on_nonzero_cell() {
    let config = MachineConfig {
        allow_wrapping: false,
        ..MachineConfig::default()
    };
    let mut machine = machine_for("++[+]", config);

    machine.step_forward().unwrap(); // Start
    machine.step_forward().unwrap(); // Add(2)
    let err = machine.step_forward().unwrap_err();
    assert!(matches!(err, RuntimeError::CellOverflow { value: 2, .. }));

    // The negative form is fine on the same cell
    let mut machine = machine_for("++[-]", config);
    run_to_end(&mut machine);
    assert_eq!(machine.current_value(), 0);
}

#[test]
fn test_negative_pointer_is_fatal_by_default() {
    let mut machine = machine_for("<", MachineConfig::default());

    machine.step_forward().unwrap(); // Start
    let err = machine.step_forward().unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::PointerOutOfBounds { pointer: -1, reverse: false, .. }
    ));
    assert_eq!(machine.pointer(), 0);
}

#[test]
fn test_negative_pointer_allowed_when_configured() {
    let config = MachineConfig {
        allow_negative_pointer: true,
        ..MachineConfig::default()
    };
    let mut machine = machine_for("<+", config);
    run_to_end(&mut machine);

    assert_eq!(machine.pointer(), -1);
    assert_eq!(machine.current_value(), 1);
    assert_eq!(machine.tape().get(-1), 1);
}

#[test]
fn test_suspension_is_idempotent() {
    let mut machine = machine_for(",", MachineConfig::default());
    machine.set_input_callback(|| Input::Pending);

    machine.step_forward().unwrap(); // Start

    for _ in 0..3 {
        assert_eq!(machine.step_forward().unwrap(), StepOutcome::NeedsInput);
        assert_eq!(machine.program_counter(), 1);
        assert_eq!(machine.pointer(), 0);
        assert_eq!(machine.current_value(), 0);
    }

    // Once input arrives the same step completes
    machine.set_input_callback(|| Input::Value(65));
    assert_eq!(machine.step_forward().unwrap(), StepOutcome::Stepped);
    assert_eq!(machine.current_value(), 65);
    assert!(machine.at_end());
}

#[test]
fn test_output_callback_receives_characters() {
    let collected = Rc::new(RefCell::new(String::new()));
    let sink = Rc::clone(&collected);

    let source = format!("{}.", "+".repeat(48));
    let mut machine = machine_for(&source, MachineConfig::default());
    machine.set_output_callback(move |c| sink.borrow_mut().push(c));
    run_to_end(&mut machine);

    assert_eq!(collected.borrow().as_str(), "0");
}

#[test]
fn test_stepping_past_end_is_fatal() {
    let mut machine = machine_for("", MachineConfig::default());

    machine.step_forward().unwrap(); // Start
    assert!(machine.at_end());

    let err = machine.step_forward().unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::ProgramCounterOutOfBounds { pc: 2 }
    ));
}

#[test]
fn test_reversing_at_beginning_is_fatal() {
    let mut machine = machine_for("+", MachineConfig::default());
    assert!(machine.at_beginning());

    let err = machine.step_backward().unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::ProgramCounterOutOfBounds { pc: -1 }
    ));
}

#[test]
fn test_executing_an_unmatched_open_jump_is_fatal() {
    // Tokenizes fine; the jump of the dangling open has nowhere to land
    let mut machine = machine_for("[", MachineConfig::default());

    machine.step_forward().unwrap(); // Start
    let err = machine.step_forward().unwrap_err();
    assert!(matches!(err, RuntimeError::MalformedInstruction { .. }));
}

#[test]
fn test_current_value_editing_bypasses_history() {
    let mut machine = machine_for("+", MachineConfig::default());

    machine.set_current_value(41);
    machine.step_forward().unwrap(); // Start
    machine.step_forward().unwrap(); // Add(1)
    assert_eq!(machine.current_value(), 42);
}

#[test]
fn test_reset_restores_initial_state_and_reruns() {
    let mut machine = machine_for("+++>++", MachineConfig::default());
    run_to_end(&mut machine);
    assert_eq!(machine.tape().get(0), 3);
    assert_eq!(machine.tape().get(1), 2);

    machine.reset();
    assert!(machine.at_beginning());
    assert_eq!(machine.program_counter(), 0);
    assert_eq!(machine.pointer(), 0);
    assert_eq!(machine.tape().get(0), 0);
    assert_eq!(machine.tape().get(1), 0);

    run_to_end(&mut machine);
    assert_eq!(machine.tape().get(0), 3);
    assert_eq!(machine.tape().get(1), 2);
}

#[test]
fn test_position_lookup() {
    let mut machine = machine_for("x+", MachineConfig::default());

    // The synthetic start has no position
    assert_eq!(machine.position_in_source(), None);

    machine.step_forward().unwrap();
    assert_eq!(machine.position_in_source(), Some(1));
}

#[test]
fn test_state_fingerprint_tracks_state() {
    let program = tokenize("++>+", true).unwrap();

    let mut a = Machine::new(MachineConfig::default());
    a.load_tokens(program.clone());
    let mut b = Machine::new(MachineConfig::default());
    b.load_tokens(program);

    assert_eq!(a.state_fingerprint(), b.state_fingerprint());

    a.step_forward().unwrap();
    assert_ne!(a.state_fingerprint(), b.state_fingerprint());

    b.step_forward().unwrap();
    assert_eq!(a.state_fingerprint(), b.state_fingerprint());
}

#[test]
fn test_one_program_runs_in_many_machines() {
    let program = tokenize("++>+++[<+>-]", true).unwrap();

    let mut first = Machine::new(MachineConfig::default());
    first.load_tokens(program.clone());
    let mut second = Machine::new(MachineConfig::default());
    second.load_tokens(program);

    // Interleave the two runs; each machine keeps its own history
    while !first.at_end() || !second.at_end() {
        if !first.at_end() {
            first.step_forward().unwrap();
        }
        if !second.at_end() {
            second.step_forward().unwrap();
            second.step_backward().unwrap();
            second.step_forward().unwrap();
        }
    }

    assert_eq!(first.tape().get(0), 5);
    assert_eq!(second.tape().get(0), 5);
}

#[test]
fn test_hello_world() {
    let collected = Rc::new(RefCell::new(String::new()));
    let sink = Rc::clone(&collected);

    let mut machine = machine_for(HELLO, MachineConfig::default());
    machine.set_output_callback(move |c| sink.borrow_mut().push(c));
    run_to_end(&mut machine);

    assert_eq!(collected.borrow().as_str(), "Hello World!\n");
}

// ===== Naive forward-only runner =====

#[test]
fn test_runner_hello_world() {
    let mut runner = Runner::from_source(HELLO).unwrap();

    assert_eq!(runner.run(), RunStatus::Finished);
    assert_eq!(runner.take_output(), "Hello World!\n");
    assert!(runner.finished());
}

#[test]
fn test_runner_starves_and_resumes() {
    let mut runner = Runner::from_source(",[.,]").unwrap();

    assert_eq!(runner.run(), RunStatus::NeedsInput);

    runner.absorb("hi");
    assert_eq!(runner.run(), RunStatus::NeedsInput);
    assert_eq!(runner.output(), "hi");

    runner.absorb("\0");
    assert_eq!(runner.run(), RunStatus::Finished);
    assert_eq!(runner.take_output(), "hi");
}

#[test]
fn test_runner_drops_carriage_returns() {
    let mut runner = Runner::from_source(",.").unwrap();

    runner.absorb("\ra");
    assert_eq!(runner.run(), RunStatus::Finished);
    assert_eq!(runner.take_output(), "a");
}

#[test]
fn test_runner_agrees_with_machine() {
    let collected = Rc::new(RefCell::new(String::new()));
    let sink = Rc::clone(&collected);

    let mut machine = machine_for(HELLO, MachineConfig::default());
    machine.set_output_callback(move |c| sink.borrow_mut().push(c));
    run_to_end(&mut machine);

    let mut runner = Runner::from_source(HELLO).unwrap();
    runner.run();

    assert_eq!(collected.borrow().as_str(), runner.output());
}
