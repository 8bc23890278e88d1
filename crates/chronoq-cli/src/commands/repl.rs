//! `chronoq repl <file>`: an interactive, line-oriented front end over the
//! reversible stepper, for manually walking a program back and forth.

use std::io::{self, BufRead, Write};

use anyhow::Result;

use chronoq_engine::StepOutcome;

use super::common::{load_engine, report_assertion_failure};

const HELP: &str = "\
commands:
  step | s              step one instruction forward
  back | b               step one instruction backward
  over                    step over a call
  out                     step out of the current call
  run | r                 run forward until a breakpoint or assertion failure
  bp <instruction>        set a breakpoint
  clear-bp                clear all breakpoints
  state | sv              print the full state vector
  amp <index|bitstring>   print one amplitude
  stack                   print the call stack
  vars                    print classical variables
  causes                  print potential causes of the last failed assertion
  reset                   rewind to the start of the program
  help                    show this message
  quit | q                exit";

pub fn execute(input: &str) -> Result<()> {
    let mut engine = load_engine(input)?;
    println!("chronoq repl — {input} loaded, {} qubit(s)", engine.num_qubits());
    println!("type 'help' for a command list");

    let stdin = io::stdin();
    loop {
        print!("(chronoq) ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or_default();
        let rest = parts.next();

        match command {
            "step" | "s" => {
                let outcome = engine.step_forward();
                report_outcome(&engine, outcome);
            }
            "back" | "b" => {
                let outcome = engine.step_backward();
                report_outcome(&engine, outcome);
            }
            "over" => {
                let outcome = engine.step_over_forward();
                report_outcome(&engine, outcome);
            }
            "out" => {
                let outcome = engine.step_out_forward();
                report_outcome(&engine, outcome);
            }
            "run" | "r" => {
                let outcome = engine.run_simulation();
                report_outcome(&engine, outcome);
            }
            "bp" => match rest.and_then(|s| s.parse::<usize>().ok()) {
                Some(id) => engine.set_breakpoint(id),
                None => println!("usage: bp <instruction>"),
            },
            "clear-bp" => engine.clear_breakpoints(),
            "state" | "sv" => match engine.get_state_vector_full() {
                Ok(amps) => print_amplitudes(&amps),
                Err(e) => println!("error: {e}"),
            },
            "amp" => match rest {
                Some(arg) => print_single_amplitude(&engine, arg),
                None => println!("usage: amp <index|bitstring>"),
            },
            "stack" => {
                let trace = engine.get_stack_trace();
                println!("depth {}: {:?}", engine.get_stack_depth(), trace);
            }
            "vars" => match engine.get_classical_variables() {
                Ok(vars) if vars.is_empty() => println!("(no classical variables yet)"),
                Ok(vars) => vars.iter().for_each(|v| println!("{v}")),
                Err(e) => println!("error: {e}"),
            },
            "causes" => match engine.did_assertion_fail() {
                Some(id) => report_assertion_failure(&engine, id),
                None => println!("no assertion has failed yet"),
            },
            "reset" => match engine.reset_simulation() {
                Ok(()) => println!("reset to the start of the program"),
                Err(e) => println!("error: {e}"),
            },
            "help" => println!("{HELP}"),
            "quit" | "q" => break,
            other => println!("unknown command '{other}', type 'help' for a list"),
        }
    }

    Ok(())
}

fn report_outcome(
    engine: &chronoq_engine::Engine<chronoq_adapter_statevector::StatevectorPackage>,
    outcome: chronoq_engine::EngineResult<StepOutcome>,
) {
    match outcome {
        Ok(StepOutcome::Finished) => println!("program finished"),
        Ok(StepOutcome::Advanced) => {
            if let Some(current) = engine.get_stack_trace().last() {
                println!("at instruction {current}");
            }
        }
        Ok(StepOutcome::Paused) => {
            if let Some(id) = engine.did_assertion_fail() {
                report_assertion_failure(engine, id);
            } else if let Some(id) = engine.was_breakpoint_hit() {
                println!("breakpoint hit at instruction {id}");
            } else {
                println!("paused");
            }
        }
        Err(e) => println!("error: {e}"),
    }
}

fn print_amplitudes(amps: &[num_complex::Complex64]) {
    for (i, amp) in amps.iter().enumerate() {
        if amp.norm_sqr() > 1e-12 {
            println!("  |{i}>: {amp:.4}");
        }
    }
}

fn print_single_amplitude(
    engine: &chronoq_engine::Engine<chronoq_adapter_statevector::StatevectorPackage>,
    arg: &str,
) {
    let result = if let Ok(index) = arg.parse::<usize>() {
        engine.get_amplitude_index(index)
    } else {
        engine.get_amplitude_bitstring(arg)
    };
    match result {
        Ok(amp) => println!("{amp:.4}"),
        Err(e) => println!("error: {e}"),
    }
}
