//! Shared helpers for the `run` and `repl` subcommands.

use anyhow::{Context, Result};

use chronoq_adapter_statevector::StatevectorPackage;
use chronoq_engine::Engine;

pub fn load_engine(path: &str) -> Result<Engine<StatevectorPackage>> {
    let source = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let mut engine = Engine::new(StatevectorPackage::new());
    engine.load_code(&source)?;
    Ok(engine)
}

/// Print a failed assertion and its potential causes, as both `run` and
/// `repl` do on encountering `StepOutcome::Paused` with an assertion hit.
pub fn report_assertion_failure(engine: &Engine<StatevectorPackage>, instruction: usize) {
    let position = engine
        .get_instruction_position(instruction)
        .map(|(start, end)| format!("bytes {start}..{end}"))
        .unwrap_or_else(|_| "unknown position".to_string());
    println!("assertion failed at instruction {instruction} ({position})");

    match engine.potential_error_causes(5) {
        Ok(causes) if !causes.is_empty() => {
            println!("potential causes:");
            for cause in causes {
                println!("  - {cause:?}");
            }
        }
        Ok(_) => println!("no potential causes found"),
        Err(e) => println!("could not search for causes: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(source: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("chronoq-cli-test-{:p}.qasm", source.as_ptr()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(source.as_bytes()).unwrap();
        path
    }

    #[test]
    fn load_engine_reads_and_preprocesses_a_file() {
        let path = write_temp("qreg q[1]; h q[0];");
        let engine = load_engine(path.to_str().unwrap()).unwrap();
        assert_eq!(engine.num_qubits(), 1);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn load_engine_reports_a_missing_file() {
        assert!(load_engine("/nonexistent/path/to/nothing.qasm").is_err());
    }
}
