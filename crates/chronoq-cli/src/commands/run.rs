//! `chronoq run <file>`: execute a program to completion, reporting every
//! assertion failure encountered along the way.

use anyhow::Result;

use chronoq_engine::StepOutcome;

use super::common::{load_engine, report_assertion_failure};

pub fn execute(input: &str) -> Result<()> {
    let mut engine = load_engine(input)?;
    engine.clear_breakpoints();

    loop {
        match engine.run_simulation()? {
            StepOutcome::Finished => break,
            StepOutcome::Advanced => unreachable!("run_simulation never returns Advanced"),
            StepOutcome::Paused => {
                let Some(instruction) = engine.did_assertion_fail() else {
                    break;
                };
                report_assertion_failure(&engine, instruction);
            }
        }
    }

    println!("run complete");
    Ok(())
}
