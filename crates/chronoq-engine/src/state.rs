//! Stepper bookkeeping (spec §4.C): the stacks and flags that make forward
//! and backward stepping possible without re-running the program from
//! scratch.

use rustc_hash::FxHashSet;

use chronoq_ir::InstructionId;

/// A single undoable step, recorded so `step_backward` can invert it.
///
/// Undoing a `Gate` entry re-resolves the instruction's condition against
/// the current classical variables and re-applies the gate's inverse,
/// rather than snapshotting the prior state — valid because classical
/// variables only change at a `Measure`, and a `Measure` entry blocks
/// backward stepping outright.
#[derive(Debug, Clone, Copy)]
pub enum UndoEntry {
    /// Re-resolve `instruction`'s condition/gate and re-apply its inverse;
    /// a no-op for anything that isn't a gate application (barriers,
    /// assertions, no-ops all use this variant too since they need no
    /// call-stack adjustment on the way back).
    Gate { instruction: InstructionId },
    /// A measurement or reset collapsed the state irreversibly; backward
    /// stepping across this entry is refused rather than faked.
    Irreversible { instruction: InstructionId },
    /// Recorded when `CALL` pushed `caller` onto the call stack; undoing it
    /// pops the call stack back off.
    Enter { caller: InstructionId },
    /// Recorded when `RETURN` popped `caller` off the call stack; undoing
    /// it pushes `caller` back on.
    Exit { caller: InstructionId },
}

/// Everything the stepper needs beyond the live quantum state: the
/// instruction cursor, call/undo history, and breakpoint/assertion flags.
#[derive(Debug)]
pub struct EngineState {
    /// `None` before `load_code`/`init`, or once the program has run off
    /// the end.
    pub current_instruction: Option<InstructionId>,

    /// History of executed instructions, most recent last — `step_backward`
    /// pops from here.
    pub previous_stack: Vec<InstructionId>,

    /// Instruction ids to resume at once the current gate body returns.
    pub call_stack: Vec<InstructionId>,

    /// Parallel to `previous_stack`: how to undo each entry.
    pub restore_stack: Vec<UndoEntry>,

    pub breakpoints: FxHashSet<InstructionId>,

    pub last_failed_assertion: Option<InstructionId>,
    pub last_met_breakpoint: Option<InstructionId>,

    /// Set once `run_simulation`/`run_all` stops at a breakpoint or failed
    /// assertion; cleared by any explicit step call.
    pub paused: bool,

    /// `false` until `load_code` has succeeded.
    pub ready: bool,
}

impl EngineState {
    pub fn new() -> Self {
        Self {
            current_instruction: None,
            previous_stack: Vec::new(),
            call_stack: Vec::new(),
            restore_stack: Vec::new(),
            breakpoints: FxHashSet::default(),
            last_failed_assertion: None,
            last_met_breakpoint: None,
            paused: false,
            ready: false,
        }
    }

    pub fn reset_run_state(&mut self) {
        self.previous_stack.clear();
        self.call_stack.clear();
        self.restore_stack.clear();
        self.last_failed_assertion = None;
        self.last_met_breakpoint = None;
        self.paused = false;
    }

    pub fn stack_depth(&self) -> usize {
        self.call_stack.len()
    }
}

impl Default for EngineState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_is_not_ready() {
        let state = EngineState::new();
        assert!(!state.ready);
        assert!(state.current_instruction.is_none());
    }

    #[test]
    fn reset_run_state_clears_history_but_not_breakpoints() {
        let mut state = EngineState::new();
        state.breakpoints.insert(4);
        state.previous_stack.push(1);
        state.last_failed_assertion = Some(2);
        state.reset_run_state();
        assert!(state.previous_stack.is_empty());
        assert!(state.breakpoints.contains(&4));
        assert!(state.last_failed_assertion.is_none());
    }
}
