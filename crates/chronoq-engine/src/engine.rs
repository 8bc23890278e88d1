//! The reversible stepper and state-inspection surface (spec §4.C/§4.F).

use num_complex::Complex64;
use rand::Rng;
use tracing::instrument;

use chronoq_dd::{DecisionDiagramPackage, StateId};
use chronoq_ir::{
    Assertion, ClassicalCondition, ClassicalVariable, Instruction, InstructionId, InstructionKind,
    QubitId, RegisterRef, SimOp, StandardGate, Successor,
};
use chronoq_preprocess::{preprocess, PreprocessedProgram};

use crate::density;
use crate::diagnostics::RuntimeDiagnostics;
use crate::error::{EngineError, EngineResult};
use crate::state::{EngineState, UndoEntry};

/// Where `step_forward`/`step_backward` landed, and anything notable that
/// happened along the way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Advanced,
    Paused,
    Finished,
}

/// Wraps a preprocessed program, a live quantum state, and the stepper
/// bookkeeping that makes stepping in both directions possible.
pub struct Engine<P: DecisionDiagramPackage> {
    package: P,
    program: Option<PreprocessedProgram>,
    state: EngineState,
    current_state: Option<StateId>,
    num_qubits: u32,
    diagnostics: RuntimeDiagnostics,
}

impl<P: DecisionDiagramPackage> Engine<P> {
    pub fn new(package: P) -> Self {
        Self {
            package,
            program: None,
            state: EngineState::new(),
            current_state: None,
            num_qubits: 0,
            diagnostics: RuntimeDiagnostics::new(),
        }
    }

    /// Preprocess `source` and reset the engine to its entry point (spec
    /// §4.B/§4.C, `loadCode`).
    pub fn load_code(&mut self, source: &str) -> EngineResult<()> {
        let program = preprocess(source)?;
        self.num_qubits = program.registers.num_qubits().max(1);
        self.program = Some(program);
        self.diagnostics.clear();
        self.reset_simulation()?;
        Ok(())
    }

    /// Re-enter the program at its first instruction with a fresh `|0...0>`
    /// state, preserving breakpoints (spec §4.C, `resetSimulation`).
    pub fn reset_simulation(&mut self) -> EngineResult<()> {
        if let Some(old) = self.current_state.take() {
            let _ = self.package.dec_ref(old);
            self.package.garbage_collect();
        }
        let zero = self.package.make_zero_state(self.num_qubits);
        self.package.inc_ref(zero);
        self.current_state = Some(zero);
        self.state.reset_run_state();

        let program = self.program.as_mut().ok_or(EngineError::NotReady)?;
        let names: Vec<String> = (0..program.classical_vars.len())
            .filter_map(|i| program.classical_vars.name_at(i).map(str::to_string))
            .collect();
        for name in names {
            program.classical_vars.set(name, false);
        }
        self.state.current_instruction = first_instruction(&program.instructions);
        self.state.ready = true;
        Ok(())
    }

    fn program(&self) -> EngineResult<&PreprocessedProgram> {
        self.program.as_ref().ok_or(EngineError::NotReady)
    }

    fn require_ready(&self) -> EngineResult<()> {
        if !self.state.ready {
            return Err(EngineError::NotReady);
        }
        Ok(())
    }

    fn instruction(&self, id: InstructionId) -> EngineResult<&Instruction> {
        self.program()?
            .instructions
            .get(id)
            .ok_or(EngineError::UnknownInstruction(id))
    }

    pub(crate) fn resolve_qubit(&self, target: &RegisterRef) -> EngineResult<QubitId> {
        let program = self.program()?;
        program
            .registers
            .find(&target.name)
            .and_then(|reg| reg.qubit_at(target.index))
            .ok_or_else(|| EngineError::UnknownClassicalVariable(target.to_string()))
    }

    pub(crate) fn resolve_targets(&self, targets: &[RegisterRef]) -> EngineResult<Vec<QubitId>> {
        targets.iter().map(|t| self.resolve_qubit(t)).collect()
    }

    fn evaluate_condition(&self, condition: &ClassicalCondition) -> EngineResult<bool> {
        let program = self.program()?;
        let reg = program
            .registers
            .find(&condition.register)
            .ok_or_else(|| EngineError::UnknownClassicalVariable(condition.register.clone()))?;
        let mut value: u64 = 0;
        for i in (0..reg.size).rev() {
            let bit = program
                .classical_vars
                .get(&format!("{}[{i}]", condition.register))
                .unwrap_or(false);
            value = (value << 1) | u64::from(bit);
        }
        Ok(value == condition.value)
    }

    // -- Forward stepping -------------------------------------------------

    #[instrument(skip(self))]
    pub fn step_forward(&mut self) -> EngineResult<StepOutcome> {
        self.require_ready()?;
        let Some(current) = self.state.current_instruction else {
            return Ok(StepOutcome::Finished);
        };
        let inst = self.instruction(current)?.clone();
        let mut newly_failed = false;

        let next = match &inst.kind {
            InstructionKind::Nop | InstructionKind::Assertion(_) => {
                if let InstructionKind::Assertion(assertion) = &inst.kind {
                    let passed = self.check_assertion(assertion)?;
                    if !passed && self.state.last_failed_assertion != Some(current) {
                        self.state.last_failed_assertion = Some(current);
                        newly_failed = true;
                    }
                }
                self.state.previous_stack.push(current);
                self.state.restore_stack.push(UndoEntry::Gate { instruction: current });
                self.successor_of(&inst)
            }
            InstructionKind::Call => {
                self.state.call_stack.push(current);
                self.state.previous_stack.push(current);
                self.state.restore_stack.push(UndoEntry::Enter { caller: current });
                self.successor_of(&inst)
            }
            InstructionKind::Return => {
                let caller = self.state.call_stack.pop().ok_or(EngineError::EmptyCallStack)?;
                self.state.previous_stack.push(current);
                self.state.restore_stack.push(UndoEntry::Exit { caller });
                let len = self.program()?.instructions.len();
                (caller + 1 < len).then_some(caller + 1)
            }
            InstructionKind::Simulate(op) => {
                self.dispatch_sim_op(current, op.clone(), &inst.targets)?;
                self.state.previous_stack.push(current);
                self.successor_of(&inst)
            }
        };

        self.state.current_instruction = next;

        if newly_failed {
            // The user observes the failed assertion with state rewound to
            // just before it, not sitting past it.
            self.step_backward()?;
            self.state.last_failed_assertion = Some(current);
            self.state.paused = true;
            return Ok(StepOutcome::Paused);
        }

        if self.state.current_instruction.is_none() {
            return Ok(StepOutcome::Finished);
        }
        Ok(StepOutcome::Advanced)
    }

    fn successor_of(&self, inst: &Instruction) -> Option<InstructionId> {
        match inst.successor {
            Successor::Next(id) => Some(id),
            Successor::Pop | Successor::End => None,
        }
    }

    fn dispatch_sim_op(&mut self, id: InstructionId, op: SimOp, targets: &[RegisterRef]) -> EngineResult<()> {
        let qubits = self.resolve_targets(targets)?;
        let state = self.current_state.ok_or(EngineError::NotReady)?;
        self.diagnostics.observe_targets(id, &qubits);

        match op {
            SimOp::Barrier => {
                self.state.restore_stack.push(UndoEntry::Gate { instruction: id });
            }
            SimOp::Gate { gate, condition } => {
                let active = match &condition {
                    Some(c) => self.evaluate_condition(c)?,
                    None => true,
                };
                let next_state = if active {
                    let op = self.package.get_dd(&gate, &qubits, self.num_qubits);
                    self.package.multiply(op, state)?
                } else {
                    let ident = self.package.make_ident(self.num_qubits);
                    self.package.multiply(ident, state)?
                };
                self.replace_state(next_state);
                self.state.restore_stack.push(UndoEntry::Gate { instruction: id });
            }
            SimOp::Measure { clbit } => {
                let qubit = qubits[0];
                let (p0, p1) = self.package.determine_measurement_probabilities(state, qubit)?;
                let outcome = sample_outcome(p0, p1);
                let collapsed = self.package.perform_collapsing_measurement(state, qubit, outcome)?;
                self.replace_state(collapsed);
                if let Some(program) = self.program.as_mut() {
                    program.classical_vars.set(clbit, !outcome);
                }
                self.state.restore_stack.push(UndoEntry::Irreversible { instruction: id });
            }
            SimOp::Reset => {
                let qubit = qubits[0];
                let (p0, p1) = self.package.determine_measurement_probabilities(state, qubit)?;
                let outcome = sample_outcome(p0, p1);
                let collapsed = self.package.perform_collapsing_measurement(state, qubit, outcome)?;
                let final_state = if outcome {
                    let x = self.package.get_dd(&StandardGate::X, &[qubit], self.num_qubits);
                    self.package.multiply(x, collapsed)?
                } else {
                    collapsed
                };
                self.replace_state(final_state);
                self.state.restore_stack.push(UndoEntry::Irreversible { instruction: id });
            }
        }
        Ok(())
    }

    fn replace_state(&mut self, next: StateId) {
        self.package.inc_ref(next);
        if let Some(old) = self.current_state.replace(next) {
            let _ = self.package.dec_ref(old);
        }
        self.package.garbage_collect();
    }

    // -- Backward stepping --------------------------------------------------

    #[instrument(skip(self))]
    pub fn step_backward(&mut self) -> EngineResult<StepOutcome> {
        self.require_ready()?;
        let Some(instruction) = self.state.previous_stack.pop() else {
            return Err(EngineError::NoPreviousInstruction);
        };
        let undo = self
            .state
            .restore_stack
            .pop()
            .ok_or(EngineError::NoPreviousInstruction)?;

        match undo {
            UndoEntry::Irreversible { .. } => {
                // Refuse: put everything back and report nothing to undo.
                self.state.previous_stack.push(instruction);
                self.state.restore_stack.push(undo);
                return Err(EngineError::NoPreviousInstruction);
            }
            UndoEntry::Enter { .. } => {
                self.state.call_stack.pop();
            }
            UndoEntry::Exit { caller } => {
                self.state.call_stack.push(caller);
            }
            UndoEntry::Gate { instruction: gate_id } => {
                self.undo_gate(gate_id)?;
            }
        }

        self.state.current_instruction = Some(instruction);
        self.state.last_failed_assertion = None;
        Ok(StepOutcome::Advanced)
    }

    fn undo_gate(&mut self, id: InstructionId) -> EngineResult<()> {
        let inst = self.instruction(id)?.clone();
        let Some(op) = inst.sim_op().cloned() else {
            return Ok(());
        };
        let SimOp::Gate { gate, condition } = op else {
            return Ok(());
        };
        let active = match &condition {
            Some(c) => self.evaluate_condition(c)?,
            None => true,
        };
        let state = self.current_state.ok_or(EngineError::NotReady)?;
        let qubits = self.resolve_targets(&inst.targets)?;
        let next_state = if active {
            let inv = self.package.get_inverse_dd(&gate, &qubits, self.num_qubits);
            self.package.multiply(inv, state)?
        } else {
            let ident = self.package.make_ident(self.num_qubits);
            self.package.multiply(ident, state)?
        };
        self.replace_state(next_state);
        Ok(())
    }

    // -- Step-over / step-out ------------------------------------------------

    pub fn step_over_forward(&mut self) -> EngineResult<StepOutcome> {
        let depth_before = self.state.stack_depth();
        loop {
            match self.step_forward()? {
                StepOutcome::Advanced if self.state.stack_depth() > depth_before => continue,
                other => return Ok(other),
            }
        }
    }

    pub fn step_over_backward(&mut self) -> EngineResult<StepOutcome> {
        let depth_before = self.state.stack_depth();
        loop {
            match self.step_backward()? {
                StepOutcome::Advanced if self.state.stack_depth() > depth_before => continue,
                other => return Ok(other),
            }
        }
    }

    pub fn step_out_forward(&mut self) -> EngineResult<StepOutcome> {
        if self.state.stack_depth() == 0 {
            return self.run_simulation();
        }
        let target_depth = self.state.stack_depth() - 1;
        loop {
            match self.step_forward()? {
                StepOutcome::Advanced if self.state.stack_depth() > target_depth => continue,
                other => return Ok(other),
            }
        }
    }

    pub fn step_out_backward(&mut self) -> EngineResult<StepOutcome> {
        let target_depth = self.state.stack_depth() + 1;
        loop {
            match self.step_backward()? {
                StepOutcome::Advanced if self.state.stack_depth() < target_depth => continue,
                other => return Ok(other),
            }
        }
    }

    // -- Run loops ------------------------------------------------------------

    #[instrument(skip(self))]
    pub fn run_simulation(&mut self) -> EngineResult<StepOutcome> {
        self.state.paused = false;
        loop {
            if self.state.paused {
                return Ok(StepOutcome::Paused);
            }
            if let Some(id) = self.state.current_instruction {
                if self.state.breakpoints.contains(&id) {
                    self.state.last_met_breakpoint = Some(id);
                    self.state.paused = true;
                    return Ok(StepOutcome::Paused);
                }
            }
            match self.step_forward()? {
                StepOutcome::Finished => return Ok(StepOutcome::Finished),
                StepOutcome::Advanced => {
                    if self.state.last_failed_assertion.is_some() {
                        self.state.paused = true;
                        return Ok(StepOutcome::Paused);
                    }
                }
                StepOutcome::Paused => return Ok(StepOutcome::Paused),
            }
        }
    }

    pub fn run_simulation_backward(&mut self) -> EngineResult<StepOutcome> {
        self.state.paused = false;
        loop {
            if self.state.paused {
                return Ok(StepOutcome::Paused);
            }
            match self.step_backward() {
                Ok(StepOutcome::Advanced) => {
                    if let Some(id) = self.state.current_instruction {
                        if self.state.breakpoints.contains(&id) {
                            self.state.last_met_breakpoint = Some(id);
                            self.state.paused = true;
                            return Ok(StepOutcome::Paused);
                        }
                    }
                }
                Ok(other) => return Ok(other),
                Err(EngineError::NoPreviousInstruction) => return Ok(StepOutcome::Finished),
                Err(e) => return Err(e),
            }
        }
    }

    pub fn run_all(&mut self) -> EngineResult<StepOutcome> {
        self.state.breakpoints.clear();
        self.run_simulation()
    }

    pub fn pause_simulation(&mut self) {
        self.state.paused = true;
    }

    pub fn set_breakpoint(&mut self, instruction: InstructionId) {
        self.state.breakpoints.insert(instruction);
    }

    pub fn clear_breakpoints(&mut self) {
        self.state.breakpoints.clear();
    }

    pub fn is_finished(&self) -> bool {
        self.state.current_instruction.is_none() && self.state.ready
    }

    pub fn did_assertion_fail(&self) -> Option<InstructionId> {
        self.state.last_failed_assertion
    }

    pub fn was_breakpoint_hit(&self) -> Option<InstructionId> {
        self.state.last_met_breakpoint
    }

    pub fn get_stack_depth(&self) -> usize {
        self.state.stack_depth() + 1
    }

    pub fn get_stack_trace(&self) -> Vec<InstructionId> {
        let mut trace = Vec::with_capacity(self.state.call_stack.len() + 1);
        if let Some(current) = self.state.current_instruction {
            trace.push(current);
        }
        trace.extend(self.state.call_stack.iter().rev());
        trace
    }

    // -- State inspection (spec §4.F) ---------------------------------------

    pub fn get_amplitude_index(&self, index: usize) -> EngineResult<Complex64> {
        let state = self.current_state.ok_or(EngineError::NotReady)?;
        Ok(self.package.amplitude(state, index)?)
    }

    pub fn get_amplitude_bitstring(&self, bitstring: &str) -> EngineResult<Complex64> {
        let index = usize::from_str_radix(bitstring, 2)
            .map_err(|_| EngineError::InvalidBitstring(bitstring.to_string()))?;
        self.get_amplitude_index(index)
    }

    pub fn get_state_vector_full(&self) -> EngineResult<Vec<Complex64>> {
        let state = self.current_state.ok_or(EngineError::NotReady)?;
        Ok(self.package.full_statevector(state)?)
    }

    /// Extract the pure sub-statevector over `qubits`, if the rest of the
    /// system happens to be unentangled from them (spec §4.F,
    /// `getStateVectorSub`): the reduced density matrix's top eigenvalue
    /// must be (numerically) 1.
    pub fn get_state_vector_sub(&self, qubits: &[QubitId]) -> EngineResult<Vec<Complex64>> {
        let full = self.get_state_vector_full()?;
        let indices: Vec<usize> = qubits.iter().map(|q| q.index()).collect();
        let rho = density::reduced_density_matrix(&full, self.num_qubits as usize, &indices);

        if (density::purity(&rho) - 1.0).abs() > 1e-8 {
            return Err(EngineError::NoPureSubstate);
        }

        let (values, vectors) = density::hermitian_eigen(&rho);
        let (best_idx, &best_val) = values
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .ok_or(EngineError::NoPureSubstate)?;
        if (best_val - 1.0).abs() > 1e-6 {
            return Err(EngineError::NoPureSubstate);
        }
        Ok(vectors[best_idx].iter().copied().collect())
    }

    pub fn get_instruction_position(&self, id: InstructionId) -> EngineResult<(usize, usize)> {
        let inst = self.instruction(id)?;
        Ok((inst.source_start, inst.source_end))
    }

    pub fn get_classical_variable_name(&self, index: usize) -> EngineResult<String> {
        self.program()?
            .classical_vars
            .name_at(index)
            .map(str::to_string)
            .ok_or(EngineError::UnknownClassicalVariable(index.to_string()))
    }

    pub fn get_classical_variables(&self) -> EngineResult<Vec<ClassicalVariable>> {
        let program = self.program()?;
        Ok((0..program.classical_vars.len())
            .filter_map(|i| program.classical_vars.variable_at(i))
            .collect())
    }

    pub fn diagnostics(&self) -> &RuntimeDiagnostics {
        &self.diagnostics
    }

    /// Plausible explanations for the most recently failed assertion,
    /// combining the runtime zero-control observations with a static
    /// interaction scan (spec §4.H, `potentialErrorCauses`).
    pub fn potential_error_causes(&self, count: usize) -> EngineResult<Vec<chronoq_diag::ErrorCause>> {
        let failed = self
            .state
            .last_failed_assertion
            .ok_or(EngineError::NoFailedAssertion)?;
        let assertion = self
            .instruction(failed)?
            .assertion()
            .ok_or(EngineError::NoFailedAssertion)?;
        let program = self.program()?;
        Ok(chronoq_diag::potential_error_causes(
            &program.instructions,
            self.diagnostics.zero_controls_map(),
            self.diagnostics.non_zero_controls_map(),
            failed,
            assertion,
            count,
        )?)
    }

    pub fn program_ref(&self) -> EngineResult<&PreprocessedProgram> {
        self.program()
    }

    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    fn check_assertion(&self, assertion: &Assertion) -> EngineResult<bool> {
        crate::checker::check(self, assertion)
    }
}

fn first_instruction(instructions: &[Instruction]) -> Option<InstructionId> {
    (!instructions.is_empty()).then_some(0)
}

fn sample_outcome(p0: f64, p1: f64) -> bool {
    let total = (p0 + p1).max(1e-12);
    let draw: f64 = rand::thread_rng().gen_range(0.0..total);
    draw >= p0
}
