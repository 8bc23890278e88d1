//! The recursive statement builder: turns block-swept, `;`-split statement
//! text into the flat [`chronoq_ir::Instruction`] array plus side tables
//! (spec §4.B).

use rustc_hash::{FxHashMap, FxHashSet};

use chronoq_assert::parse_assertion;
use chronoq_ir::{
    ClassicalCondition, ClassicalVariables, Instruction, InstructionId, InstructionKind,
    RegisterKind, RegisterRef, RegisterTable, SimOp, StandardGate, Successor,
};

use crate::blocks::{block_token_index, sweep_blocks, SweptBlock};
use crate::comments::strip_comments;
use crate::error::{PreprocessError, PreprocessResult};
use crate::statement::{line_at, split_statements, RawStatement};
use crate::targets::parse_targets;

/// A user-defined gate, recorded once its header and body have been built.
#[derive(Debug, Clone)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<String>,
    pub header_id: InstructionId,
    pub entry_id: InstructionId,
    pub return_id: InstructionId,
}

/// Everything the preprocessor hands to the rest of the workspace.
pub struct PreprocessedProgram {
    pub instructions: Vec<Instruction>,
    pub registers: RegisterTable,
    pub classical_vars: ClassicalVariables,
    pub functions: FxHashMap<String, FunctionDef>,
    /// Executable source with assertions and RETURNs omitted, handed to the
    /// (out-of-scope) OpenQASM front-end.
    pub clean_source: String,
}

type DepMap = FxHashMap<String, (InstructionId, usize)>;

struct Builder {
    source: String,
    instructions: Vec<Instruction>,
    registers: RegisterTable,
    classical_vars: ClassicalVariables,
    functions: FxHashMap<String, FunctionDef>,
    clean_source: String,
}

pub fn preprocess(source: &str) -> PreprocessResult<PreprocessedProgram> {
    let stripped = strip_comments(source);
    let mut blocks: Vec<SweptBlock> = Vec::new();
    let rewritten = sweep_blocks(&stripped, 0, &mut blocks);

    let mut builder = Builder::new(stripped);
    builder.process_scope(&rewritten, 0, &FxHashSet::default(), false, &mut blocks)?;
    builder.finalize_successors();

    Ok(PreprocessedProgram {
        instructions: builder.instructions,
        registers: builder.registers,
        classical_vars: builder.classical_vars,
        functions: builder.functions,
        clean_source: builder.clean_source,
    })
}

impl Builder {
    fn new(source: String) -> Self {
        Self {
            source,
            instructions: Vec::new(),
            registers: RegisterTable::new(),
            classical_vars: ClassicalVariables::new(),
            functions: FxHashMap::default(),
            clean_source: String::new(),
        }
    }

    fn line(&self, offset: usize) -> usize {
        line_at(&self.source, offset)
    }

    fn alloc(&mut self, kind: InstructionKind, start: usize, end: usize) -> InstructionId {
        let id = self.instructions.len();
        self.instructions.push(Instruction::new(id, kind, start, end));
        id
    }

    /// Every instruction defaults to falling through to the next allocated
    /// id. `RETURN` (`Pop`) and `CALL` (jump to callee entry) are set
    /// explicitly at creation time and are left alone here.
    fn finalize_successors(&mut self) {
        let len = self.instructions.len();
        for i in 0..len {
            if matches!(self.instructions[i].kind, InstructionKind::Return) {
                continue;
            }
            if self.instructions[i].is_function_call {
                continue;
            }
            self.instructions[i].successor = if i + 1 < len {
                Successor::Next(i + 1)
            } else {
                Successor::End
            };
        }
    }

    fn process_scope(
        &mut self,
        text: &str,
        base_offset: usize,
        shadowed: &FxHashSet<String>,
        in_function_definition: bool,
        blocks: &mut Vec<SweptBlock>,
    ) -> PreprocessResult<Vec<InstructionId>> {
        let statements = split_statements(text, base_offset);
        let mut dep_map: DepMap = FxHashMap::default();
        let mut emitted = Vec::new();
        for stmt in &statements {
            if let Some(id) = self.process_statement(
                stmt,
                shadowed,
                in_function_definition,
                blocks,
                &mut dep_map,
            )? {
                emitted.push(id);
            }
        }
        Ok(emitted)
    }

    fn process_statement(
        &mut self,
        stmt: &RawStatement,
        shadowed: &FxHashSet<String>,
        in_function_definition: bool,
        blocks: &mut Vec<SweptBlock>,
        dep_map: &mut DepMap,
    ) -> PreprocessResult<Option<InstructionId>> {
        let line = self.line(stmt.start);
        let text = stmt.text.trim();

        if let Some(rest) = strip_keyword(text, "qreg") {
            let (name, size) = parse_register_header(rest, line)?;
            if self.registers.contains(&name) {
                return Err(PreprocessError::DuplicateRegister { line, register: name });
            }
            self.registers.declare(RegisterKind::Quantum, &name, size);
            self.clean_source.push_str(&format!("qreg {name}[{size}];\n"));
            return Ok(None);
        }

        if let Some(rest) = strip_keyword(text, "creg") {
            let (name, size) = parse_register_header(rest, line)?;
            if self.registers.contains(&name) {
                return Err(PreprocessError::DuplicateRegister { line, register: name });
            }
            self.registers.declare(RegisterKind::Classical, &name, size);
            for i in 0..size {
                self.classical_vars.declare(format!("{name}[{i}]"));
            }
            self.clean_source.push_str(&format!("creg {name}[{size}];\n"));
            return Ok(None);
        }

        if let Some(rest) = strip_keyword(text, "gate") {
            return self
                .process_gate_definition(rest, stmt, shadowed, blocks, line)
                .map(Some);
        }

        if text.starts_with("assert-") {
            return self
                .process_assertion(text, stmt, shadowed, blocks, line, dep_map)
                .map(Some);
        }

        if let Some(rest) = strip_keyword(text, "measure") {
            return self.process_measure(rest, stmt, shadowed, line, dep_map).map(Some);
        }

        if let Some(rest) = strip_keyword(text, "reset") {
            return self.process_reset(rest, stmt, shadowed, line, dep_map).map(Some);
        }

        if let Some(rest) = strip_keyword(text, "barrier") {
            return self.process_barrier(rest, stmt, shadowed, line, dep_map).map(Some);
        }

        if let Some(rest) = strip_keyword(text, "if") {
            return self
                .process_classic_controlled(
                    rest,
                    stmt,
                    shadowed,
                    in_function_definition,
                    line,
                    dep_map,
                )
                .map(Some);
        }

        self.process_gate_or_call(text, stmt, shadowed, in_function_definition, line, dep_map, None)
            .map(Some)
    }

    fn process_gate_definition(
        &mut self,
        rest: &str,
        stmt: &RawStatement,
        shadowed: &FxHashSet<String>,
        blocks: &mut Vec<SweptBlock>,
        line: usize,
    ) -> PreprocessResult<InstructionId> {
        let rest = rest.trim();
        let block_pos = rest.find("$__block").ok_or_else(|| PreprocessError::Malformed {
            line,
            message: "gate definition is missing a { … } body".to_string(),
        })?;
        let header = rest[..block_pos].trim();
        let token = rest[block_pos..].trim();
        let block_index = block_token_index(token).ok_or_else(|| PreprocessError::Malformed {
            line,
            message: format!("invalid block token '{token}'"),
        })?;

        let (name, params) = parse_name_and_parens(header, line)?;
        if self.functions.contains_key(&name) {
            return Err(PreprocessError::DuplicateGateDefinition { line, gate: name });
        }

        let header_id = self.alloc(InstructionKind::Nop, stmt.start, stmt.end);
        self.instructions[header_id].is_function_definition = true;
        self.instructions[header_id].in_function_definition = false;

        let swept = blocks[block_index].clone();
        let body_shadowed: FxHashSet<String> = params.iter().cloned().collect();
        let rewritten_body = sweep_blocks(&swept.body, swept.abs_start, blocks);
        let body_ids =
            self.process_scope(&rewritten_body, swept.abs_start, &body_shadowed, true, blocks)?;

        let return_pos = swept.abs_start + swept.body.chars().count();
        let return_id = self.alloc(InstructionKind::Return, return_pos, return_pos);
        self.instructions[return_id].in_function_definition = true;
        self.instructions[return_id].successor = Successor::Pop;

        let entry_id = body_ids.first().copied().unwrap_or(return_id);
        self.instructions[header_id].block = Some(body_ids);

        self.functions.insert(
            name.clone(),
            FunctionDef {
                name,
                params,
                header_id,
                entry_id,
                return_id,
            },
        );
        Ok(header_id)
    }

    fn process_classic_controlled(
        &mut self,
        rest: &str,
        stmt: &RawStatement,
        shadowed: &FxHashSet<String>,
        in_function_definition: bool,
        line: usize,
        dep_map: &mut DepMap,
    ) -> PreprocessResult<InstructionId> {
        let rest = rest.trim();
        if !rest.starts_with('(') {
            return Err(PreprocessError::Malformed {
                line,
                message: "expected '(' after 'if'".to_string(),
            });
        }
        let close = rest.find(')').ok_or_else(|| PreprocessError::Malformed {
            line,
            message: "missing ')' in if-condition".to_string(),
        })?;
        let condition_text = &rest[1..close];
        let (register, value) =
            condition_text
                .split_once("==")
                .ok_or_else(|| PreprocessError::Malformed {
                    line,
                    message: format!("malformed condition '{condition_text}'"),
                })?;
        let register = register.trim().to_string();
        if !self.registers.contains(&register) {
            return Err(PreprocessError::UnknownRegister { line, register });
        }
        let value: u64 = value.trim().parse().map_err(|_| PreprocessError::Malformed {
            line,
            message: format!("invalid condition value '{value}'"),
        })?;

        let gate_text = rest[close + 1..].trim();
        self.process_gate_or_call(
            gate_text,
            stmt,
            shadowed,
            in_function_definition,
            line,
            dep_map,
            Some(ClassicalCondition { register, value }),
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn process_gate_or_call(
        &mut self,
        text: &str,
        stmt: &RawStatement,
        shadowed: &FxHashSet<String>,
        in_function_definition: bool,
        line: usize,
        dep_map: &mut DepMap,
        condition: Option<ClassicalCondition>,
    ) -> PreprocessResult<InstructionId> {
        let (name_part, targets_text) = split_name_and_targets(text, line)?;
        let targets = parse_targets(&targets_text, line, &self.registers, shadowed)?;
        let (name, params) = parse_name_and_parens(&name_part, line)?;

        if let Some(func) = self.functions.get(&name).cloned() {
            if func.params.len() != targets.len() {
                return Err(PreprocessError::ArityMismatch {
                    line,
                    gate: name,
                    expected: func.params.len(),
                    got: targets.len(),
                });
            }
            let mut substitution = FxHashMap::default();
            for (formal, actual) in func.params.iter().zip(targets.iter()) {
                substitution.insert(formal.clone(), actual.to_string());
            }
            let id = self.alloc(InstructionKind::Call, stmt.start, stmt.end);
            {
                let inst = &mut self.instructions[id];
                inst.targets = targets.clone();
                inst.in_function_definition = in_function_definition;
                inst.is_function_call = true;
                inst.called_function = Some(func.name.clone());
                inst.call_substitution = substitution;
                inst.successor = Successor::Next(func.entry_id);
            }
            self.record_dependencies(id, &targets, dep_map);
            self.clean_source
                .push_str(&format!("{} {};\n", func.name, format_targets(&targets)));
            return Ok(id);
        }

        let gate = StandardGate::from_name(&name, &params).ok_or_else(|| {
            PreprocessError::UnknownGate {
                line,
                name: name.clone(),
            }
        })?;
        if gate.num_qubits() as usize != targets.len() {
            return Err(PreprocessError::ArityMismatch {
                line,
                gate: name.clone(),
                expected: gate.num_qubits() as usize,
                got: targets.len(),
            });
        }

        let kind = InstructionKind::Simulate(SimOp::Gate {
            gate,
            condition: condition.clone(),
        });
        let id = self.alloc(kind, stmt.start, stmt.end);
        self.instructions[id].targets = targets.clone();
        self.instructions[id].in_function_definition = in_function_definition;
        self.record_dependencies(id, &targets, dep_map);

        match &condition {
            None => self
                .clean_source
                .push_str(&format!("{} {};\n", name, format_targets(&targets))),
            Some(c) => self.clean_source.push_str(&format!(
                "if ({}=={}) {} {};\n",
                c.register,
                c.value,
                name,
                format_targets(&targets)
            )),
        }
        Ok(id)
    }

    fn process_measure(
        &mut self,
        rest: &str,
        stmt: &RawStatement,
        shadowed: &FxHashSet<String>,
        line: usize,
        dep_map: &mut DepMap,
    ) -> PreprocessResult<InstructionId> {
        let (qubit_part, clbit_part) =
            rest.split_once("->")
                .ok_or_else(|| PreprocessError::Malformed {
                    line,
                    message: "measure requires '-> c[i]'".to_string(),
                })?;
        let targets = parse_targets(qubit_part.trim(), line, &self.registers, shadowed)?;
        if targets.len() != 1 {
            return Err(PreprocessError::Malformed {
                line,
                message: "measure expects exactly one qubit target".to_string(),
            });
        }
        let clbit = parse_single_clbit(clbit_part.trim(), line, &self.registers)?;
        self.classical_vars.declare(clbit.clone());

        let id = self.alloc(
            InstructionKind::Simulate(SimOp::Measure { clbit: clbit.clone() }),
            stmt.start,
            stmt.end,
        );
        self.instructions[id].targets = targets.clone();
        self.record_dependencies(id, &targets, dep_map);
        self.clean_source
            .push_str(&format!("measure {} -> {};\n", format_targets(&targets), clbit));
        Ok(id)
    }

    fn process_reset(
        &mut self,
        rest: &str,
        stmt: &RawStatement,
        shadowed: &FxHashSet<String>,
        line: usize,
        dep_map: &mut DepMap,
    ) -> PreprocessResult<InstructionId> {
        let targets = parse_targets(rest.trim(), line, &self.registers, shadowed)?;
        let id = self.alloc(InstructionKind::Simulate(SimOp::Reset), stmt.start, stmt.end);
        self.instructions[id].targets = targets.clone();
        self.record_dependencies(id, &targets, dep_map);
        self.clean_source
            .push_str(&format!("reset {};\n", format_targets(&targets)));
        Ok(id)
    }

    fn process_barrier(
        &mut self,
        rest: &str,
        stmt: &RawStatement,
        shadowed: &FxHashSet<String>,
        line: usize,
        dep_map: &mut DepMap,
    ) -> PreprocessResult<InstructionId> {
        let trimmed = rest.trim();
        let targets = if trimmed.is_empty() {
            Vec::new()
        } else {
            parse_targets(trimmed, line, &self.registers, shadowed)?
        };
        let id = self.alloc(InstructionKind::Simulate(SimOp::Barrier), stmt.start, stmt.end);
        self.instructions[id].targets = targets.clone();
        self.record_dependencies(id, &targets, dep_map);
        self.clean_source.push_str("barrier;\n");
        Ok(id)
    }

    fn process_assertion(
        &mut self,
        text: &str,
        stmt: &RawStatement,
        shadowed: &FxHashSet<String>,
        blocks: &mut Vec<SweptBlock>,
        line: usize,
        dep_map: &mut DepMap,
    ) -> PreprocessResult<InstructionId> {
        let (stmt_head, block_body) = match text.find("$__block") {
            Some(pos) => {
                let token = text[pos..].trim();
                let idx = block_token_index(token).ok_or_else(|| PreprocessError::Malformed {
                    line,
                    message: format!("invalid block token '{token}'"),
                })?;
                (text[..pos].trim(), Some(blocks[idx].body.clone()))
            }
            None => (text, None),
        };

        let assertion =
            parse_assertion(stmt_head, line, block_body.as_deref(), &self.registers, shadowed)?;
        let targets = assertion.targets().to_vec();
        let id = self.alloc(InstructionKind::Assertion(assertion), stmt.start, stmt.end);
        self.instructions[id].targets = targets.clone();
        self.record_dependencies(id, &targets, dep_map);
        Ok(id)
    }

    fn record_dependencies(&mut self, id: InstructionId, targets: &[RegisterRef], dep_map: &mut DepMap) {
        let mut deps = Vec::new();
        for (index, target) in targets.iter().enumerate() {
            let key = target.to_string();
            if let Some(&prior) = dep_map.get(&key) {
                deps.push(prior);
            }
            dep_map.insert(key, (id, index));
        }
        self.instructions[id].data_dependencies = deps;
    }
}

fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    if text == keyword {
        return Some("");
    }
    text.strip_prefix(keyword)
        .filter(|rest| rest.starts_with(char::is_whitespace))
}

fn parse_register_header(rest: &str, line: usize) -> PreprocessResult<(String, u32)> {
    let rest = rest.trim();
    let open = rest.find('[').ok_or_else(|| PreprocessError::Malformed {
        line,
        message: format!("register declaration '{rest}' is missing '['"),
    })?;
    let close = rest.rfind(']').ok_or_else(|| PreprocessError::Malformed {
        line,
        message: format!("register declaration '{rest}' is missing ']'"),
    })?;
    let name = rest[..open].trim().to_string();
    let size: u32 = rest[open + 1..close]
        .trim()
        .parse()
        .map_err(|_| PreprocessError::Malformed {
            line,
            message: format!("invalid register size in '{rest}'"),
        })?;
    Ok((name, size))
}

fn parse_single_clbit(text: &str, line: usize, registers: &RegisterTable) -> PreprocessResult<String> {
    let open = text.find('[').ok_or_else(|| PreprocessError::Malformed {
        line,
        message: format!("expected 'name[index]', got '{text}'"),
    })?;
    let close = text.rfind(']').ok_or_else(|| PreprocessError::Malformed {
        line,
        message: format!("expected 'name[index]', got '{text}'"),
    })?;
    let name = text[..open].trim();
    let index: u32 = text[open + 1..close]
        .trim()
        .parse()
        .map_err(|_| PreprocessError::Malformed {
            line,
            message: format!("invalid classical index in '{text}'"),
        })?;
    let reg = registers
        .find(name)
        .ok_or_else(|| PreprocessError::UnknownRegister {
            line,
            register: name.to_string(),
        })?;
    if reg.kind != RegisterKind::Classical {
        return Err(PreprocessError::Malformed {
            line,
            message: format!("'{name}' is not a classical register"),
        });
    }
    if index >= reg.size {
        return Err(PreprocessError::IndexOutOfBounds {
            line,
            register: name.to_string(),
            index,
            size: reg.size,
        });
    }
    Ok(format!("{name}[{index}]"))
}

fn parse_name_and_parens(text: &str, line: usize) -> PreprocessResult<(String, Vec<f64>)> {
    let text = text.trim();
    match text.find('(') {
        Some(open) => {
            let close = text.rfind(')').ok_or_else(|| PreprocessError::Malformed {
                line,
                message: format!("missing ')' in '{text}'"),
            })?;
            let name = text[..open].trim().to_string();
            let params_str = text[open + 1..close].trim();
            if params_str.is_empty() {
                Ok((name, Vec::new()))
            } else {
                let params = params_str
                    .split(',')
                    .map(|p| {
                        p.trim().parse::<f64>().map_err(|_| PreprocessError::Malformed {
                            line,
                            message: format!("invalid numeric parameter '{p}'"),
                        })
                    })
                    .collect::<PreprocessResult<Vec<_>>>()?;
                Ok((name, params))
            }
        }
        None => Ok((text.to_string(), Vec::new())),
    }
}

fn split_name_and_targets(text: &str, line: usize) -> PreprocessResult<(String, String)> {
    let chars: Vec<char> = text.chars().collect();
    let mut depth = 0i32;
    for (i, &c) in chars.iter().enumerate() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            c if c.is_whitespace() && depth == 0 => {
                let name_part: String = chars[..i].iter().collect();
                let targets: String = chars[i + 1..].iter().collect();
                return Ok((name_part.trim().to_string(), targets.trim().to_string()));
            }
            _ => {}
        }
    }
    Err(PreprocessError::Malformed {
        line,
        message: format!("statement '{text}' has no target list"),
    })
}

fn format_targets(targets: &[RegisterRef]) -> String {
    targets
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_declarations_consume_no_instruction_id() {
        let program = preprocess("qreg q[2]; h q[0];").unwrap();
        assert_eq!(program.instructions.len(), 1);
        assert_eq!(program.registers.num_qubits(), 2);
    }

    #[test]
    fn bell_pair_wires_sequential_successors() {
        let program =
            preprocess("qreg q[2]; h q[0]; cx q[0],q[1]; assert-ent q[0],q[1];").unwrap();
        assert_eq!(program.instructions.len(), 3);
        assert_eq!(program.instructions[0].successor, Successor::Next(1));
        assert_eq!(program.instructions[1].successor, Successor::Next(2));
        assert_eq!(program.instructions[2].successor, Successor::End);
        assert!(program.instructions[2].kind.is_assertion());
    }

    #[test]
    fn gate_call_jumps_into_callee_and_returns_via_pop() {
        let src = "qreg q[2]; gate bell(a,b) { h a; cx a,b; } bell q[0], q[1];";
        let program = preprocess(src).unwrap();
        // header, h, cx, return, call
        assert_eq!(program.instructions.len(), 5);
        let header = &program.instructions[0];
        assert!(header.is_function_definition);
        let ret = &program.instructions[3];
        assert!(ret.kind.is_return());
        assert_eq!(ret.successor, Successor::Pop);
        let call = &program.instructions[4];
        assert!(call.is_function_call);
        assert_eq!(call.successor, Successor::Next(1));
        assert_eq!(
            call.call_substitution.get("a").map(String::as_str),
            Some("q[0]")
        );
    }

    #[test]
    fn arity_mismatch_on_call_is_rejected() {
        let src = "qreg q[2]; gate bell(a,b) { h a; cx a,b; } bell q[0];";
        let err = preprocess(src).unwrap_err();
        assert!(matches!(err, PreprocessError::ArityMismatch { .. }));
    }

    #[test]
    fn classic_controlled_gate_carries_condition() {
        let src = "qreg q[1]; creg c[1]; if (c==1) x q[0];";
        let program = preprocess(src).unwrap();
        let inst = &program.instructions[0];
        match inst.sim_op() {
            Some(SimOp::Gate { condition: Some(c), .. }) => {
                assert_eq!(c.register, "c");
                assert_eq!(c.value, 1);
            }
            other => panic!("expected a conditioned gate, got {other:?}"),
        }
    }

    #[test]
    fn data_dependency_points_at_last_writer() {
        let src = "qreg q[1]; h q[0]; x q[0];";
        let program = preprocess(src).unwrap();
        assert!(program.instructions[0].data_dependencies.is_empty());
        assert_eq!(program.instructions[1].data_dependencies, vec![(0, 0)]);
    }

    #[test]
    fn clean_source_omits_assertions() {
        let src = "qreg q[1]; h q[0]; assert-sup q[0];";
        let program = preprocess(src).unwrap();
        assert!(!program.clean_source.contains("assert-sup"));
        assert!(program.clean_source.contains('h'));
    }
}
