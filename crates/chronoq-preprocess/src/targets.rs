//! Shared target-list parsing: `q[0], q[1]` or a bare register name that
//! expands against its declared size (spec §4.A, applied uniformly to every
//! statement kind that names qubits or classical bits).

use rustc_hash::FxHashSet;

use chronoq_ir::{RegisterRef, RegisterTable};

use crate::error::{PreprocessError, PreprocessResult};

pub fn parse_targets(
    text: &str,
    line: usize,
    registers: &RegisterTable,
    shadowed: &FxHashSet<String>,
) -> PreprocessResult<Vec<RegisterRef>> {
    let mut out = Vec::new();
    for raw in text.split(',') {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        let (name, index) = match raw.find('[') {
            Some(open) => {
                let close = raw.rfind(']').ok_or_else(|| PreprocessError::Malformed {
                    line,
                    message: format!("missing ']' in target '{raw}'"),
                })?;
                let name = raw[..open].trim();
                let idx_str = raw[open + 1..close].trim();
                let idx: u32 = idx_str.parse().map_err(|_| PreprocessError::Malformed {
                    line,
                    message: format!("invalid index '{idx_str}' in target '{raw}'"),
                })?;
                (name, Some(idx))
            }
            None => (raw, None),
        };

        match index {
            Some(idx) => {
                let reg = registers
                    .find(name)
                    .ok_or_else(|| PreprocessError::UnknownRegister {
                        line,
                        register: name.to_string(),
                    })?;
                if idx >= reg.size {
                    return Err(PreprocessError::IndexOutOfBounds {
                        line,
                        register: name.to_string(),
                        index: idx,
                        size: reg.size,
                    });
                }
                out.push(RegisterRef::new(name, idx));
            }
            None if shadowed.contains(name) => out.push(RegisterRef::new(name, 0)),
            None => match registers.find(name) {
                Some(reg) => {
                    for idx in 0..reg.size {
                        out.push(RegisterRef::new(name, idx));
                    }
                }
                None => {
                    return Err(PreprocessError::UnknownRegister {
                        line,
                        register: name.to_string(),
                    })
                }
            },
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronoq_ir::RegisterKind;

    #[test]
    fn expands_whole_register() {
        let mut regs = RegisterTable::new();
        regs.declare(RegisterKind::Quantum, "q", 3);
        let targets = parse_targets("q", 1, &regs, &FxHashSet::default()).unwrap();
        assert_eq!(targets.len(), 3);
    }

    #[test]
    fn rejects_out_of_range_index() {
        let mut regs = RegisterTable::new();
        regs.declare(RegisterKind::Quantum, "q", 2);
        let err = parse_targets("q[5]", 1, &regs, &FxHashSet::default()).unwrap_err();
        assert!(matches!(err, PreprocessError::IndexOutOfBounds { .. }));
    }
}
