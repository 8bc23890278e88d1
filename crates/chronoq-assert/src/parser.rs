//! Parses a single `assert-*` statement into a [`chronoq_ir::Assertion`].

use num_complex::Complex64;
use rustc_hash::FxHashSet;

use chronoq_ir::{Assertion, RegisterRef, RegisterTable, StatevectorLiteral};

use crate::error::{ParseResult, ParsingError};
use crate::lexer::{tokenize, Token};

/// Parse one assertion statement.
///
/// `stmt` is the statement text up to (not including) any trailing `{…}`
/// block reference; `block_body` is the raw text of that block, if the
/// preprocessor swept one out for this statement (required for
/// `assert-eq`, ignored otherwise).
pub fn parse_assertion(
    stmt: &str,
    line: usize,
    block_body: Option<&str>,
    registers: &RegisterTable,
    shadowed: &FxHashSet<String>,
) -> ParseResult<Assertion> {
    let tokens: Vec<Token> = tokenize(stmt)
        .into_iter()
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| ParsingError::Malformed {
            line,
            message: "invalid token in assertion statement".to_string(),
        })?;

    let mut iter = tokens.into_iter().peekable();
    let keyword = iter.next().ok_or_else(|| ParsingError::Malformed {
        line,
        message: "empty assertion statement".to_string(),
    })?;

    match keyword {
        Token::AssertEnt => Ok(Assertion::Entanglement {
            targets: parse_target_list(&mut iter, line, registers, shadowed)?,
        }),
        Token::AssertSup => Ok(Assertion::Superposition {
            targets: parse_target_list(&mut iter, line, registers, shadowed)?,
        }),
        Token::AssertSpan => Ok(Assertion::Span {
            targets: parse_target_list(&mut iter, line, registers, shadowed)?,
        }),
        Token::AssertEq => {
            let threshold = match iter.next() {
                Some(Token::FloatLiteral(f)) => f,
                Some(Token::IntLiteral(i)) => i as f64,
                _ => {
                    return Err(ParsingError::Malformed {
                        line,
                        message: "assert-eq requires a similarity threshold".to_string(),
                    })
                }
            };
            if !(0.0..=1.0).contains(&threshold) {
                return Err(ParsingError::ThresholdOutOfRange {
                    line,
                    value: threshold,
                });
            }
            let targets = parse_target_list(&mut iter, line, registers, shadowed)?;
            let body = block_body.ok_or_else(|| ParsingError::Malformed {
                line,
                message: "assert-eq requires a { … } body".to_string(),
            })?;
            match parse_statevector_literal(body) {
                Some(expected) => {
                    let want = 1usize << targets.len();
                    if expected.len() != want {
                        return Err(ParsingError::StatevectorLengthMismatch {
                            line,
                            expected: want,
                            targets: targets.len(),
                            got: expected.len(),
                        });
                    }
                    Ok(Assertion::StatevectorEquality {
                        targets,
                        similarity_threshold: threshold,
                        expected,
                    })
                }
                None => Ok(Assertion::CircuitEquality {
                    targets,
                    similarity_threshold: threshold,
                    circuit_code: body.to_string(),
                }),
            }
        }
        _ => Err(ParsingError::UnknownKeyword {
            line,
            keyword: format!("{keyword:?}"),
        }),
    }
}

fn parse_target_list(
    iter: &mut std::iter::Peekable<std::vec::IntoIter<Token>>,
    line: usize,
    registers: &RegisterTable,
    shadowed: &FxHashSet<String>,
) -> ParseResult<Vec<RegisterRef>> {
    let mut out = Vec::new();
    loop {
        let name = match iter.next() {
            Some(Token::Identifier(name)) => name,
            None if out.is_empty() => {
                return Err(ParsingError::Malformed {
                    line,
                    message: "expected at least one target".to_string(),
                })
            }
            None => break,
            Some(other) => {
                return Err(ParsingError::Malformed {
                    line,
                    message: format!("expected a target identifier, found {other:?}"),
                })
            }
        };
        if name.is_empty() {
            return Err(ParsingError::EmptyTarget { line, target: name });
        }

        let explicit_index = if matches!(iter.peek(), Some(Token::LBracket)) {
            iter.next();
            let idx = match iter.next() {
                Some(Token::IntLiteral(i)) => i as u32,
                _ => {
                    return Err(ParsingError::Malformed {
                        line,
                        message: format!("expected an integer index after '{name}['"),
                    })
                }
            };
            match iter.next() {
                Some(Token::RBracket) => {}
                _ => {
                    return Err(ParsingError::Malformed {
                        line,
                        message: format!("expected ']' after '{name}[{idx}'"),
                    })
                }
            }
            Some(idx)
        } else {
            None
        };

        expand_target(&name, explicit_index, line, registers, shadowed, &mut out)?;

        match iter.peek() {
            Some(Token::Comma) => {
                iter.next();
            }
            _ => break,
        }
    }
    Ok(out)
}

fn expand_target(
    name: &str,
    explicit_index: Option<u32>,
    line: usize,
    registers: &RegisterTable,
    shadowed: &FxHashSet<String>,
    out: &mut Vec<RegisterRef>,
) -> ParseResult<()> {
    if let Some(index) = explicit_index {
        if let Some(reg) = registers.find(name) {
            if index >= reg.size {
                return Err(ParsingError::IndexOutOfBounds {
                    line,
                    register: name.to_string(),
                    index,
                    size: reg.size,
                });
            }
            out.push(RegisterRef::new(name, index));
            return Ok(());
        }
        if shadowed.contains(name) {
            // A formal parameter names exactly one qubit; it cannot be
            // subscripted.
            return Err(ParsingError::Malformed {
                line,
                message: format!("'{name}' is a gate parameter and cannot be indexed"),
            });
        }
        return Err(ParsingError::UnknownRegister {
            line,
            register: name.to_string(),
        });
    }

    if shadowed.contains(name) {
        out.push(RegisterRef::new(name, 0));
        return Ok(());
    }

    match registers.find(name) {
        Some(reg) => {
            for idx in 0..reg.size {
                out.push(RegisterRef::new(name, idx));
            }
            Ok(())
        }
        None => Err(ParsingError::UnknownRegister {
            line,
            register: name.to_string(),
        }),
    }
}

/// Try to parse `body` as a brace-free comma list of complex literals.
/// Returns `None` if any element fails to parse as a number, signalling to
/// the caller that `body` is sub-circuit source instead.
fn parse_statevector_literal(body: &str) -> Option<StatevectorLiteral> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    let mut amplitudes = Vec::new();
    for term in trimmed.split(',') {
        amplitudes.push(parse_complex_term(term)?);
    }
    Some(StatevectorLiteral(amplitudes))
}

/// Parse a single complex literal term: `1.0`, `-0.5`, `0.7071+0.7071i`,
/// `-0.5i`, `i`, `-i`.
fn parse_complex_term(raw: &str) -> Option<Complex64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    let has_i = s.ends_with(['i', 'I']);
    let body = if has_i { &s[..s.len() - 1] } else { s };

    if !has_i {
        return body.parse::<f64>().ok().map(|r| Complex64::new(r, 0.0));
    }
    if body.is_empty() {
        return Some(Complex64::new(0.0, 1.0));
    }
    if body == "-" {
        return Some(Complex64::new(0.0, -1.0));
    }
    if body == "+" {
        return Some(Complex64::new(0.0, 1.0));
    }

    let bytes = body.as_bytes();
    let split = (1..bytes.len()).rev().find(|&i| {
        (bytes[i] == b'+' || bytes[i] == b'-') && bytes[i - 1] != b'e' && bytes[i - 1] != b'E'
    });

    match split {
        Some(i) => {
            let real: f64 = body[..i].parse().ok()?;
            let imag_str = &body[i..];
            let imag: f64 = match imag_str {
                "+" => 1.0,
                "-" => -1.0,
                other => other.parse().ok()?,
            };
            Some(Complex64::new(real, imag))
        }
        None => body.parse::<f64>().ok().map(|im| Complex64::new(0.0, im)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronoq_ir::RegisterKind;

    fn registers() -> RegisterTable {
        let mut r = RegisterTable::new();
        r.declare(RegisterKind::Quantum, "q", 2);
        r
    }

    #[test]
    fn parses_entanglement() {
        let a = parse_assertion(
            "assert-ent q[0], q[1]",
            1,
            None,
            &registers(),
            &FxHashSet::default(),
        )
        .unwrap();
        assert_eq!(
            a,
            Assertion::Entanglement {
                targets: vec![RegisterRef::new("q", 0), RegisterRef::new("q", 1)]
            }
        );
    }

    #[test]
    fn whole_register_expands() {
        let a = parse_assertion("assert-sup q", 1, None, &registers(), &FxHashSet::default())
            .unwrap();
        assert_eq!(a.targets().len(), 2);
    }

    #[test]
    fn out_of_range_threshold_rejected() {
        let err = parse_assertion(
            "assert-eq 1.5 q[0]",
            3,
            Some("1.0, 0.0"),
            &registers(),
            &FxHashSet::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ParsingError::ThresholdOutOfRange { .. }));
    }

    #[test]
    fn statevector_literal_parsed() {
        let a = parse_assertion(
            "assert-eq 0.9 q[0], q[1]",
            1,
            Some("0.7071+0i, 0, 0, 0.7071+0i"),
            &registers(),
            &FxHashSet::default(),
        )
        .unwrap();
        match a {
            Assertion::StatevectorEquality { expected, .. } => assert_eq!(expected.len(), 4),
            _ => panic!("expected statevector equality"),
        }
    }

    #[test]
    fn circuit_body_kept_verbatim() {
        let a = parse_assertion(
            "assert-eq 0.9 q[0], q[1]",
            1,
            Some("h q[0]; cx q[0], q[1];"),
            &registers(),
            &FxHashSet::default(),
        )
        .unwrap();
        assert!(matches!(a, Assertion::CircuitEquality { .. }));
    }

    #[test]
    fn shadowed_formal_parameter_is_not_expanded() {
        let mut shadowed = FxHashSet::default();
        shadowed.insert("a".to_string());
        let a = parse_assertion("assert-sup a", 1, None, &registers(), &shadowed).unwrap();
        assert_eq!(a.targets(), &[RegisterRef::new("a", 0)]);
    }
}
