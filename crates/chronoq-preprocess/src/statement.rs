//! Splits block-swept source into candidate statements on `;` boundaries,
//! keeping absolute byte offsets for breakpoint resolution.

#[derive(Debug, Clone)]
pub struct RawStatement {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// `base_offset` is `text`'s own absolute position in the original source.
pub fn split_statements(text: &str, base_offset: usize) -> Vec<RawStatement> {
    let mut out = Vec::new();
    let mut start: Option<usize> = None;
    for (idx, ch) in text.char_indices() {
        if start.is_none() && !ch.is_whitespace() {
            start = Some(idx);
        }
        if ch == ';' {
            if let Some(s) = start {
                let stmt = text[s..idx].trim_end();
                if !stmt.is_empty() {
                    out.push(RawStatement {
                        text: stmt.to_string(),
                        start: base_offset + s,
                        end: base_offset + idx,
                    });
                }
            }
            start = None;
        }
    }
    out
}

/// Line number (1-based) of `offset` in the original (comment-stripped)
/// source text.
pub fn line_at(source: &str, offset: usize) -> usize {
    source
        .char_indices()
        .take_while(|(i, _)| *i < offset)
        .filter(|(_, c)| *c == '\n')
        .count()
        + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_semicolons_and_trims() {
        let stmts = split_statements(" qreg q[2] ; h q[0] ; ", 0);
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[0].text, "qreg q[2]");
        assert_eq!(stmts[1].text, "h q[0]");
    }

    #[test]
    fn offsets_account_for_base() {
        let stmts = split_statements("h q[0];", 10);
        assert_eq!(stmts[0].start, 10);
        assert_eq!(stmts[0].end, 17);
    }
}
