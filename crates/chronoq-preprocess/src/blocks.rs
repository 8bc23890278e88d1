//! Block sweeping: lift balanced `{ … }` bodies out of the statement stream
//! so that `;` becomes a reliable statement terminator.

/// A swept-out `{ … }` body together with its absolute start offset in the
/// original (comment-stripped) source, so that recursing the preprocessor on
/// the body's own text doesn't lose global source positions.
#[derive(Debug, Clone)]
pub struct SweptBlock {
    pub body: String,
    pub abs_start: usize,
}

/// Rewrites every top-level `{ … }` in `source` into a synthetic
/// `$__blockN$;` token, appending swept-out bodies to `blocks` (a single
/// arena shared across recursive calls, so indices stay valid program-wide).
/// `base_offset` is `source`'s own absolute position in the original text.
/// Nested braces inside a swept body are left untouched — they are re-swept
/// when the caller recurses the preprocessor on that body's own text.
pub fn sweep_blocks(source: &str, base_offset: usize, blocks: &mut Vec<SweptBlock>) -> String {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '{' {
            let start = i + 1;
            let mut depth = 1usize;
            let mut j = start;
            while j < chars.len() && depth > 0 {
                match chars[j] {
                    '{' => depth += 1,
                    '}' => depth -= 1,
                    _ => {}
                }
                j += 1;
            }
            let end = if depth == 0 { j - 1 } else { j };
            let body: String = chars[start..end].iter().collect();
            let index = blocks.len();
            blocks.push(SweptBlock {
                body,
                abs_start: base_offset + start,
            });
            out.push_str(&format!("$__block{index}$;"));
            i = j;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    out
}

/// Recognizes a synthetic block token (`$__blockN$`) and returns its index.
pub fn block_token_index(token: &str) -> Option<usize> {
    let rest = token.strip_prefix("$__block")?;
    let digits = rest.strip_suffix('$')?;
    digits.parse().ok()
}
