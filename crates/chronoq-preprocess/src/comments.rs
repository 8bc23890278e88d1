//! Comment stripping. `//` to end-of-line is replaced with spaces so that
//! every later offset still points into the original source.

pub fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '/' && chars.peek() == Some(&'/') {
            out.push(' ');
            chars.next();
            out.push(' ');
            while let Some(&next) = chars.peek() {
                if next == '\n' {
                    break;
                }
                out.push(' ');
                chars.next();
            }
        } else {
            out.push(c);
        }
    }
    out
}
