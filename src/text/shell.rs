/// Wraps `value` in single quotes for POSIX shells. Each embedded `'` closes the
/// quoted string, emits an escaped quote and reopens it (`'\''`).
pub fn shell_single_quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        if c == '\'' {
            out.push_str("'\\''");
        } else {
            out.push(c);
        }
    }
    out.push('\'');
    out
}
