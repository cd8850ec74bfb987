// 仅用于展示：把日志里常见的转义序列还原成可读字符，不参与结构化解析

fn hex4(chars: &[char]) -> Option<u32> {
    if chars.len() < 4 {
        return None;
    }
    chars[..4]
        .iter()
        .try_fold(0u32, |acc, c| c.to_digit(16).map(|d| acc * 16 + d))
}

fn is_high_surrogate(u: u32) -> bool {
    (0xD800..=0xDBFF).contains(&u)
}

fn is_low_surrogate(u: u32) -> bool {
    (0xDC00..=0xDFFF).contains(&u)
}

/// Decodes backslash escapes (`\n`, `\t`, `\"`, `\uXXXX` with surrogate pairs, ...)
/// for readability. Unknown escapes and lone surrogates are kept verbatim.
pub fn decode_escaped_text_for_display(text: &str) -> String {
    if !text.contains('\\') {
        return text.to_string();
    }
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c != '\\' || i + 1 >= chars.len() {
            out.push(c);
            i += 1;
            continue;
        }
        let simple = match chars[i + 1] {
            'n' => Some('\n'),
            'r' => Some('\r'),
            't' => Some('\t'),
            'b' => Some('\u{8}'),
            'f' => Some('\u{c}'),
            '"' => Some('"'),
            '\\' => Some('\\'),
            '/' => Some('/'),
            _ => None,
        };
        if let Some(decoded) = simple {
            out.push(decoded);
            i += 2;
            continue;
        }
        if chars[i + 1] == 'u'
            && let Some(unit) = hex4(&chars[i + 2..])
        {
            if is_high_surrogate(unit)
                && chars.get(i + 6) == Some(&'\\')
                && chars.get(i + 7) == Some(&'u')
                && let Some(low) = hex4(&chars[i + 8..])
                && is_low_surrogate(low)
            {
                let code = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                if let Some(ch) = char::from_u32(code) {
                    out.push(ch);
                    i += 12;
                    continue;
                }
            }
            if let Some(ch) = char::from_u32(unit) {
                out.push(ch);
                i += 6;
                continue;
            }
        }
        // unrecognized: keep the backslash, the next char is handled on the next turn
        out.push('\\');
        i += 1;
    }
    out
}
