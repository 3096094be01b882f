//! Comment removal ahead of the line scanner.
//!
//! Comment characters become spaces and newlines are kept, so the stripped
//! text has exactly the line structure of the source. Quotes and character
//! classes never span lines, and their state resets at each newline. A block
//! comment is tracked with a flag across lines.

pub(crate) fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut in_block = false;
    let mut in_line = false;
    let mut quote: Option<char> = None;
    let mut in_class = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if c == '\n' {
            out.push('\n');
            in_line = false;
            quote = None;
            in_class = false;
            escaped = false;
            continue;
        }

        if in_line {
            out.push(' ');
            continue;
        }

        if in_block {
            if c == '*' && chars.peek() == Some(&'/') {
                chars.next();
                in_block = false;
                out.push_str("  ");
            } else {
                out.push(' ');
            }
            continue;
        }

        if quote.is_some() || in_class {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if Some(c) == quote {
                quote = None;
            } else if in_class && c == ']' {
                in_class = false;
            }
            continue;
        }

        match c {
            '/' if chars.peek() == Some(&'/') => {
                chars.next();
                in_line = true;
                out.push_str("  ");
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                in_block = true;
                out.push_str("  ");
            }
            '\'' | '"' => {
                quote = Some(c);
                out.push(c);
            }
            '[' => {
                in_class = true;
                out.push(c);
            }
            _ => out.push(c),
        }
    }

    out
}
