//! printf-style template interpolation
//!
//! Templates reach the logger as runtime strings, so they cannot go through
//! `format!`. This module walks the template once and substitutes `%` verbs
//! with the `Display` rendering of the next argument.
//!
//! Supported syntax: `%[flags][width][.precision]verb` where flags are `-`
//! (left align) and `0` (zero pad). Every verb letter consumes one argument;
//! `%q` quotes it, `%%` emits a literal percent. Argument mismatches are
//! reported inline instead of failing:
//!
//! - missing argument: `%!d(MISSING)`
//! - surplus arguments: `%!(EXTRA a, b)` appended at the end
//! - template ending in a bare `%`: `%!(NOVERB)`

use std::fmt::{self, Write};
use std::iter::Peekable;
use std::str::Chars;

/// Upper bound for widths and precisions parsed out of a template
const MAX_WIDTH: usize = 1_000_000;

#[derive(Debug, Default, Clone, Copy)]
struct Directive {
    left_align: bool,
    zero_pad: bool,
    width: Option<usize>,
    precision: Option<usize>,
}

impl Directive {
    fn parse(chars: &mut Peekable<Chars<'_>>) -> Self {
        let mut directive = Directive::default();

        while let Some(&flag) = chars.peek() {
            match flag {
                '-' => directive.left_align = true,
                '0' => directive.zero_pad = true,
                '+' | ' ' | '#' => {}
                _ => break,
            }
            chars.next();
        }

        directive.width = take_number(chars);
        if chars.peek() == Some(&'.') {
            chars.next();
            directive.precision = Some(take_number(chars).unwrap_or(0));
        }

        directive
    }

    fn render<T: fmt::Display + ?Sized>(&self, out: &mut String, verb: char, arg: &T) {
        let mut body = match self.precision {
            Some(precision) => format!("{:.*}", precision, arg),
            None => arg.to_string(),
        };

        if verb == 'q' {
            body = quote(&body);
        }

        let len = body.chars().count();
        let width = self.width.unwrap_or(0);
        if len >= width {
            out.push_str(&body);
            return;
        }

        let fill = width - len;
        if self.left_align {
            out.push_str(&body);
            out.extend(std::iter::repeat(' ').take(fill));
        } else if self.zero_pad && looks_numeric(&body) {
            let (sign, digits) = match body.strip_prefix('-') {
                Some(rest) => ("-", rest),
                None => ("", body.as_str()),
            };
            out.push_str(sign);
            out.extend(std::iter::repeat('0').take(fill));
            out.push_str(digits);
        } else {
            out.extend(std::iter::repeat(' ').take(fill));
            out.push_str(&body);
        }
    }
}

fn take_number(chars: &mut Peekable<Chars<'_>>) -> Option<usize> {
    let mut value: Option<usize> = None;
    while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
        chars.next();
        let next = value
            .unwrap_or(0)
            .saturating_mul(10)
            .saturating_add(digit as usize);
        value = Some(next.min(MAX_WIDTH));
    }
    value
}

fn looks_numeric(body: &str) -> bool {
    let digits = body.strip_prefix('-').unwrap_or(body);
    digits.starts_with(|c: char| c.is_ascii_digit())
}

fn quote(body: &str) -> String {
    let mut quoted = String::with_capacity(body.len() + 2);
    quoted.push('"');
    for c in body.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Interpolate `args` into `template`
///
/// # Examples
///
/// ```
/// use level_file_logger::core::template::render_template;
///
/// let line = render_template("code=%d msg=%s", &["400", "bad request"]);
/// assert_eq!(line, "code=400 msg=bad request");
/// ```
pub fn render_template<T: fmt::Display>(template: &str, args: &[T]) -> String {
    let mut out = String::with_capacity(template.len() + args.len() * 8);
    let mut chars = template.chars().peekable();
    let mut next_arg = 0;

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        let directive = Directive::parse(&mut chars);
        let Some(verb) = chars.next() else {
            out.push_str("%!(NOVERB)");
            break;
        };

        if verb == '%' {
            out.push('%');
            continue;
        }

        match args.get(next_arg) {
            Some(arg) => {
                next_arg += 1;
                directive.render(&mut out, verb, arg);
            }
            None => {
                let _ = write!(out, "%!{}(MISSING)", verb);
            }
        }
    }

    if next_arg < args.len() {
        out.push_str("%!(EXTRA ");
        for (idx, arg) in args[next_arg..].iter().enumerate() {
            if idx > 0 {
                out.push_str(", ");
            }
            let _ = write!(out, "{}", arg);
        }
        out.push(')');
    }

    out
}

/// Concatenate the rendered arguments with no separator
///
/// Adjacent numbers are not spaced apart: `[1, 2]` renders `12`.
pub fn render_plain<T: fmt::Display>(args: &[T]) -> String {
    let mut out = String::new();
    for arg in args {
        let _ = write!(out, "{}", arg);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_basic_verbs() {
        let rendered = render_template("code=%d msg=%s", &args(&["400", "bad request"]));
        assert_eq!(rendered, "code=400 msg=bad request");

        let rendered = render_template("%v/%v", &[1.5f64, 2.0f64]);
        assert_eq!(rendered, "1.5/2");
    }

    #[test]
    fn test_literal_percent() {
        let rendered = render_template("100%% of %s", &args(&["tests"]));
        assert_eq!(rendered, "100% of tests");
    }

    #[test]
    fn test_width_and_alignment() {
        assert_eq!(render_template("[%5d]", &[42]), "[   42]");
        assert_eq!(render_template("[%-5d]", &[42]), "[42   ]");
        assert_eq!(render_template("[%05d]", &[42]), "[00042]");
        assert_eq!(render_template("[%05d]", &[-42]), "[-0042]");
        assert_eq!(render_template("[%05s]", &args(&["ab"])), "[   ab]");
    }

    #[test]
    fn test_precision() {
        assert_eq!(render_template("%.2f", &[3.14159f64]), "3.14");
        assert_eq!(render_template("%.3s", &args(&["abcdef"])), "abc");
        assert_eq!(render_template("%8.3f|", &[2.5f64]), "   2.500|");
    }

    #[test]
    fn test_quote_verb() {
        assert_eq!(render_template("%q", &args(&["say \"hi\""])), "\"say \\\"hi\\\"\"");
    }

    #[test]
    fn test_missing_and_extra_arguments() {
        assert_eq!(render_template("%d and %s", &[1]), "1 and %!s(MISSING)");
        assert_eq!(render_template("only %d", &[1, 2, 3]), "only 1%!(EXTRA 2, 3)");
        assert_eq!(render_template("no verbs", &[7]), "no verbs%!(EXTRA 7)");
    }

    #[test]
    fn test_trailing_percent() {
        assert_eq!(render_template("50%", &[0u8; 0]), "50%!(NOVERB)");
    }

    #[test]
    fn test_unicode_passthrough() {
        assert_eq!(render_template("✓ %s ✓", &args(&["ok"])), "✓ ok ✓");
        assert_eq!(render_template("[%4s]", &args(&["é"])), "[   é]");
    }

    #[test]
    fn test_render_plain_concatenates() {
        let plain = render_plain(&args(&["the error code/message: ", "400", "/", "bad request"]));
        assert_eq!(plain, "the error code/message: 400/bad request");
        assert_eq!(render_plain::<String>(&[]), "");
    }

    #[test]
    fn test_render_plain_never_inserts_spaces() {
        assert_eq!(render_plain(&[1, 2]), "12");
        assert_eq!(render_plain(&[1.5, 2.0]), "1.52");
    }
}
