//! Argument tokenizing and coercion
//!
//! A command line is split on ASCII whitespace. Single or double quotes group
//! words into one argument; inside double quotes a backslash escapes the next
//! character. Each command declares a signature and every positional token is
//! coerced to the declared kind before the handler runs.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::error::ShellError;

/// Declared type of one positional argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Str,
    /// Signed 64-bit; accepts `-`, `+`, `0x` and `0b` prefixes
    Int,
    /// Unsigned 64-bit; accepts `+`, `0x` and `0b` prefixes
    UInt,
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgKind::Str => f.write_str("a string"),
            ArgKind::Int => f.write_str("an integer"),
            ArgKind::UInt => f.write_str("an unsigned integer"),
        }
    }
}

/// One coerced argument value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    Str(String),
    Int(i64),
    UInt(u64),
}

/// Typed positional arguments handed to a command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    values: Vec<Arg>,
}

impl Args {
    pub fn new(values: Vec<Arg>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Arg> {
        self.values.get(index)
    }

    /// String argument at `index`, `None` if absent or of another kind
    pub fn str(&self, index: usize) -> Option<&str> {
        match self.values.get(index) {
            Some(Arg::Str(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn int(&self, index: usize) -> Option<i64> {
        match self.values.get(index) {
            Some(Arg::Int(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn uint(&self, index: usize) -> Option<u64> {
        match self.values.get(index) {
            Some(Arg::UInt(v)) => Some(*v),
            _ => None,
        }
    }
}

/// Split a line into raw tokens
pub fn tokenize(line: &str) -> Result<Vec<String>, ShellError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    // Distinguishes `""` (an empty argument) from no token at all
    let mut in_token = false;
    let mut in_quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match in_quote {
            Some(q) if c == q => in_quote = None,
            Some('"') if c == '\\' => match chars.next() {
                Some(escaped) => current.push(escaped),
                None => return Err(ShellError::UnterminatedQuote),
            },
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                in_quote = Some(c);
                in_token = true;
            }
            None if c.is_ascii_whitespace() => {
                if in_token {
                    tokens.push(core::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if in_quote.is_some() {
        return Err(ShellError::UnterminatedQuote);
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

/// Coerce raw tokens against a declared signature
pub fn coerce(tokens: Vec<String>, signature: &[ArgKind]) -> Result<Args, ShellError> {
    if tokens.len() != signature.len() {
        return Err(ShellError::ArgumentCount {
            expected: signature.len(),
            got: tokens.len(),
        });
    }

    let mut values = Vec::with_capacity(tokens.len());
    for (index, (token, kind)) in tokens.into_iter().zip(signature).enumerate() {
        let mismatch = ShellError::ArgumentTypeMismatch {
            index,
            expected: *kind,
        };
        let value = match kind {
            ArgKind::Str => Arg::Str(token),
            ArgKind::Int => Arg::Int(parse_int(&token).ok_or(mismatch)?),
            ArgKind::UInt => Arg::UInt(parse_uint(&token).ok_or(mismatch)?),
        };
        values.push(value);
    }
    Ok(Args::new(values))
}

/// Parse an unsigned magnitude with optional `0x`/`0b` prefix
fn parse_magnitude(s: &str) -> Option<u64> {
    let (digits, radix) = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        (hex, 16)
    } else if let Some(bin) = s.strip_prefix("0b").or_else(|| s.strip_prefix("0B")) {
        (bin, 2)
    } else {
        (s, 10)
    };
    // from_str_radix would accept a second sign here
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }
    u64::from_str_radix(digits, radix).ok()
}

pub fn parse_int(s: &str) -> Option<i64> {
    let (negative, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let magnitude = i128::from(parse_magnitude(rest)?);
    let value = if negative { -magnitude } else { magnitude };
    i64::try_from(value).ok()
}

pub fn parse_uint(s: &str) -> Option<u64> {
    parse_magnitude(s.strip_prefix('+').unwrap_or(s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_tokenize_whitespace() {
        assert_eq!(tokenize("  spawn  alpha\t5 ").unwrap(), strings(&["spawn", "alpha", "5"]));
        assert!(tokenize("   ").unwrap().is_empty());
    }

    #[test]
    fn test_tokenize_quotes() {
        assert_eq!(
            tokenize("spawn \"USER SHELL\" 10").unwrap(),
            strings(&["spawn", "USER SHELL", "10"])
        );
        assert_eq!(tokenize("echo 'a b'c").unwrap(), strings(&["echo", "a bc"]));
        assert_eq!(tokenize("x \"\"").unwrap(), strings(&["x", ""]));
        assert_eq!(tokenize(r#"x "say \"hi\"""#).unwrap(), strings(&["x", "say \"hi\""]));
    }

    #[test]
    fn test_tokenize_unterminated() {
        assert_eq!(tokenize("spawn \"oops 3"), Err(ShellError::UnterminatedQuote));
        assert_eq!(tokenize("x \"trailing\\"), Err(ShellError::UnterminatedQuote));
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int("-7"), Some(-7));
        assert_eq!(parse_int("+7"), Some(7));
        assert_eq!(parse_int("0x1F"), Some(31));
        assert_eq!(parse_int("-0b101"), Some(-5));
        assert_eq!(parse_int("-9223372036854775808"), Some(i64::MIN));
        assert_eq!(parse_int("9223372036854775808"), None);
        assert_eq!(parse_int("--1"), None);
        assert_eq!(parse_int("12ab"), None);
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("0x"), None);
    }

    #[test]
    fn test_parse_uint() {
        assert_eq!(parse_uint("99"), Some(99));
        assert_eq!(parse_uint("0x7f"), Some(127));
        assert_eq!(parse_uint("-1"), None);
    }

    #[test]
    fn test_coerce_signature() {
        let args = coerce(strings(&["alpha", "5"]), &[ArgKind::Str, ArgKind::Int]).unwrap();
        assert_eq!(args.str(0), Some("alpha"));
        assert_eq!(args.int(1), Some(5));
        assert_eq!(args.int(0), None);
        assert_eq!(args.get(1), Some(&Arg::Int(5)));
    }

    #[test]
    fn test_coerce_errors() {
        assert_eq!(
            coerce(strings(&["alpha"]), &[ArgKind::Str, ArgKind::Int]),
            Err(ShellError::ArgumentCount { expected: 2, got: 1 })
        );
        assert_eq!(
            coerce(strings(&["alpha", "high"]), &[ArgKind::Str, ArgKind::Int]),
            Err(ShellError::ArgumentTypeMismatch {
                index: 1,
                expected: ArgKind::Int
            })
        );
        assert_eq!(coerce(vec![], &[]), Ok(Args::default()));
    }
}
