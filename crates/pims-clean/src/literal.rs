//! Bracketed list-of-strings encoding used by exports for multi-valued
//! columns, e.g. `['Music', "Food"]`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiteralError {
    #[error("list literal must start with '['")]
    NotAList,
    #[error("unexpected {found:?} at offset {offset}")]
    Unexpected { found: char, offset: usize },
    #[error("unterminated string starting at offset {0}")]
    UnterminatedString(usize),
    #[error("list literal is not closed")]
    Unclosed,
    #[error("trailing input after list literal")]
    Trailing,
}

struct Cursor<'a> {
    text: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            chars: text.char_indices().peekable(),
        }
    }

    fn skip_ws(&mut self) {
        while self.chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
    }

    fn peek(&mut self) -> Option<(usize, char)> {
        self.chars.peek().copied()
    }

    fn quoted(&mut self, start: usize, quote: char) -> Result<String, LiteralError> {
        let mut out = String::new();
        while let Some((_, c)) = self.chars.next() {
            match c {
                '\\' => match self.chars.next() {
                    Some((_, 'n')) => out.push('\n'),
                    Some((_, 't')) => out.push('\t'),
                    Some((_, 'r')) => out.push('\r'),
                    Some((_, e @ ('\\' | '\'' | '"'))) => out.push(e),
                    Some((_, other)) => {
                        out.push('\\');
                        out.push(other);
                    }
                    None => return Err(LiteralError::UnterminatedString(start)),
                },
                c if c == quote => return Ok(out),
                c => out.push(c),
            }
        }
        Err(LiteralError::UnterminatedString(start))
    }

    fn remaining_is_blank(&mut self) -> bool {
        match self.peek() {
            Some((offset, _)) => self.text[offset..].trim().is_empty(),
            None => true,
        }
    }
}

/// Parse a list literal whose elements are all quoted strings.
pub fn parse_string_list(input: &str) -> Result<Vec<String>, LiteralError> {
    let mut cur = Cursor::new(input);
    cur.skip_ws();
    match cur.chars.next() {
        Some((_, '[')) => {}
        _ => return Err(LiteralError::NotAList),
    }

    let mut items = Vec::new();
    loop {
        cur.skip_ws();
        match cur.chars.next() {
            Some((_, ']')) => break,
            Some((offset, q @ ('\'' | '"'))) => items.push(cur.quoted(offset, q)?),
            Some((offset, found)) => return Err(LiteralError::Unexpected { found, offset }),
            None => return Err(LiteralError::Unclosed),
        }

        cur.skip_ws();
        match cur.chars.next() {
            Some((_, ',')) => continue,
            Some((_, ']')) => break,
            Some((offset, found)) => return Err(LiteralError::Unexpected { found, offset }),
            None => return Err(LiteralError::Unclosed),
        }
    }

    if !cur.remaining_is_blank() {
        return Err(LiteralError::Trailing);
    }
    Ok(items)
}

fn quote_item(item: &str) -> String {
    let quote = if item.contains('\'') && !item.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(item.len() + 2);
    out.push(quote);
    for c in item.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

pub fn format_string_list(items: &[String]) -> String {
    let inner = items
        .iter()
        .map(|item| quote_item(item))
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{inner}]")
}
