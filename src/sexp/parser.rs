//! Parser for s-expression documents.

use super::SExpr;
use crate::error::{EditorError, EditorResult};

struct Cursor<'a> {
    input: &'a [u8],
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        if byte == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(byte)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.bump();
        }
    }

    fn error(&self, message: impl Into<String>) -> EditorError {
        EditorError::parse(self.line, self.column, message)
    }
}

/// Parses a document containing exactly one root node.
///
/// # Errors
///
/// Returns [`EditorError::Parse`] with line/column information on malformed
/// input.
pub fn parse(input: &str) -> EditorResult<SExpr> {
    let mut cursor = Cursor::new(input);
    cursor.skip_whitespace();
    if cursor.peek() != Some(b'(') {
        return Err(cursor.error("document does not start with a node"));
    }
    let root = parse_node(&mut cursor)?;
    cursor.skip_whitespace();
    if cursor.peek().is_some() {
        return Err(cursor.error("trailing content after root node"));
    }
    Ok(root)
}

fn parse_node(cursor: &mut Cursor<'_>) -> EditorResult<SExpr> {
    debug_assert_eq!(cursor.peek(), Some(b'('));
    cursor.bump();
    let name = parse_token(cursor)?;
    if name.is_empty() {
        return Err(cursor.error("node without a tag name"));
    }
    let mut node = SExpr::new(name);
    loop {
        cursor.skip_whitespace();
        match cursor.peek() {
            Some(b')') => {
                cursor.bump();
                return Ok(node);
            }
            Some(b'(') => {
                let child = parse_node(cursor)?;
                node.push_child(child);
            }
            Some(b'"') => {
                let text = parse_quoted(cursor)?;
                node.push_text(text);
            }
            Some(_) => {
                let token = parse_token(cursor)?;
                node.push_token(token);
            }
            None => return Err(cursor.error("unexpected end of input inside node")),
        }
    }
}

fn parse_token(cursor: &mut Cursor<'_>) -> EditorResult<String> {
    let start = cursor.pos;
    while let Some(byte) = cursor.peek() {
        match byte {
            b' ' | b'\t' | b'\r' | b'\n' | b'(' | b')' | b'"' => break,
            _ => {
                cursor.bump();
            }
        }
    }
    let token = &cursor.input[start..cursor.pos];
    String::from_utf8(token.to_vec()).map_err(|_| cursor.error("token is not valid UTF-8"))
}

fn parse_quoted(cursor: &mut Cursor<'_>) -> EditorResult<String> {
    debug_assert_eq!(cursor.peek(), Some(b'"'));
    cursor.bump();
    let mut bytes = Vec::new();
    loop {
        match cursor.bump() {
            Some(b'"') => break,
            Some(b'\\') => match cursor.bump() {
                Some(b'"') => bytes.push(b'"'),
                Some(b'\\') => bytes.push(b'\\'),
                Some(b'n') => bytes.push(b'\n'),
                _ => return Err(cursor.error("invalid escape sequence in string")),
            },
            Some(byte) => bytes.push(byte),
            None => return Err(cursor.error("unterminated string")),
        }
    }
    String::from_utf8(bytes).map_err(|_| cursor.error("string is not valid UTF-8"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_document() {
        let doc = parse("(circle abc (layer top_legend) (width 0.2))").unwrap();
        assert_eq!(doc.name(), "circle");
        assert_eq!(doc.value(0), Some("abc"));
        assert_eq!(doc.child_value("layer").unwrap(), "top_legend");
    }

    #[test]
    fn parse_nested_and_quoted() {
        let doc = parse("(text (value \"{{NAME}}\") (align center bottom))").unwrap();
        assert_eq!(doc.child("value").unwrap().value(0), Some("{{NAME}}"));
        assert_eq!(doc.child("align").unwrap().values(), vec!["center", "bottom"]);
    }

    #[test]
    fn parse_escapes() {
        let doc = parse("(v \"a\\\"b\\\\c\\nd\")").unwrap();
        assert_eq!(doc.value(0), Some("a\"b\\c\nd"));
    }

    #[test]
    fn parse_errors_carry_position() {
        let err = parse("(node (child)").unwrap_err();
        match err {
            EditorError::Parse { line, .. } => assert_eq!(line, 1),
            other => panic!("unexpected error: {other}"),
        }
        assert!(parse("").is_err());
        assert!(parse("(a) (b)").is_err());
        assert!(parse("(a))").is_err());
        assert!(parse("(a \"unterminated)").is_err());
    }

    #[test]
    fn multiline_position_tracking() {
        let err = parse("(a\n (b\n").unwrap_err();
        match err {
            EditorError::Parse { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }
}
