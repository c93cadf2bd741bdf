//! Canonical writer for s-expression documents.
//!
//! Nodes without child nodes are written inline; nodes with children put
//! every child node on its own line, indented by one space per level, with
//! the closing parenthesis on its own line. The output is deterministic so
//! documents can be compared textually.

use super::{SAtom, SExpr};

/// Writes a document with a trailing newline.
#[must_use]
pub fn write(root: &SExpr) -> String {
    let mut out = String::new();
    write_node(root, 0, &mut out);
    out.push('\n');
    out
}

fn write_node(node: &SExpr, indent: usize, out: &mut String) {
    out.push('(');
    out.push_str(node.name());
    let has_child_nodes = node
        .atoms()
        .iter()
        .any(|atom| matches!(atom, SAtom::Child(_)));
    for atom in node.atoms() {
        match atom {
            SAtom::Token(token) => {
                out.push(' ');
                out.push_str(token);
            }
            SAtom::Text(text) => {
                out.push(' ');
                write_quoted(text, out);
            }
            SAtom::Child(child) => {
                out.push('\n');
                for _ in 0..=indent {
                    out.push(' ');
                }
                write_node(child, indent + 1, out);
            }
        }
    }
    if has_child_nodes {
        out.push('\n');
        for _ in 0..indent {
            out.push(' ');
        }
    }
    out.push(')');
}

fn write_quoted(text: &str, out: &mut String) {
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::super::parser::parse;
    use super::*;

    #[test]
    fn inline_and_block_layout() {
        let mut node = SExpr::new("circle");
        node.push_token("abc");
        node.push_value_child("layer", "top_legend");
        let pos = node.append_child("position");
        pos.push_token("0.0");
        pos.push_token("1.27");
        let expected = "(circle abc\n (layer top_legend)\n (position 0.0 1.27)\n)\n";
        assert_eq!(write(&node), expected);
    }

    #[test]
    fn quoting_escapes_specials() {
        let mut node = SExpr::new("value");
        node.push_text("say \"hi\"\nback\\slash");
        assert_eq!(write(&node), "(value \"say \\\"hi\\\"\\nback\\\\slash\")\n");
    }

    #[test]
    fn write_parse_roundtrip() {
        let mut node = SExpr::new("pad");
        node.push_token("11111111-2222-3333-4444-555555555555");
        node.push_text_child("name", "A 1");
        node.push_value_child("side", "top");
        let nested = node.append_child("size");
        nested.push_token("1.0");
        nested.push_token("2.0");
        let reparsed = parse(&write(&node)).unwrap();
        assert_eq!(reparsed, node);
    }
}
