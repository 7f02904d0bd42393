//! XML token listing (`jackc --emit-tokens`), a debug view of the scanner
//! used by the test suite to check tokenization in isolation from code
//! generation. The escaping of `<`, `>`, `&`, `"` is a property of this
//! serializer, not of the token itself.

use crate::token::{Token, TokenKind};

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

/// Render a token stream as the `<tokens>...</tokens>` XML listing.
pub fn render_tokens(tokens: &[Token]) -> String {
    let mut out = String::from("<tokens>\n");
    for token in tokens {
        let (tag, text) = match &token.kind {
            TokenKind::Keyword(k) => ("keyword", k.to_string()),
            TokenKind::Symbol(s) => ("symbol", s.to_string()),
            TokenKind::IntConst(n) => ("integerConstant", n.to_string()),
            TokenKind::StringConst(s) => ("stringConstant", s.clone()),
            TokenKind::Identifier(name) => ("identifier", name.clone()),
        };
        out.push_str(&format!("<{tag}> {} </{tag}>\n", escape(&text)));
    }
    out.push_str("</tokens>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::tokenize;
    use std::path::Path;

    #[test]
    fn escapes_reserved_characters_in_rendered_tokens() {
        let tokens = tokenize("a < b & c", Path::new("t.jack")).unwrap();
        let rendered = render_tokens(&tokens);
        assert!(rendered.contains("<symbol> &lt; </symbol>"));
        assert!(rendered.contains("<symbol> &amp; </symbol>"));
    }

    #[test]
    fn string_constants_are_rendered_without_their_quotes() {
        let tokens = tokenize(r#""hi""#, Path::new("t.jack")).unwrap();
        let rendered = render_tokens(&tokens);
        assert!(rendered.contains("<stringConstant> hi </stringConstant>"));
    }
}
