//! Recursive-descent parser reducing model output to a validated call.
//!
//! The only accepted shape is `identifier(literal, ..., kw=literal, ...)`:
//! one call per input, a bare identifier callee, literal-only arguments.
//! Everything else — attribute access, nested calls, variable references,
//! statements, operators — returns `None`. The accepted tree is
//! side-effect-free by construction; whether the *name* is a known
//! operation is the dispatcher's problem, not the parser's.

use crate::command::lexer::{tokenize, Token};

/// A literal argument value. The full set of shapes a validated call can
/// carry; nothing here can reference or execute anything.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
    List(Vec<Literal>),
    Map(Vec<(Literal, Literal)>),
}

impl Literal {
    /// Human-readable shape name for usage messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Literal::Str(_) => "string",
            Literal::Int(_) | Literal::Float(_) => "number",
            Literal::Bool(_) => "boolean",
            Literal::Null => "null",
            Literal::List(_) => "list",
            Literal::Map(_) => "map",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::Str(value) => Some(value),
            _ => None,
        }
    }
}

/// A validated call: function name plus literal-only arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandCall {
    pub name: String,
    pub args: Vec<Literal>,
    pub kwargs: Vec<(String, Literal)>,
}

impl CommandCall {
    pub fn kwarg(&self, name: &str) -> Option<&Literal> {
        self.kwargs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }
}

/// Parses one line of model output into a validated call.
///
/// Returns `None` for anything outside the restricted grammar; no failure
/// escapes as a panic. This is the entire validation surface between the
/// model's raw text and the operations that touch storage.
pub fn parse_command(text: &str) -> Option<CommandCall> {
    let tokens = tokenize(text)?;
    let mut parser = Parser { tokens, pos: 0 };
    let call = parser.call()?;
    if parser.pos != parser.tokens.len() {
        return None; // trailing tokens: a second statement, stray garbage
    }
    Some(call)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            return true;
        }
        false
    }

    fn call(&mut self) -> Option<CommandCall> {
        let name = match self.bump()? {
            Token::Ident(name) => name,
            _ => return None,
        };
        if !self.eat(&Token::LParen) {
            return None;
        }

        let mut args = Vec::new();
        let mut kwargs: Vec<(String, Literal)> = Vec::new();

        if self.eat(&Token::RParen) {
            return Some(CommandCall { name, args, kwargs });
        }

        loop {
            if let (Some(Token::Ident(_)), Some(Token::Equals)) =
                (self.tokens.get(self.pos), self.tokens.get(self.pos + 1))
            {
                let Some(Token::Ident(key)) = self.bump() else {
                    return None;
                };
                self.pos += 1; // consume '='
                if kwargs.iter().any(|(existing, _)| existing == &key) {
                    return None;
                }
                let value = self.literal()?;
                kwargs.push((key, value));
            } else {
                if !kwargs.is_empty() {
                    return None; // positional after keyword
                }
                args.push(self.literal()?);
            }

            if self.eat(&Token::Comma) {
                if self.eat(&Token::RParen) {
                    break; // trailing comma
                }
                continue;
            }
            if self.eat(&Token::RParen) {
                break;
            }
            return None;
        }

        Some(CommandCall { name, args, kwargs })
    }

    fn literal(&mut self) -> Option<Literal> {
        match self.bump()? {
            Token::Str(value) => Some(Literal::Str(value)),
            Token::Int(value) => Some(Literal::Int(value)),
            Token::Float(value) => Some(Literal::Float(value)),
            Token::Minus => match self.bump()? {
                Token::Int(value) => Some(Literal::Int(-value)),
                Token::Float(value) => Some(Literal::Float(-value)),
                _ => None,
            },
            Token::Ident(word) => keyword_literal(&word),
            Token::LBracket => self.sequence(Token::RBracket),
            Token::LParen => self.sequence(Token::RParen),
            Token::LBrace => self.mapping(),
            _ => None,
        }
    }

    fn sequence(&mut self, close: Token) -> Option<Literal> {
        let mut items = Vec::new();
        if self.eat(&close) {
            return Some(Literal::List(items));
        }
        loop {
            items.push(self.literal()?);
            if self.eat(&Token::Comma) {
                if self.eat(&close) {
                    break;
                }
                continue;
            }
            if self.eat(&close) {
                break;
            }
            return None;
        }
        Some(Literal::List(items))
    }

    fn mapping(&mut self) -> Option<Literal> {
        let mut entries = Vec::new();
        if self.eat(&Token::RBrace) {
            return Some(Literal::Map(entries));
        }
        loop {
            let key = self.literal()?;
            if !self.eat(&Token::Colon) {
                return None;
            }
            let value = self.literal()?;
            entries.push((key, value));
            if self.eat(&Token::Comma) {
                if self.eat(&Token::RBrace) {
                    break;
                }
                continue;
            }
            if self.eat(&Token::RBrace) {
                break;
            }
            return None;
        }
        Some(Literal::Map(entries))
    }
}

// The model writes Python-style keywords; accept the JSON spellings too.
fn keyword_literal(word: &str) -> Option<Literal> {
    match word {
        "True" | "true" => Some(Literal::Bool(true)),
        "False" | "false" => Some(Literal::Bool(false)),
        "None" | "none" | "null" => Some(Literal::Null),
        _ => None, // bare identifier in argument position: a variable reference
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(text: &str) -> CommandCall {
        parse_command(text).unwrap()
    }

    #[test]
    fn decomposes_a_plain_call() {
        let call = parsed(r#"add_entry("2024-01-20", "test event")"#);
        assert_eq!(call.name, "add_entry");
        assert_eq!(
            call.args,
            vec![
                Literal::Str("2024-01-20".to_string()),
                Literal::Str("test event".to_string()),
            ]
        );
        assert!(call.kwargs.is_empty());
    }

    #[test]
    fn decomposes_keyword_arguments() {
        let call = parsed(r#"lookup_events(people=["mom"])"#);
        assert_eq!(call.name, "lookup_events");
        assert!(call.args.is_empty());
        assert_eq!(
            call.kwarg("people"),
            Some(&Literal::List(vec![Literal::Str("mom".to_string())]))
        );
    }

    #[test]
    fn accepts_none_and_list_positionals() {
        let call = parsed(r#"add_entry("2024-12-03", "gf is visiting", None, ["girlfriend"])"#);
        assert_eq!(call.args[2], Literal::Null);
        assert_eq!(
            call.args[3],
            Literal::List(vec![Literal::Str("girlfriend".to_string())])
        );
    }

    #[test]
    fn accepts_trailing_comments_like_the_few_shot_examples() {
        let call = parsed(r#"lookup_events("2024-01-15", "2024-01-21")      # next Monday to Sunday"#);
        assert_eq!(call.args.len(), 2);
    }

    #[test]
    fn accepts_empty_call_and_trailing_comma() {
        assert_eq!(parsed("lookup_events()").args.len(), 0);
        assert_eq!(parsed(r#"clear_events("2024-01-01",)"#).args.len(), 1);
    }

    #[test]
    fn accepts_numbers_booleans_maps_and_tuples() {
        let call = parsed(r#"f(1, -2.5, True, false, {"a": 1}, ("x", "y"))"#);
        assert_eq!(call.args[0], Literal::Int(1));
        assert_eq!(call.args[1], Literal::Float(-2.5));
        assert_eq!(call.args[2], Literal::Bool(true));
        assert_eq!(call.args[3], Literal::Bool(false));
        assert_eq!(
            call.args[4],
            Literal::Map(vec![(Literal::Str("a".to_string()), Literal::Int(1))])
        );
        assert_eq!(
            call.args[5],
            Literal::List(vec![
                Literal::Str("x".to_string()),
                Literal::Str("y".to_string()),
            ])
        );
    }

    #[test]
    fn rejects_text_that_is_not_a_call() {
        assert!(parse_command("invalid command").is_none());
        assert!(parse_command("rm -rf /").is_none());
        assert!(parse_command("").is_none());
        assert!(parse_command("42").is_none());
        assert!(parse_command("\"just a string\"").is_none());
    }

    #[test]
    fn rejects_attribute_access_and_computed_names() {
        assert!(parse_command("os.system('x')").is_none());
        assert!(parse_command("f[0]()").is_none());
    }

    #[test]
    fn name_whitelisting_is_not_the_parsers_job() {
        // A scary but grammar-conforming name parses; the dispatcher drops it.
        let call = parsed("__import__('os')");
        assert_eq!(call.name, "__import__");
        assert_eq!(call.args, vec![Literal::Str("os".to_string())]);
    }

    #[test]
    fn rejects_non_literal_arguments() {
        assert!(parse_command("add_entry(x)").is_none());
        assert!(parse_command("add_entry(f())").is_none());
        assert!(parse_command("add_entry(1 + 2)").is_none());
        assert!(parse_command("lookup_events(people=[x])").is_none());
    }

    #[test]
    fn rejects_multiple_statements_and_trailing_garbage() {
        assert!(parse_command("f(); g()").is_none());
        assert!(parse_command("f() g()").is_none());
        assert!(parse_command("f()(\"again\")").is_none());
    }

    #[test]
    fn rejects_assignments() {
        assert!(parse_command("x = f()").is_none());
        assert!(parse_command("x = 1").is_none());
    }

    #[test]
    fn rejects_positional_after_keyword_and_duplicate_keywords() {
        assert!(parse_command(r#"f(a=1, "b")"#).is_none());
        assert!(parse_command("f(a=1, a=2)").is_none());
    }
}
