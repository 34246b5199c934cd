use crate::config::Dialect;

///
/// Token
///

#[derive(Clone, Debug, Eq, PartialEq)]
enum Token {
    AnySeq,
    AnyOne,
    Literal(char),
    /// Bracketed character class (SQL Server only).
    Class { chars: Vec<char>, negated: bool },
}

impl Token {
    fn matches(&self, c: char) -> bool {
        match self {
            Self::AnySeq | Self::AnyOne => true,
            Self::Literal(literal) => *literal == c,
            Self::Class { chars, negated } => chars.contains(&c) != *negated,
        }
    }
}

fn tokenize(pattern: &str, escape: char, dialect: Dialect) -> Vec<Token> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut tokens = Vec::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        i += 1;

        match c {
            _ if c == escape => match chars.get(i) {
                Some(&next) => {
                    tokens.push(Token::Literal(next));
                    i += 1;
                }
                // trailing escape matches itself
                None => tokens.push(Token::Literal(c)),
            },
            '%' => tokens.push(Token::AnySeq),
            '_' => tokens.push(Token::AnyOne),
            '[' if dialect == Dialect::SqlServer => {
                let Some(close) = chars[i..].iter().position(|&ch| ch == ']') else {
                    tokens.push(Token::Literal(c));
                    continue;
                };
                let body = &chars[i..i + close];
                let (negated, body) = match body.split_first() {
                    Some((&'^', rest)) if !rest.is_empty() => (true, rest),
                    _ => (false, body),
                };
                tokens.push(Token::Class {
                    chars: expand_ranges(body),
                    negated,
                });
                i += close + 1;
            }
            _ => tokens.push(Token::Literal(c)),
        }
    }

    tokens
}

fn expand_ranges(body: &[char]) -> Vec<char> {
    let mut chars = Vec::new();
    let mut i = 0;

    while i < body.len() {
        match (body.get(i + 1), body.get(i + 2)) {
            (Some(&'-'), Some(&end)) if body[i] <= end => {
                chars.extend(body[i]..=end);
                i += 3;
            }
            _ => {
                chars.push(body[i]);
                i += 1;
            }
        }
    }

    chars
}

/// SQL `LIKE` with an explicit escape character.
///
/// `%` matches any run of characters, `_` exactly one. Under
/// [`Dialect::SqlServer`] a bracketed class (`[%]`, `[a-c]`, `[^x]`) matches
/// one character from the set.
#[must_use]
pub fn like_matches(text: &str, pattern: &str, escape: char, dialect: Dialect) -> bool {
    let tokens = tokenize(pattern, escape, dialect);
    let text: Vec<char> = text.chars().collect();

    // matched[j]: tokens[..t] match text[..j]
    let mut matched = vec![false; text.len() + 1];
    matched[0] = true;

    for token in &tokens {
        let mut next = vec![false; text.len() + 1];
        match token {
            Token::AnySeq => {
                let mut reachable = false;
                for j in 0..=text.len() {
                    reachable |= matched[j];
                    next[j] = reachable;
                }
            }
            _ => {
                for j in 0..text.len() {
                    next[j + 1] = matched[j] && token.matches(text[j]);
                }
            }
        }
        matched = next;
    }

    matched[text.len()]
}

///
/// TESTS
///
