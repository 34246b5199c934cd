use std::collections::BTreeMap;
use tracing::trace;

///
/// ValueReplacer
///
/// Rewrites a raw argument before it is used by an ordering comparison,
/// e.g. to expand virtual properties such as `${NOW_TS}`.
///

pub trait ValueReplacer {
    fn replace(&self, input: &str) -> String;
}

impl<T> ValueReplacer for T
where
    T: Fn(&str) -> String,
{
    fn replace(&self, input: &str) -> String {
        self(input)
    }
}

///
/// MacroReplacer
///
/// Substitutes `${NAME}` tokens from a fixed table; names match
/// case-insensitively and unknown tokens are left untouched.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MacroReplacer {
    values: BTreeMap<String, String>,
}

impl MacroReplacer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.values.insert(name.to_uppercase(), value.into());
        self
    }

    fn lookup(&self, name: &str) -> Option<&str> {
        self.values.get(&name.to_uppercase()).map(String::as_str)
    }
}

impl<N: AsRef<str>, V: Into<String>> FromIterator<(N, V)> for MacroReplacer {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |replacer, (name, value)| {
                replacer.with(name.as_ref(), value)
            })
    }
}

impl ValueReplacer for MacroReplacer {
    fn replace(&self, input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        let mut rest = input;

        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let token = &rest[start..];

            let Some(end) = token.find('}') else {
                out.push_str(token);
                return out;
            };
            let name = &token[2..end];

            match self.lookup(name) {
                Some(value) => {
                    trace!(name, "expanding macro");
                    out.push_str(value);
                }
                None => out.push_str(&token[..=end]),
            }
            rest = &token[end + 1..];
        }
        out.push_str(rest);

        out
    }
}

///
/// TESTS
///
