//! Shell-style word expansion for environment merge directives.
//!
//! Supported forms: `$NAME`, `${NAME}`, `${NAME:-word}`, `${NAME-word}`,
//! `${NAME:+word}`, `${NAME+word}`, backslash escapes, single quotes
//! (literal) and double quotes (expanding). Unset variables expand to the
//! empty string.

use std::collections::BTreeMap;

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{anychar, char},
    combinator::{cut, map, opt, value},
    multi::many0,
    sequence::{delimited, preceded, terminated},
};
use specwright_common::error::{Result, SpecError};

/// How a braced variable treats an unset or empty value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Modifier {
    /// `:-`: word when unset or empty.
    DefaultUnsetOrEmpty,
    /// `-`: word when unset.
    DefaultUnset,
    /// `:+`: word when set and non-empty.
    AlternateNonEmpty,
    /// `+`: word when set.
    AlternateSet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    /// A double-quoted run.
    Group(Vec<Part>),
    Var {
        name: String,
        modifier: Option<(Modifier, Vec<Part>)>,
    },
}

const fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn name(input: &str) -> IResult<&str, String> {
    map(take_while1(is_name_char), str::to_string).parse(input)
}

fn modifier(input: &str) -> IResult<&str, Modifier> {
    alt((
        value(Modifier::DefaultUnsetOrEmpty, tag(":-")),
        value(Modifier::AlternateNonEmpty, tag(":+")),
        value(Modifier::DefaultUnset, char('-')),
        value(Modifier::AlternateSet, char('+')),
    ))
    .parse(input)
}

/// `${NAME}` or `${NAME<modifier>word}`; anything else after `${` is fatal.
fn braced(input: &str) -> IResult<&str, Part> {
    let (input, _) = char('{')(input)?;
    let (input, (name, modifier, _)) = cut((
        name,
        opt((modifier, many0(word_part))),
        char('}'),
    ))
    .parse(input)?;
    Ok((input, Part::Var { name, modifier }))
}

fn variable(input: &str) -> IResult<&str, Part> {
    preceded(
        char('$'),
        alt((
            braced,
            map(name, |name| Part::Var {
                name,
                modifier: None,
            }),
        )),
    )
    .parse(input)
}

/// A `$` that starts no variable stands for itself.
fn lone_dollar(input: &str) -> IResult<&str, Part> {
    value(Part::Literal("$".to_string()), char('$')).parse(input)
}

fn escaped(input: &str) -> IResult<&str, Part> {
    map(preceded(char('\\'), anychar), |c| Part::Literal(c.to_string())).parse(input)
}

fn single_quoted(input: &str) -> IResult<&str, Part> {
    map(
        preceded(
            char('\''),
            cut(terminated(take_while(|c: char| c != '\''), char('\''))),
        ),
        |s: &str| Part::Literal(s.to_string()),
    )
    .parse(input)
}

/// Inside double quotes a backslash only escapes `"`, `\` and `$`.
fn dq_escaped(input: &str) -> IResult<&str, Part> {
    map(preceded(char('\\'), anychar), |c| match c {
        '"' | '\\' | '$' => Part::Literal(c.to_string()),
        other => Part::Literal(format!("\\{other}")),
    })
    .parse(input)
}

fn dq_literal(input: &str) -> IResult<&str, Part> {
    map(take_while1(|c: char| !matches!(c, '"' | '\\' | '$')), |s: &str| {
        Part::Literal(s.to_string())
    })
    .parse(input)
}

fn double_quoted(input: &str) -> IResult<&str, Part> {
    map(
        delimited(
            char('"'),
            cut(many0(alt((dq_escaped, variable, lone_dollar, dq_literal)))),
            cut(char('"')),
        ),
        Part::Group,
    )
    .parse(input)
}

fn plain_literal(input: &str) -> IResult<&str, Part> {
    map(take_while1(|c: char| !matches!(c, '$' | '\\' | '\'' | '"')), |s: &str| {
        Part::Literal(s.to_string())
    })
    .parse(input)
}

/// Literal text inside a braced word stops at the closing brace.
fn word_literal(input: &str) -> IResult<&str, Part> {
    map(
        take_while1(|c: char| !matches!(c, '$' | '\\' | '\'' | '"' | '}')),
        |s: &str| Part::Literal(s.to_string()),
    )
    .parse(input)
}

fn word_part(input: &str) -> IResult<&str, Part> {
    alt((
        single_quoted,
        double_quoted,
        escaped,
        variable,
        lone_dollar,
        word_literal,
    ))
    .parse(input)
}

fn top_part(input: &str) -> IResult<&str, Part> {
    alt((
        single_quoted,
        double_quoted,
        escaped,
        variable,
        lone_dollar,
        plain_literal,
    ))
    .parse(input)
}

fn render(parts: &[Part], env: &BTreeMap<String, String>, out: &mut String) {
    for part in parts {
        match part {
            Part::Literal(text) => out.push_str(text),
            Part::Group(inner) => render(inner, env, out),
            Part::Var { name, modifier } => {
                let current = env.get(name);
                let set = current.is_some();
                let non_empty = current.is_some_and(|v| !v.is_empty());
                match modifier {
                    None => out.push_str(current.map_or("", String::as_str)),
                    Some((Modifier::DefaultUnsetOrEmpty, word)) => {
                        if non_empty {
                            out.push_str(current.map_or("", String::as_str));
                        } else {
                            render(word, env, out);
                        }
                    }
                    Some((Modifier::DefaultUnset, word)) => {
                        if set {
                            out.push_str(current.map_or("", String::as_str));
                        } else {
                            render(word, env, out);
                        }
                    }
                    Some((Modifier::AlternateNonEmpty, word)) => {
                        if non_empty {
                            render(word, env, out);
                        }
                    }
                    Some((Modifier::AlternateSet, word)) => {
                        if set {
                            render(word, env, out);
                        }
                    }
                }
            }
        }
    }
}

/// Expands variables, quotes and escapes in `word` against `env`.
///
/// # Errors
///
/// Returns [`SpecError::Validation`] for an unterminated `${` or quote,
/// an unknown modifier, an empty variable name, or a trailing backslash.
pub fn expand(word: &str, env: &BTreeMap<String, String>) -> Result<String> {
    let parts = match many0(top_part).parse(word) {
        Ok(("", parts)) => parts,
        Ok((rest, _)) => {
            return Err(SpecError::validation(format!(
                "cannot expand {word:?}: unexpected {rest:?}"
            )));
        }
        Err(e) => {
            return Err(SpecError::validation(format!("cannot expand {word:?}: {e}")));
        }
    };
    let mut out = String::with_capacity(word.len());
    render(&parts, env, &mut out);
    Ok(out)
}
