use std::borrow::Cow;
use std::collections::HashSet;

mod parsers;
mod scanner;

use parsers::{
    is_block_comment_end, is_block_comment_start, is_hash_comment_start, is_line_comment_start,
};
use scanner::{State, scan_placeholder};

use crate::record::Params;
use crate::types::RowValues;

/// Positional marker syntax of the target backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `MySQL` anonymous markers: `?`.
    MySql,
    /// `SQLite` numbered markers: `?1`, `?2`, ...
    Sqlite,
}

impl PlaceholderStyle {
    /// Append the marker for the 1-based argument `position` to `buf`.
    pub fn push_marker(self, buf: &mut String, position: usize) {
        buf.push('?');
        if matches!(self, PlaceholderStyle::Sqlite) {
            buf.push_str(&position.to_string());
        }
    }

    fn backslash_escapes(self) -> bool {
        matches!(self, PlaceholderStyle::MySql)
    }

    fn hash_comments(self) -> bool {
        matches!(self, PlaceholderStyle::MySql)
    }

    fn dash_comment_needs_space(self) -> bool {
        matches!(self, PlaceholderStyle::MySql)
    }
}

/// A positionally-parameterized statement and its ordered arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltStatement<'a> {
    pub sql: Cow<'a, str>,
    pub params: Vec<RowValues>,
}

/// Rewrite `{name}` placeholders into positional markers.
///
/// The template is scanned left to right; every placeholder whose name is a key of `params`
/// becomes a marker and its value is appended to the argument list, so argument order always
/// follows marker order in the output. Placeholders with no matching key stay as literal
/// text, and params the template never mentions are ignored.
///
/// Each name is substituted at its first occurrence only; a repeated `{name}` later in the
/// template is left untouched. Braces inside quoted strings, backtick identifiers and
/// comments are never treated as placeholders.
///
/// ```rust
/// use datamapper_sql::prelude::*;
///
/// let mut params = Params::new();
/// params.insert("id".into(), RowValues::Int(123));
/// let built = build_statement("SELECT * FROM users WHERE id = {id}", &params, PlaceholderStyle::MySql);
/// assert_eq!(built.sql, "SELECT * FROM users WHERE id = ?");
/// assert_eq!(built.params, vec![RowValues::Int(123)]);
/// ```
/// Returns a borrowed `Cow` when nothing was substituted.
#[must_use]
pub fn build_statement<'a>(
    template: &'a str,
    params: &Params,
    style: PlaceholderStyle,
) -> BuiltStatement<'a> {
    let mut out: Option<String> = None;
    let mut args: Vec<RowValues> = Vec::new();
    let mut used: HashSet<&str> = HashSet::new();
    let mut copied = 0;
    let mut state = State::Normal;
    let mut idx = 0;
    let bytes = template.as_bytes();

    while idx < bytes.len() {
        let b = bytes[idx];
        match state {
            State::Normal => match b {
                b'\'' => state = State::SingleQuoted,
                b'"' => state = State::DoubleQuoted,
                b'`' => state = State::Backticked,
                _ if is_line_comment_start(bytes, idx, style.dash_comment_needs_space()) => {
                    state = State::LineComment;
                }
                _ if style.hash_comments() && is_hash_comment_start(bytes, idx) => {
                    state = State::LineComment;
                }
                _ if is_block_comment_start(bytes, idx) => {
                    state = State::BlockComment;
                    idx += 1;
                }
                b'{' => {
                    if let Some((end, name)) = scan_placeholder(bytes, idx)
                        && !used.contains(name)
                        && let Some(value) = params.get(name)
                    {
                        let buf =
                            out.get_or_insert_with(|| String::with_capacity(template.len()));
                        buf.push_str(&template[copied..idx]);
                        args.push(value.clone());
                        style.push_marker(buf, args.len());
                        used.insert(name);
                        copied = end + 1;
                        idx = end;
                    }
                }
                _ => {}
            },
            State::SingleQuoted | State::DoubleQuoted | State::Backticked => {
                let quote = match state {
                    State::SingleQuoted => b'\'',
                    State::DoubleQuoted => b'"',
                    _ => b'`',
                };
                if b == b'\\' && quote != b'`' && style.backslash_escapes() {
                    idx += 1; // skip escaped char
                } else if b == quote {
                    if bytes.get(idx + 1) == Some(&quote) {
                        idx += 1; // doubled quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment => {
                if is_block_comment_end(bytes, idx) {
                    state = State::Normal;
                    idx += 1;
                }
            }
        }
        idx += 1;
    }

    match out {
        Some(mut buf) => {
            buf.push_str(&template[copied..]);
            BuiltStatement {
                sql: Cow::Owned(buf),
                params: args,
            }
        }
        None => BuiltStatement {
            sql: Cow::Borrowed(template),
            params: args,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, RowValues)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn single_parameter() {
        let p = params(&[("id", RowValues::Int(123))]);
        let built = build_statement("SELECT * FROM users WHERE id = {id}", &p, PlaceholderStyle::MySql);
        assert_eq!(built.sql, "SELECT * FROM users WHERE id = ?");
        assert_eq!(built.params, vec![RowValues::Int(123)]);
    }

    #[test]
    fn arguments_follow_template_order() {
        let p = params(&[
            ("email", RowValues::Text("john@example.com".into())),
            ("name", RowValues::Text("John".into())),
        ]);
        let built = build_statement(
            "SELECT * FROM users WHERE name = {name} AND email = {email}",
            &p,
            PlaceholderStyle::MySql,
        );
        assert_eq!(built.sql, "SELECT * FROM users WHERE name = ? AND email = ?");
        assert_eq!(
            built.params,
            vec![
                RowValues::Text("John".into()),
                RowValues::Text("john@example.com".into())
            ]
        );
    }

    #[test]
    fn no_parameters_borrows_template() {
        let built = build_statement("SELECT * FROM users", &Params::new(), PlaceholderStyle::MySql);
        assert!(matches!(built.sql, Cow::Borrowed(_)));
        assert!(built.params.is_empty());
    }

    #[test]
    fn unreferenced_params_are_dropped() {
        let p = params(&[("id", RowValues::Int(1)), ("other", RowValues::Int(2))]);
        let built = build_statement("SELECT * FROM t", &p, PlaceholderStyle::MySql);
        assert_eq!(built.sql, "SELECT * FROM t");
        assert!(built.params.is_empty());
    }

    #[test]
    fn unknown_placeholders_stay_literal() {
        let p = params(&[("id", RowValues::Int(1))]);
        let built = build_statement("SELECT {missing} FROM t WHERE id = {id}", &p, PlaceholderStyle::MySql);
        assert_eq!(built.sql, "SELECT {missing} FROM t WHERE id = ?");
        assert_eq!(built.params.len(), 1);
    }

    #[test]
    fn repeated_name_substitutes_first_occurrence_only() {
        let p = params(&[("v", RowValues::Int(9))]);
        let built = build_statement("SELECT {v}, {v}", &p, PlaceholderStyle::MySql);
        assert_eq!(built.sql, "SELECT ?, {v}");
        assert_eq!(built.params, vec![RowValues::Int(9)]);
    }

    #[test]
    fn sqlite_markers_are_numbered() {
        let p = params(&[("a", RowValues::Int(1)), ("b", RowValues::Int(2))]);
        let built = build_statement("UPDATE t SET x = {b} WHERE y = {a}", &p, PlaceholderStyle::Sqlite);
        assert_eq!(built.sql, "UPDATE t SET x = ?1 WHERE y = ?2");
        assert_eq!(built.params, vec![RowValues::Int(2), RowValues::Int(1)]);
    }

    #[test]
    fn skips_literals_and_comments() {
        let p = params(&[("id", RowValues::Int(1))]);
        let sql = "SELECT '{id}', `{id}` -- {id}\n/* {id} */ FROM t # {id}\nWHERE id = {id}";
        let built = build_statement(sql, &p, PlaceholderStyle::MySql);
        assert_eq!(
            built.sql,
            "SELECT '{id}', `{id}` -- {id}\n/* {id} */ FROM t # {id}\nWHERE id = ?"
        );
        assert_eq!(built.params.len(), 1);
    }

    #[test]
    fn bare_double_dash_is_a_comment_only_for_sqlite() {
        let p = params(&[("id", RowValues::Int(1))]);
        let sql = "SELECT * FROM users --{id}\n WHERE 1=1";
        let sqlite = build_statement(sql, &p, PlaceholderStyle::Sqlite);
        assert_eq!(sqlite.sql, sql);
        assert!(sqlite.params.is_empty());

        // MySQL reads `--{id}` as two minus signs followed by an expression.
        let mysql = build_statement(sql, &p, PlaceholderStyle::MySql);
        assert_eq!(mysql.sql, "SELECT * FROM users --?\n WHERE 1=1");
        assert_eq!(mysql.params, vec![RowValues::Int(1)]);
    }

    #[test]
    fn backslash_escaped_quote_does_not_end_literal() {
        let p = params(&[("id", RowValues::Int(1))]);
        let built = build_statement(r"SELECT 'it\'s {id}' WHERE id = {id}", &p, PlaceholderStyle::MySql);
        assert_eq!(built.sql, r"SELECT 'it\'s {id}' WHERE id = ?");
    }

    #[test]
    fn preserves_multibyte_text() {
        let p = params(&[("n", RowValues::Text("x".into()))]);
        let built = build_statement("SELECT 'é' AS ü WHERE n = {n} -- ñ", &p, PlaceholderStyle::MySql);
        assert_eq!(built.sql, "SELECT 'é' AS ü WHERE n = ? -- ñ");
    }

    #[test]
    fn stored_procedure_call() {
        let p = params(&[("user_id", RowValues::Int(5)), ("days", RowValues::Int(30))]);
        let built = build_statement("CALL purge_sessions({user_id}, {days})", &p, PlaceholderStyle::MySql);
        assert_eq!(built.sql, "CALL purge_sessions(?, ?)");
        assert_eq!(built.params, vec![RowValues::Int(5), RowValues::Int(30)]);
    }
}
