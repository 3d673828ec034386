//! Expression fragments: templates, aliases, concatenation and AND/OR groups.

use crate::compose::Composer;
use crate::error::{SqlError, SqlResult};
use crate::fragment::{Fragment, Node};
use crate::value::{Arg, Value};

/// A SQL template with positional arguments.
///
/// Each `?` consumes the next argument. A value argument keeps its marker; a
/// fragment argument is rendered and spliced in place of the marker together
/// with its own arguments. `??` is a literal `?` and consumes nothing.
///
/// ```ignore
/// let e = Expr::new("count(?)", [Expr::new("nullif(a,?)", ["b"])]);
/// assert_eq!(e.render()?.0, "count(nullif(a,?))");
/// ```
#[derive(Debug, Clone)]
pub struct Expr {
    sql: String,
    args: Vec<Arg>,
}

impl Expr {
    pub fn new<A: Into<Arg>>(sql: impl Into<String>, args: impl IntoIterator<Item = A>) -> Self {
        Self {
            sql: sql.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// A template without arguments.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            args: Vec::new(),
        }
    }

    /// Append one more argument.
    pub fn arg(mut self, arg: impl Into<Arg>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Prepend `keyword ` to the template, keeping the arguments.
    pub(crate) fn prefixed(self, keyword: &str) -> Self {
        Self {
            sql: format!("{keyword} {}", self.sql),
            args: self.args,
        }
    }
}

impl Fragment for Expr {
    fn render_raw(&self) -> SqlResult<(String, Vec<Value>)> {
        if self.args.iter().all(|a| a.as_node().is_none()) {
            let args = self
                .args
                .iter()
                .filter_map(|a| match a {
                    Arg::Value(v) => Some(v.clone()),
                    Arg::Node(_) => None,
                })
                .collect();
            return Ok((self.sql.clone(), args));
        }

        let mut sql = String::with_capacity(self.sql.len());
        let mut args = Vec::new();
        let mut pending = self.args.iter();
        let mut next = pending.next();
        let mut rest = self.sql.as_str();

        while let Some(arg) = next {
            let Some(pos) = rest.find('?') else { break };
            let tail = &rest[pos + 1..];
            if tail.starts_with('?') {
                sql.push_str(&rest[..pos + 2]);
                rest = &rest[pos + 2..];
                continue;
            }
            sql.push_str(&rest[..pos]);
            match arg {
                Arg::Node(node) => {
                    let (nested_sql, nested_args) = node.render_raw()?;
                    sql.push_str(&nested_sql);
                    args.extend(nested_args);
                }
                Arg::Value(v) => {
                    sql.push('?');
                    args.push(v.clone());
                }
            }
            rest = tail;
            next = pending.next();
        }
        sql.push_str(rest);

        for leftover in next.into_iter().chain(pending) {
            match leftover {
                Arg::Value(v) => args.push(v.clone()),
                Arg::Node(_) => return Err(SqlError::UnusedFragment),
            }
        }
        Ok((sql, args))
    }

    fn is_blank(&self) -> bool {
        self.sql.is_empty() && self.args.is_empty()
    }
}

impl From<&str> for Expr {
    fn from(sql: &str) -> Self {
        Expr::raw(sql)
    }
}

impl From<String> for Expr {
    fn from(sql: String) -> Self {
        Expr::raw(sql)
    }
}

/// Build a template fragment: `expr("a = ?", [1])`.
pub fn expr<A: Into<Arg>>(sql: impl Into<String>, args: impl IntoIterator<Item = A>) -> Expr {
    Expr::new(sql, args)
}

/// Build a `Vec<Arg>` from mixed values and fragments.
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Arg>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::Arg::from($arg)),+]
    };
}

/// `(sql) AS alias`
#[derive(Debug, Clone)]
pub struct Alias {
    node: Node,
    alias: String,
}

impl Fragment for Alias {
    fn render_raw(&self) -> SqlResult<(String, Vec<Value>)> {
        let (sql, args) = self.node.render_raw()?;
        Ok((format!("({sql}) AS {}", self.alias), args))
    }
}

/// Wrap a fragment as `(fragment) AS alias`.
pub fn alias(node: impl Into<Node>, alias: impl Into<String>) -> Alias {
    Alias {
        node: node.into(),
        alias: alias.into(),
    }
}

/// Concatenation of string literals and fragments without separators.
#[derive(Debug, Clone)]
pub struct Concat {
    parts: Vec<Arg>,
}

impl Fragment for Concat {
    fn render_raw(&self) -> SqlResult<(String, Vec<Value>)> {
        let mut sql = String::new();
        let mut args = Vec::new();
        for part in &self.parts {
            match part {
                Arg::Value(Value::Text(text)) => sql.push_str(text),
                Arg::Node(node) => {
                    let (part_sql, part_args) = node.render_raw()?;
                    sql.push_str(&part_sql);
                    args.extend(part_args);
                }
                Arg::Value(other) => return Err(SqlError::InvalidConcatPart(other.to_string())),
            }
        }
        Ok((sql, args))
    }
}

/// Concatenate literals and fragments: `concat(args!["COALESCE(a,", e, ")"])`.
pub fn concat(parts: impl IntoIterator<Item = Arg>) -> Concat {
    Concat {
        parts: parts.into_iter().collect(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Connective {
    And,
    Or,
}

/// Fragments joined by `AND` or `OR` inside parentheses.
///
/// An empty group renders `(1=1)` for AND and `(1=0)` for OR.
#[derive(Debug, Clone)]
pub struct Conjunction {
    connective: Connective,
    parts: Vec<Node>,
}

impl Conjunction {
    /// Add one more operand.
    pub fn push(mut self, node: impl Into<Node>) -> Self {
        self.parts.push(node.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl Fragment for Conjunction {
    fn render_raw(&self) -> SqlResult<(String, Vec<Value>)> {
        let (sep, empty) = match self.connective {
            Connective::And => (" AND ", "(1=1)"),
            Connective::Or => (" OR ", "(1=0)"),
        };
        if self.parts.is_empty() {
            return Ok((empty.to_string(), Vec::new()));
        }
        let mut inner = Composer::new();
        inner.write_all(&self.parts, sep);
        let (sql, args) = inner.finish()?;
        if sql.is_empty() {
            return Ok((sql, args));
        }
        Ok((format!("({sql})"), args))
    }
}

/// `(a AND b AND ...)`
pub fn and<N: Into<Node>>(parts: impl IntoIterator<Item = N>) -> Conjunction {
    Conjunction {
        connective: Connective::And,
        parts: parts.into_iter().map(Into::into).collect(),
    }
}

/// `(a OR b OR ...)`
pub fn or<N: Into<Node>>(parts: impl IntoIterator<Item = N>) -> Conjunction {
    Conjunction {
        connective: Connective::Or,
        parts: parts.into_iter().map(Into::into).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes;
    use crate::predicate::eq;

    fn raw(node: impl Fragment) -> (String, Vec<Value>) {
        node.render_raw().unwrap()
    }

    #[test]
    fn test_values_only_pass_through() {
        let (sql, args) = raw(expr("a = ? AND b ?? c", args![1, "x"]));
        assert_eq!(sql, "a = ? AND b ?? c");
        assert_eq!(args, vec![Value::Int(1), Value::from("x")]);
    }

    #[test]
    fn test_recursion() {
        let (sql, args) = raw(expr("count(?)", [expr("nullif(a,?)", ["b"])]));
        assert_eq!(sql, "count(nullif(a,?))");
        assert_eq!(args, vec![Value::from("b")]);

        let (sql, args) = raw(expr("extract(? from ?)", args![Expr::raw("epoch"), "2001-02-03"]));
        assert_eq!(sql, "extract(epoch from ?)");
        assert_eq!(args, vec![Value::from("2001-02-03")]);

        let on = and(nodes![
            eq().add("id", 1),
            "NOT c1",
            expr("? @@ ?", ["x", "y"]),
        ]);
        let (sql, args) = raw(expr("JOIN t1 ON ?", [on]));
        assert_eq!(sql, "JOIN t1 ON (id = ? AND NOT c1 AND ? @@ ?)");
        assert_eq!(
            args,
            vec![Value::Int(1), Value::from("x"), Value::from("y")]
        );
    }

    #[test]
    fn test_escape_survives_nesting() {
        let (sql, args) = raw(expr("? AND a ?? b", [expr("c = ?", [1])]));
        assert_eq!(sql, "c = ? AND a ?? b");
        assert_eq!(args, vec![Value::Int(1)]);
        assert_eq!(
            expr("? AND a ?? b", [expr("c = ?", [1])]).render().unwrap().0,
            "c = ? AND a ? b"
        );
    }

    #[test]
    fn test_leftover_fragment_is_an_error() {
        let err = expr("count(??)", [Expr::raw("x")]).render_raw().unwrap_err();
        assert!(matches!(err, SqlError::UnusedFragment));
    }

    #[test]
    fn test_leftover_values_are_kept() {
        let (sql, args) = raw(expr("f(?)", args![Expr::raw("x"), 2]));
        assert_eq!(sql, "f(x)");
        assert_eq!(args, vec![Value::Int(2)]);
    }

    #[test]
    fn test_blank() {
        assert!(Expr::raw("").is_blank());
        assert!(!expr("", [1]).is_blank());
    }

    #[test]
    fn test_alias() {
        let (sql, args) = raw(alias(expr("b IN (?,?)", [1, 2]), "b_alias"));
        assert_eq!(sql, "(b IN (?,?)) AS b_alias");
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_concat() {
        let c = concat(args!["COALESCE(name,", expr("CONCAT(?,' ',?)", ["f", "l"]), ")"]);
        let (sql, args) = raw(c);
        assert_eq!(sql, "COALESCE(name,CONCAT(?,' ',?))");
        assert_eq!(args, vec![Value::from("f"), Value::from("l")]);
    }

    #[test]
    fn test_concat_rejects_non_string_values() {
        let err = concat(args!["prefix", 123, "suffix"]).render().unwrap_err();
        assert_eq!(err.to_string(), "123 is not a string or SQL fragment");
    }

    #[test]
    fn test_empty_groups() {
        assert_eq!(raw(and(Vec::<Node>::new())), ("(1=1)".to_string(), vec![]));
        assert_eq!(raw(or(Vec::<Node>::new())), ("(1=0)".to_string(), vec![]));
    }

    #[test]
    fn test_nested_groups() {
        let g = or(nodes![expr("j = ?", [10]), and(nodes![eq().add("k", 11), "true"])]);
        let (sql, args) = raw(g);
        assert_eq!(sql, "(j = ? OR (k = ? AND true))");
        assert_eq!(args, vec![Value::Int(10), Value::Int(11)]);
    }

    #[test]
    fn test_group_skips_empty_parts() {
        let (sql, _) = raw(and(nodes!["a", "", "b"]).push("c"));
        assert_eq!(sql, "(a AND b AND c)");
    }
}
