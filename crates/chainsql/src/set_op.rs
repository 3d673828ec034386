//! UNION / INTERSECT / EXCEPT over statements.

use crate::compose::Composer;
use crate::error::{SqlError, SqlResult};
use crate::fragment::{Fragment, Node};
use crate::value::Value;

/// Statements joined by a set operator: `SELECT 1 UNION ALL SELECT 2`.
#[derive(Debug, Clone)]
pub struct SetOp {
    keyword: &'static str,
    parts: Vec<Node>,
}

impl SetOp {
    fn new<N: Into<Node>>(keyword: &'static str, parts: impl IntoIterator<Item = N>) -> Self {
        Self {
            keyword,
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }

    pub fn keyword(&self) -> &'static str {
        self.keyword
    }
}

impl Fragment for SetOp {
    fn render_raw(&self) -> SqlResult<(String, Vec<Value>)> {
        if self.parts.is_empty() {
            return Err(SqlError::missing(format!("{} has no parts", self.keyword)));
        }
        let sep = format!(" {} ", self.keyword);
        let mut out = Composer::new();
        out.write_all(&self.parts, &sep);
        out.finish()
    }

    fn is_subquery(&self) -> bool {
        true
    }
}

pub fn union_all<N: Into<Node>>(parts: impl IntoIterator<Item = N>) -> SetOp {
    SetOp::new("UNION ALL", parts)
}

pub fn union_distinct<N: Into<Node>>(parts: impl IntoIterator<Item = N>) -> SetOp {
    SetOp::new("UNION DISTINCT", parts)
}

pub fn intersect_all<N: Into<Node>>(parts: impl IntoIterator<Item = N>) -> SetOp {
    SetOp::new("INTERSECT ALL", parts)
}

pub fn intersect_distinct<N: Into<Node>>(parts: impl IntoIterator<Item = N>) -> SetOp {
    SetOp::new("INTERSECT DISTINCT", parts)
}

pub fn except_all<N: Into<Node>>(parts: impl IntoIterator<Item = N>) -> SetOp {
    SetOp::new("EXCEPT ALL", parts)
}

pub fn except_distinct<N: Into<Node>>(parts: impl IntoIterator<Item = N>) -> SetOp {
    SetOp::new("EXCEPT DISTINCT", parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::expr;
    use crate::nodes;
    use crate::qb::select;

    type Ctor = fn(Vec<Node>) -> SetOp;

    fn all_ops() -> Vec<(&'static str, Ctor)> {
        vec![
            ("UNION ALL", |p| union_all(p)),
            ("UNION DISTINCT", |p| union_distinct(p)),
            ("INTERSECT ALL", |p| intersect_all(p)),
            ("INTERSECT DISTINCT", |p| intersect_distinct(p)),
            ("EXCEPT ALL", |p| except_all(p)),
            ("EXCEPT DISTINCT", |p| except_distinct(p)),
        ]
    }

    #[test]
    fn test_no_parts() {
        for (sep, ctor) in all_ops() {
            let err = ctor(vec![]).render().unwrap_err();
            assert_eq!(err.to_string(), format!("{sep} has no parts"));
        }
    }

    #[test]
    fn test_single_part() {
        for (_, ctor) in all_ops() {
            let one = select(&["1"]).column(expr("?", [2]));
            let (sql, args) = ctor(nodes![one]).render().unwrap();
            assert_eq!(sql, "SELECT 1, ?");
            assert_eq!(args, vec![Value::Int(2)]);
        }
    }

    #[test]
    fn test_parts_are_joined() {
        for (sep, ctor) in all_ops() {
            let (sql, args) = ctor(nodes![
                select(&[]).column(expr("?", [1])),
                select(&[]).column(expr("?", [2])),
            ])
            .render()
            .unwrap();
            assert_eq!(sql, format!("SELECT ? {sep} SELECT ?"));
            assert_eq!(args, vec![Value::Int(1), Value::Int(2)]);

            let (sql, _) = ctor(nodes![
                select(&["1"]).from("a"),
                select(&["2"]).from("b"),
                select(&["3"]).from("c"),
            ])
            .render()
            .unwrap();
            assert_eq!(sql, format!("SELECT 1 FROM a {sep} SELECT 2 FROM b {sep} SELECT 3 FROM c"));
        }
    }

    #[test]
    fn test_as_subquery() {
        for (sep, ctor) in all_ops() {
            let inner = ctor(nodes![
                select(&[]).column(expr("?", [1])),
                select(&[]).column(expr("?", [2])),
            ]);
            let (sql, args) = select(&["*"]).from_select(inner, "s").render().unwrap();
            assert_eq!(sql, format!("SELECT * FROM (SELECT ? {sep} SELECT ?) AS s"));
            assert_eq!(args, vec![Value::Int(1), Value::Int(2)]);
        }
    }

    #[test]
    fn test_set_value_is_parenthesized() {
        let (sql, _) = crate::qb::update("t")
            .set("c", union_all(nodes![select(&["1"]), select(&["2"])]))
            .to_sql()
            .unwrap();
        assert_eq!(sql, "UPDATE t SET c = (SELECT 1 UNION ALL SELECT 2)");
    }

    #[test]
    fn test_numbering_spans_parts() {
        let op = union_all(nodes![
            select(&["a"]).from("t").where_(expr("x = ?", [1])),
            select(&["a"]).from("u").where_(expr("y = ?", [2])),
        ]);
        let (sql, _) = select(&["*"])
            .from_select(op, "s")
            .placeholder_format(crate::PlaceholderFormat::Dollar)
            .render()
            .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM (SELECT a FROM t WHERE x = $1 UNION ALL SELECT a FROM u WHERE y = $2) AS s"
        );
    }
}
