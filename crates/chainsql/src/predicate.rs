//! Keyed predicate maps for WHERE/HAVING clauses.
//!
//! A [`PredicateMap`] maps column names to operands and lowers every entry to
//! one comparison, joined by `AND` in column-name order:
//!
//! ```ignore
//! use chainsql::predicate::eq;
//!
//! eq().add("status", "active").add("id", vec![1, 2, 3]);
//! // id IN (?,?,?) AND status = ?
//! ```

use std::collections::BTreeMap;

use crate::error::{SqlError, SqlResult};
use crate::fragment::Fragment;
use crate::placeholder::placeholders;
use crate::value::{Arg, Value};

/// Comparison operator applied to every entry of a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// `col = ?`, `col IN (...)`, `col IS NULL`
    Eq,
    /// `col <> ?`, `col NOT IN (...)`, `col IS NOT NULL`
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    Like,
    NotLike,
    Ilike,
    NotIlike,
}

impl Op {
    fn sql(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "<>",
            Op::Lt => "<",
            Op::Lte => "<=",
            Op::Gt => ">",
            Op::Gte => ">=",
            Op::Like => "LIKE",
            Op::NotLike => "NOT LIKE",
            Op::Ilike => "ILIKE",
            Op::NotIlike => "NOT ILIKE",
        }
    }

    fn family(self) -> &'static str {
        match self {
            Op::Lt | Op::Lte | Op::Gt | Op::Gte => "less than or greater than",
            _ => "like",
        }
    }

    fn is_equality(self) -> bool {
        matches!(self, Op::Eq | Op::Ne)
    }
}

/// Column → operand map rendered as `AND`-joined comparisons.
#[derive(Debug, Clone)]
pub struct PredicateMap {
    op: Op,
    entries: BTreeMap<String, Arg>,
}

impl PredicateMap {
    pub fn new(op: Op) -> Self {
        Self {
            op,
            entries: BTreeMap::new(),
        }
    }

    /// Add (or replace) the operand for `column`.
    pub fn add(mut self, column: impl Into<String>, operand: impl Into<Arg>) -> Self {
        self.entries.insert(column.into(), operand.into());
        self
    }

    pub fn op(&self) -> Op {
        self.op
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Column names and operands in rendering order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Arg)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn lower_value(
        &self,
        column: &str,
        value: &Value,
        args: &mut Vec<Value>,
    ) -> SqlResult<String> {
        let op = self.op;
        let negated = op == Op::Ne;
        match value {
            Value::Null if op.is_equality() => {
                let is = if negated { "IS NOT" } else { "IS" };
                Ok(format!("{column} {is} NULL"))
            }
            Value::Array(items) if op.is_equality() => {
                if items.is_empty() {
                    return Ok(if negated { "(1=1)" } else { "(1=0)" }.to_string());
                }
                args.extend(items.iter().cloned());
                let in_op = if negated { "NOT IN" } else { "IN" };
                Ok(format!("{column} {in_op} ({})", placeholders(items.len())))
            }
            Value::Null => Err(SqlError::NullOperand(op.family())),
            Value::Array(_) => Err(SqlError::ListOperand(op.family())),
            other => {
                args.push(other.clone());
                Ok(format!("{column} {} ?", op.sql()))
            }
        }
    }
}

impl Fragment for PredicateMap {
    fn render_raw(&self) -> SqlResult<(String, Vec<Value>)> {
        if self.entries.is_empty() {
            let sql = if self.op.is_equality() { "(1=1)" } else { "" };
            return Ok((sql.to_string(), Vec::new()));
        }
        let mut parts = Vec::with_capacity(self.entries.len());
        let mut args = Vec::new();
        for (column, operand) in &self.entries {
            let part = match operand {
                Arg::Node(node) => {
                    let (sql, nested) = node.render_raw()?;
                    args.extend(nested);
                    format!("{column} {} {sql}", self.op.sql())
                }
                Arg::Value(value) => self.lower_value(column, value, &mut args)?,
            };
            parts.push(part);
        }
        Ok((parts.join(" AND "), args))
    }

    fn is_blank(&self) -> bool {
        self.entries.is_empty() && !self.op.is_equality()
    }
}

impl<K: Into<String>, V: Into<Arg>> FromIterator<(K, V)> for PredicateMap {
    /// Collects into an equality map.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(PredicateMap::new(Op::Eq), |map, (k, v)| map.add(k, v))
    }
}

/// `col = ?` / `col IN (...)` / `col IS NULL`
pub fn eq() -> PredicateMap {
    PredicateMap::new(Op::Eq)
}

/// `col <> ?` / `col NOT IN (...)` / `col IS NOT NULL`
pub fn ne() -> PredicateMap {
    PredicateMap::new(Op::Ne)
}

pub fn lt() -> PredicateMap {
    PredicateMap::new(Op::Lt)
}

pub fn lte() -> PredicateMap {
    PredicateMap::new(Op::Lte)
}

pub fn gt() -> PredicateMap {
    PredicateMap::new(Op::Gt)
}

pub fn gte() -> PredicateMap {
    PredicateMap::new(Op::Gte)
}

pub fn like() -> PredicateMap {
    PredicateMap::new(Op::Like)
}

pub fn not_like() -> PredicateMap {
    PredicateMap::new(Op::NotLike)
}

/// Case-insensitive LIKE (PostgreSQL)
pub fn ilike() -> PredicateMap {
    PredicateMap::new(Op::Ilike)
}

pub fn not_ilike() -> PredicateMap {
    PredicateMap::new(Op::NotIlike)
}
