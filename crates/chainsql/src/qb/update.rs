//! UPDATE statement builder.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::compose::Composer;
use crate::error::{SqlError, SqlResult};
use crate::expr::alias;
use crate::fragment::Node;
use crate::placeholder::PlaceholderFormat;
use crate::runner::SharedRunner;
use crate::store::{Handle, List, kind};
use crate::value::{Arg, Value};

#[derive(Debug, Clone, Default)]
pub struct UpdateData {
    pub(crate) format: PlaceholderFormat,
    pub(crate) runner: Option<SharedRunner>,
    pub(crate) timeout: Option<Duration>,
    pub(crate) prefixes: List<Node>,
    pub(crate) table: String,
    pub(crate) set_clauses: List<(String, Arg)>,
    pub(crate) from: Option<Node>,
    pub(crate) where_parts: List<Node>,
    pub(crate) order_bys: List<String>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
    pub(crate) suffixes: List<Node>,
}

kind!(UpdateData as "UpdateBuilder" {
    FORMAT: PlaceholderFormat => format,
    RUNNER: Option<SharedRunner> => runner,
    TIMEOUT: Option<Duration> => timeout,
    PREFIXES: List<Node> => prefixes,
    TABLE: String => table,
    SET_CLAUSES: List<(String, Arg)> => set_clauses,
    FROM: Option<Node> => from,
    WHERE_PARTS: List<Node> => where_parts,
    ORDER_BYS: List<String> => order_bys,
    LIMIT: Option<u64> => limit,
    OFFSET: Option<u64> => offset,
    SUFFIXES: List<Node> => suffixes,
});

#[derive(Clone, Default)]
pub struct UpdateBuilder(Handle<UpdateData>);

impl_statement_fragment!(UpdateBuilder, UpdateData, subquery = false);

impl UpdateBuilder {
    pub(crate) fn from_data(data: UpdateData) -> Self {
        Self(Handle::from_state(data))
    }

    impl_statement_exec!(UpdateData);

    fn assemble(&self) -> SqlResult<(String, Vec<Value>)> {
        let d = self.0.state();
        if d.table.is_empty() {
            return Err(SqlError::missing("update statements must specify a table"));
        }
        if d.set_clauses.is_empty() {
            return Err(SqlError::missing(
                "update statements must have at least one Set clause",
            ));
        }

        let mut out = Composer::new();
        if !d.prefixes.is_empty() {
            out.write_all(d.prefixes.iter(), " ");
            out.push_str(" ");
        }

        out.push_str("UPDATE ");
        out.push_str(&d.table);
        out.push_str(" SET ");
        for (i, (column, value)) in d.set_clauses.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(column);
            out.push_str(" = ");
            match value {
                Arg::Node(node) if node.is_subquery() => {
                    out.push_str("(");
                    out.write(node, "");
                    out.push_str(")");
                }
                Arg::Node(node) => {
                    out.write(node, "");
                }
                Arg::Value(v) => {
                    out.push_arg(v.clone());
                }
            }
        }

        if let Some(from) = &d.from {
            out.push_str(" FROM ");
            out.write(from, "");
        }

        out.section("WHERE", &d.where_parts, " AND ");
        if !d.order_bys.is_empty() {
            out.push_str(" ORDER BY ");
            out.push_str(&d.order_bys.join(", "));
        }
        if let Some(limit) = d.limit {
            out.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = d.offset {
            out.push_str(&format!(" OFFSET {offset}"));
        }

        out.section("", &d.suffixes, " ");
        out.finish()
    }

    pub fn prefix(&self, prefix: impl Into<Node>) -> Self {
        Self(self.0.append(UpdateData::PREFIXES, prefix.into()))
    }

    pub fn remove_prefixes(&self) -> Self {
        Self(self.0.delete(UpdateData::PREFIXES))
    }

    pub fn table(&self, table: &str) -> Self {
        Self(self.0.set(UpdateData::TABLE, table.to_string()))
    }

    /// Add `column = value`. A nested SELECT is wrapped in parentheses; other
    /// fragments are inlined; plain values are bound.
    pub fn set(&self, column: &str, value: impl Into<Arg>) -> Self {
        Self(
            self.0
                .append(UpdateData::SET_CLAUSES, (column.to_string(), value.into())),
        )
    }

    /// Add one SET clause per entry, ordered by column name.
    pub fn set_map<K, V>(&self, clauses: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Arg>,
    {
        let sorted: BTreeMap<String, Arg> = clauses
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self(self.0.extend(UpdateData::SET_CLAUSES, sorted))
    }

    pub fn from(&self, from: &str) -> Self {
        Self(self.0.set(UpdateData::FROM, Some(Node::from(from))))
    }

    /// `FROM (subquery) AS alias`
    pub fn from_select(&self, from: impl Into<Node>, alias_name: &str) -> Self {
        let from = alias(from, alias_name);
        Self(self.0.set(UpdateData::FROM, Some(Node::new(from))))
    }

    pub fn where_(&self, pred: impl Into<Node>) -> Self {
        let pred: Node = pred.into();
        if pred.is_blank() {
            return self.clone();
        }
        Self(self.0.append(UpdateData::WHERE_PARTS, pred))
    }

    pub fn remove_where(&self) -> Self {
        Self(self.0.delete(UpdateData::WHERE_PARTS))
    }

    pub fn order_by(&self, order_bys: &[&str]) -> Self {
        Self(
            self.0
                .extend(UpdateData::ORDER_BYS, order_bys.iter().map(|o| o.to_string())),
        )
    }

    pub fn limit(&self, limit: u64) -> Self {
        Self(self.0.set(UpdateData::LIMIT, Some(limit)))
    }

    pub fn remove_limit(&self) -> Self {
        Self(self.0.delete(UpdateData::LIMIT))
    }

    pub fn offset(&self, offset: u64) -> Self {
        Self(self.0.set(UpdateData::OFFSET, Some(offset)))
    }

    pub fn remove_offset(&self) -> Self {
        Self(self.0.delete(UpdateData::OFFSET))
    }

    pub fn suffix(&self, suffix: impl Into<Node>) -> Self {
        Self(self.0.append(UpdateData::SUFFIXES, suffix.into()))
    }

    pub fn remove_suffixes(&self) -> Self {
        Self(self.0.delete(UpdateData::SUFFIXES))
    }
}
