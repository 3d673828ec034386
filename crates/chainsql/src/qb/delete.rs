//! DELETE statement builder.

use std::time::Duration;

use crate::compose::Composer;
use crate::error::{SqlError, SqlResult};
use crate::fragment::Node;
use crate::placeholder::PlaceholderFormat;
use crate::runner::SharedRunner;
use crate::store::{Handle, List, kind};
use crate::value::Value;

#[derive(Debug, Clone, Default)]
pub struct DeleteData {
    pub(crate) format: PlaceholderFormat,
    pub(crate) runner: Option<SharedRunner>,
    pub(crate) timeout: Option<Duration>,
    pub(crate) prefixes: List<Node>,
    pub(crate) from: String,
    pub(crate) where_parts: List<Node>,
    pub(crate) order_bys: List<String>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
    pub(crate) suffixes: List<Node>,
}

kind!(DeleteData as "DeleteBuilder" {
    FORMAT: PlaceholderFormat => format,
    RUNNER: Option<SharedRunner> => runner,
    TIMEOUT: Option<Duration> => timeout,
    PREFIXES: List<Node> => prefixes,
    FROM: String => from,
    WHERE_PARTS: List<Node> => where_parts,
    ORDER_BYS: List<String> => order_bys,
    LIMIT: Option<u64> => limit,
    OFFSET: Option<u64> => offset,
    SUFFIXES: List<Node> => suffixes,
});

#[derive(Clone, Default)]
pub struct DeleteBuilder(Handle<DeleteData>);

impl_statement_fragment!(DeleteBuilder, DeleteData, subquery = false);

impl DeleteBuilder {
    pub(crate) fn from_data(data: DeleteData) -> Self {
        Self(Handle::from_state(data))
    }

    impl_statement_exec!(DeleteData);

    fn assemble(&self) -> SqlResult<(String, Vec<Value>)> {
        let d = self.0.state();
        if d.from.is_empty() {
            return Err(SqlError::missing("delete statements must specify a From table"));
        }

        let mut out = Composer::new();
        if !d.prefixes.is_empty() {
            out.write_all(d.prefixes.iter(), " ");
            out.push_str(" ");
        }

        out.push_str("DELETE FROM ");
        out.push_str(&d.from);

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
        Self(self.0.append(DeleteData::PREFIXES, prefix.into()))
    }

    pub fn remove_prefixes(&self) -> Self {
        Self(self.0.delete(DeleteData::PREFIXES))
    }

    pub fn from(&self, from: &str) -> Self {
        Self(self.0.set(DeleteData::FROM, from.to_string()))
    }

    pub fn where_(&self, pred: impl Into<Node>) -> Self {
        let pred: Node = pred.into();
        if pred.is_blank() {
            return self.clone();
        }
        Self(self.0.append(DeleteData::WHERE_PARTS, pred))
    }

    pub fn remove_where(&self) -> Self {
        Self(self.0.delete(DeleteData::WHERE_PARTS))
    }

    pub fn order_by(&self, order_bys: &[&str]) -> Self {
        Self(
            self.0
                .extend(DeleteData::ORDER_BYS, order_bys.iter().map(|o| o.to_string())),
        )
    }

    pub fn limit(&self, limit: u64) -> Self {
        Self(self.0.set(DeleteData::LIMIT, Some(limit)))
    }

    pub fn offset(&self, offset: u64) -> Self {
        Self(self.0.set(DeleteData::OFFSET, Some(offset)))
    }

    /// `RETURNING ...` and similar trailing clauses.
    pub fn suffix(&self, suffix: impl Into<Node>) -> Self {
        Self(self.0.append(DeleteData::SUFFIXES, suffix.into()))
    }

    pub fn remove_suffixes(&self) -> Self {
        Self(self.0.delete(DeleteData::SUFFIXES))
    }
}
