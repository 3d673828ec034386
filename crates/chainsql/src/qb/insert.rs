//! INSERT / REPLACE statement builder.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::compose::Composer;
use crate::error::{SqlError, SqlResult};
use crate::fragment::Node;
use crate::placeholder::PlaceholderFormat;
use crate::qb::select::SelectBuilder;
use crate::runner::SharedRunner;
use crate::store::{Handle, List, kind};
use crate::value::{Arg, Value};

#[derive(Debug, Clone, Default)]
pub struct InsertData {
    pub(crate) format: PlaceholderFormat,
    pub(crate) runner: Option<SharedRunner>,
    pub(crate) timeout: Option<Duration>,
    pub(crate) prefixes: List<Node>,
    /// `INSERT` when empty.
    pub(crate) keyword: &'static str,
    pub(crate) options: List<String>,
    pub(crate) into: String,
    pub(crate) columns: List<String>,
    pub(crate) values: List<Vec<Arg>>,
    pub(crate) select: Option<Node>,
    pub(crate) suffixes: List<Node>,
}

kind!(InsertData as "InsertBuilder" {
    FORMAT: PlaceholderFormat => format,
    RUNNER: Option<SharedRunner> => runner,
    TIMEOUT: Option<Duration> => timeout,
    PREFIXES: List<Node> => prefixes,
    KEYWORD: &'static str => keyword,
    OPTIONS: List<String> => options,
    INTO: String => into,
    COLUMNS: List<String> => columns,
    VALUES: List<Vec<Arg>> => values,
    SELECT: Option<Node> => select,
    SUFFIXES: List<Node> => suffixes,
});

/// INSERT statement builder, filled either with value rows or a SELECT.
#[derive(Clone, Default)]
pub struct InsertBuilder(Handle<InsertData>);

impl_statement_fragment!(InsertBuilder, InsertData, subquery = false);

impl InsertBuilder {
    pub(crate) fn from_data(data: InsertData) -> Self {
        Self(Handle::from_state(data))
    }

    impl_statement_exec!(InsertData);

    fn assemble(&self) -> SqlResult<(String, Vec<Value>)> {
        let d = self.0.state();
        if d.into.is_empty() {
            return Err(SqlError::missing("insert statements must specify a table"));
        }
        if d.values.is_empty() && d.select.is_none() {
            return Err(SqlError::missing(
                "insert statements must have at least one set of values or select clause",
            ));
        }

        let mut out = Composer::new();
        if !d.prefixes.is_empty() {
            out.write_all(d.prefixes.iter(), " ");
            out.push_str(" ");
        }

        out.push_str(if d.keyword.is_empty() { "INSERT" } else { d.keyword });
        out.push_str(" ");
        if !d.options.is_empty() {
            out.push_str(&d.options.join(" "));
            out.push_str(" ");
        }

        out.push_str("INTO ");
        out.push_str(&d.into);
        out.push_str(" ");
        if !d.columns.is_empty() {
            out.push_str("(");
            out.push_str(&d.columns.join(","));
            out.push_str(") ");
        }

        match &d.select {
            Some(select) => {
                out.write(select, "");
            }
            None => write_rows(&mut out, &d.values),
        }

        out.section("", &d.suffixes, " ");
        out.finish()
    }

    pub fn prefix(&self, prefix: impl Into<Node>) -> Self {
        Self(self.0.append(InsertData::PREFIXES, prefix.into()))
    }

    pub fn remove_prefixes(&self) -> Self {
        Self(self.0.delete(InsertData::PREFIXES))
    }

    /// Add keywords between `INSERT` and `INTO`, e.g. `IGNORE`.
    pub fn options(&self, options: &[&str]) -> Self {
        Self(
            self.0
                .extend(InsertData::OPTIONS, options.iter().map(|o| o.to_string())),
        )
    }

    /// Set the target table, replacing the one given to `insert`.
    pub fn table(&self, table: &str) -> Self {
        Self(self.0.set(InsertData::INTO, table.to_string()))
    }

    pub fn columns(&self, columns: &[&str]) -> Self {
        Self(
            self.0
                .extend(InsertData::COLUMNS, columns.iter().map(|c| c.to_string())),
        )
    }

    /// Add one row of values. Fragment values are inlined instead of bound.
    pub fn values<A: Into<Arg>>(&self, row: impl IntoIterator<Item = A>) -> Self {
        let row: Vec<Arg> = row.into_iter().map(Into::into).collect();
        Self(self.0.append(InsertData::VALUES, row))
    }

    /// Replace columns and values with a single row taken from `clauses`,
    /// ordered by column name.
    pub fn set_map<K, V>(&self, clauses: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Arg>,
    {
        let sorted: BTreeMap<String, Arg> = clauses
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let (columns, row): (Vec<String>, Vec<Arg>) = sorted.into_iter().unzip();
        let next = self.0.set(InsertData::COLUMNS, List::from(columns));
        Self(next.set(InsertData::VALUES, List::from(vec![row])))
    }

    /// `INSERT INTO t (cols) SELECT ...`; takes precedence over value rows.
    pub fn select(&self, select: SelectBuilder) -> Self {
        Self(self.0.set(InsertData::SELECT, Some(Node::new(select))))
    }

    pub fn suffix(&self, suffix: impl Into<Node>) -> Self {
        Self(self.0.append(InsertData::SUFFIXES, suffix.into()))
    }

    pub fn remove_suffixes(&self) -> Self {
        Self(self.0.delete(InsertData::SUFFIXES))
    }
}

fn write_rows(out: &mut Composer, rows: &[Vec<Arg>]) {
    out.push_str("VALUES ");
    for (r, row) in rows.iter().enumerate() {
        if r > 0 {
            out.push_str(",");
        }
        out.push_str("(");
        for (i, value) in row.iter().enumerate() {
            if i > 0 {
                out.push_str(",");
            }
            match value {
                Arg::Node(node) => {
                    out.write(node, "");
                }
                Arg::Value(v) => {
                    out.push_arg(v.clone());
                }
            }
        }
        out.push_str(")");
    }
}
