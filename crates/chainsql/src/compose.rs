//! Sequential rendering of fragment lists.

use crate::error::{SqlError, SqlResult};
use crate::fragment::Node;
use crate::value::Value;

/// Accumulates SQL text and arguments from a sequence of fragments.
///
/// The first error is sticky: once a write fails every later write is a
/// no-op and [`Composer::finish`] returns that error, discarding partial
/// output. Fragments are written in raw form so nested statements keep their
/// abstract markers.
#[derive(Debug, Default)]
pub struct Composer {
    sql: String,
    args: Vec<Value>,
    error: Option<SqlError>,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Append literal scaffolding.
    pub fn push_str(&mut self, sql: &str) -> &mut Self {
        if self.error.is_none() {
            self.sql.push_str(sql);
        }
        self
    }

    /// Append a bound argument together with its `?` marker.
    pub fn push_arg(&mut self, value: Value) -> &mut Self {
        if self.error.is_none() {
            self.sql.push('?');
            self.args.push(value);
        }
        self
    }

    /// Render `node`; skip it when it produced no text, otherwise append it
    /// after `sep` (omitted while the buffer is still empty).
    pub fn write(&mut self, node: &Node, sep: &str) -> &mut Self {
        if self.error.is_some() {
            return self;
        }
        match node.render_raw() {
            Ok((sql, args)) => {
                if sql.is_empty() {
                    return self;
                }
                if !self.sql.is_empty() {
                    self.sql.push_str(sep);
                }
                self.sql.push_str(&sql);
                self.args.extend(args);
            }
            Err(err) => self.fail(err),
        }
        self
    }

    /// Write every node in order, joined by `sep`. Nodes rendering to empty
    /// text are skipped along with their separator.
    pub fn write_all<'a>(
        &mut self,
        nodes: impl IntoIterator<Item = &'a Node>,
        sep: &str,
    ) -> &mut Self {
        let mut wrote = false;
        for node in nodes {
            if self.error.is_some() {
                break;
            }
            match node.render_raw() {
                Ok((sql, args)) => {
                    if sql.is_empty() {
                        continue;
                    }
                    if wrote {
                        self.sql.push_str(sep);
                    }
                    self.sql.push_str(&sql);
                    self.args.extend(args);
                    wrote = true;
                }
                Err(err) => self.fail(err),
            }
        }
        self
    }

    /// Write a clause: `keyword` followed by `nodes` joined by `sep`, preceded
    /// by a single space when the buffer is non-empty. Nothing is written when
    /// the nodes produce no text.
    pub fn section(&mut self, keyword: &str, nodes: &[Node], sep: &str) -> &mut Self {
        if nodes.is_empty() || self.error.is_some() {
            return self;
        }
        let mut inner = Composer::new();
        inner.write_all(nodes, sep);
        let (sql, args) = match inner.finish() {
            Ok(rendered) => rendered,
            Err(err) => {
                self.fail(err);
                return self;
            }
        };
        if sql.is_empty() {
            return self;
        }
        if !self.sql.is_empty() {
            self.sql.push(' ');
        }
        if !keyword.is_empty() {
            self.sql.push_str(keyword);
            self.sql.push(' ');
        }
        self.sql.push_str(&sql);
        self.args.extend(args);
        self
    }

    /// Record an error; later writes become no-ops.
    pub fn fail(&mut self, err: SqlError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    pub fn finish(self) -> SqlResult<(String, Vec<Value>)> {
        match self.error {
            Some(err) => Err(err),
            None => Ok((self.sql, self.args)),
        }
    }
}

/// Render `nodes` joined by `sep` as one raw fragment.
pub fn join(nodes: &[Node], sep: &str) -> SqlResult<(String, Vec<Value>)> {
    let mut out = Composer::new();
    for node in nodes {
        out.write(node, sep);
    }
    out.finish()
}
