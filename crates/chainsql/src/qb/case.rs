//! CASE expressions.

use std::fmt;

use crate::compose::Composer;
use crate::error::{SqlError, SqlResult};
use crate::fragment::{Fragment, Node};
use crate::store::{Handle, List, kind};
use crate::value::Value;

#[derive(Debug, Clone, Default)]
pub struct CaseData {
    what: Option<Node>,
    when_parts: List<(Node, Node)>,
    else_part: Option<Node>,
}

kind!(CaseData as "CaseBuilder" {
    WHAT: Option<Node> => what,
    WHEN_PARTS: List<(Node, Node)> => when_parts,
    ELSE_PART: Option<Node> => else_part,
});

/// `CASE [value] WHEN ... THEN ... [ELSE ...] END`
///
/// Operands are fragments, so plain strings are written as SQL:
///
/// ```ignore
/// let c = case_value("number").when("1", "one").else_(expr("?", ["other"]));
/// // CASE number WHEN 1 THEN one ELSE ? END
/// ```
#[derive(Clone, Default)]
pub struct CaseBuilder(Handle<CaseData>);

impl fmt::Debug for CaseBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl CaseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value compared against each WHEN operand.
    pub fn what(&self, what: impl Into<Node>) -> Self {
        Self(self.0.set(CaseData::WHAT, Some(what.into())))
    }

    pub fn when(&self, when: impl Into<Node>, then: impl Into<Node>) -> Self {
        Self(self.0.append(CaseData::WHEN_PARTS, (when.into(), then.into())))
    }

    pub fn else_(&self, value: impl Into<Node>) -> Self {
        Self(self.0.set(CaseData::ELSE_PART, Some(value.into())))
    }
}

impl Fragment for CaseBuilder {
    fn render_raw(&self) -> SqlResult<(String, Vec<Value>)> {
        let d = self.0.state();
        if d.when_parts.is_empty() {
            return Err(SqlError::missing(
                "case expression must contain at least one WHEN clause",
            ));
        }

        let mut out = Composer::new();
        out.push_str("CASE");
        if let Some(what) = &d.what {
            out.write(what, " ");
        }
        for (when, then) in d.when_parts.iter() {
            out.push_str(" WHEN");
            out.write(when, " ");
            out.push_str(" THEN");
            out.write(then, " ");
        }
        if let Some(else_part) = &d.else_part {
            out.push_str(" ELSE");
            out.write(else_part, " ");
        }
        out.push_str(" END");
        out.finish()
    }
}
