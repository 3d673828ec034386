//! The fragment contract shared by every SQL building block.

use std::fmt;
use std::sync::Arc;

use crate::error::SqlResult;
use crate::expr::Expr;
use crate::placeholder::PlaceholderFormat;
use crate::value::Value;

/// Anything that lowers to SQL text plus its positional arguments.
///
/// `render_raw` produces text with abstract `?` markers and is what nested
/// composition uses, so that numbering is decided once by the outermost
/// statement. `render` is the caller-facing form with markers rewritten for
/// the target backend; statements override it with their configured
/// [`PlaceholderFormat`].
///
/// Rendering must be pure: repeated calls yield identical output.
pub trait Fragment: fmt::Debug + Send + Sync {
    /// Render with abstract `?` markers (escapes `??` left in place).
    fn render_raw(&self) -> SqlResult<(String, Vec<Value>)>;

    /// Render for execution.
    fn render(&self) -> SqlResult<(String, Vec<Value>)> {
        let (sql, args) = self.render_raw()?;
        Ok((PlaceholderFormat::Question.replace(&sql), args))
    }

    /// A blank fragment renders nothing and is skipped by WHERE/HAVING.
    fn is_blank(&self) -> bool {
        false
    }

    /// True for full statements, which need parentheses when used as a
    /// value (for example on the right of `SET col =`).
    fn is_subquery(&self) -> bool {
        false
    }
}

/// A shared, type-erased fragment.
#[derive(Clone)]
pub struct Node(Arc<dyn Fragment>);

impl Node {
    pub fn new(fragment: impl Fragment + 'static) -> Self {
        Node(Arc::new(fragment))
    }

    pub fn render(&self) -> SqlResult<(String, Vec<Value>)> {
        self.0.render()
    }

    pub fn render_raw(&self) -> SqlResult<(String, Vec<Value>)> {
        self.0.render_raw()
    }

    pub fn is_blank(&self) -> bool {
        self.0.is_blank()
    }

    pub fn is_subquery(&self) -> bool {
        self.0.is_subquery()
    }

    pub fn as_fragment(&self) -> &dyn Fragment {
        &*self.0
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl<F: Fragment + 'static> From<F> for Node {
    fn from(fragment: F) -> Self {
        Node::new(fragment)
    }
}

impl From<&str> for Node {
    fn from(sql: &str) -> Self {
        Node::new(Expr::raw(sql))
    }
}

impl From<String> for Node {
    fn from(sql: String) -> Self {
        Node::new(Expr::raw(sql))
    }
}

/// Build a `Vec<Node>` from a mix of strings and fragments.
#[macro_export]
macro_rules! nodes {
    () => {
        ::std::vec::Vec::<$crate::Node>::new()
    };
    ($($node:expr),+ $(,)?) => {
        ::std::vec![$($crate::Node::from($node)),+]
    };
}
