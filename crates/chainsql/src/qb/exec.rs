/// Implement [`Fragment`](crate::Fragment) for a statement builder.
///
/// The builder must provide `fn assemble(&self) -> SqlResult<(String, Vec<Value>)>`
/// producing raw SQL; `render` rewrites its markers with the kind's `FORMAT`.
macro_rules! impl_statement_fragment {
    ($builder:ident, $kind:ident, subquery = $subquery:literal) => {
        impl ::std::fmt::Debug for $builder {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Debug::fmt(&self.0, f)
            }
        }

        impl $crate::fragment::Fragment for $builder {
            fn render_raw(
                &self,
            ) -> $crate::error::SqlResult<(String, Vec<$crate::value::Value>)> {
                self.assemble()
            }

            fn render(&self) -> $crate::error::SqlResult<(String, Vec<$crate::value::Value>)> {
                let (sql, args) = self.assemble()?;
                Ok((self.0.get($kind::FORMAT).replace(&sql), args))
            }

            fn is_subquery(&self) -> bool {
                $subquery
            }
        }
    };
}

/// Generate the configuration and execution methods shared by every
/// statement builder. Use inside the builder's `impl` block.
///
/// Usage:
/// ```ignore
/// impl SelectBuilder {
///     impl_statement_exec!(SelectData);
/// }
/// ```
macro_rules! impl_statement_exec {
    ($kind:ident) => {
        /// Set the placeholder format used by `to_sql` and the execution methods.
        pub fn placeholder_format(&self, format: $crate::placeholder::PlaceholderFormat) -> Self {
            Self(self.0.set($kind::FORMAT, format))
        }

        /// Attach the runner used by `exec`, `query` and `query_row`.
        pub fn run_with(&self, runner: impl $crate::runner::Runner + 'static) -> Self {
            self.run_with_shared($crate::runner::SharedRunner::new(runner))
        }

        pub fn run_with_shared(&self, runner: $crate::runner::SharedRunner) -> Self {
            Self(self.0.set($kind::RUNNER, Some(runner)))
        }

        /// Bound every execution of this statement by `timeout`.
        pub fn timeout(&self, timeout: ::std::time::Duration) -> Self {
            Self(self.0.set($kind::TIMEOUT, Some(timeout)))
        }

        pub fn remove_timeout(&self) -> Self {
            Self(self.0.delete($kind::TIMEOUT))
        }

        /// Render with the configured placeholder format.
        pub fn to_sql(&self) -> $crate::error::SqlResult<(String, Vec<$crate::value::Value>)> {
            $crate::fragment::Fragment::render(self)
        }

        /// Render with arguments inlined, for logging.
        pub fn debug_sql(&self) -> String {
            $crate::debug::debug(self)
        }

        fn runner(&self) -> $crate::error::SqlResult<&dyn $crate::runner::Runner> {
            self.0
                .get($kind::RUNNER)
                .as_ref()
                .map($crate::runner::SharedRunner::as_runner)
                .ok_or($crate::error::SqlError::RunnerNotSet)
        }

        /// Execute the statement and return the affected row count.
        pub async fn exec(&self) -> $crate::error::SqlResult<u64> {
            let runner = self.runner()?;
            $crate::runner::exec_with_timeout(runner, self, *self.0.get($kind::TIMEOUT)).await
        }

        /// Like [`exec`](Self::exec) with an explicit timeout.
        pub async fn exec_timeout(
            &self,
            timeout: ::std::time::Duration,
        ) -> $crate::error::SqlResult<u64> {
            let runner = self.runner()?;
            $crate::runner::exec_with_timeout(runner, self, Some(timeout)).await
        }

        /// Execute the statement and return all rows.
        pub async fn query(&self) -> $crate::error::SqlResult<Vec<tokio_postgres::Row>> {
            let runner = self.runner()?;
            $crate::runner::query_with_timeout(runner, self, *self.0.get($kind::TIMEOUT)).await
        }

        pub async fn query_timeout(
            &self,
            timeout: ::std::time::Duration,
        ) -> $crate::error::SqlResult<Vec<tokio_postgres::Row>> {
            let runner = self.runner()?;
            $crate::runner::query_with_timeout(runner, self, Some(timeout)).await
        }

        /// Execute the statement and return the **first** row.
        pub async fn query_row(&self) -> $crate::error::SqlResult<tokio_postgres::Row> {
            let runner = self.runner()?;
            $crate::runner::query_row_with_timeout(runner, self, *self.0.get($kind::TIMEOUT))
                .await
        }

        pub async fn query_row_timeout(
            &self,
            timeout: ::std::time::Duration,
        ) -> $crate::error::SqlResult<tokio_postgres::Row> {
            let runner = self.runner()?;
            $crate::runner::query_row_with_timeout(runner, self, Some(timeout)).await
        }
    };
}
