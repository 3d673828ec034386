//! Compile-only checks for the runner implementations.

#![allow(dead_code)]

use chainsql::{SqlResult, qb};

async fn _client_runner_compiles(client: tokio_postgres::Client) -> SqlResult<()> {
    let rows = qb::select(&["id"]).from("users").run_with(client).query().await?;
    let _ = rows.len();
    Ok(())
}

async fn _transaction_runner_compiles(client: &mut tokio_postgres::Client) -> SqlResult<()> {
    let tx = client.transaction().await?;
    let affected = chainsql::runner::exec_with(&tx, &qb::delete("users").where_("id = 1")).await?;
    let _ = affected;
    tx.commit().await?;
    Ok(())
}

#[cfg(feature = "pool")]
async fn _pool_runner_compiles(pool: &deadpool_postgres::Pool) -> SqlResult<()> {
    let client = pool.get().await?;
    qb::update("users")
        .set("active", false)
        .run_with(client)
        .exec()
        .await?;
    Ok(())
}
