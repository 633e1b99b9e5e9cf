//! The two fan-out patterns used by the orchestrator.
//!
//! - [`gather_all_fail_fast`]: same-source fetches whose results only make
//!   sense together (history windows). The first error wins and the
//!   remaining futures are dropped.
//! - [`gather_all_settled`]: independent per-source pipelines. Every future
//!   runs to completion and results come back in input order.

use std::future::Future;

use futures::future::{join_all, try_join_all};

/// Await every future; fail as soon as one fails.
pub async fn gather_all_fail_fast<I, F, T, E>(futures: I) -> Result<Vec<T>, E>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, E>>,
{
    try_join_all(futures).await
}

/// Await every future and keep each outcome, in input order.
pub async fn gather_all_settled<I, F>(futures: I) -> Vec<F::Output>
where
    I: IntoIterator<Item = F>,
    F: Future,
{
    join_all(futures).await
}
