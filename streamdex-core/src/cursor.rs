//! Skip-offset to upstream-page translation.
//!
//! Callers paginate by item offset; the upstream paginates by page number.
//! Every cached catalog response records the `(skip, page)` pair it was
//! fetched for, and those rows form a memo per query shape:
//!
//! 1. an exact `(shape, skip)` row returns its page;
//! 2. otherwise, if `skip` is beyond the shape's highest recorded skip, the
//!    next page after that row;
//! 3. otherwise page 1.
//!
//! Rule 2 assumes callers advance one upstream page at a time. Offsets that
//! do not fall on a page boundary, or pages requested out of order, resolve
//! to an approximate page.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::database::ports::{PageMemoRepository, QueryShape};

pub const FIRST_PAGE: i64 = 1;

#[derive(Clone)]
pub struct CursorResolver {
    memo: Arc<dyn PageMemoRepository>,
}

impl std::fmt::Debug for CursorResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CursorResolver").finish_non_exhaustive()
    }
}

impl CursorResolver {
    pub fn new(memo: Arc<dyn PageMemoRepository>) -> Self {
        Self { memo }
    }

    /// Upstream page for `skip` under `shape`. Never fails: storage errors
    /// fall back to the first page.
    pub async fn resolve(&self, shape: &QueryShape, skip: i64) -> i64 {
        match self.memo.find_exact(shape, skip).await {
            Ok(Some(row)) => {
                debug!(skip, page = row.page, "page resolved from exact memo");
                return row.page;
            }
            Ok(None) => {}
            Err(err) => {
                warn!(skip, "page memo lookup failed, using first page: {err}");
                return FIRST_PAGE;
            }
        }

        match self.memo.find_latest(shape).await {
            Ok(Some(latest)) if skip > latest.skip => {
                debug!(
                    skip,
                    last_skip = latest.skip,
                    page = latest.page + 1,
                    "page advanced past latest memo"
                );
                latest.page + 1
            }
            Ok(_) => FIRST_PAGE,
            Err(err) => {
                warn!(skip, "page memo lookup failed, using first page: {err}");
                FIRST_PAGE
            }
        }
    }
}
