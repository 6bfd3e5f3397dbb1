use std::sync::Arc;

use async_graphql::{Context, Object, Result};
use tracing::info;

use crate::db::models::Submission;
use crate::db::Store;

use super::types::GqlSubmission;

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Submit a solution for a problem. Returns the new submission with only
    /// its id populated; a nonexistent problem fails the foreign key and
    /// surfaces as an operation error.
    async fn submit_solution(
        &self,
        ctx: &Context<'_>,
        problem_id: i32,
        solution: String,
    ) -> Result<GqlSubmission> {
        let store = ctx.data_unchecked::<Arc<Store>>();
        let id = store.submit_solution(problem_id, &solution).await?;
        info!(submission_id = id, problem_id, "Submission created");
        Ok(GqlSubmission(Submission::created(id)))
    }
}
