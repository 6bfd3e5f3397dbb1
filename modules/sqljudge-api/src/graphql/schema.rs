use std::sync::Arc;

use async_graphql::{Context, EmptySubscription, Object, Result, Schema};

use crate::db::Store;

use super::mutations::MutationRoot;
use super::types::{GqlProblem, GqlSubmission, GqlUser};

pub type ApiSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Get a single problem with its authors and tags.
    async fn problem(&self, ctx: &Context<'_>, id: i32) -> Result<GqlProblem> {
        let store = ctx.data_unchecked::<Arc<Store>>();
        let problem = store.problem(id).await?;
        Ok(GqlProblem(problem))
    }

    /// List all problems, ordered by id.
    async fn problems(&self, ctx: &Context<'_>) -> Result<Vec<GqlProblem>> {
        let store = ctx.data_unchecked::<Arc<Store>>();
        let problems = store.problems().await?;
        Ok(problems.into_iter().map(GqlProblem).collect())
    }

    /// List all submissions, newest first.
    async fn submissions(&self, ctx: &Context<'_>) -> Result<Vec<GqlSubmission>> {
        let store = ctx.data_unchecked::<Arc<Store>>();
        let submissions = store.submissions().await?;
        Ok(submissions.into_iter().map(GqlSubmission).collect())
    }

    /// Get a single user account.
    async fn user(&self, ctx: &Context<'_>, id: i32) -> Result<GqlUser> {
        let store = ctx.data_unchecked::<Arc<Store>>();
        let user = store.user(id).await?;
        Ok(GqlUser(user))
    }
}

pub fn build_schema(store: Arc<Store>) -> ApiSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(store)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

    // A pool that never connects; enough to build the schema.
    fn lazy_store() -> Arc<Store> {
        let options = PgConnectOptions::new()
            .host("localhost")
            .username("judge")
            .database("judge");
        let pool = PgPoolOptions::new().connect_lazy_with(options);
        Arc::new(Store::new(pool))
    }

    // Pool creation spawns maintenance tasks, so these need a runtime even
    // though the pool never connects.
    #[tokio::test]
    async fn schema_exposes_the_five_operations() {
        let schema = build_schema(lazy_store());
        let sdl = schema.sdl();

        assert!(sdl.contains("problem(id: Int!): Problem!"));
        assert!(sdl.contains("problems: [Problem!]!"));
        assert!(sdl.contains("submissions: [Submission!]!"));
        assert!(sdl.contains("user(id: Int!): User!"));
        assert!(sdl.contains("submitSolution(problemId: Int!, solution: String!): Submission!"));
    }

    #[tokio::test]
    async fn nested_collections_are_non_nullable() {
        let schema = build_schema(lazy_store());
        let sdl = schema.sdl();

        // Empty means empty list, never null.
        assert!(sdl.contains("tags: [Tag!]!"));
        assert!(sdl.contains("authors: [User!]!"));
    }
}
