use async_graphql::Object;

use crate::db::models::{Problem, Submission, Tag, User};

// --- Problem ---

pub struct GqlProblem(pub Problem);

#[Object(name = "Problem")]
impl GqlProblem {
    async fn id(&self) -> i32 {
        self.0.id
    }
    async fn title(&self) -> &str {
        &self.0.title
    }
    async fn description(&self) -> Option<&str> {
        self.0.description.as_deref()
    }
    async fn accepted_ratio(&self) -> Option<f64> {
        self.0.accepted_ratio
    }
    async fn tags(&self) -> Vec<GqlTag> {
        self.0.tags.iter().cloned().map(GqlTag).collect()
    }
    async fn authors(&self) -> Vec<GqlUser> {
        self.0.authors.iter().cloned().map(GqlUser).collect()
    }
}

// --- Tag ---

pub struct GqlTag(pub Tag);

#[Object(name = "Tag")]
impl GqlTag {
    async fn name(&self) -> &str {
        &self.0.name
    }
    async fn hex_color(&self) -> &str {
        &self.0.hex_color
    }
}

// --- User ---

pub struct GqlUser(pub User);

#[Object(name = "User")]
impl GqlUser {
    async fn id(&self) -> i32 {
        self.0.id
    }
    async fn username(&self) -> &str {
        &self.0.username
    }
    async fn full_name(&self) -> Option<&str> {
        self.0.full_name.as_deref()
    }
}

// --- Submission ---

pub struct GqlSubmission(pub Submission);

#[Object(name = "Submission")]
impl GqlSubmission {
    async fn id(&self) -> i32 {
        self.0.id
    }
    async fn created_at(&self) -> Option<&str> {
        self.0.created_at.as_deref()
    }
    async fn status(&self) -> Option<&str> {
        self.0.status.as_deref()
    }
    async fn checker_message(&self) -> Option<&str> {
        self.0.checker_message.as_deref()
    }
    /// The owning problem, id and title only.
    async fn problem(&self) -> Option<GqlProblem> {
        self.0.problem.clone().map(GqlProblem)
    }
}
