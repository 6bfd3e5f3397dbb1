use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error("Query error: {0}")]
    Query(#[from] sqlx::Error),

    #[error("Invariant violation: {0}")]
    Invariant(String),
}

impl ApiError {
    /// Not-found for a single-entity fetch that matched zero rows.
    pub fn not_found(entity: &'static str, id: i32) -> Self {
        ApiError::NotFound { entity, id }
    }
}
