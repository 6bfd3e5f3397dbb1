use std::collections::HashMap;

use sqlx::PgPool;

use sqljudge_common::ApiError;

use super::models::{Problem, Submission, Tag, User};

// ---------------------------------------------------------------------------
// SQL statements
// ---------------------------------------------------------------------------

const PROBLEM_SQL: &str = r#"
SELECT id, title, description
FROM problem
WHERE id = $1
"#;

const PROBLEM_AUTHORS_SQL: &str = r#"
SELECT ua.id, ua.username, ua.full_name
FROM problem_author pa
JOIN user_account ua ON pa.user_account_id = ua.id
WHERE pa.problem_id = $1
ORDER BY ua.full_name NULLS LAST
"#;

const PROBLEM_TAGS_SQL: &str = r#"
SELECT t.name, c.hex
FROM problem_tag pt
JOIN tag t ON pt.tag_id = t.id
JOIN color c ON t.color_id = c.id
WHERE pt.problem_id = $1
ORDER BY t.name
"#;

const PROBLEMS_SQL: &str = r#"
SELECT p.id, p.title, ps.accepted_ratio
FROM problem p
JOIN problem_statistics ps ON p.id = ps.id
ORDER BY p.id
"#;

const PROBLEMS_TAGS_SQL: &str = r#"
SELECT pt.problem_id, t.name, c.hex
FROM problem_tag pt
JOIN tag t ON pt.tag_id = t.id
JOIN color c ON t.color_id = c.id
ORDER BY t.name
"#;

const SUBMISSIONS_SQL: &str = r#"
SELECT s.id, to_char(s.created_at, 'DD.MM.YYYY HH24:MI:SS:MS'), st.description, s.checker_message
FROM submission s
JOIN submission_status st ON s.status_id = st.id
ORDER BY s.created_at DESC, s.id DESC
"#;

const SUBMISSIONS_PROBLEMS_SQL: &str = r#"
SELECT s.id, s.problem_id, p.title
FROM submission s
JOIN problem p ON s.problem_id = p.id
"#;

const USER_SQL: &str = r#"
SELECT id, username, full_name
FROM user_account
WHERE id = $1
"#;

// No auth exists yet, so submissions are filed under the seed account.
const SUBMIT_SOLUTION_SQL: &str = r#"
INSERT INTO submission (user_account_id, problem_id, solution)
VALUES (1, $1, $2)
RETURNING id
"#;

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Read/write access to the judge database. One method per API operation;
/// multi-query reads run inside a single read-only snapshot so the stitch
/// phase sees the same rows the primary fetch did.
pub struct Store {
    pool: PgPool,
}

impl Store {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch a single problem with its authors and tags.
    pub async fn problem(&self, id: i32) -> Result<Problem, ApiError> {
        let mut tx = self.read_only_tx().await?;

        let row = sqlx::query_as::<_, (i32, String, Option<String>)>(PROBLEM_SQL)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| ApiError::not_found("problem", id))?;

        let mut problem = Problem {
            id: row.0,
            title: row.1,
            description: row.2,
            accepted_ratio: None,
            tags: Vec::new(),
            authors: Vec::new(),
        };

        let author_rows = sqlx::query_as::<_, (i32, String, Option<String>)>(PROBLEM_AUTHORS_SQL)
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;
        problem.authors = author_rows
            .into_iter()
            .map(|(id, username, full_name)| User {
                id,
                username,
                full_name,
            })
            .collect();

        let tag_rows = sqlx::query_as::<_, (String, String)>(PROBLEM_TAGS_SQL)
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;
        problem.tags = tag_rows
            .into_iter()
            .map(|(name, hex_color)| Tag { name, hex_color })
            .collect();

        tx.commit().await?;
        Ok(problem)
    }

    /// Fetch all problems ordered by id, with tags stitched in from one
    /// secondary query across every problem (no per-problem fan-out).
    pub async fn problems(&self) -> Result<Vec<Problem>, ApiError> {
        let mut tx = self.read_only_tx().await?;

        let rows = sqlx::query_as::<_, (i32, String, Option<f64>)>(PROBLEMS_SQL)
            .fetch_all(&mut *tx)
            .await?;
        let mut problems: Vec<Problem> = rows
            .into_iter()
            .map(|(id, title, accepted_ratio)| Problem {
                id,
                title,
                description: None,
                accepted_ratio,
                tags: Vec::new(),
                authors: Vec::new(),
            })
            .collect();

        let tag_rows = sqlx::query_as::<_, (i32, String, String)>(PROBLEMS_TAGS_SQL)
            .fetch_all(&mut *tx)
            .await?;
        attach_tags(&mut problems, tag_rows)?;

        tx.commit().await?;
        Ok(problems)
    }

    /// Fetch all submissions, newest first, each with a partial reference to
    /// its problem (id and title) stitched in from one secondary query.
    pub async fn submissions(&self) -> Result<Vec<Submission>, ApiError> {
        let mut tx = self.read_only_tx().await?;

        let rows =
            sqlx::query_as::<_, (i32, String, String, Option<String>)>(SUBMISSIONS_SQL)
                .fetch_all(&mut *tx)
                .await?;
        let mut submissions: Vec<Submission> = rows
            .into_iter()
            .map(|(id, created_at, status, checker_message)| Submission {
                id,
                created_at: Some(created_at),
                status: Some(status),
                checker_message,
                problem: None,
            })
            .collect();

        let problem_rows = sqlx::query_as::<_, (i32, i32, String)>(SUBMISSIONS_PROBLEMS_SQL)
            .fetch_all(&mut *tx)
            .await?;
        attach_problems(&mut submissions, problem_rows)?;

        tx.commit().await?;
        Ok(submissions)
    }

    /// Fetch a single user account.
    pub async fn user(&self, id: i32) -> Result<User, ApiError> {
        let row = sqlx::query_as::<_, (i32, String, Option<String>)>(USER_SQL)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::not_found("user", id))?;

        Ok(User {
            id: row.0,
            username: row.1,
            full_name: row.2,
        })
    }

    /// Insert a new submission and return its freshly assigned id. A foreign
    /// key violation (unknown problem) surfaces as a query error; nothing is
    /// retried.
    pub async fn submit_solution(&self, problem_id: i32, solution: &str) -> Result<i32, ApiError> {
        let id = sqlx::query_scalar::<_, i32>(SUBMIT_SOLUTION_SQL)
            .bind(problem_id)
            .bind(solution)
            .fetch_one(&self.pool)
            .await?;
        Ok(id)
    }

    /// Begin a repeatable-read, read-only transaction. Both phases of a
    /// fetch-and-stitch read run on this one snapshot, so the secondary query
    /// cannot observe owners the primary fetch did not.
    async fn read_only_tx(&self) -> Result<sqlx::Transaction<'_, sqlx::Postgres>, ApiError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }
}

// ---------------------------------------------------------------------------
// Stitching
// ---------------------------------------------------------------------------

/// Attach `(problem_id, name, hex)` tag rows to their owning problems,
/// preserving secondary-row order. The id index is built over the complete
/// primary result before any row is consumed; a tag row whose owner is not
/// in the index means the two queries disagreed on which problems exist.
fn attach_tags(problems: &mut [Problem], rows: Vec<(i32, String, String)>) -> Result<(), ApiError> {
    let index: HashMap<i32, usize> = problems
        .iter()
        .enumerate()
        .map(|(slot, p)| (p.id, slot))
        .collect();

    for (problem_id, name, hex_color) in rows {
        let slot = *index.get(&problem_id).ok_or_else(|| {
            ApiError::Invariant(format!(
                "tag row references problem {problem_id} absent from the primary fetch"
            ))
        })?;
        problems[slot].tags.push(Tag { name, hex_color });
    }
    Ok(())
}

/// Attach `(submission_id, problem_id, title)` rows to their submissions as
/// partial problem references.
fn attach_problems(
    submissions: &mut [Submission],
    rows: Vec<(i32, i32, String)>,
) -> Result<(), ApiError> {
    let index: HashMap<i32, usize> = submissions
        .iter()
        .enumerate()
        .map(|(slot, s)| (s.id, slot))
        .collect();

    for (submission_id, problem_id, title) in rows {
        let slot = *index.get(&submission_id).ok_or_else(|| {
            ApiError::Invariant(format!(
                "problem row references submission {submission_id} absent from the primary fetch"
            ))
        })?;
        submissions[slot].problem = Some(Problem::reference(problem_id, title));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problem(id: i32, title: &str) -> Problem {
        Problem {
            id,
            title: title.to_string(),
            description: None,
            accepted_ratio: None,
            tags: Vec::new(),
            authors: Vec::new(),
        }
    }

    fn submission(id: i32) -> Submission {
        Submission {
            id,
            created_at: Some("01.01.2024 12:00:00:000".to_string()),
            status: Some("Accepted".to_string()),
            checker_message: None,
            problem: None,
        }
    }

    #[test]
    fn tags_land_on_their_owner_in_row_order() {
        let mut problems = vec![problem(1, "a"), problem(2, "b"), problem(3, "c")];
        let rows = vec![
            (2, "graphs".to_string(), "#00ff00".to_string()),
            (1, "dp".to_string(), "#ff0000".to_string()),
            (2, "trees".to_string(), "#0000ff".to_string()),
        ];

        attach_tags(&mut problems, rows).unwrap();

        assert_eq!(problems[0].tags.len(), 1);
        assert_eq!(problems[0].tags[0].name, "dp");
        let p2: Vec<&str> = problems[1].tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(p2, ["graphs", "trees"]);
        assert!(problems[2].tags.is_empty());
    }

    #[test]
    fn problem_without_tags_keeps_an_empty_collection() {
        let mut problems = vec![problem(7, "lonely")];
        attach_tags(&mut problems, Vec::new()).unwrap();
        assert!(problems[0].tags.is_empty());
        assert!(problems[0].authors.is_empty());
    }

    #[test]
    fn unknown_tag_owner_is_an_invariant_violation() {
        let mut problems = vec![problem(1, "a")];
        let rows = vec![(99, "phantom".to_string(), "#000000".to_string())];

        let err = attach_tags(&mut problems, rows).unwrap_err();
        assert!(matches!(err, ApiError::Invariant(_)));
        assert!(err.to_string().contains("99"));
    }

    #[test]
    fn submissions_get_partial_problem_references() {
        let mut submissions = vec![submission(10), submission(11)];
        let rows = vec![
            (11, 2, "Two Sum".to_string()),
            (10, 1, "Hello SQL".to_string()),
        ];

        attach_problems(&mut submissions, rows).unwrap();

        let p = submissions[0].problem.as_ref().unwrap();
        assert_eq!((p.id, p.title.as_str()), (1, "Hello SQL"));
        assert!(p.description.is_none());
        assert!(p.tags.is_empty());
        let p = submissions[1].problem.as_ref().unwrap();
        assert_eq!(p.id, 2);
    }

    #[test]
    fn unknown_submission_owner_is_an_invariant_violation() {
        let mut submissions = vec![submission(10)];
        let rows = vec![(42, 1, "ghost".to_string())];
        assert!(matches!(
            attach_problems(&mut submissions, rows),
            Err(ApiError::Invariant(_))
        ));
    }

    #[test]
    fn list_queries_carry_deterministic_ordering() {
        assert!(PROBLEMS_SQL.contains("ORDER BY p.id"));
        assert!(SUBMISSIONS_SQL.contains("ORDER BY s.created_at DESC, s.id DESC"));
        // Tag collections sort by name, authors by full name with nulls last.
        assert!(PROBLEM_TAGS_SQL.contains("ORDER BY t.name"));
        assert!(PROBLEMS_TAGS_SQL.contains("ORDER BY t.name"));
        assert!(PROBLEM_AUTHORS_SQL.contains("ORDER BY ua.full_name NULLS LAST"));
    }
}
