// ---------------------------------------------------------------------------
// Domain objects assembled from flat query rows
// ---------------------------------------------------------------------------

/// A judge problem. List queries populate id/title/accepted_ratio and tags;
/// the single-problem query populates id/title/description, tags and authors.
/// Submission rows carry a partial reference with only id and title set.
#[derive(Debug, Clone)]
pub struct Problem {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub accepted_ratio: Option<f64>,
    pub tags: Vec<Tag>,
    pub authors: Vec<User>,
}

impl Problem {
    /// Partial reference carried by a submission: id and title only.
    pub fn reference(id: i32, title: String) -> Self {
        Self {
            id,
            title,
            description: None,
            accepted_ratio: None,
            tags: Vec::new(),
            authors: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Tag {
    pub name: String,
    pub hex_color: String,
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub full_name: Option<String>,
}

/// A solution submission. `created_at` is pre-formatted by the database
/// (`DD.MM.YYYY HH24:MI:SS:MS`); ordering always uses the raw timestamp
/// column, never this string. A freshly inserted submission has only its id.
#[derive(Debug, Clone)]
pub struct Submission {
    pub id: i32,
    pub created_at: Option<String>,
    pub status: Option<String>,
    pub checker_message: Option<String>,
    pub problem: Option<Problem>,
}

impl Submission {
    /// A submission as returned right after insertion: id only.
    pub fn created(id: i32) -> Self {
        Self {
            id,
            created_at: None,
            status: None,
            checker_message: None,
            problem: None,
        }
    }
}
