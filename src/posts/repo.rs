use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// A post row with its author reference resolved. The join is LEFT because
/// deleting a user leaves their posts behind; an orphaned reference shows
/// up as absent author columns.
#[derive(Debug, Clone, FromRow)]
pub struct PostRow {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
}

const POST_SELECT: &str = r#"
    SELECT p.id, p.title, p.content, p.author_id, p.created_at, p.updated_at,
           u.name AS author_name, u.email AS author_email
    FROM posts p
    LEFT JOIN users u ON u.id = p.author_id
"#;

impl PostRow {
    pub async fn list_all(db: &PgPool) -> Result<Vec<PostRow>, sqlx::Error> {
        sqlx::query_as::<_, PostRow>(&format!("{POST_SELECT} ORDER BY p.created_at DESC"))
            .fetch_all(db)
            .await
    }

    pub async fn list_by_author(db: &PgPool, author_id: Uuid) -> Result<Vec<PostRow>, sqlx::Error> {
        sqlx::query_as::<_, PostRow>(&format!(
            "{POST_SELECT} WHERE p.author_id = $1 ORDER BY p.created_at DESC"
        ))
        .bind(author_id)
        .fetch_all(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<PostRow>, sqlx::Error> {
        sqlx::query_as::<_, PostRow>(&format!("{POST_SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// The author reference is set once here, from the authenticated caller,
    /// and no update path ever touches it.
    pub async fn create(
        db: &PgPool,
        title: &str,
        content: &str,
        author_id: Uuid,
    ) -> Result<PostRow, sqlx::Error> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO posts (title, content, author_id)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(title)
        .bind(content)
        .bind(author_id)
        .fetch_one(db)
        .await?;

        // Re-read with the author resolved so the response matches reads.
        sqlx::query_as::<_, PostRow>(&format!("{POST_SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_one(db)
            .await
    }

    pub async fn update(
        db: &PgPool,
        id: Uuid,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<PostRow, sqlx::Error> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            UPDATE posts SET
                title = COALESCE($2, title),
                content = COALESCE($3, content),
                updated_at = now()
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(content)
        .fetch_one(db)
        .await?;

        sqlx::query_as::<_, PostRow>(&format!("{POST_SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_one(db)
            .await
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
