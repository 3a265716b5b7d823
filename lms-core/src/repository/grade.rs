//! Grade repository
//!
//! `record_grade` and `archive_and_delete_grade` pair a grade write with its
//! `grade_history` row in one transaction.

use crate::domain::Grade;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GradeRepository: Send + Sync {
    async fn insert_grade(&self, grade: &Grade) -> Result<()>;
    async fn insert_grade_history(&self, grade: &Grade) -> Result<()>;
    async fn fetch_grades(&self) -> Result<Vec<Grade>>;
    /// Returns `AppError::NotFound` when no visible grade has this id
    async fn get_grade_by_id(&self, id: i32) -> Result<Grade>;
    async fn fetch_grades_by_student_id(&self, student_id: i32) -> Result<Vec<Grade>>;
    async fn fetch_grades_by_subject_id(&self, subject_id: i32) -> Result<Vec<Grade>>;
    async fn fetch_grade_history(&self, grade_id: i32) -> Result<Vec<Grade>>;
    /// Returns `AppError::NotFound` when nothing was deleted
    async fn delete_grade(&self, id: i32) -> Result<()>;
    /// Inserts the grade and its first history row atomically
    async fn record_grade(&self, grade: &Grade) -> Result<()>;
    /// Appends the tombstone to history and deletes the grade atomically
    async fn archive_and_delete_grade(&self, tombstone: &Grade) -> Result<()>;
}

pub struct GradeRepositoryImpl {
    pool: PgPool,
}

impl GradeRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn insert_grade_row(conn: &mut PgConnection, grade: &Grade) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO grades (id, score, created_at, student_id, teacher_id,
                            event_id, subject_id, is_deleted)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(grade.id)
    .bind(grade.score)
    .bind(grade.created_at)
    .bind(grade.student_id)
    .bind(grade.teacher_id)
    .bind(grade.event_id)
    .bind(grade.subject_id)
    .bind(grade.is_deleted)
    .execute(conn)
    .await
    .map_err(|e| AppError::from_write(e, "grade"))?;

    Ok(())
}

async fn insert_history_row(conn: &mut PgConnection, grade: &Grade) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO grade_history (grade_id, score, created_at, student_id, teacher_id,
                                   event_id, subject_id, is_deleted)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(grade.id)
    .bind(grade.score)
    .bind(grade.created_at)
    .bind(grade.student_id)
    .bind(grade.teacher_id)
    .bind(grade.event_id)
    .bind(grade.subject_id)
    .bind(grade.is_deleted)
    .execute(conn)
    .await?;

    Ok(())
}

async fn delete_grade_row(conn: &mut PgConnection, id: i32) -> Result<()> {
    let result = sqlx::query("DELETE FROM grades WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("grade {} not found", id)));
    }

    Ok(())
}

#[async_trait]
impl GradeRepository for GradeRepositoryImpl {
    async fn insert_grade(&self, grade: &Grade) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        insert_grade_row(&mut *conn, grade).await
    }

    async fn insert_grade_history(&self, grade: &Grade) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        insert_history_row(&mut *conn, grade).await
    }

    async fn fetch_grades(&self) -> Result<Vec<Grade>> {
        let grades = sqlx::query_as::<_, Grade>(
            r#"
            SELECT id, score, created_at, student_id, teacher_id, event_id, subject_id, is_deleted
            FROM grades
            WHERE is_deleted = FALSE
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(grades)
    }

    async fn get_grade_by_id(&self, id: i32) -> Result<Grade> {
        sqlx::query_as::<_, Grade>(
            r#"
            SELECT id, score, created_at, student_id, teacher_id, event_id, subject_id, is_deleted
            FROM grades
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("grade {} not found", id)))
    }

    async fn fetch_grades_by_student_id(&self, student_id: i32) -> Result<Vec<Grade>> {
        let grades = sqlx::query_as::<_, Grade>(
            r#"
            SELECT id, score, created_at, student_id, teacher_id, event_id, subject_id, is_deleted
            FROM grades
            WHERE student_id = $1 AND is_deleted = FALSE
            ORDER BY id
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(grades)
    }

    async fn fetch_grades_by_subject_id(&self, subject_id: i32) -> Result<Vec<Grade>> {
        let grades = sqlx::query_as::<_, Grade>(
            r#"
            SELECT id, score, created_at, student_id, teacher_id, event_id, subject_id, is_deleted
            FROM grades
            WHERE subject_id = $1 AND is_deleted = FALSE
            ORDER BY id
            "#,
        )
        .bind(subject_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(grades)
    }

    async fn fetch_grade_history(&self, grade_id: i32) -> Result<Vec<Grade>> {
        let grades = sqlx::query_as::<_, Grade>(
            r#"
            SELECT grade_id AS id, score, created_at, student_id, teacher_id,
                   event_id, subject_id, is_deleted
            FROM grade_history
            WHERE grade_id = $1
            ORDER BY history_id
            "#,
        )
        .bind(grade_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(grades)
    }

    async fn delete_grade(&self, id: i32) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        delete_grade_row(&mut *conn, id).await
    }

    async fn record_grade(&self, grade: &Grade) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        insert_grade_row(&mut *tx, grade).await?;
        insert_history_row(&mut *tx, grade).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn archive_and_delete_grade(&self, tombstone: &Grade) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        insert_history_row(&mut *tx, tombstone).await?;
        delete_grade_row(&mut *tx, tombstone.id).await?;
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::*;

    #[tokio::test]
    async fn test_mock_get_grade_not_found() {
        let mut mock = MockGradeRepository::new();

        mock.expect_get_grade_by_id()
            .with(eq(55))
            .returning(|id| Err(AppError::NotFound(format!("grade {} not found", id))));

        let result = mock.get_grade_by_id(55).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_mock_fetch_by_student() {
        let mut mock = MockGradeRepository::new();

        mock.expect_fetch_grades_by_student_id()
            .with(eq(3))
            .returning(|student_id| {
                Ok(vec![Grade {
                    id: 1,
                    student_id,
                    ..Default::default()
                }])
            });

        let grades = mock.fetch_grades_by_student_id(3).await.unwrap();
        assert_eq!(grades.len(), 1);
        assert_eq!(grades[0].student_id, 3);
    }

    #[tokio::test]
    async fn test_mock_insert_grade_conflict() {
        let mut mock = MockGradeRepository::new();

        mock.expect_insert_grade()
            .returning(|_| Err(AppError::Conflict("grade already exists".to_string())));

        let result = mock.insert_grade(&Grade::default()).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
