//! Grading business logic

use crate::domain::Grade;
use crate::error::Result;
use crate::jwt::Claims;
use crate::repository::GradeRepository;
use async_trait::async_trait;
use chrono::SubsecRound;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

/// Grade operations exposed to the HTTP layer
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GradeSvc: Send + Sync {
    async fn fetch_grades(&self) -> Result<Vec<Grade>>;
    async fn get_grade(&self, id: i32) -> Result<Grade>;
    async fn fetch_grades_by_student(&self, student_id: i32) -> Result<Vec<Grade>>;
    async fn fetch_grades_by_subject(&self, subject_id: i32) -> Result<Vec<Grade>>;
    async fn fetch_grade_history(&self, grade_id: i32) -> Result<Vec<Grade>>;
    async fn add_grade(&self, claims: &Claims, grade: &Grade) -> Result<Grade>;
    async fn delete_grade(&self, claims: &Claims, id: i32) -> Result<()>;
}

pub struct GradeService<R: GradeRepository> {
    grade_repo: Arc<R>,
}

impl<R: GradeRepository> GradeService<R> {
    pub fn new(grade_repo: Arc<R>) -> Self {
        Self { grade_repo }
    }
}

#[async_trait]
impl<R: GradeRepository> GradeSvc for GradeService<R> {
    async fn fetch_grades(&self) -> Result<Vec<Grade>> {
        self.grade_repo.fetch_grades().await
    }

    async fn get_grade(&self, id: i32) -> Result<Grade> {
        self.grade_repo.get_grade_by_id(id).await
    }

    async fn fetch_grades_by_student(&self, student_id: i32) -> Result<Vec<Grade>> {
        self.grade_repo.fetch_grades_by_student_id(student_id).await
    }

    async fn fetch_grades_by_subject(&self, subject_id: i32) -> Result<Vec<Grade>> {
        self.grade_repo.fetch_grades_by_subject_id(subject_id).await
    }

    async fn fetch_grade_history(&self, grade_id: i32) -> Result<Vec<Grade>> {
        self.grade_repo.fetch_grade_history(grade_id).await
    }

    async fn add_grade(&self, claims: &Claims, grade: &Grade) -> Result<Grade> {
        grade.validate()?;

        // TIMESTAMPTZ keeps microseconds
        let grade = Grade {
            created_at: grade.created_at.trunc_subsecs(6),
            is_deleted: false,
            ..grade.clone()
        };
        self.grade_repo.record_grade(&grade).await?;

        info!(user_id = claims.user_id, grade_id = grade.id, "Grade recorded");
        Ok(grade)
    }

    async fn delete_grade(&self, claims: &Claims, id: i32) -> Result<()> {
        let existing = self.grade_repo.get_grade_by_id(id).await?;

        let tombstone = Grade {
            is_deleted: true,
            ..existing
        };
        self.grade_repo.archive_and_delete_grade(&tombstone).await?;

        info!(user_id = claims.user_id, grade_id = id, "Grade deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::repository::grade::MockGradeRepository;
    use chrono::{Duration, TimeZone, Utc};
    use mockall::predicate::*;
    use mockall::Sequence;

    fn claims() -> Claims {
        Claims {
            expires_at: i64::MAX,
            full_user_name: "Teacher".to_string(),
            user_id: 4,
        }
    }

    fn grade() -> Grade {
        Grade {
            id: 1,
            score: 2,
            student_id: 3,
            teacher_id: 4,
            event_id: 5,
            subject_id: 6,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_add_grade_records_grade_with_history() {
        let mut mock = MockGradeRepository::new();
        mock.expect_record_grade()
            .withf(|g: &Grade| g.id == 1 && !g.is_deleted)
            .times(1)
            .returning(|_| Ok(()));
        mock.expect_insert_grade().never();
        mock.expect_insert_grade_history().never();

        let service = GradeService::new(Arc::new(mock));
        let stored = service.add_grade(&claims(), &grade()).await.unwrap();
        assert_eq!(stored, grade());
    }

    #[tokio::test]
    async fn test_add_grade_truncates_to_microseconds() {
        let mut mock = MockGradeRepository::new();
        mock.expect_record_grade()
            .withf(|g: &Grade| g.created_at.timestamp_subsec_nanos() == 123_456_000)
            .times(1)
            .returning(|_| Ok(()));

        let service = GradeService::new(Arc::new(mock));
        let precise = Grade {
            created_at: Utc.with_ymd_and_hms(2024, 9, 2, 8, 30, 0).unwrap()
                + Duration::nanoseconds(123_456_789),
            ..grade()
        };
        let stored = service.add_grade(&claims(), &precise).await.unwrap();
        assert_eq!(stored.created_at.timestamp_subsec_nanos(), 123_456_000);
    }

    #[tokio::test]
    async fn test_add_grade_clears_deleted_flag() {
        let mut mock = MockGradeRepository::new();
        mock.expect_record_grade()
            .withf(|g: &Grade| !g.is_deleted)
            .times(1)
            .returning(|_| Ok(()));

        let service = GradeService::new(Arc::new(mock));
        let deleted = Grade {
            is_deleted: true,
            ..grade()
        };
        let stored = service.add_grade(&claims(), &deleted).await.unwrap();
        assert!(!stored.is_deleted);
    }

    #[tokio::test]
    async fn test_add_grade_rejects_out_of_range_score() {
        let mut mock = MockGradeRepository::new();
        mock.expect_record_grade().never();

        let service = GradeService::new(Arc::new(mock));
        let bad = Grade {
            score: 250,
            ..grade()
        };
        let result = service.add_grade(&claims(), &bad).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_add_grade_conflict() {
        let mut mock = MockGradeRepository::new();
        mock.expect_record_grade()
            .returning(|_| Err(AppError::Conflict("grade already exists".to_string())));

        let service = GradeService::new(Arc::new(mock));
        let result = service.add_grade(&claims(), &grade()).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_delete_grade_archives_tombstone() {
        let mut mock = MockGradeRepository::new();
        let mut seq = Sequence::new();

        mock.expect_get_grade_by_id()
            .with(eq(1))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(grade()));
        mock.expect_archive_and_delete_grade()
            .withf(|g: &Grade| g.id == 1 && g.is_deleted)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        mock.expect_insert_grade_history().never();
        mock.expect_delete_grade().never();

        let service = GradeService::new(Arc::new(mock));
        service.delete_grade(&claims(), 1).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_missing_grade_is_not_found() {
        let mut mock = MockGradeRepository::new();
        mock.expect_get_grade_by_id()
            .returning(|id| Err(AppError::NotFound(format!("grade {} not found", id))));
        mock.expect_archive_and_delete_grade().never();

        let service = GradeService::new(Arc::new(mock));
        let result = service.delete_grade(&claims(), 55).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_fetch_by_subject_empty() {
        let mut mock = MockGradeRepository::new();
        mock.expect_fetch_grades_by_subject_id()
            .with(eq(55))
            .returning(|_| Ok(vec![]));

        let service = GradeService::new(Arc::new(mock));
        assert!(service.fetch_grades_by_subject(55).await.unwrap().is_empty());
    }
}
