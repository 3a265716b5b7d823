//! Grade domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A grade given to a student for an event within a subject
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, FromRow, Validate)]
pub struct Grade {
    pub id: i32,
    #[validate(range(min = 0, max = 100))]
    pub score: i32,
    /// Serialized as RFC3339
    pub created_at: DateTime<Utc>,
    pub student_id: i32,
    pub teacher_id: i32,
    pub event_id: i32,
    pub subject_id: i32,
    pub is_deleted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Grade {
        Grade {
            id: 1,
            score: 2,
            created_at: Utc.with_ymd_and_hms(2024, 9, 2, 8, 30, 0).unwrap(),
            student_id: 3,
            teacher_id: 4,
            event_id: 5,
            subject_id: 6,
            is_deleted: false,
        }
    }

    #[test]
    fn test_grade_serializes_rfc3339() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["created_at"], "2024-09-02T08:30:00Z");
        assert_eq!(json["student_id"], 3);
        assert_eq!(json["is_deleted"], false);
    }

    #[test]
    fn test_grade_deserializes_offset_timestamp() {
        let grade: Grade = serde_json::from_str(
            r#"{"id":1,"score":2,"created_at":"2024-09-02T10:30:00+02:00",
                "student_id":3,"teacher_id":4,"event_id":5,"subject_id":6,"is_deleted":false}"#,
        )
        .unwrap();
        assert_eq!(grade, sample());
    }

    #[test]
    fn test_score_range() {
        let mut grade = sample();
        assert!(grade.validate().is_ok());
        grade.score = 101;
        assert!(grade.validate().is_err());
        grade.score = -1;
        assert!(grade.validate().is_err());
    }
}
