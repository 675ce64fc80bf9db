//! Domain model for the school backend.
//!
//! Entities are plain data carriers shared by the repository backends and the
//! service layer. Every table row is identified by an `i64` primary key wrapped
//! in a dedicated newtype so ids of different entities cannot be mixed up.

pub mod macros;

pub mod account;
pub mod coursework;
pub mod meetups;
pub mod news;
pub mod school;

pub use account::*;
pub use coursework::*;
pub use meetups::*;
pub use news::*;
pub use school::*;

crate::define_id_type!(i64, UserId);
crate::define_id_type!(i64, ClassId);
crate::define_id_type!(i64, SubjectId);
crate::define_id_type!(i64, StudentId);
crate::define_id_type!(i64, TeacherId);
crate::define_id_type!(i64, GradeId);
crate::define_id_type!(i64, ExamId);
crate::define_id_type!(i64, HomeworkId);
crate::define_id_type!(i64, SubmissionId);
crate::define_id_type!(i64, MaterialId);
crate::define_id_type!(i64, NewsId);
crate::define_id_type!(i64, CommentId);
crate::define_id_type!(i64, MeetupId);
crate::define_id_type!(i64, TalkId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_serializes_as_number() {
        let json = serde_json::to_string(&UserId::new(7)).unwrap();
        assert_eq!(json, "7");
        let back: UserId = serde_json::from_str("7").unwrap();
        assert_eq!(back, UserId(7));
    }

    #[test]
    fn test_id_from_str() {
        assert_eq!("42".parse::<TalkId>().unwrap().value(), 42);
        assert!("abc".parse::<TalkId>().is_err());
    }
}
