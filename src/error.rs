#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("no user is signed in")]
    NotAuthenticated,

    #[error("course not found: {0}")]
    CourseNotFound(String),

    #[error("lesson {lesson} not found in course {course}")]
    LessonNotFound { course: String, lesson: String },

    #[error("quiz not found: {0}")]
    QuizNotFound(String),

    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error("trade offer not found: {0}")]
    OfferNotFound(String),

    #[error("already enrolled in course {0}")]
    AlreadyEnrolled(String),

    #[error("enroll in course {0} before completing its lessons")]
    NotEnrolled(String),

    #[error("insufficient credits: requested {requested}, available {available}")]
    InsufficientCredits { requested: u64, available: u64 },

    #[error("quiz score must be between 0 and 100, got {0}")]
    InvalidScore(u32),

    #[error("invalid update: {0}")]
    InvalidUpdate(String),
}
