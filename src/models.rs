use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProgress {
    pub xp: u64,
    pub level: u32,
    pub xp_to_next_level: u64,
    pub credits: u64,
    pub streak: u32,
    pub badges: Vec<Badge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub level: u32,
    pub max_level: u32,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub class: String,
    pub stream: String,
    pub interests: Vec<String>,
    pub rating: f64,
    pub joined_date: DateTime<Utc>,
    pub skills: Vec<Skill>,
    pub progress: UserProgress,
}

/// Profile fields a user may edit directly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub class: Option<String>,
    pub stream: Option<String>,
    pub interests: Option<Vec<String>>,
    pub skills: Option<Vec<Skill>>,
    pub streak: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Common => "Common",
            Self::Rare => "Rare",
            Self::Epic => "Epic",
            Self::Legendary => "Legendary",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Badge {
    pub id: String,
    pub name: String,
    pub description: String,
    pub emoji: String,
    pub rarity: Rarity,
    pub earned_date: DateTime<Utc>,
    pub category: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuizDifficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LessonKind {
    Video,
    Reading,
    Quiz,
    Practice,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instructor {
    pub name: String,
    pub avatar: String,
    pub rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub description: String,
    pub duration: String,
    pub kind: LessonKind,
    pub content: String,
    pub completed: bool,
    pub xp_reward: u64,
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub thumbnail: String,
    pub instructor: Instructor,
    pub lessons: Vec<Lesson>,
    pub duration: String,
    pub enrolled: bool,
    pub progress: f64,
    pub rating: f64,
    pub students_count: u32,
    pub tags: Vec<String>,
    pub xp_reward: u64,
}

impl Course {
    pub fn completed_lessons(&self) -> usize {
        self.lessons.iter().filter(|lesson| lesson.completed).count()
    }

    pub fn is_complete(&self) -> bool {
        !self.lessons.is_empty() && self.completed_lessons() == self.lessons.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub difficulty: QuizDifficulty,
    pub questions: Vec<Question>,
    pub time_limit_secs: Option<u32>,
    pub xp_reward: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
    Planning,
    InProgress,
    Completed,
    Archived,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub rating: f64,
    pub comment: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDraft {
    pub title: String,
    pub description: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub tags: Vec<String>,
    pub is_public: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: ProjectStatus,
    pub progress: u8,
    pub team: Vec<TeamMember>,
    pub tags: Vec<String>,
    pub category: String,
    pub difficulty: Difficulty,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub rating: Option<f64>,
    pub reviews: Vec<Review>,
    pub is_public: bool,
    pub repository_url: Option<String>,
    pub live_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub progress: Option<u8>,
    pub tags: Option<Vec<String>>,
    pub is_public: Option<bool>,
    pub repository_url: Option<String>,
    pub live_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeLevel {
    Beginner,
    Intermediate,
    Expert,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeOfferDraft {
    pub user_id: String,
    pub user_name: String,
    pub user_avatar: String,
    pub user_rating: f64,
    pub teaches: String,
    pub wants: String,
    pub level: TradeLevel,
    pub availability: Vec<String>,
    pub description: String,
    pub tags: Vec<String>,
    pub credits: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeOffer {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_avatar: String,
    pub user_rating: f64,
    pub teaches: String,
    pub wants: String,
    pub level: TradeLevel,
    pub sessions_completed: u32,
    pub availability: Vec<String>,
    pub description: String,
    pub tags: Vec<String>,
    pub credits: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    CourseEnrolled,
    CourseCompleted,
    LessonCompleted,
    QuizCompleted,
    ProjectCreated,
    BadgeEarned,
    TaughtSession,
    LearnedSession,
    LevelUp,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CourseEnrolled => "course_enrolled",
            Self::CourseCompleted => "course_completed",
            Self::LessonCompleted => "lesson_completed",
            Self::QuizCompleted => "quiz_completed",
            Self::ProjectCreated => "project_created",
            Self::BadgeEarned => "badge_earned",
            Self::TaughtSession => "taught_session",
            Self::LearnedSession => "learned_session",
            Self::LevelUp => "level_up",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::CourseEnrolled => "📚",
            Self::CourseCompleted => "🎓",
            Self::LessonCompleted => "✅",
            Self::QuizCompleted => "🏆",
            Self::ProjectCreated => "🚀",
            Self::BadgeEarned => "🏅",
            Self::TaughtSession => "🧑‍🏫",
            Self::LearnedSession => "📖",
            Self::LevelUp => "⬆️",
        }
    }
}

/// An activity before the log stamps it with an id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub kind: ActivityKind,
    pub title: String,
    pub description: String,
    pub xp_gained: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub kind: ActivityKind,
    pub title: String,
    pub description: String,
    pub xp_gained: u64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: String,
    pub user_name: String,
    pub user_avatar: String,
    pub xp: u64,
    pub level: u32,
    pub streak: u32,
    pub is_current_user: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TournamentStatus {
    Upcoming,
    Live,
    Ended,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prize {
    pub position: u32,
    pub reward: String,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub prize_pool: u64,
    pub participants: u32,
    pub max_participants: u32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: TournamentStatus,
    pub difficulty: QuizDifficulty,
    pub entry_fee: u64,
    pub rules: Vec<String>,
    pub prizes: Vec<Prize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectStep {
    pub id: String,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiniProject {
    pub id: String,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub estimated_time: String,
    pub icon: String,
    pub tags: Vec<String>,
    pub steps: Vec<ProjectStep>,
    pub xp_reward: u64,
}
