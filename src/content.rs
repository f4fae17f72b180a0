use std::rc::Rc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{
    Activity, ActivityKind, Badge, Course, LeaderboardEntry, MiniProject, NewActivity, Project,
    ProjectDraft, ProjectStatus, ProjectUpdate, Quiz, TeamMember, Tournament, TradeOffer,
    TradeOfferDraft, UserProfile,
};
use crate::progression::{level_title, IdentityStore, LevelUp};
use crate::scoring::{self, Performance, QuizScore};
use crate::seed::Catalog;
use crate::storage::{
    self, KeyValueStore, ACTIVITIES_KEY, COURSES_KEY, PROJECTS_KEY, TRADE_OFFERS_KEY,
};

pub const ACTIVITY_LOG_CAPACITY: usize = 50;
pub const BADGE_XP_BONUS: u64 = 50;
pub const PROJECT_XP_BONUS: u64 = 100;

#[derive(Debug, Clone, PartialEq)]
pub enum LessonOutcome {
    Completed {
        xp_awarded: u64,
        course_progress: f64,
        course_completed: bool,
        level_up: LevelUp,
    },
    AlreadyCompleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeOutcome {
    Earned { level_up: LevelUp },
    AlreadyEarned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizAward {
    pub xp_awarded: u64,
    pub level_up: LevelUp,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuizAttempt {
    pub score: QuizScore,
    pub performance: Performance,
    pub award: QuizAward,
}

/// Per-course progress persisted between runs; the catalog itself always comes from the seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CourseProgressRecord {
    course_id: String,
    enrolled: bool,
    completed_lessons: Vec<String>,
}

/// Course progress belongs to exactly one user and is ignored for anyone else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CourseProgressSnapshot {
    owner: String,
    records: Vec<CourseProgressRecord>,
}

fn apply_course_records(courses: &mut [Course], records: Vec<CourseProgressRecord>) {
    for record in records {
        let Some(course) = courses.iter_mut().find(|c| c.id == record.course_id) else {
            continue;
        };
        course.enrolled = record.enrolled;
        for lesson in course.lessons.iter_mut() {
            lesson.completed = record.completed_lessons.contains(&lesson.id);
        }
        course.progress = lesson_progress(course);
    }
}

fn reset_course_progress(courses: &mut [Course]) {
    for course in courses.iter_mut() {
        course.enrolled = false;
        course.progress = 0.0;
        for lesson in course.lessons.iter_mut() {
            lesson.completed = false;
        }
    }
}

fn lesson_progress(course: &Course) -> f64 {
    if course.lessons.is_empty() {
        return 0.0;
    }
    course.completed_lessons() as f64 / course.lessons.len() as f64 * 100.0
}

/// Catalog content plus the activity feed. Awards go through the identity store.
pub struct ContentStore {
    store: Rc<dyn KeyValueStore>,
    courses: Vec<Course>,
    course_owner: Option<String>,
    quizzes: Vec<Quiz>,
    trade_offers: Vec<TradeOffer>,
    leaderboard: Vec<LeaderboardEntry>,
    tournaments: Vec<Tournament>,
    mini_projects: Vec<MiniProject>,
    projects: Vec<Project>,
    activities: Vec<Activity>,
}

impl ContentStore {
    /// Loads saved state. Course progress is only restored for `current_user`.
    pub fn load(
        store: Rc<dyn KeyValueStore>,
        catalog: Catalog,
        current_user: Option<&UserProfile>,
    ) -> Self {
        let mut courses = catalog.courses;
        let current_id = current_user.map(|user| user.id.clone());
        let snapshot: Option<CourseProgressSnapshot> =
            storage::load_snapshot(store.as_ref(), COURSES_KEY);
        match snapshot {
            Some(snapshot) if current_id.as_deref() == Some(snapshot.owner.as_str()) => {
                apply_course_records(&mut courses, snapshot.records);
            }
            Some(snapshot) => {
                tracing::debug!(owner = %snapshot.owner, "ignoring course progress of another user");
            }
            None => {}
        }

        let trade_offers = storage::load_snapshot(store.as_ref(), TRADE_OFFERS_KEY)
            .unwrap_or(catalog.trade_offers);
        let projects = storage::load_snapshot(store.as_ref(), PROJECTS_KEY).unwrap_or_default();
        let mut activities: Vec<Activity> =
            storage::load_snapshot(store.as_ref(), ACTIVITIES_KEY).unwrap_or_default();
        activities.truncate(ACTIVITY_LOG_CAPACITY);

        Self {
            store,
            courses,
            course_owner: current_id,
            quizzes: catalog.quizzes,
            trade_offers,
            leaderboard: catalog.leaderboard,
            tournaments: catalog.tournaments,
            mini_projects: catalog.mini_projects,
            projects,
            activities,
        }
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn course(&self, course_id: &str) -> Option<&Course> {
        self.courses.iter().find(|course| course.id == course_id)
    }

    pub fn enrolled_courses(&self) -> Vec<&Course> {
        self.courses.iter().filter(|course| course.enrolled).collect()
    }

    pub fn quizzes(&self) -> &[Quiz] {
        &self.quizzes
    }

    pub fn trade_offers(&self) -> &[TradeOffer] {
        &self.trade_offers
    }

    pub fn tournaments(&self) -> &[Tournament] {
        &self.tournaments
    }

    pub fn mini_projects(&self) -> &[MiniProject] {
        &self.mini_projects
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// Most recent first.
    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn enroll_course(
        &mut self,
        identity: &IdentityStore,
        course_id: &str,
    ) -> Result<(), StoreError> {
        let user = identity.user().ok_or(StoreError::NotAuthenticated)?;
        self.claim_courses(&user.id);

        let course = self
            .courses
            .iter_mut()
            .find(|course| course.id == course_id)
            .ok_or_else(|| StoreError::CourseNotFound(course_id.to_string()))?;
        if course.enrolled {
            return Err(StoreError::AlreadyEnrolled(course_id.to_string()));
        }

        course.enrolled = true;
        let title = course.title.clone();
        tracing::info!(course_id, "enrolled");
        self.persist_courses();

        self.add_activity(NewActivity {
            kind: ActivityKind::CourseEnrolled,
            title: "Enrolled in Course".to_string(),
            description: format!("Started learning {title}"),
            xp_gained: 0,
        });
        Ok(())
    }

    pub fn update_course_progress(
        &mut self,
        identity: &mut IdentityStore,
        course_id: &str,
        lesson_id: &str,
    ) -> Result<LessonOutcome, StoreError> {
        let user = identity.user().ok_or(StoreError::NotAuthenticated)?;
        self.claim_courses(&user.id);

        let course_idx = self
            .courses
            .iter()
            .position(|course| course.id == course_id)
            .ok_or_else(|| StoreError::CourseNotFound(course_id.to_string()))?;
        let course = &self.courses[course_idx];
        if !course.enrolled {
            return Err(StoreError::NotEnrolled(course_id.to_string()));
        }
        let lesson_idx = course
            .lessons
            .iter()
            .position(|lesson| lesson.id == lesson_id)
            .ok_or_else(|| StoreError::LessonNotFound {
                course: course_id.to_string(),
                lesson: lesson_id.to_string(),
            })?;

        // Re-completing a lesson must never award XP twice.
        if course.lessons[lesson_idx].completed {
            return Ok(LessonOutcome::AlreadyCompleted);
        }

        let xp_reward = course.lessons[lesson_idx].xp_reward;
        let level_up = identity.add_xp(xp_reward)?;

        let course = &mut self.courses[course_idx];
        course.lessons[lesson_idx].completed = true;
        course.progress = lesson_progress(course);
        let course_progress = course.progress;
        let course_completed = course.is_complete();
        let lesson_title = course.lessons[lesson_idx].title.clone();
        let course_title = course.title.clone();
        self.persist_courses();

        self.add_activity(NewActivity {
            kind: ActivityKind::LessonCompleted,
            title: "Lesson Completed".to_string(),
            description: lesson_title,
            xp_gained: xp_reward,
        });
        if course_completed {
            tracing::info!(course_id, "course completed");
            self.add_activity(NewActivity {
                kind: ActivityKind::CourseCompleted,
                title: "Course Completed".to_string(),
                description: course_title,
                xp_gained: 0,
            });
        }
        self.record_level_up(level_up);

        Ok(LessonOutcome::Completed {
            xp_awarded: xp_reward,
            course_progress,
            course_completed,
            level_up,
        })
    }

    pub fn complete_quiz(
        &mut self,
        identity: &mut IdentityStore,
        quiz_id: &str,
        score: u32,
    ) -> Result<QuizAward, StoreError> {
        if score > 100 {
            return Err(StoreError::InvalidScore(score));
        }
        let quiz = self
            .quizzes
            .iter()
            .find(|quiz| quiz.id == quiz_id)
            .ok_or_else(|| StoreError::QuizNotFound(quiz_id.to_string()))?;

        let xp_awarded = scoring::quiz_xp(score, quiz.xp_reward);
        let quiz_title = quiz.title.clone();
        let level_up = identity.add_xp(xp_awarded)?;

        self.add_activity(NewActivity {
            kind: ActivityKind::QuizCompleted,
            title: "Quiz Completed".to_string(),
            description: format!("Scored {score}% on {quiz_title}"),
            xp_gained: xp_awarded,
        });
        self.record_level_up(level_up);

        Ok(QuizAward {
            xp_awarded,
            level_up,
        })
    }

    pub fn take_quiz(
        &mut self,
        identity: &mut IdentityStore,
        quiz_id: &str,
        answers: &[Option<usize>],
    ) -> Result<QuizAttempt, StoreError> {
        let quiz = self
            .quizzes
            .iter()
            .find(|quiz| quiz.id == quiz_id)
            .ok_or_else(|| StoreError::QuizNotFound(quiz_id.to_string()))?;

        let score = scoring::score_answers(quiz, answers);
        let award = self.complete_quiz(identity, quiz_id, score.percentage)?;

        Ok(QuizAttempt {
            performance: scoring::performance(score.percentage),
            score,
            award,
        })
    }

    pub fn earn_badge(
        &mut self,
        identity: &mut IdentityStore,
        badge: Badge,
    ) -> Result<BadgeOutcome, StoreError> {
        let name = badge.name.clone();
        if !identity.award_badge(badge)? {
            return Ok(BadgeOutcome::AlreadyEarned);
        }

        let level_up = identity.add_xp(BADGE_XP_BONUS)?;
        self.add_activity(NewActivity {
            kind: ActivityKind::BadgeEarned,
            title: "Badge Earned".to_string(),
            description: name,
            xp_gained: BADGE_XP_BONUS,
        });
        self.record_level_up(level_up);

        Ok(BadgeOutcome::Earned { level_up })
    }

    pub fn create_project(
        &mut self,
        identity: &mut IdentityStore,
        draft: ProjectDraft,
    ) -> Result<&Project, StoreError> {
        if draft.title.trim().is_empty() {
            return Err(StoreError::InvalidUpdate(
                "project title cannot be blank".to_string(),
            ));
        }
        let owner = identity.user().ok_or(StoreError::NotAuthenticated)?;
        let team = vec![TeamMember {
            id: owner.id.clone(),
            name: owner.name.clone(),
            avatar: owner.avatar.clone(),
            role: "Owner".to_string(),
        }];
        let level_up = identity.add_xp(PROJECT_XP_BONUS)?;

        let project = Project {
            id: format!("project_{}", Uuid::new_v4()),
            title: draft.title,
            description: draft.description,
            status: ProjectStatus::Planning,
            progress: 0,
            team,
            tags: draft.tags,
            category: draft.category,
            difficulty: draft.difficulty,
            start_date: Utc::now().date_naive(),
            end_date: None,
            rating: None,
            reviews: Vec::new(),
            is_public: draft.is_public,
            repository_url: None,
            live_url: None,
        };
        tracing::info!(project_id = %project.id, "project created");

        let title = project.title.clone();
        self.projects.push(project);
        self.persist_projects();

        self.add_activity(NewActivity {
            kind: ActivityKind::ProjectCreated,
            title: "Project Created".to_string(),
            description: title,
            xp_gained: PROJECT_XP_BONUS,
        });
        self.record_level_up(level_up);

        Ok(&self.projects[self.projects.len() - 1])
    }

    pub fn update_project(
        &mut self,
        project_id: &str,
        update: ProjectUpdate,
    ) -> Result<&Project, StoreError> {
        if update.progress.is_some_and(|progress| progress > 100) {
            return Err(StoreError::InvalidUpdate(
                "progress must be between 0 and 100".to_string(),
            ));
        }
        if update
            .title
            .as_deref()
            .is_some_and(|title| title.trim().is_empty())
        {
            return Err(StoreError::InvalidUpdate(
                "project title cannot be blank".to_string(),
            ));
        }

        let idx = self
            .projects
            .iter()
            .position(|project| project.id == project_id)
            .ok_or_else(|| StoreError::ProjectNotFound(project_id.to_string()))?;
        let project = &mut self.projects[idx];

        if let Some(title) = update.title {
            project.title = title;
        }
        if let Some(description) = update.description {
            project.description = description;
        }
        if let Some(status) = update.status {
            project.status = status;
            if status == ProjectStatus::Completed && project.end_date.is_none() {
                project.end_date = Some(Utc::now().date_naive());
            }
        }
        if let Some(progress) = update.progress {
            project.progress = progress;
        }
        if let Some(tags) = update.tags {
            project.tags = tags;
        }
        if let Some(is_public) = update.is_public {
            project.is_public = is_public;
        }
        if let Some(url) = update.repository_url {
            project.repository_url = Some(url);
        }
        if let Some(url) = update.live_url {
            project.live_url = Some(url);
        }

        self.persist_projects();
        Ok(&self.projects[idx])
    }

    pub fn create_trade_offer(&mut self, draft: TradeOfferDraft) -> &TradeOffer {
        let offer = TradeOffer {
            id: format!("trade_{}", Uuid::new_v4()),
            user_id: draft.user_id,
            user_name: draft.user_name,
            user_avatar: draft.user_avatar,
            user_rating: draft.user_rating,
            teaches: draft.teaches,
            wants: draft.wants,
            level: draft.level,
            sessions_completed: 0,
            availability: draft.availability,
            description: draft.description,
            tags: draft.tags,
            credits: draft.credits,
        };
        tracing::info!(offer_id = %offer.id, teaches = %offer.teaches, "trade offer posted");

        self.trade_offers.push(offer);
        self.persist_trade_offers();
        &self.trade_offers[self.trade_offers.len() - 1]
    }

    /// Pays for a session from an offer. Nothing changes if the balance is short.
    pub fn book_session(
        &mut self,
        identity: &mut IdentityStore,
        offer_id: &str,
    ) -> Result<u64, StoreError> {
        let idx = self
            .trade_offers
            .iter()
            .position(|offer| offer.id == offer_id)
            .ok_or_else(|| StoreError::OfferNotFound(offer_id.to_string()))?;

        let balance = identity.use_credits(self.trade_offers[idx].credits)?;
        let offer = &mut self.trade_offers[idx];
        offer.sessions_completed += 1;
        let description = format!("Learning {} with {}", offer.teaches, offer.user_name);
        self.persist_trade_offers();

        self.add_activity(NewActivity {
            kind: ActivityKind::LearnedSession,
            title: "Session Booked".to_string(),
            description,
            xp_gained: 0,
        });
        Ok(balance)
    }

    pub fn record_taught_session(
        &mut self,
        identity: &mut IdentityStore,
        subject: &str,
        credits: u64,
    ) -> Result<u64, StoreError> {
        let balance = identity.add_credits(credits)?;
        self.add_activity(NewActivity {
            kind: ActivityKind::TaughtSession,
            title: "Session Taught".to_string(),
            description: format!("Taught {subject} for {credits} credits"),
            xp_gained: 0,
        });
        Ok(balance)
    }

    pub fn add_activity(&mut self, entry: NewActivity) -> &Activity {
        let activity = Activity {
            id: format!("activity_{}", Uuid::new_v4()),
            kind: entry.kind,
            title: entry.title,
            description: entry.description,
            xp_gained: entry.xp_gained,
            timestamp: Utc::now(),
        };

        self.activities.insert(0, activity);
        self.activities.truncate(ACTIVITY_LOG_CAPACITY);
        storage::save_snapshot(self.store.as_ref(), ACTIVITIES_KEY, &self.activities);
        &self.activities[0]
    }

    /// Seeded standings plus the current user, ranked by level then XP.
    pub fn leaderboard(&self, current_user: Option<&UserProfile>) -> Vec<LeaderboardEntry> {
        let mut entries = self.leaderboard.clone();
        if let Some(user) = current_user {
            entries.push(LeaderboardEntry {
                rank: 0,
                user_id: user.id.clone(),
                user_name: user.name.clone(),
                user_avatar: user.avatar.clone(),
                xp: user.progress.xp,
                level: user.progress.level,
                streak: user.progress.streak,
                is_current_user: true,
            });
        }

        entries.sort_by(|a, b| b.level.cmp(&a.level).then(b.xp.cmp(&a.xp)));
        for (idx, entry) in entries.iter_mut().enumerate() {
            entry.rank = idx + 1;
        }
        entries
    }

    fn record_level_up(&mut self, level_up: LevelUp) {
        if level_up.levels_gained() == 0 {
            return;
        }
        self.add_activity(NewActivity {
            kind: ActivityKind::LevelUp,
            title: "Level Up!".to_string(),
            description: format!(
                "Reached level {} ({})",
                level_up.new_level,
                level_title(level_up.new_level)
            ),
            xp_gained: 0,
        });
    }

    /// Switches course progress to `user_id`, starting from a clean catalog if it changed hands.
    fn claim_courses(&mut self, user_id: &str) {
        if self.course_owner.as_deref() == Some(user_id) {
            return;
        }
        reset_course_progress(&mut self.courses);
        self.course_owner = Some(user_id.to_string());
    }

    fn persist_courses(&self) {
        let Some(owner) = &self.course_owner else {
            return;
        };
        let records: Vec<CourseProgressRecord> = self
            .courses
            .iter()
            .map(|course| CourseProgressRecord {
                course_id: course.id.clone(),
                enrolled: course.enrolled,
                completed_lessons: course
                    .lessons
                    .iter()
                    .filter(|lesson| lesson.completed)
                    .map(|lesson| lesson.id.clone())
                    .collect(),
            })
            .collect();
        let snapshot = CourseProgressSnapshot {
            owner: owner.clone(),
            records,
        };
        storage::save_snapshot(self.store.as_ref(), COURSES_KEY, &snapshot);
    }

    fn persist_projects(&self) {
        storage::save_snapshot(self.store.as_ref(), PROJECTS_KEY, &self.projects);
    }

    fn persist_trade_offers(&self) {
        storage::save_snapshot(self.store.as_ref(), TRADE_OFFERS_KEY, &self.trade_offers);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Difficulty, Rarity, TradeLevel};
    use crate::progression::xp_for_level;
    use crate::seed::demo_catalog;
    use crate::storage::MemoryStore;
    use proptest::prelude::*;

    fn setup() -> (ContentStore, IdentityStore) {
        let store: Rc<dyn KeyValueStore> = Rc::new(MemoryStore::new());
        let mut identity = IdentityStore::load(store.clone());
        identity.signup("Kiara", "kiara@example.com", "secret");
        let content = ContentStore::load(store, demo_catalog(), identity.user());
        (content, identity)
    }

    fn xp(identity: &IdentityStore) -> (u32, u64) {
        let progress = &identity.user().unwrap().progress;
        (progress.level, progress.xp)
    }

    fn badge(id: &str) -> Badge {
        Badge {
            id: id.to_string(),
            name: "Quiz Whiz".to_string(),
            description: "Aced a quiz".to_string(),
            emoji: "⚡".to_string(),
            rarity: Rarity::Rare,
            earned_date: Utc::now(),
            category: "quizzes".to_string(),
        }
    }

    fn note(idx: usize) -> NewActivity {
        NewActivity {
            kind: ActivityKind::LessonCompleted,
            title: format!("entry {idx}"),
            description: String::new(),
            xp_gained: 0,
        }
    }

    #[test]
    fn enrolling_twice_is_rejected() {
        let (mut content, identity) = setup();
        content.enroll_course(&identity, "course_1").unwrap();
        assert_eq!(
            content.enroll_course(&identity, "course_1"),
            Err(StoreError::AlreadyEnrolled("course_1".to_string()))
        );
        assert_eq!(content.enrolled_courses().len(), 1);
        assert_eq!(content.activities().len(), 1);
        assert_eq!(content.activities()[0].xp_gained, 0);
    }

    #[test]
    fn missing_course_is_reported() {
        let (mut content, mut identity) = setup();
        assert_eq!(
            content.enroll_course(&identity, "course_404"),
            Err(StoreError::CourseNotFound("course_404".to_string()))
        );
        assert_eq!(
            content.update_course_progress(&mut identity, "course_404", "lesson_1_1"),
            Err(StoreError::CourseNotFound("course_404".to_string()))
        );
        assert!(content.activities().is_empty());
    }

    #[test]
    fn lessons_require_enrolment() {
        let (mut content, mut identity) = setup();
        assert_eq!(
            content.update_course_progress(&mut identity, "course_1", "lesson_1_1"),
            Err(StoreError::NotEnrolled("course_1".to_string()))
        );
        assert_eq!(xp(&identity), (1, 0));
    }

    #[test]
    fn completing_a_lesson_twice_awards_once() {
        let (mut content, mut identity) = setup();
        content.enroll_course(&identity, "course_1").unwrap();

        let first = content
            .update_course_progress(&mut identity, "course_1", "lesson_1_1")
            .unwrap();
        assert!(matches!(
            first,
            LessonOutcome::Completed { xp_awarded: 20, .. }
        ));
        let logged = content.activities().len();

        let second = content
            .update_course_progress(&mut identity, "course_1", "lesson_1_1")
            .unwrap();
        assert_eq!(second, LessonOutcome::AlreadyCompleted);
        assert_eq!(xp(&identity), (1, 20));
        assert_eq!(content.activities().len(), logged);

        let progress = content.course("course_1").unwrap().progress;
        assert!((progress - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn finishing_every_lesson_completes_the_course() {
        let (mut content, mut identity) = setup();
        content.enroll_course(&identity, "course_2").unwrap();
        content
            .update_course_progress(&mut identity, "course_2", "lesson_2_1")
            .unwrap();
        let outcome = content
            .update_course_progress(&mut identity, "course_2", "lesson_2_2")
            .unwrap();

        match outcome {
            LessonOutcome::Completed {
                course_progress,
                course_completed,
                ..
            } => {
                assert_eq!(course_progress, 100.0);
                assert!(course_completed);
            }
            LessonOutcome::AlreadyCompleted => panic!("expected completion"),
        }
        assert_eq!(xp(&identity), (1, 45));
        assert_eq!(content.activities()[0].kind, ActivityKind::CourseCompleted);
        assert_eq!(content.activities()[1].kind, ActivityKind::LessonCompleted);
    }

    #[test]
    fn unknown_lesson_is_reported() {
        let (mut content, mut identity) = setup();
        content.enroll_course(&identity, "course_1").unwrap();
        assert_eq!(
            content.update_course_progress(&mut identity, "course_1", "lesson_9"),
            Err(StoreError::LessonNotFound {
                course: "course_1".to_string(),
                lesson: "lesson_9".to_string(),
            })
        );
    }

    #[test]
    fn quiz_award_is_proportional_to_score() {
        let (mut content, mut identity) = setup();
        let award = content.complete_quiz(&mut identity, "quiz_2", 60).unwrap();
        assert_eq!(award.xp_awarded, 90);
        assert_eq!(xp(&identity), (1, 90));
        assert_eq!(content.activities()[0].description, "Scored 60% on React Fundamentals");
        assert_eq!(content.activities()[0].xp_gained, 90);
    }

    #[test]
    fn quiz_rejects_bad_input() {
        let (mut content, mut identity) = setup();
        assert_eq!(
            content.complete_quiz(&mut identity, "quiz_1", 101),
            Err(StoreError::InvalidScore(101))
        );
        assert_eq!(
            content.complete_quiz(&mut identity, "quiz_9", 50),
            Err(StoreError::QuizNotFound("quiz_9".to_string()))
        );
        assert_eq!(xp(&identity), (1, 0));
    }

    #[test]
    fn taking_a_quiz_scores_and_awards() {
        let (mut content, mut identity) = setup();
        let answers = [Some(0), Some(1), Some(1), None, Some(0)];
        let attempt = content.take_quiz(&mut identity, "quiz_1", &answers).unwrap();

        assert_eq!(attempt.score.correct, 3);
        assert_eq!(attempt.score.percentage, 60);
        assert_eq!(attempt.performance, Performance::Good);
        assert_eq!(attempt.award.xp_awarded, 60);
        assert_eq!(xp(&identity), (1, 60));
    }

    #[test]
    fn badges_award_bonus_once() {
        let (mut content, mut identity) = setup();
        let outcome = content.earn_badge(&mut identity, badge("quiz_whiz")).unwrap();
        assert!(matches!(outcome, BadgeOutcome::Earned { .. }));
        assert_eq!(
            content.earn_badge(&mut identity, badge("quiz_whiz")).unwrap(),
            BadgeOutcome::AlreadyEarned
        );

        assert_eq!(xp(&identity), (1, BADGE_XP_BONUS));
        assert_eq!(identity.user().unwrap().progress.badges.len(), 1);
        assert_eq!(content.activities().len(), 1);
    }

    #[test]
    fn level_up_is_logged() {
        let (mut content, mut identity) = setup();
        identity.add_xp(450).unwrap();
        content.earn_badge(&mut identity, badge("streak_master")).unwrap();

        assert_eq!(xp(&identity), (2, 0));
        assert_eq!(content.activities()[0].kind, ActivityKind::LevelUp);
        assert_eq!(content.activities()[0].description, "Reached level 2 (Beginner)");
        assert_eq!(content.activities()[1].kind, ActivityKind::BadgeEarned);
    }

    #[test]
    fn projects_award_flat_bonus_and_update_in_place() {
        let (mut content, mut identity) = setup();
        let project_id = content
            .create_project(
                &mut identity,
                ProjectDraft {
                    title: "Weather Dashboard".to_string(),
                    description: "Charts local forecasts".to_string(),
                    category: "Web".to_string(),
                    difficulty: Difficulty::Intermediate,
                    tags: vec!["API".to_string()],
                    is_public: true,
                },
            )
            .unwrap()
            .id
            .clone();
        assert_eq!(xp(&identity), (1, PROJECT_XP_BONUS));
        assert_eq!(content.projects()[0].team[0].name, "Kiara");

        let updated = content
            .update_project(
                &project_id,
                ProjectUpdate {
                    status: Some(ProjectStatus::Completed),
                    progress: Some(100),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.status, ProjectStatus::Completed);
        assert!(updated.end_date.is_some());
        assert_eq!(xp(&identity), (1, PROJECT_XP_BONUS));

        assert!(matches!(
            content.update_project(
                &project_id,
                ProjectUpdate {
                    progress: Some(140),
                    ..Default::default()
                }
            ),
            Err(StoreError::InvalidUpdate(_))
        ));
        assert_eq!(
            content.update_project("project_x", ProjectUpdate::default()),
            Err(StoreError::ProjectNotFound("project_x".to_string()))
        );
    }

    #[test]
    fn anonymous_project_creation_changes_nothing() {
        let store: Rc<dyn KeyValueStore> = Rc::new(MemoryStore::new());
        let mut identity = IdentityStore::load(store.clone());
        let mut content = ContentStore::load(store, demo_catalog(), identity.user());
        let result = content.create_project(
            &mut identity,
            ProjectDraft {
                title: "Todo List".to_string(),
                description: String::new(),
                category: "Web".to_string(),
                difficulty: Difficulty::Beginner,
                tags: Vec::new(),
                is_public: false,
            },
        );
        assert!(matches!(result, Err(StoreError::NotAuthenticated)));
        assert!(content.projects().is_empty());
        assert!(content.activities().is_empty());
    }

    #[test]
    fn booking_spends_credits_or_fails_cleanly() {
        let (mut content, mut identity) = setup();
        assert_eq!(content.book_session(&mut identity, "trade_1").unwrap(), 20);
        assert_eq!(content.trade_offers()[0].sessions_completed, 24);

        assert_eq!(
            content.book_session(&mut identity, "trade_2"),
            Err(StoreError::InsufficientCredits {
                requested: 35,
                available: 20
            })
        );
        assert_eq!(content.trade_offers()[1].sessions_completed, 45);
        assert_eq!(content.activities().len(), 1);

        assert_eq!(
            content.record_taught_session(&mut identity, "Physics", 40).unwrap(),
            60
        );
        assert_eq!(content.activities()[0].kind, ActivityKind::TaughtSession);
    }

    #[test]
    fn trade_offers_are_appended_without_xp() {
        let (mut content, identity) = setup();
        let offer = content.create_trade_offer(TradeOfferDraft {
            user_id: "user_x".to_string(),
            user_name: "Kiara".to_string(),
            user_avatar: "🎓".to_string(),
            user_rating: 0.0,
            teaches: "Algebra".to_string(),
            wants: "Guitar".to_string(),
            level: TradeLevel::Intermediate,
            availability: vec!["Sunday".to_string()],
            description: "Weekend algebra help".to_string(),
            tags: vec!["Math".to_string()],
            credits: 15,
        });
        assert!(offer.id.starts_with("trade_"));
        assert_eq!(content.trade_offers().len(), 3);
        assert_eq!(xp(&identity), (1, 0));
    }

    #[test]
    fn activity_log_keeps_fifty_most_recent() {
        let (mut content, _) = setup();
        for idx in 0..60 {
            content.add_activity(note(idx));
        }

        let titles: Vec<&str> = content
            .activities()
            .iter()
            .map(|activity| activity.title.as_str())
            .collect();
        assert_eq!(titles.len(), ACTIVITY_LOG_CAPACITY);
        assert_eq!(titles[0], "entry 59");
        assert_eq!(titles[49], "entry 10");
    }

    #[test]
    fn progress_survives_reload() {
        let store: Rc<dyn KeyValueStore> = Rc::new(MemoryStore::new());
        let mut identity = IdentityStore::load(store.clone());
        identity.signup("Kiara", "kiara@example.com", "secret");
        let mut content =
            ContentStore::load(store.clone(), demo_catalog(), identity.user());
        content.enroll_course(&identity, "course_1").unwrap();
        content
            .update_course_progress(&mut identity, "course_1", "lesson_1_2")
            .unwrap();

        let mut identity = IdentityStore::load(store.clone());
        let mut reloaded = ContentStore::load(store, demo_catalog(), identity.user());
        let course = reloaded.course("course_1").unwrap();
        assert!(course.enrolled);
        assert!(course.lessons[1].completed);
        assert_eq!(reloaded.activities().len(), 2);

        assert_eq!(
            reloaded
                .update_course_progress(&mut identity, "course_1", "lesson_1_2")
                .unwrap(),
            LessonOutcome::AlreadyCompleted
        );
        assert_eq!(xp(&identity), (1, 25));
    }

    #[test]
    fn leaderboard_ranks_current_user() {
        let (content, mut identity) = setup();
        identity.add_xp(100).unwrap();
        let board = content.leaderboard(identity.user());

        assert_eq!(board.len(), 5);
        assert_eq!(board[0].user_name, "Priya Sharma");
        assert_eq!(board[4].rank, 5);
        assert!(board[4].is_current_user);
        assert_eq!(content.leaderboard(None).len(), 4);
    }

    #[test]
    fn next_user_starts_courses_from_scratch() {
        let store: Rc<dyn KeyValueStore> = Rc::new(MemoryStore::new());
        let mut identity = IdentityStore::load(store.clone());
        identity.signup("Kiara", "kiara@example.com", "secret");
        let mut content =
            ContentStore::load(store.clone(), demo_catalog(), identity.user());
        content.enroll_course(&identity, "course_1").unwrap();
        content
            .update_course_progress(&mut identity, "course_1", "lesson_1_1")
            .unwrap();
        identity.logout();

        let mut identity = IdentityStore::load(store.clone());
        identity.signup("Dev", "dev@example.com", "secret");
        let mut content = ContentStore::load(store.clone(), demo_catalog(), identity.user());
        assert!(content.enrolled_courses().is_empty());
        assert!(!content.course("course_1").unwrap().lessons[0].completed);

        content.enroll_course(&identity, "course_1").unwrap();
        let outcome = content
            .update_course_progress(&mut identity, "course_1", "lesson_1_1")
            .unwrap();
        assert!(matches!(
            outcome,
            LessonOutcome::Completed { xp_awarded: 20, .. }
        ));
        assert_eq!(xp(&identity), (1, 20));

        // Dev's progress is now the saved one.
        let reloaded = ContentStore::load(store, demo_catalog(), identity.user());
        assert_eq!(reloaded.enrolled_courses().len(), 1);
        assert!(reloaded.course("course_1").unwrap().lessons[0].completed);
    }

    #[test]
    fn switching_users_in_process_resets_course_progress() {
        let (mut content, mut identity) = setup();
        content.enroll_course(&identity, "course_2").unwrap();
        content
            .update_course_progress(&mut identity, "course_2", "lesson_2_1")
            .unwrap();

        identity.logout();
        identity.signup("Dev", "dev@example.com", "secret");
        assert_eq!(
            content.update_course_progress(&mut identity, "course_2", "lesson_2_1"),
            Err(StoreError::NotEnrolled("course_2".to_string()))
        );
        content.enroll_course(&identity, "course_2").unwrap();
        content
            .update_course_progress(&mut identity, "course_2", "lesson_2_1")
            .unwrap();
        assert_eq!(xp(&identity), (1, 20));
    }

    #[test]
    fn courses_require_a_session() {
        let store: Rc<dyn KeyValueStore> = Rc::new(MemoryStore::new());
        let mut identity = IdentityStore::load(store.clone());
        let mut content = ContentStore::load(store, demo_catalog(), None);
        assert_eq!(
            content.enroll_course(&identity, "course_1"),
            Err(StoreError::NotAuthenticated)
        );
        assert_eq!(
            content.update_course_progress(&mut identity, "course_1", "lesson_1_1"),
            Err(StoreError::NotAuthenticated)
        );
        assert!(content.enrolled_courses().is_empty());
    }

    const LESSONS: [(&str, &str); 5] = [
        ("course_1", "lesson_1_1"),
        ("course_1", "lesson_1_2"),
        ("course_1", "lesson_1_3"),
        ("course_2", "lesson_2_1"),
        ("course_2", "lesson_2_2"),
    ];
    const QUIZZES: [&str; 2] = ["quiz_1", "quiz_2"];

    #[derive(Debug, Clone)]
    enum Step {
        Lesson(usize),
        Quiz(usize, u32),
        Badge(u8),
        Project,
        Xp(u64),
    }

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![
            (0..LESSONS.len()).prop_map(Step::Lesson),
            (0..QUIZZES.len(), 0u32..=100).prop_map(|(quiz, score)| Step::Quiz(quiz, score)),
            (0u8..4).prop_map(Step::Badge),
            Just(Step::Project),
            (0u64..5_000).prop_map(Step::Xp),
        ]
    }

    proptest! {
        #[test]
        fn every_award_path_keeps_xp_below_threshold(steps in proptest::collection::vec(step(), 0..40)) {
            let (mut content, mut identity) = setup();
            content.enroll_course(&identity, "course_1").unwrap();
            content.enroll_course(&identity, "course_2").unwrap();

            for step in steps {
                match step {
                    Step::Lesson(idx) => {
                        let (course, lesson) = LESSONS[idx];
                        content.update_course_progress(&mut identity, course, lesson).unwrap();
                    }
                    Step::Quiz(idx, score) => {
                        content.complete_quiz(&mut identity, QUIZZES[idx], score).unwrap();
                    }
                    Step::Badge(idx) => {
                        content.earn_badge(&mut identity, badge(&format!("badge_{idx}"))).unwrap();
                    }
                    Step::Project => {
                        content
                            .create_project(
                                &mut identity,
                                ProjectDraft {
                                    title: "Portfolio".to_string(),
                                    description: String::new(),
                                    category: "Web".to_string(),
                                    difficulty: Difficulty::Beginner,
                                    tags: Vec::new(),
                                    is_public: false,
                                },
                            )
                            .unwrap();
                    }
                    Step::Xp(amount) => {
                        identity.add_xp(amount).unwrap();
                    }
                }

                let current = &identity.user().unwrap().progress;
                prop_assert!(current.level >= 1);
                prop_assert!(current.xp < current.xp_to_next_level);
                prop_assert_eq!(current.xp_to_next_level, xp_for_level(current.level));
                prop_assert!(content.activities().len() <= ACTIVITY_LOG_CAPACITY);
            }
        }
    }
}
