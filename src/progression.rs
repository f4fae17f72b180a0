use std::rc::Rc;

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{Badge, ProfileUpdate, Skill, UserProfile, UserProgress};
use crate::storage::{self, KeyValueStore, ONBOARDED_KEY, USER_KEY};

pub const BASE_LEVEL_XP: u64 = 500;
pub const STARTING_CREDITS: u64 = 50;

const DEMO_EMAIL: &str = "student@gyaan.com";
const DEMO_SECRET: &str = "password123";

/// floor(500 * level^1.5), computed as isqrt(250_000 * level^3) so it stays exact.
pub fn xp_for_level(level: u32) -> u64 {
    let level = u128::from(level);
    let scaled = u128::from(BASE_LEVEL_XP * BASE_LEVEL_XP) * level * level * level;
    integer_sqrt(scaled) as u64
}

fn integer_sqrt(value: u128) -> u128 {
    let mut root = (value as f64).sqrt() as u128;
    while root * root > value {
        root -= 1;
    }
    while (root + 1) * (root + 1) <= value {
        root += 1;
    }
    root
}

pub fn level_title(level: u32) -> &'static str {
    match level {
        0..=2 => "Beginner",
        3..=4 => "Learner",
        5..=9 => "Scholar",
        10..=14 => "Expert",
        15..=19 => "Master",
        _ => "Guru",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUp {
    pub previous_level: u32,
    pub new_level: u32,
}

impl LevelUp {
    pub fn levels_gained(&self) -> u32 {
        self.new_level - self.previous_level
    }
}

/// Adds XP and rolls over as many levels as the total covers.
pub fn apply_xp(progress: &mut UserProgress, amount: u64) -> LevelUp {
    let previous_level = progress.level;
    progress.xp = progress.xp.saturating_add(amount);

    while progress.xp >= progress.xp_to_next_level {
        progress.xp -= progress.xp_to_next_level;
        progress.level += 1;
        progress.xp_to_next_level = xp_for_level(progress.level);
    }

    LevelUp {
        previous_level,
        new_level: progress.level,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated { onboarded: bool },
}

fn fresh_progress(streak: u32) -> UserProgress {
    UserProgress {
        xp: 0,
        level: 1,
        xp_to_next_level: xp_for_level(1),
        credits: STARTING_CREDITS,
        streak,
        badges: Vec::new(),
    }
}

fn fresh_profile(id: String, name: &str, email: &str, avatar: &str, streak: u32) -> UserProfile {
    UserProfile {
        id,
        name: name.to_string(),
        email: email.to_string(),
        avatar: avatar.to_string(),
        class: String::new(),
        stream: String::new(),
        interests: Vec::new(),
        rating: 0.0,
        joined_date: Utc::now(),
        skills: Vec::new(),
        progress: fresh_progress(streak),
    }
}

fn demo_profile() -> UserProfile {
    let skill = |name: &str, level: u32, category: &str| Skill {
        name: name.to_string(),
        level,
        max_level: 100,
        category: category.to_string(),
    };

    UserProfile {
        id: "demo_user_123".to_string(),
        name: "Arjun Sharma".to_string(),
        email: DEMO_EMAIL.to_string(),
        avatar: "👨‍🎓".to_string(),
        class: "Class 12".to_string(),
        stream: "Science Stream".to_string(),
        interests: ["coding", "physics", "mathematics", "design"]
            .iter()
            .map(|interest| interest.to_string())
            .collect(),
        rating: 4.8,
        joined_date: Utc
            .with_ymd_and_hms(2024, 6, 15, 0, 0, 0)
            .single()
            .unwrap_or_else(Utc::now),
        skills: vec![
            skill("React", 80, "Programming"),
            skill("Python", 45, "Programming"),
            skill("Mathematics", 70, "Academics"),
            skill("Physics", 65, "Academics"),
        ],
        progress: UserProgress {
            xp: 2450,
            level: 5,
            xp_to_next_level: 3000,
            credits: 250,
            streak: 12,
            badges: Vec::new(),
        },
    }
}

/// Sole owner of the signed-in user's identity and progression numbers.
pub struct IdentityStore {
    store: Rc<dyn KeyValueStore>,
    user: Option<UserProfile>,
    onboarded: bool,
}

impl IdentityStore {
    pub fn load(store: Rc<dyn KeyValueStore>) -> Self {
        let user: Option<UserProfile> = storage::load_snapshot(store.as_ref(), USER_KEY);
        let onboarded = user.is_some()
            && storage::load_snapshot::<bool>(store.as_ref(), ONBOARDED_KEY).unwrap_or(false);

        Self {
            store,
            user,
            onboarded,
        }
    }

    pub fn state(&self) -> SessionState {
        match self.user {
            Some(_) => SessionState::Authenticated {
                onboarded: self.onboarded,
            },
            None => SessionState::Anonymous,
        }
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn is_onboarded(&self) -> bool {
        self.onboarded
    }

    pub fn login(&mut self, email: &str, secret: &str) -> &UserProfile {
        let profile = if email == DEMO_EMAIL && secret == DEMO_SECRET {
            demo_profile()
        } else {
            let name = email.split('@').next().unwrap_or(email);
            let mut profile = fresh_profile(
                format!("user_{}", Uuid::new_v4()),
                name,
                email,
                "🎓",
                1,
            );
            profile.class = "Class 10".to_string();
            profile.stream = "General".to_string();
            profile.interests = vec!["learning".to_string()];
            profile
        };

        tracing::info!(user_id = %profile.id, "signed in");
        self.start_session(profile, true)
    }

    pub fn signup(&mut self, name: &str, email: &str, _secret: &str) -> &UserProfile {
        let profile = fresh_profile(format!("user_{}", Uuid::new_v4()), name, email, "🎓", 0);
        tracing::info!(user_id = %profile.id, "account created");
        self.start_session(profile, false)
    }

    pub fn login_with_google(&mut self) -> &UserProfile {
        let profile = fresh_profile(
            format!("user_google_{}", Uuid::new_v4()),
            "Google User",
            "user@gmail.com",
            "👨‍🎓",
            0,
        );
        tracing::info!(user_id = %profile.id, "signed in with google");
        self.start_session(profile, false)
    }

    fn start_session(&mut self, profile: UserProfile, onboarded: bool) -> &UserProfile {
        self.onboarded = onboarded;
        self.persist_onboarded();
        storage::save_snapshot(self.store.as_ref(), USER_KEY, &profile);
        self.user.insert(profile)
    }

    pub fn logout(&mut self) {
        if let Some(user) = self.user.take() {
            tracing::info!(user_id = %user.id, "signed out");
        }
        self.onboarded = false;
        storage::clear_snapshot(self.store.as_ref(), USER_KEY);
        storage::clear_snapshot(self.store.as_ref(), ONBOARDED_KEY);
    }

    pub fn complete_onboarding(&mut self, interests: Vec<String>) -> Result<(), StoreError> {
        let user = self.user.as_mut().ok_or(StoreError::NotAuthenticated)?;
        user.interests = interests;
        self.onboarded = true;
        self.persist_user();
        self.persist_onboarded();
        Ok(())
    }

    pub fn update_user(&mut self, update: ProfileUpdate) -> Result<&UserProfile, StoreError> {
        if let Some(name) = &update.name {
            if name.trim().is_empty() {
                return Err(StoreError::InvalidUpdate("name cannot be blank".to_string()));
            }
        }

        let user = self.user.as_mut().ok_or(StoreError::NotAuthenticated)?;
        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(avatar) = update.avatar {
            user.avatar = avatar;
        }
        if let Some(class) = update.class {
            user.class = class;
        }
        if let Some(stream) = update.stream {
            user.stream = stream;
        }
        if let Some(interests) = update.interests {
            user.interests = interests;
        }
        if let Some(skills) = update.skills {
            user.skills = skills;
        }
        if let Some(streak) = update.streak {
            user.progress.streak = streak;
        }

        storage::save_snapshot(self.store.as_ref(), USER_KEY, &*user);
        Ok(user)
    }

    pub fn add_xp(&mut self, amount: u64) -> Result<LevelUp, StoreError> {
        let user = self.user.as_mut().ok_or(StoreError::NotAuthenticated)?;
        let level_up = apply_xp(&mut user.progress, amount);

        if level_up.levels_gained() > 0 {
            tracing::info!(
                user_id = %user.id,
                from = level_up.previous_level,
                to = level_up.new_level,
                "level up"
            );
        }

        self.persist_user();
        Ok(level_up)
    }

    pub fn add_credits(&mut self, amount: u64) -> Result<u64, StoreError> {
        let user = self.user.as_mut().ok_or(StoreError::NotAuthenticated)?;
        user.progress.credits = user.progress.credits.saturating_add(amount);
        let balance = user.progress.credits;
        self.persist_user();
        Ok(balance)
    }

    /// Spends credits if the balance covers them; otherwise nothing changes.
    pub fn use_credits(&mut self, amount: u64) -> Result<u64, StoreError> {
        let user = self.user.as_mut().ok_or(StoreError::NotAuthenticated)?;
        if user.progress.credits < amount {
            return Err(StoreError::InsufficientCredits {
                requested: amount,
                available: user.progress.credits,
            });
        }

        user.progress.credits -= amount;
        let balance = user.progress.credits;
        self.persist_user();
        Ok(balance)
    }

    /// Records a badge. Returns false when a badge with the same id is already held.
    pub fn award_badge(&mut self, badge: Badge) -> Result<bool, StoreError> {
        let user = self.user.as_mut().ok_or(StoreError::NotAuthenticated)?;
        if user.progress.badges.iter().any(|held| held.id == badge.id) {
            return Ok(false);
        }

        tracing::info!(user_id = %user.id, badge = %badge.id, rarity = badge.rarity.as_str(), "badge earned");
        user.progress.badges.push(badge);
        self.persist_user();
        Ok(true)
    }

    fn persist_user(&self) {
        if let Some(user) = &self.user {
            storage::save_snapshot(self.store.as_ref(), USER_KEY, user);
        }
    }

    fn persist_onboarded(&self) {
        storage::save_snapshot(self.store.as_ref(), ONBOARDED_KEY, &self.onboarded);
    }
}
