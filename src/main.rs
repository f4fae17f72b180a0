use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};

mod content;
mod error;
mod guru;
mod interchange;
mod models;
mod progression;
mod report;
mod scoring;
mod seed;
mod storage;

use content::{BadgeOutcome, ContentStore, LessonOutcome, BADGE_XP_BONUS, PROJECT_XP_BONUS};
use error::StoreError;
use models::{
    Badge, Difficulty, ProfileUpdate, ProjectDraft, ProjectStatus, ProjectUpdate, Rarity,
    TradeLevel, TradeOfferDraft,
};
use progression::{level_title, IdentityStore, LevelUp, SessionState};
use storage::{FileStore, KeyValueStore};

const DATA_DIR_ENV: &str = "GYAANMITRA_DATA_DIR";
const DEFAULT_DATA_DIR: &str = ".gyaanmitra";

#[derive(Parser)]
#[command(name = "gyaanmitra")]
#[command(about = "Gamified learning tracker: courses, quizzes, XP, badges and skill trades", long_about = None)]
struct Cli {
    /// Directory holding saved progress (defaults to $GYAANMITRA_DATA_DIR or ./.gyaanmitra)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log state changes to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum RarityArg {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl From<RarityArg> for Rarity {
    fn from(value: RarityArg) -> Self {
        match value {
            RarityArg::Common => Rarity::Common,
            RarityArg::Rare => Rarity::Rare,
            RarityArg::Epic => Rarity::Epic,
            RarityArg::Legendary => Rarity::Legendary,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum DifficultyArg {
    Beginner,
    Intermediate,
    Advanced,
}

impl From<DifficultyArg> for Difficulty {
    fn from(value: DifficultyArg) -> Self {
        match value {
            DifficultyArg::Beginner => Difficulty::Beginner,
            DifficultyArg::Intermediate => Difficulty::Intermediate,
            DifficultyArg::Advanced => Difficulty::Advanced,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Planning,
    InProgress,
    Completed,
    Archived,
}

impl From<StatusArg> for ProjectStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Planning => ProjectStatus::Planning,
            StatusArg::InProgress => ProjectStatus::InProgress,
            StatusArg::Completed => ProjectStatus::Completed,
            StatusArg::Archived => ProjectStatus::Archived,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum TradeLevelArg {
    Beginner,
    Intermediate,
    Expert,
}

impl From<TradeLevelArg> for TradeLevel {
    fn from(value: TradeLevelArg) -> Self {
        match value {
            TradeLevelArg::Beginner => TradeLevel::Beginner,
            TradeLevelArg::Intermediate => TradeLevel::Intermediate,
            TradeLevelArg::Expert => TradeLevel::Expert,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in (any email/password pair works; the demo account has preset progress)
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create a new account
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign in with a Google account
    Google,
    /// Sign out and clear saved progression
    Logout,
    /// Pick interests and finish onboarding
    Onboard {
        #[arg(long, value_delimiter = ',', required = true)]
        interests: Vec<String>,
    },
    /// Edit profile details
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        avatar: Option<String>,
        #[arg(long)]
        class: Option<String>,
        #[arg(long)]
        stream: Option<String>,
        #[arg(long, value_delimiter = ',')]
        interests: Option<Vec<String>>,
        #[arg(long)]
        streak: Option<u32>,
    },
    /// Show level, XP, credits and badges
    Status,
    /// List courses, quizzes, trade offers, tournaments and mini projects
    Catalog,
    /// Enroll in a course
    Enroll {
        #[arg(long)]
        course: String,
    },
    /// Mark a lesson complete
    CompleteLesson {
        #[arg(long)]
        course: String,
        #[arg(long)]
        lesson: String,
    },
    /// Answer a quiz; answers are 1-based option numbers, `-` skips a question
    Quiz {
        #[arg(long)]
        quiz: String,
        #[arg(long, value_delimiter = ',')]
        answers: Vec<String>,
    },
    /// Award a badge
    Badge {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "🏅")]
        emoji: String,
        #[arg(long, value_enum, default_value_t = RarityArg::Common)]
        rarity: RarityArg,
        #[arg(long, default_value = "general")]
        category: String,
    },
    /// Start a new project
    Project {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "General")]
        category: String,
        #[arg(long, value_enum, default_value_t = DifficultyArg::Beginner)]
        difficulty: DifficultyArg,
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
        #[arg(long)]
        public: bool,
    },
    /// Update an existing project
    ProjectUpdate {
        #[arg(long)]
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        #[arg(long)]
        progress: Option<u8>,
        #[arg(long, value_delimiter = ',')]
        tags: Option<Vec<String>>,
        #[arg(long)]
        public: Option<bool>,
        #[arg(long)]
        repository_url: Option<String>,
        #[arg(long)]
        live_url: Option<String>,
    },
    /// Post a skill-trade offer
    Offer {
        #[arg(long)]
        teaches: String,
        #[arg(long)]
        wants: String,
        #[arg(long, value_enum, default_value_t = TradeLevelArg::Intermediate)]
        level: TradeLevelArg,
        #[arg(long, default_value_t = 10)]
        credits: u64,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, value_delimiter = ',')]
        availability: Vec<String>,
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
    },
    /// Import skill-trade offers from a CSV file
    ImportOffers {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Book a session from a trade offer, paying its credits
    Book {
        #[arg(long)]
        offer: String,
    },
    /// Record a session you taught and collect credits
    Teach {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        credits: u64,
    },
    /// Add or spend credits
    Credits {
        #[command(subcommand)]
        action: CreditsAction,
    },
    /// Show the activity feed, optionally exporting it as CSV
    Activity {
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Show the leaderboard
    Leaderboard,
    /// Generate a markdown progress report
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Ask the learning guru a question
    Ask {
        #[arg(required = true)]
        message: Vec<String>,
    },
}

#[derive(Subcommand)]
enum CreditsAction {
    Add {
        #[arg(long)]
        amount: u64,
    },
    Spend {
        #[arg(long)]
        amount: u64,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
}

fn resolve_data_dir(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

/// `3` selects the third option, `-` or an empty slot leaves the question unanswered.
fn parse_answer(raw: &str) -> anyhow::Result<Option<usize>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return Ok(None);
    }
    let choice: usize = trimmed
        .parse()
        .with_context(|| format!("answer {trimmed:?} is not an option number"))?;
    if choice == 0 {
        anyhow::bail!("option numbers start at 1");
    }
    Ok(Some(choice - 1))
}

fn print_level_up(level_up: LevelUp) {
    if level_up.levels_gained() > 0 {
        println!(
            "Level up! Now level {} ({}).",
            level_up.new_level,
            level_title(level_up.new_level)
        );
    }
}

fn print_status(identity: &IdentityStore) {
    let Some(user) = identity.user() else {
        println!("Not signed in.");
        return;
    };
    let progress = &user.progress;

    println!("{} {} <{}>", user.avatar, user.name, user.email);
    if !identity.is_onboarded() {
        println!("Onboarding pending: run `gyaanmitra onboard --interests ...`.");
    }
    println!(
        "Level {} ({}) - {} / {} XP",
        progress.level,
        level_title(progress.level),
        progress.xp,
        progress.xp_to_next_level
    );
    println!("Credits: {}  Streak: {} days", progress.credits, progress.streak);
    if !user.interests.is_empty() {
        println!("Interests: {}", user.interests.join(", "));
    }
    if progress.badges.is_empty() {
        println!("Badges: none yet");
    } else {
        let badges: Vec<String> = progress
            .badges
            .iter()
            .map(|badge| format!("{} {}", badge.emoji, badge.name))
            .collect();
        println!("Badges: {}", badges.join(", "));
    }
}

fn print_catalog(content: &ContentStore) {
    println!("Courses:");
    for course in content.courses() {
        println!(
            "- {} {} [{}] {} lessons, {:.0}% done{}",
            course.id,
            course.title,
            course.category,
            course.lessons.len(),
            course.progress,
            if course.enrolled { " (enrolled)" } else { "" }
        );
        for lesson in &course.lessons {
            println!(
                "    {} {} {} ({} XP){}",
                lesson.order,
                lesson.id,
                lesson.title,
                lesson.xp_reward,
                if lesson.completed { " done" } else { "" }
            );
        }
    }

    println!("Quizzes:");
    for quiz in content.quizzes() {
        println!(
            "- {} {} ({} questions, up to {} XP)",
            quiz.id,
            quiz.title,
            quiz.questions.len(),
            quiz.xp_reward
        );
    }

    println!("Trade offers:");
    for offer in content.trade_offers() {
        println!(
            "- {} {} teaches {} for {} credits, wants {} ({} sessions)",
            offer.id,
            offer.user_name,
            offer.teaches,
            offer.credits,
            offer.wants,
            offer.sessions_completed
        );
    }

    println!("Tournaments:");
    for tournament in content.tournaments() {
        println!(
            "- {} {} ({}/{} players, prize pool {})",
            tournament.id,
            tournament.title,
            tournament.participants,
            tournament.max_participants,
            tournament.prize_pool
        );
    }

    println!("Mini projects:");
    for project in content.mini_projects() {
        println!(
            "- {} {} {} ({}, {} steps, {} XP)",
            project.icon,
            project.id,
            project.title,
            project.estimated_time,
            project.steps.len(),
            project.xp_reward
        );
    }

    if !content.projects().is_empty() {
        println!("Your projects:");
        for project in content.projects() {
            println!(
                "- {} {} ({:?}, {}%)",
                project.id, project.title, project.status, project.progress
            );
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let data_dir = resolve_data_dir(cli.data_dir);
    let store: Rc<dyn KeyValueStore> =
        Rc::new(FileStore::open(&data_dir).context("failed to open data directory")?);
    let mut identity = IdentityStore::load(store.clone());
    let mut content = ContentStore::load(store, seed::demo_catalog(), identity.user());

    match cli.command {
        Commands::Login { email, password } => {
            let user = identity.login(&email, &password);
            println!("Welcome back, {}!", user.name);
        }
        Commands::Signup {
            name,
            email,
            password,
        } => {
            let user = identity.signup(&name, &email, &password);
            println!("Welcome to GyaanMitra, {}! Run `onboard` next.", user.name);
        }
        Commands::Google => {
            let user = identity.login_with_google();
            println!("Signed in as {}.", user.name);
        }
        Commands::Logout => {
            identity.logout();
            println!("Signed out.");
        }
        Commands::Onboard { interests } => {
            identity.complete_onboarding(interests)?;
            println!("Your learning journey begins now!");
        }
        Commands::Profile {
            name,
            avatar,
            class,
            stream,
            interests,
            streak,
        } => {
            let user = identity.update_user(ProfileUpdate {
                name,
                avatar,
                class,
                stream,
                interests,
                skills: None,
                streak,
            })?;
            println!("Profile updated for {}.", user.name);
        }
        Commands::Status => print_status(&identity),
        Commands::Catalog => print_catalog(&content),
        Commands::Enroll { course } => {
            content.enroll_course(&identity, &course)?;
            if let Some(course) = content.course(&course) {
                println!("Enrolled in {} {}.", course.thumbnail, course.title);
            }
        }
        Commands::CompleteLesson { course, lesson } => {
            match content.update_course_progress(&mut identity, &course, &lesson)? {
                LessonOutcome::Completed {
                    xp_awarded,
                    course_progress,
                    course_completed,
                    level_up,
                } => {
                    println!("Lesson completed! +{xp_awarded} XP");
                    println!("Course progress: {course_progress:.0}%");
                    if course_completed {
                        println!("Course completed!");
                    }
                    print_level_up(level_up);
                }
                LessonOutcome::AlreadyCompleted => {
                    println!("Lesson {lesson} was already completed; no XP awarded.");
                }
            }
        }
        Commands::Quiz { quiz, answers } => {
            let answers = answers
                .iter()
                .map(|raw| parse_answer(raw))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let attempt = content.take_quiz(&mut identity, &quiz, &answers)?;

            println!("{}", attempt.performance.label());
            println!(
                "{} / {} correct ({}%), +{} XP",
                attempt.score.correct,
                attempt.score.total,
                attempt.score.percentage,
                attempt.award.xp_awarded
            );
            for review in &attempt.score.reviews {
                let mark = if review.is_correct { "ok" } else { "x" };
                let chosen = review
                    .selected
                    .map(|choice| format!("option {}", choice + 1))
                    .unwrap_or_else(|| "skipped".to_string());
                println!(
                    "  {} {mark} (yours: {chosen}, correct: option {}){}",
                    review.question_id,
                    review.correct_answer + 1,
                    review
                        .explanation
                        .as_deref()
                        .filter(|_| !review.is_correct)
                        .map(|text| format!(" {text}"))
                        .unwrap_or_default()
                );
            }
            print_level_up(attempt.award.level_up);
        }
        Commands::Badge {
            id,
            name,
            description,
            emoji,
            rarity,
            category,
        } => {
            let badge = Badge {
                id,
                name: name.clone(),
                description,
                emoji,
                rarity: rarity.into(),
                earned_date: Utc::now(),
                category,
            };
            match content.earn_badge(&mut identity, badge)? {
                BadgeOutcome::Earned { level_up } => {
                    println!("Badge earned: {name}! +{} XP", BADGE_XP_BONUS);
                    print_level_up(level_up);
                }
                BadgeOutcome::AlreadyEarned => println!("Badge {name} is already earned."),
            }
        }
        Commands::Project {
            title,
            description,
            category,
            difficulty,
            tags,
            public,
        } => {
            let project = content.create_project(
                &mut identity,
                ProjectDraft {
                    title,
                    description,
                    category,
                    difficulty: difficulty.into(),
                    tags,
                    is_public: public,
                },
            )?;
            println!(
                "Created project {} ({}). +{} XP",
                project.title,
                project.id,
                PROJECT_XP_BONUS
            );
        }
        Commands::ProjectUpdate {
            id,
            title,
            description,
            status,
            progress,
            tags,
            public,
            repository_url,
            live_url,
        } => {
            let project = content.update_project(
                &id,
                ProjectUpdate {
                    title,
                    description,
                    status: status.map(Into::into),
                    progress,
                    tags,
                    is_public: public,
                    repository_url,
                    live_url,
                },
            )?;
            println!(
                "Updated {} ({:?}, {}%).",
                project.title, project.status, project.progress
            );
        }
        Commands::Offer {
            teaches,
            wants,
            level,
            credits,
            description,
            availability,
            tags,
        } => {
            let user = identity.user().ok_or(StoreError::NotAuthenticated)?;
            let draft = TradeOfferDraft {
                user_id: user.id.clone(),
                user_name: user.name.clone(),
                user_avatar: user.avatar.clone(),
                user_rating: user.rating,
                teaches,
                wants,
                level: level.into(),
                availability,
                description,
                tags,
                credits,
            };
            let offer = content.create_trade_offer(draft);
            println!("Posted offer {} to teach {}.", offer.id, offer.teaches);
        }
        Commands::ImportOffers { csv } => {
            let user = identity.user().ok_or(StoreError::NotAuthenticated)?;
            let drafts = interchange::read_trade_offers_csv(&csv, &user.id, &user.avatar)?;
            let imported = drafts.len();
            for draft in drafts {
                content.create_trade_offer(draft);
            }
            println!("Imported {imported} offers from {}.", csv.display());
        }
        Commands::Book { offer } => {
            let balance = content.book_session(&mut identity, &offer)?;
            println!("Session booked. Remaining credits: {balance}");
        }
        Commands::Teach { subject, credits } => {
            let balance = content.record_taught_session(&mut identity, &subject, credits)?;
            println!("Thanks for teaching {subject}! Credits: {balance}");
        }
        Commands::Credits { action } => match action {
            CreditsAction::Add { amount } => {
                let balance = identity.add_credits(amount)?;
                println!("Credits: {balance}");
            }
            CreditsAction::Spend { amount } => match identity.use_credits(amount) {
                Ok(balance) => println!("Spent {amount} credits. Remaining: {balance}"),
                Err(err @ StoreError::InsufficientCredits { .. }) => println!("{err}"),
                Err(err) => return Err(err.into()),
            },
        },
        Commands::Activity { limit, csv } => {
            if let Some(path) = csv {
                let written = interchange::export_activities_csv(&path, content.activities())?;
                println!("Wrote {written} activities to {}.", path.display());
            } else if content.activities().is_empty() {
                println!("No activity yet.");
            } else {
                for activity in content.activities().iter().take(limit) {
                    println!(
                        "{} {} {}: {} (+{} XP)",
                        activity.timestamp.format("%Y-%m-%d %H:%M"),
                        activity.kind.icon(),
                        activity.title,
                        activity.description,
                        activity.xp_gained
                    );
                }
            }
        }
        Commands::Leaderboard => {
            for entry in content.leaderboard(identity.user()) {
                println!(
                    "{:>2}. {} {} - level {}, {} XP, {} day streak{}",
                    entry.rank,
                    entry.user_avatar,
                    entry.user_name,
                    entry.level,
                    entry.xp,
                    entry.streak,
                    if entry.is_current_user { " (you)" } else { "" }
                );
            }
        }
        Commands::Report { out } => {
            let user = identity.user().ok_or(StoreError::NotAuthenticated)?;
            let report = report::build_report(user, &content);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Ask { message } => {
            if identity.state() == SessionState::Anonymous {
                println!("{}", guru::GREETING);
            }
            println!("{}", guru::respond(&message.join(" ")));
        }
    }

    Ok(())
}
