use chrono::{Duration, Utc};

use crate::models::{
    Course, Difficulty, Instructor, LeaderboardEntry, Lesson, LessonKind, MiniProject, Prize,
    ProjectStep, Question, Quiz, QuizDifficulty, Tournament, TournamentStatus, TradeLevel,
    TradeOffer,
};

pub struct Catalog {
    pub courses: Vec<Course>,
    pub quizzes: Vec<Quiz>,
    pub trade_offers: Vec<TradeOffer>,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub tournaments: Vec<Tournament>,
    pub mini_projects: Vec<MiniProject>,
}

pub fn demo_catalog() -> Catalog {
    Catalog {
        courses: demo_courses(),
        quizzes: demo_quizzes(),
        trade_offers: demo_trade_offers(),
        leaderboard: demo_leaderboard(),
        tournaments: demo_tournaments(),
        mini_projects: demo_mini_projects(),
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn demo_courses() -> Vec<Course> {
    let lessons = |course_id: &str, rows: &[(&str, &str, &str, &str, &str, u64)]| {
        rows.iter()
            .enumerate()
            .map(|(idx, (id, title, description, duration, content, xp_reward))| Lesson {
                id: id.to_string(),
                course_id: course_id.to_string(),
                title: title.to_string(),
                description: description.to_string(),
                duration: duration.to_string(),
                kind: LessonKind::Video,
                content: content.to_string(),
                completed: false,
                xp_reward: *xp_reward,
                order: idx as u32 + 1,
            })
            .collect::<Vec<_>>()
    };

    vec![
        Course {
            id: "course_1".to_string(),
            title: "JavaScript Fundamentals".to_string(),
            description: "Master the basics of JavaScript programming with hands-on projects"
                .to_string(),
            category: "Programming".to_string(),
            difficulty: Difficulty::Beginner,
            thumbnail: "💻".to_string(),
            instructor: Instructor {
                name: "Prof. Sharma".to_string(),
                avatar: "👨‍🏫".to_string(),
                rating: 4.9,
            },
            lessons: lessons(
                "course_1",
                &[
                    (
                        "lesson_1_1",
                        "Introduction to JavaScript",
                        "Learn what JavaScript is and why it's important",
                        "15 min",
                        "JavaScript is a versatile programming language...",
                        20,
                    ),
                    (
                        "lesson_1_2",
                        "Variables and Data Types",
                        "Understanding variables, strings, numbers, and more",
                        "20 min",
                        "Variables are containers for storing data...",
                        25,
                    ),
                    (
                        "lesson_1_3",
                        "Functions and Scope",
                        "Master functions and understand scope",
                        "25 min",
                        "Functions are reusable blocks of code...",
                        30,
                    ),
                ],
            ),
            duration: "8 hours".to_string(),
            enrolled: false,
            progress: 0.0,
            rating: 4.8,
            students_count: 1234,
            tags: strings(&["JavaScript", "Programming", "Web Dev"]),
            xp_reward: 500,
        },
        Course {
            id: "course_2".to_string(),
            title: "UI/UX Design Basics".to_string(),
            description: "Learn the fundamentals of user interface and experience design"
                .to_string(),
            category: "Design".to_string(),
            difficulty: Difficulty::Beginner,
            thumbnail: "🎨".to_string(),
            instructor: Instructor {
                name: "Ms. Patel".to_string(),
                avatar: "👩‍🎨".to_string(),
                rating: 4.7,
            },
            lessons: lessons(
                "course_2",
                &[
                    (
                        "lesson_2_1",
                        "Design Principles",
                        "Core principles of great design",
                        "18 min",
                        "Good design is invisible...",
                        20,
                    ),
                    (
                        "lesson_2_2",
                        "Color Theory",
                        "Understanding colors and their psychology",
                        "22 min",
                        "Colors evoke emotions and create meaning...",
                        25,
                    ),
                ],
            ),
            duration: "6 hours".to_string(),
            enrolled: false,
            progress: 0.0,
            rating: 4.6,
            students_count: 856,
            tags: strings(&["Design", "UI/UX", "Creative"]),
            xp_reward: 400,
        },
        Course {
            id: "course_3".to_string(),
            title: "React Development".to_string(),
            description: "Build modern web applications with React".to_string(),
            category: "Programming".to_string(),
            difficulty: Difficulty::Intermediate,
            thumbnail: "⚛️".to_string(),
            instructor: Instructor {
                name: "Dr. Kumar".to_string(),
                avatar: "👨‍💻".to_string(),
                rating: 4.9,
            },
            lessons: Vec::new(),
            duration: "12 hours".to_string(),
            enrolled: false,
            progress: 0.0,
            rating: 4.9,
            students_count: 2341,
            tags: strings(&["React", "JavaScript", "Frontend"]),
            xp_reward: 750,
        },
    ]
}

fn demo_quizzes() -> Vec<Quiz> {
    let questions = |rows: &[(&str, &str, [&str; 4], usize, &str)]| {
        rows.iter()
            .map(|(id, question, options, correct_answer, explanation)| Question {
                id: id.to_string(),
                question: question.to_string(),
                options: strings(options),
                correct_answer: *correct_answer,
                explanation: Some(explanation.to_string()),
            })
            .collect::<Vec<_>>()
    };

    vec![
        Quiz {
            id: "quiz_1".to_string(),
            title: "JavaScript Basics Challenge".to_string(),
            description: "Test your JavaScript fundamentals in 5 minutes".to_string(),
            category: "Programming".to_string(),
            difficulty: QuizDifficulty::Easy,
            time_limit_secs: Some(300),
            xp_reward: 100,
            questions: questions(&[
                (
                    "q1",
                    "What does JS stand for?",
                    ["JavaScript", "JavaSource", "JustScript", "JScript"],
                    0,
                    "JS is short for JavaScript, the programming language of the web.",
                ),
                (
                    "q2",
                    "Which symbol is used for single-line comments in JavaScript?",
                    ["#", "//", "/*", "<!--"],
                    1,
                    "// is used for single-line comments in JavaScript.",
                ),
                (
                    "q3",
                    "What is the correct way to declare a variable in JavaScript?",
                    ["variable x = 5", "let x = 5", "v x = 5", "declare x = 5"],
                    1,
                    "In modern JavaScript, we use let, const, or var to declare variables.",
                ),
                (
                    "q4",
                    "What does === operator do in JavaScript?",
                    ["Assignment", "Comparison", "Strict equality check", "Not equal"],
                    2,
                    "=== checks for strict equality (both value and type must match).",
                ),
                (
                    "q5",
                    "Which method is used to print something in the console?",
                    ["print()", "console.log()", "log()", "write()"],
                    1,
                    "console.log() is the standard method to output data to the console.",
                ),
            ]),
        },
        Quiz {
            id: "quiz_2".to_string(),
            title: "React Fundamentals".to_string(),
            description: "Test your React knowledge".to_string(),
            category: "Programming".to_string(),
            difficulty: QuizDifficulty::Medium,
            time_limit_secs: Some(300),
            xp_reward: 150,
            questions: questions(&[
                (
                    "q1",
                    "What is JSX?",
                    [
                        "JavaScript XML",
                        "Java Syntax Extension",
                        "JSON XML",
                        "JavaScript Extension",
                    ],
                    0,
                    "JSX stands for JavaScript XML, allowing us to write HTML in React.",
                ),
                (
                    "q2",
                    "Which hook is used to manage state in functional components?",
                    ["useEffect", "useState", "useContext", "useReducer"],
                    1,
                    "useState is the primary hook for managing state in functional components.",
                ),
                (
                    "q3",
                    "What is the Virtual DOM?",
                    [
                        "A copy of HTML DOM",
                        "A programming concept",
                        "A lightweight copy of DOM",
                        "A browser feature",
                    ],
                    2,
                    "Virtual DOM is a lightweight copy of the actual DOM used for efficient updates.",
                ),
                (
                    "q4",
                    "What is a React Component?",
                    [
                        "A function or class",
                        "A JavaScript file",
                        "An HTML element",
                        "A CSS class",
                    ],
                    0,
                    "A component is a function or class that returns React elements.",
                ),
                (
                    "q5",
                    "What does npm stand for?",
                    [
                        "Node Package Manager",
                        "New Project Manager",
                        "Node Programming Module",
                        "Network Package Manager",
                    ],
                    0,
                    "npm stands for Node Package Manager, used to install JavaScript packages.",
                ),
            ]),
        },
    ]
}

fn demo_trade_offers() -> Vec<TradeOffer> {
    vec![
        TradeOffer {
            id: "trade_1".to_string(),
            user_id: "user_demo_1".to_string(),
            user_name: "Priya Sharma".to_string(),
            user_avatar: "👩‍💻".to_string(),
            user_rating: 4.8,
            teaches: "React Development".to_string(),
            wants: "UI/UX Design".to_string(),
            level: TradeLevel::Expert,
            sessions_completed: 23,
            availability: strings(&["Monday", "Wednesday", "Friday"]),
            description: "I can teach React basics to advanced concepts".to_string(),
            tags: strings(&["React", "JavaScript", "Frontend"]),
            credits: 30,
        },
        TradeOffer {
            id: "trade_2".to_string(),
            user_id: "user_demo_2".to_string(),
            user_name: "Rahul Kumar".to_string(),
            user_avatar: "👨‍🎨".to_string(),
            user_rating: 4.9,
            teaches: "Graphic Design".to_string(),
            wants: "JavaScript Basics".to_string(),
            level: TradeLevel::Expert,
            sessions_completed: 45,
            availability: strings(&["Tuesday", "Thursday", "Saturday"]),
            description: "Professional graphic designer ready to teach".to_string(),
            tags: strings(&["Design", "Photoshop", "Illustrator"]),
            credits: 35,
        },
    ]
}

fn demo_leaderboard() -> Vec<LeaderboardEntry> {
    let rows = [
        ("user_1", "Priya Sharma", "👑", 8450, 12, 45),
        ("user_2", "Rahul Kumar", "🌟", 7820, 11, 38),
        ("user_3", "Ananya Singh", "⚡", 7350, 11, 32),
        ("user_4", "Arjun Patel", "🎯", 6890, 10, 28),
    ];

    rows.iter()
        .enumerate()
        .map(|(idx, (user_id, user_name, avatar, xp, level, streak))| LeaderboardEntry {
            rank: idx + 1,
            user_id: user_id.to_string(),
            user_name: user_name.to_string(),
            user_avatar: avatar.to_string(),
            xp: *xp,
            level: *level,
            streak: *streak,
            is_current_user: false,
        })
        .collect()
}

fn demo_tournaments() -> Vec<Tournament> {
    let now = Utc::now();
    vec![Tournament {
        id: "tournament_1".to_string(),
        title: "Web Development Championship".to_string(),
        description: "Compete with 500+ students across India".to_string(),
        category: "Programming".to_string(),
        prize_pool: 10000,
        participants: 250,
        max_participants: 500,
        start_date: now,
        end_date: now + Duration::days(2),
        status: TournamentStatus::Live,
        difficulty: QuizDifficulty::Medium,
        entry_fee: 0,
        rules: strings(&["Fair play", "No plagiarism", "Respect other participants"]),
        prizes: [(1, 5000), (2, 3000), (3, 2000)]
            .iter()
            .map(|(position, amount)| Prize {
                position: *position,
                reward: "Cash Prize".to_string(),
                amount: *amount,
            })
            .collect(),
    }]
}

fn demo_mini_projects() -> Vec<MiniProject> {
    let steps = [
        ("step_1", "Setup HTML structure", "Create the calculator layout"),
        ("step_2", "Style with CSS", "Make it look beautiful"),
        ("step_3", "Add JavaScript logic", "Implement calculator functions"),
    ];

    vec![MiniProject {
        id: "mini_1".to_string(),
        title: "Calculator App".to_string(),
        description: "Build a functional calculator with basic operations".to_string(),
        difficulty: Difficulty::Beginner,
        estimated_time: "2 hours".to_string(),
        icon: "🔢".to_string(),
        tags: strings(&["HTML", "CSS", "JavaScript"]),
        xp_reward: 100,
        steps: steps
            .iter()
            .enumerate()
            .map(|(idx, (id, title, description))| ProjectStep {
                id: id.to_string(),
                title: title.to_string(),
                description: description.to_string(),
                completed: false,
                order: idx as u32 + 1,
            })
            .collect(),
    }]
}
