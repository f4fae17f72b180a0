//! Canned learning-assistant replies.
//!
//! Rules are checked in order and the first rule with a keyword contained in
//! the (lowercased) input wins.

pub const GREETING: &str = "Hi! I'm your AI Learning Guru 🎓 How can I help you today?";

struct Rule {
    keywords: &'static [&'static str],
    reply: &'static str,
}

const RULES: &[Rule] = &[
    Rule {
        keywords: &["course", "learn", "recommend"],
        reply: "Based on your interests, I recommend starting with:\n\n\
                1. JavaScript Fundamentals - Great for beginners\n\
                2. React Development - Build modern web apps\n\
                3. Python Basics - Versatile and beginner-friendly\n\n\
                Which one sounds interesting to you?",
    },
    Rule {
        keywords: &["study", "tip", "focus"],
        reply: "Here are some effective study tips:\n\n\
                - Pomodoro Technique: Study for 25 mins, break for 5 mins\n\
                - Active Recall: Test yourself instead of re-reading\n\
                - Spaced Repetition: Review material at increasing intervals\n\
                - Teach Others: Use the Trade feature to teach and reinforce learning\n\n\
                Keep your streak going! 🔥",
    },
    Rule {
        keywords: &["goal", "plan", "roadmap"],
        reply: "Let's create a learning roadmap! 🎯\n\n\
                Week 1-2: Master the basics\n\
                Week 3-4: Build mini-projects\n\
                Week 5-6: Collaborate with peers\n\
                Week 7-8: Complete a major project\n\n\
                Start by enrolling in a course that matches your goals!",
    },
    Rule {
        keywords: &["career", "job", "future"],
        reply: "Great question! Here's my advice:\n\n\
                - Web Development: High demand, great pay\n\
                - Data Science: Future-focused field\n\
                - UI/UX Design: Creative and technical\n\
                - Mobile Development: Growing market\n\n\
                Focus on building projects and networking through our Trade feature!",
    },
    Rule {
        keywords: &["xp", "level", "point"],
        reply: "Want to level up faster? Here's how:\n\n\
                - Finish lessons: 20-30 XP each\n\
                - Complete quizzes: up to 150 XP, scaled by your score\n\
                - Earn badges: 50 XP each\n\
                - Create projects: 100 XP each\n\n\
                Keep going! You're doing great! 🚀",
    },
    Rule {
        keywords: &["credit", "teach", "trade"],
        reply: "Credits are your teaching currency! 💰\n\n\
                Earn credits by teaching peers in the Trade section.\n\
                Spend credits to book sessions with experts (15-35 credits per session).\n\n\
                Check out the Trade section to get started!",
    },
    Rule {
        keywords: &["project", "build", "create"],
        reply: "Projects are the best way to learn! 🚀\n\n\
                Start with a mini project like the Calculator App (2 hrs, 100 XP),\n\
                then join team projects to collaborate with others!\n\n\
                Head to the Projects section to get started!",
    },
    Rule {
        keywords: &["motivat", "tired", "difficult"],
        reply: "I believe in you! 💪\n\n\
                - Every expert was once a beginner\n\
                - Small progress is still progress\n\
                - Your streak shows dedication: keep it going! 🔥\n\
                - Learning with friends makes it easier, so try Trade!\n\n\
                Take a short break and come back stronger! 🌟",
    },
];

const FALLBACK: &str = "I'm here to help you learn better! You can ask me about:\n\n\
                        - Course recommendations\n\
                        - Study tips\n\
                        - Learning goals\n\
                        - Career guidance\n\
                        - Earning XP and credits\n\
                        - Project ideas\n\n\
                        What would you like to know?";

pub fn respond(input: &str) -> &'static str {
    let lowered = input.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|keyword| lowered.contains(keyword)))
        .map(|rule| rule.reply)
        .unwrap_or(FALLBACK)
}
