use crate::models::Quiz;

#[derive(Debug, Clone, PartialEq)]
pub struct QuestionReview {
    pub question_id: String,
    pub selected: Option<usize>,
    pub correct_answer: usize,
    pub is_correct: bool,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuizScore {
    pub correct: usize,
    pub total: usize,
    pub percentage: u32,
    pub reviews: Vec<QuestionReview>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Performance {
    Excellent,
    Good,
    KeepPracticing,
}

impl Performance {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent Work!",
            Self::Good => "Good Effort!",
            Self::KeepPracticing => "Keep Practicing!",
        }
    }
}

/// Scores answers by position. Missing or out-of-range answers count as incorrect.
pub fn score_answers(quiz: &Quiz, answers: &[Option<usize>]) -> QuizScore {
    let reviews: Vec<QuestionReview> = quiz
        .questions
        .iter()
        .enumerate()
        .map(|(idx, question)| {
            let selected = answers.get(idx).copied().flatten();
            QuestionReview {
                question_id: question.id.clone(),
                selected,
                correct_answer: question.correct_answer,
                is_correct: selected == Some(question.correct_answer),
                explanation: question.explanation.clone(),
            }
        })
        .collect();

    let correct = reviews.iter().filter(|review| review.is_correct).count();
    let total = reviews.len();

    QuizScore {
        correct,
        total,
        percentage: percentage(correct, total),
        reviews,
    }
}

pub fn percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (correct.min(total) * 100 / total) as u32
}

/// floor(score / 100 * reward) in integer arithmetic.
pub fn quiz_xp(score: u32, xp_reward: u64) -> u64 {
    u64::from(score.min(100)) * xp_reward / 100
}

pub fn performance(score: u32) -> Performance {
    match score {
        70.. => Performance::Excellent,
        50..=69 => Performance::Good,
        _ => Performance::KeepPracticing,
    }
}
