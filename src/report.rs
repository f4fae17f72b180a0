use std::fmt::Write;

use crate::content::ContentStore;
use crate::models::{Activity, ActivityKind, UserProfile};
use crate::progression::level_title;

#[derive(Debug, Clone, PartialEq)]
pub struct ActivitySummary {
    pub kind: ActivityKind,
    pub count: usize,
    pub total_xp: u64,
}

pub fn summarize_by_kind(activities: &[Activity]) -> Vec<ActivitySummary> {
    let mut map: std::collections::HashMap<ActivityKind, (usize, u64)> =
        std::collections::HashMap::new();

    for activity in activities {
        let entry = map.entry(activity.kind).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += activity.xp_gained;
    }

    let mut summaries: Vec<ActivitySummary> = map
        .into_iter()
        .map(|(kind, (count, total_xp))| ActivitySummary {
            kind,
            count,
            total_xp,
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.total_xp
            .cmp(&a.total_xp)
            .then(b.count.cmp(&a.count))
            .then(a.kind.as_str().cmp(b.kind.as_str()))
    });
    summaries
}

fn progress_bar(xp: u64, threshold: u64) -> String {
    const WIDTH: u64 = 20;
    let filled = if threshold == 0 {
        0
    } else {
        (xp.min(threshold) * WIDTH / threshold) as usize
    };
    format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(WIDTH as usize - filled)
    )
}

pub fn build_report(user: &UserProfile, content: &ContentStore) -> String {
    let progress = &user.progress;
    let summaries = summarize_by_kind(content.activities());

    let mut output = String::new();

    let _ = writeln!(output, "# Learning Progress Report");
    let _ = writeln!(
        output,
        "Generated for {} {} ({})",
        user.avatar, user.name, user.email
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Progression");
    let _ = writeln!(
        output,
        "- Level {} ({})",
        progress.level,
        level_title(progress.level)
    );
    let _ = writeln!(
        output,
        "- XP {} / {} {} ({} to go)",
        progress.xp,
        progress.xp_to_next_level,
        progress_bar(progress.xp, progress.xp_to_next_level),
        progress.xp_to_next_level.saturating_sub(progress.xp)
    );
    let _ = writeln!(output, "- Credits: {}", progress.credits);
    let _ = writeln!(output, "- Streak: {} days", progress.streak);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Badges");

    if progress.badges.is_empty() {
        let _ = writeln!(output, "No badges earned yet.");
    } else {
        for badge in &progress.badges {
            let _ = writeln!(
                output,
                "- {} {} ({}) earned {}",
                badge.emoji,
                badge.name,
                badge.rarity.as_str(),
                badge.earned_date.date_naive()
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Courses");

    let enrolled = content.enrolled_courses();
    if enrolled.is_empty() {
        let _ = writeln!(output, "Not enrolled in any course.");
    } else {
        for course in enrolled {
            let _ = writeln!(
                output,
                "- {} {}: {}/{} lessons ({:.0}%)",
                course.thumbnail,
                course.title,
                course.completed_lessons(),
                course.lessons.len(),
                course.progress
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Activity Mix");

    if summaries.is_empty() {
        let _ = writeln!(output, "No activity recorded yet.");
    } else {
        for summary in summaries.iter() {
            let _ = writeln!(
                output,
                "- {}: {} entries, {} XP",
                summary.kind.as_str(),
                summary.count,
                summary.total_xp
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Activity");

    if content.activities().is_empty() {
        let _ = writeln!(output, "No activity recorded yet.");
    } else {
        for activity in content.activities().iter().take(5) {
            let _ = writeln!(
                output,
                "- {} {} on {}: {}{}",
                activity.kind.icon(),
                activity.title,
                activity.timestamp.format("%Y-%m-%d %H:%M"),
                activity.description,
                if activity.xp_gained > 0 {
                    format!(" (+{} XP)", activity.xp_gained)
                } else {
                    String::new()
                }
            );
        }
    }

    output
}
