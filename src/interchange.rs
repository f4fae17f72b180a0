use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::models::{Activity, TradeLevel, TradeOfferDraft};

#[derive(Serialize)]
struct ActivityRow<'a> {
    id: &'a str,
    kind: &'static str,
    title: &'a str,
    description: &'a str,
    xp_gained: u64,
    timestamp: String,
}

pub fn export_activities_csv(path: &Path, activities: &[Activity]) -> anyhow::Result<usize> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    for activity in activities {
        writer.serialize(ActivityRow {
            id: &activity.id,
            kind: activity.kind.as_str(),
            title: &activity.title,
            description: &activity.description,
            xp_gained: activity.xp_gained,
            timestamp: activity.timestamp.to_rfc3339(),
        })?;
    }

    writer.flush()?;
    Ok(activities.len())
}

#[derive(Deserialize)]
struct OfferRow {
    user_name: String,
    teaches: String,
    wants: String,
    level: TradeLevel,
    credits: u64,
    description: String,
    availability: Option<String>,
    tags: Option<String>,
}

fn split_list(value: Option<String>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(';')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reads offer drafts from CSV. `availability` and `tags` are `;`-separated lists.
pub fn read_trade_offers_csv(
    path: &Path,
    user_id: &str,
    user_avatar: &str,
) -> anyhow::Result<Vec<TradeOfferDraft>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut drafts = Vec::new();

    for result in reader.deserialize::<OfferRow>() {
        let row = result?;
        drafts.push(TradeOfferDraft {
            user_id: user_id.to_string(),
            user_name: row.user_name,
            user_avatar: user_avatar.to_string(),
            user_rating: 0.0,
            teaches: row.teaches,
            wants: row.wants,
            level: row.level,
            availability: split_list(row.availability),
            description: row.description,
            tags: split_list(row.tags),
            credits: row.credits,
        });
    }

    Ok(drafts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActivityKind;
    use chrono::Utc;

    #[test]
    fn offers_parse_with_list_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("offers.csv");
        std::fs::write(
            &path,
            "user_name,teaches,wants,level,credits,description,availability,tags\n\
             Kiara Patel,Calculus,Spanish,Expert,25,Exam prep,Monday; Friday,Math;Exams\n\
             Jules Moreno,Guitar,Python,Beginner,10,Chords and strumming,,\n",
        )
        .unwrap();

        let drafts = read_trade_offers_csv(&path, "user_1", "🎓").unwrap();
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].level, TradeLevel::Expert);
        assert_eq!(drafts[0].availability, vec!["Monday", "Friday"]);
        assert_eq!(drafts[0].tags, vec!["Math", "Exams"]);
        assert!(drafts[1].availability.is_empty());
        assert_eq!(drafts[1].credits, 10);
    }

    #[test]
    fn activities_export_one_row_each() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("activity.csv");
        let activities = vec![Activity {
            id: "activity_1".to_string(),
            kind: ActivityKind::QuizCompleted,
            title: "Quiz Completed".to_string(),
            description: "Scored 80% on React Fundamentals".to_string(),
            xp_gained: 120,
            timestamp: Utc::now(),
        }];

        assert_eq!(export_activities_csv(&path, &activities).unwrap(), 1);
        let written = std::fs::read_to_string(&path).unwrap();
        let mut lines = written.lines();
        assert_eq!(
            lines.next(),
            Some("id,kind,title,description,xp_gained,timestamp")
        );
        assert!(lines
            .next()
            .unwrap()
            .starts_with("activity_1,quiz_completed,Quiz Completed,Scored 80% on React Fundamentals,120,"));
    }
}
