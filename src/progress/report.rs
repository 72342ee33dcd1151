//! Progress reports across skills.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::progress::mastery::{Evidence, MasteryLevel, MasteryScorer};

/// Mastery of one skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillMastery {
    /// Skill identifier.
    pub skill: String,
    /// Computed level.
    pub level: MasteryLevel,
}

/// Per-skill mastery plus aggregates, for progress reporting.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    /// Per-skill levels, sorted by skill.
    pub skills: Vec<SkillMastery>,
    /// Skills above level 0.
    pub started: usize,
    /// Skills at the highest level.
    pub mastered: usize,
    /// Mean level across all skills (0.0 when there are none).
    pub average_level: f64,
}

impl ProgressReport {
    /// Build a report with the default thresholds.
    pub fn from_skills<'a, I, S>(skills: I) -> Self
    where
        I: IntoIterator<Item = (S, &'a Evidence)>,
        S: Into<String>,
    {
        Self::with_scorer(&MasteryScorer::default(), skills)
    }

    /// Build a report with a configured scorer.
    ///
    /// When a skill appears more than once, the last evidence wins.
    pub fn with_scorer<'a, I, S>(scorer: &MasteryScorer, skills: I) -> Self
    where
        I: IntoIterator<Item = (S, &'a Evidence)>,
        S: Into<String>,
    {
        let levels: BTreeMap<String, MasteryLevel> = skills
            .into_iter()
            .map(|(skill, evidence)| (skill.into(), scorer.compute(evidence)))
            .collect();

        let started = levels.values().filter(|l| **l > MasteryLevel::NOT_STARTED).count();
        let mastered = levels.values().filter(|l| **l == MasteryLevel::MASTERED).count();
        let average_level = if levels.is_empty() {
            0.0
        } else {
            let total: u32 = levels.values().map(|l| u32::from(l.value())).sum();
            f64::from(total) / levels.len() as f64
        };

        Self {
            skills: levels
                .into_iter()
                .map(|(skill, level)| SkillMastery { skill, level })
                .collect(),
            started,
            mastered,
            average_level,
        }
    }

    /// Get the level of one skill.
    pub fn level_of(&self, skill: &str) -> Option<MasteryLevel> {
        self.skills
            .iter()
            .find(|s| s.skill == skill)
            .map(|s| s.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::mastery::Rubric;

    fn observed(accuracy: f64) -> Evidence {
        Evidence {
            turn_ids: ["turn-1".to_string()].into_iter().collect(),
            rubric: Rubric {
                accuracy,
                ..Rubric::default()
            },
            ..Evidence::default()
        }
    }

    #[test]
    fn test_empty_report() {
        let report = ProgressReport::from_skills(Vec::<(String, &Evidence)>::new());
        assert!(report.skills.is_empty());
        assert_eq!(report.started, 0);
        assert_eq!(report.mastered, 0);
        assert_eq!(report.average_level, 0.0);
    }

    #[test]
    fn test_report_aggregates() {
        let fractions = observed(0.95);
        let decimals = observed(0.55);
        let geometry = Evidence::default();

        let report = ProgressReport::from_skills([
            ("fractions", &fractions),
            ("decimals", &decimals),
            ("area", &geometry),
        ]);

        let names: Vec<&str> = report.skills.iter().map(|s| s.skill.as_str()).collect();
        assert_eq!(names, vec!["area", "decimals", "fractions"]);
        assert_eq!(report.level_of("fractions"), Some(MasteryLevel::MASTERED));
        assert_eq!(report.level_of("area"), Some(MasteryLevel::NOT_STARTED));
        assert_eq!(report.level_of("algebra"), None);
        assert_eq!(report.started, 2);
        assert_eq!(report.mastered, 1);
        assert!((report.average_level - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_last_evidence_wins() {
        let early = observed(0.3);
        let later = observed(0.8);
        let report = ProgressReport::from_skills([("ratios", &early), ("ratios", &later)]);
        assert_eq!(report.skills.len(), 1);
        assert_eq!(report.level_of("ratios").map(|l| l.value()), Some(3));
    }

    #[test]
    fn test_report_serialization() {
        let evidence = observed(0.7);
        let report = ProgressReport::from_skills([("percent", &evidence)]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["skills"][0]["skill"], "percent");
        assert_eq!(json["skills"][0]["level"], 3);
        assert_eq!(json["averageLevel"], 3.0);
    }

    #[test]
    fn test_stored_report_with_invalid_level_is_rejected() {
        let json = r#"{"skills":[{"skill":"ratios","level":9}],"started":1,"mastered":0,"averageLevel":9.0}"#;
        assert!(serde_json::from_str::<ProgressReport>(json).is_err());
    }
}
