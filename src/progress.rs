use std::collections::BTreeMap;

use crate::models::{Activity, CourseProgress, Curriculum, ProgressSummary};

impl ProgressSummary {
    pub fn new(total: u32, completed: u32) -> Self {
        debug_assert!(completed <= total);
        Self {
            total,
            completed,
            percent: percent(completed, total),
        }
    }

    fn of(activities: &[Activity]) -> Self {
        let completed = activities.iter().filter(|a| a.completed).count();
        Self::new(activities.len() as u32, completed as u32)
    }
}

/// Round-half-up integer percentage; 0 for an empty course.
pub fn percent(completed: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let (c, t) = (completed as u64, total as u64);
    ((200 * c + t) / (2 * t)).min(100) as u8
}

/// Per-module and overall completion. Overall is computed from the summed
/// counts, never by averaging module percentages.
pub fn summarize(curriculum: &Curriculum) -> CourseProgress {
    let mut per_module = BTreeMap::new();
    let (mut total, mut completed) = (0u32, 0u32);

    for module in &curriculum.modules {
        let s = ProgressSummary::of(&module.activities);
        total += s.total;
        completed += s.completed;
        per_module.insert(module.index, s);
    }

    CourseProgress {
        per_module,
        overall: ProgressSummary::new(total, completed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use serde_json::json;

    #[test]
    fn rounds_half_up() {
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 8), 13);
        assert_eq!(percent(1, 200), 1);
        assert_eq!(percent(0, 5), 0);
        assert_eq!(percent(5, 5), 100);
        assert_eq!(percent(0, 0), 0);
    }

    #[test]
    fn empty_curriculum_is_zero() {
        let p = summarize(&Curriculum::default());
        assert_eq!(p.overall, ProgressSummary::default());
        assert!(p.per_module.is_empty());
    }

    #[test]
    fn overall_weights_by_activity_count() {
        // 1/1 and 0/9: averaging module percentages would give 50
        let c = normalize(&json!([
            { "atividades": [{ "concluida": true }] },
            { "atividades": [{}, {}, {}, {}, {}, {}, {}, {}, {}] }
        ]));
        let p = summarize(&c);
        assert_eq!(p.per_module[&0], ProgressSummary { total: 1, completed: 1, percent: 100 });
        assert_eq!(p.per_module[&1], ProgressSummary { total: 9, completed: 0, percent: 0 });
        assert_eq!(p.overall, ProgressSummary { total: 10, completed: 1, percent: 10 });
    }

    #[test]
    fn modules_without_activities_count_as_zero() {
        let c = normalize(&json!([{ "titulo": "Vazio" }, { "atividades": [{ "concluida": true }] }]));
        let p = summarize(&c);
        assert_eq!(p.per_module[&0], ProgressSummary::default());
        assert_eq!(p.overall.percent, 100);
    }
}
