//! Access evaluation for exercises and curricula.
//!
//! Pure decision functions over the catalog and a user's completed-exercise
//! set. No state is read or written here; callers resolve the completed set
//! once (see `ProgressStore::completed_ids`) and pass it in.

use crate::types::*;
use std::collections::HashSet;

/// Whether a user may access an exercise
///
/// True when the exercise has no prerequisites, otherwise true iff **every**
/// prerequisite id is in the completed set. An id the catalog does not know
/// evaluates to false rather than erroring.
pub fn can_access_exercise(
    catalog: &Catalog,
    exercise_id: &str,
    completed: &HashSet<String>,
) -> bool {
    let Some(exercise) = catalog.exercise(exercise_id) else {
        tracing::debug!("Access check for unknown exercise '{}'", exercise_id);
        return false;
    };

    exercise
        .prerequisites
        .iter()
        .all(|prereq| completed.contains(prereq))
}

/// Whether a user may access a curriculum
///
/// False when the user's level is below the unlock minimum, or when any
/// required exercise is missing from the completed set. A curriculum with no
/// unlock criteria is always accessible.
pub fn can_access_skill(skill: &Skill, user_level: Level, completed: &HashSet<String>) -> bool {
    let Some(criteria) = &skill.unlock_criteria else {
        return true;
    };

    if user_level < criteria.min_level {
        return false;
    }

    criteria
        .completed_exercise_ids
        .iter()
        .all(|required| completed.contains(required))
}

/// Completion percentage of a curriculum, as a rounded integer 0..=100
///
/// Defined as 0 for a curriculum with no progression entries.
pub fn skill_progress(skill: &Skill, completed: &HashSet<String>) -> u8 {
    if skill.progression.is_empty() {
        return 0;
    }

    let done = skill
        .progression
        .iter()
        .filter(|entry| completed.contains(&entry.exercise_id))
        .count();

    ((done as f64 / skill.progression.len() as f64) * 100.0).round() as u8
}

/// The exercise a user should currently work on within a curriculum
///
/// Scans the progression in ascending `order` (not array position) and
/// returns the first entry not yet completed. When every entry is complete,
/// the last-ordered entry is returned as an ongoing mastery target — a
/// finished curriculum still has a current exercise. `None` only when the
/// progression is empty.
pub fn current_skill_exercise<'a>(
    skill: &'a Skill,
    completed: &HashSet<String>,
) -> Option<&'a CurriculumEntry> {
    let mut entries: Vec<&CurriculumEntry> = skill.progression.iter().collect();
    entries.sort_by_key(|entry| entry.order);

    entries
        .iter()
        .find(|entry| !completed.contains(&entry.exercise_id))
        .copied()
        .or_else(|| entries.last().copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_default_catalog;

    fn completed(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn test_no_prerequisites_always_accessible() {
        let catalog = build_default_catalog();
        assert!(can_access_exercise(&catalog, "wall_pushup", &completed(&[])));
        assert!(can_access_exercise(
            &catalog,
            "wall_pushup",
            &completed(&["pullup", "squat"])
        ));
    }

    #[test]
    fn test_all_prerequisites_required() {
        let catalog = build_default_catalog();

        // wall_handstand requires crow_pose AND pushup
        assert!(can_access_exercise(
            &catalog,
            "wall_handstand",
            &completed(&["crow_pose", "pushup"])
        ));
        assert!(!can_access_exercise(
            &catalog,
            "wall_handstand",
            &completed(&["crow_pose"])
        ));
        assert!(can_access_exercise(
            &catalog,
            "wall_handstand",
            &completed(&["crow_pose", "pushup", "squat"])
        ));
    }

    #[test]
    fn test_unknown_exercise_not_accessible() {
        let catalog = build_default_catalog();
        assert!(!can_access_exercise(
            &catalog,
            "flying_pushup",
            &completed(&["pushup"])
        ));
    }

    #[test]
    fn test_skill_without_criteria_always_accessible() {
        let catalog = build_default_catalog();
        let skill = catalog.skill("first_pullup").unwrap();
        assert!(can_access_skill(skill, Level::Beginner, &completed(&[])));
    }

    #[test]
    fn test_skill_level_gate() {
        let catalog = build_default_catalog();
        let skill = catalog.skill("handstand").unwrap();

        assert!(!can_access_skill(
            skill,
            Level::Beginner,
            &completed(&["pushup"])
        ));
        assert!(can_access_skill(
            skill,
            Level::Intermediate,
            &completed(&["pushup"])
        ));
        assert!(can_access_skill(
            skill,
            Level::Advanced,
            &completed(&["pushup"])
        ));
    }

    #[test]
    fn test_skill_required_exercises_gate() {
        let catalog = build_default_catalog();
        let skill = catalog.skill("handstand").unwrap();

        assert!(!can_access_skill(skill, Level::Advanced, &completed(&[])));
    }

    #[test]
    fn test_skill_progress_boundaries() {
        let catalog = build_default_catalog();
        let skill = catalog.skill("first_pullup").unwrap();

        assert_eq!(skill_progress(skill, &completed(&[])), 0);
        assert_eq!(skill_progress(skill, &completed(&["squat"])), 0);
        assert_eq!(
            skill_progress(
                skill,
                &completed(&["australian_row", "negative_pullup", "pullup"])
            ),
            100
        );
    }

    #[test]
    fn test_skill_progress_rounds() {
        let catalog = build_default_catalog();
        let skill = catalog.skill("first_pullup").unwrap();

        // 1 of 3 entries: round(33.33) = 33
        assert_eq!(skill_progress(skill, &completed(&["australian_row"])), 33);
        // 2 of 3 entries: round(66.67) = 67
        assert_eq!(
            skill_progress(skill, &completed(&["australian_row", "negative_pullup"])),
            67
        );
    }

    #[test]
    fn test_skill_progress_monotonic() {
        let catalog = build_default_catalog();
        let skill = catalog.skill("leg_strength").unwrap();

        let mut done = completed(&[]);
        let mut last = 0;
        for entry in &skill.progression {
            done.insert(entry.exercise_id.clone());
            let progress = skill_progress(skill, &done);
            assert!(progress >= last);
            last = progress;
        }
        assert_eq!(last, 100);
    }

    #[test]
    fn test_empty_progression_is_zero() {
        let skill = Skill {
            id: "empty".into(),
            name: "Empty".into(),
            description: String::new(),
            progression: vec![],
            unlock_criteria: None,
        };
        assert_eq!(skill_progress(&skill, &completed(&["pushup"])), 0);
    }

    #[test]
    fn test_current_exercise_first_incomplete() {
        let catalog = build_default_catalog();
        let skill = catalog.skill("first_pullup").unwrap();

        let current = current_skill_exercise(skill, &completed(&[])).unwrap();
        assert_eq!(current.exercise_id, "australian_row");

        let current =
            current_skill_exercise(skill, &completed(&["australian_row"])).unwrap();
        assert_eq!(current.exercise_id, "negative_pullup");
    }

    #[test]
    fn test_current_exercise_scans_by_order_not_position() {
        // Entries deliberately stored out of order
        let skill = Skill {
            id: "scrambled".into(),
            name: "Scrambled".into(),
            description: String::new(),
            progression: vec![
                CurriculumEntry {
                    exercise_id: "third".into(),
                    order: 30,
                },
                CurriculumEntry {
                    exercise_id: "first".into(),
                    order: 10,
                },
                CurriculumEntry {
                    exercise_id: "second".into(),
                    order: 20,
                },
            ],
            unlock_criteria: None,
        };

        let current = current_skill_exercise(&skill, &completed(&[])).unwrap();
        assert_eq!(current.exercise_id, "first");

        let current = current_skill_exercise(&skill, &completed(&["first"])).unwrap();
        assert_eq!(current.exercise_id, "second");
    }

    #[test]
    fn test_current_exercise_mastery_fallback() {
        let catalog = build_default_catalog();
        let skill = catalog.skill("first_pullup").unwrap();

        let all = completed(&["australian_row", "negative_pullup", "pullup"]);
        let current = current_skill_exercise(skill, &all).unwrap();
        assert_eq!(current.exercise_id, "pullup");
    }

    #[test]
    fn test_current_exercise_empty_progression() {
        let skill = Skill {
            id: "empty".into(),
            name: "Empty".into(),
            description: String::new(),
            progression: vec![],
            unlock_criteria: None,
        };
        assert!(current_skill_exercise(&skill, &completed(&[])).is_none());
    }
}
