//! Exercise and curriculum catalog.
//!
//! Read-only lookups over id-keyed maps, chain traversal, and the built-in
//! default catalog used for administrative seeding. Lookups return `None`
//! for unknown ids; traversal truncates on broken links instead of erroring.

use crate::types::*;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog_internal);

/// Get a reference to the cached default catalog
pub fn default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog of exercises, skills, and strength paths
///
/// **Note**: For production use, prefer `default_catalog()` which returns a
/// cached reference. This function is retained for testing and custom
/// catalog creation.
pub fn build_default_catalog() -> Catalog {
    build_default_catalog_internal()
}

impl Catalog {
    // ========================================================================
    // Lookups
    // ========================================================================

    /// Look up an exercise by id
    pub fn exercise(&self, id: &str) -> Option<&Exercise> {
        self.exercises.get(id)
    }

    /// Look up a skill by id
    pub fn skill(&self, id: &str) -> Option<&Skill> {
        self.skills.get(id)
    }

    /// Look up a strength path by id
    pub fn strength_path(&self, id: &str) -> Option<&Skill> {
        self.strength_paths.get(id)
    }

    /// Look up a curriculum by id, checking skills then strength paths
    pub fn curriculum(&self, id: &str) -> Option<&Skill> {
        self.skills.get(id).or_else(|| self.strength_paths.get(id))
    }

    /// All exercises in a category, id-sorted for deterministic output
    pub fn exercises_by_category(&self, category: Category) -> Vec<&Exercise> {
        self.filtered(|e| e.category == category)
    }

    /// All exercises at a level, id-sorted
    pub fn exercises_by_level(&self, level: Level) -> Vec<&Exercise> {
        self.filtered(|e| e.level == level)
    }

    /// All exercises requiring a piece of equipment, id-sorted
    pub fn exercises_by_equipment(&self, equipment: Equipment) -> Vec<&Exercise> {
        self.filtered(|e| e.equipment == equipment)
    }

    /// The curriculum's entry points: beginner level with no prerequisites
    pub fn beginner_exercises(&self) -> Vec<&Exercise> {
        self.filtered(|e| e.level == Level::Beginner && e.prerequisites.is_empty())
    }

    fn filtered(&self, keep: impl Fn(&Exercise) -> bool) -> Vec<&Exercise> {
        let mut matches: Vec<&Exercise> = self.exercises.values().filter(|e| keep(e)).collect();
        matches.sort_by(|a, b| a.id.cmp(&b.id));
        matches
    }

    // ========================================================================
    // Chain traversal
    // ========================================================================

    /// Follow `next_progression_id` links from a starting exercise
    ///
    /// Returns the ordered chain. A link to a missing id truncates the chain
    /// silently; a revisited id stops traversal, so a cycle in the data can
    /// never loop forever. An unknown starting id yields an empty chain.
    pub fn chain_from(&self, start: &str) -> Vec<&Exercise> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self.exercises.get(start);

        while let Some(exercise) = current {
            if !seen.insert(exercise.id.as_str()) {
                tracing::warn!(
                    "Progression chain revisits '{}', stopping traversal",
                    exercise.id
                );
                break;
            }
            chain.push(exercise);
            current = exercise
                .next_progression_id
                .as_deref()
                .and_then(|id| self.exercises.get(id));
        }

        chain
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid. Advisory:
    /// run at seed time; read paths degrade gracefully instead of checking.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (id, exercise) in &self.exercises {
            if id.is_empty() || exercise.id.is_empty() {
                errors.push("Exercise has empty ID".to_string());
            }
            if id != &exercise.id {
                errors.push(format!(
                    "Exercise key '{}' doesn't match exercise.id '{}'",
                    id, exercise.id
                ));
            }
            if exercise.name.is_empty() {
                errors.push(format!("Exercise '{}' has empty name", id));
            }
            if exercise.target.value == 0 {
                errors.push(format!("Exercise '{}' has zero target value", id));
            }
            for prereq in &exercise.prerequisites {
                if !self.exercises.contains_key(prereq) {
                    errors.push(format!(
                        "Exercise '{}' references non-existent prerequisite '{}'",
                        id, prereq
                    ));
                }
            }
            if let Some(next) = &exercise.next_progression_id {
                if !self.exercises.contains_key(next) {
                    errors.push(format!(
                        "Exercise '{}' references non-existent progression '{}'",
                        id, next
                    ));
                }
            }
        }

        // Progression links must form chains, not cycles
        for id in self.exercises.keys() {
            let chain = self.chain_from(id);
            if let Some(last) = chain.last() {
                if let Some(next) = &last.next_progression_id {
                    if self.exercises.contains_key(next) {
                        errors.push(format!("Progression chain from '{}' contains a cycle", id));
                    }
                }
            }
        }

        for (namespace, curricula) in [("Skill", &self.skills), ("Path", &self.strength_paths)] {
            for (id, curriculum) in curricula {
                if id.is_empty() || curriculum.id.is_empty() {
                    errors.push(format!("{} has empty ID", namespace));
                }
                if id != &curriculum.id {
                    errors.push(format!(
                        "{} key '{}' doesn't match id '{}'",
                        namespace, id, curriculum.id
                    ));
                }
                if curriculum.name.is_empty() {
                    errors.push(format!("{} '{}' has empty name", namespace, id));
                }

                let mut orders = HashSet::new();
                for entry in &curriculum.progression {
                    if !self.exercises.contains_key(&entry.exercise_id) {
                        errors.push(format!(
                            "{} '{}' references non-existent exercise '{}'",
                            namespace, id, entry.exercise_id
                        ));
                    }
                    if !orders.insert(entry.order) {
                        errors.push(format!(
                            "{} '{}' has duplicate order value {}",
                            namespace, id, entry.order
                        ));
                    }
                }

                if let Some(criteria) = &curriculum.unlock_criteria {
                    for required in &criteria.completed_exercise_ids {
                        if !self.exercises.contains_key(required) {
                            errors.push(format!(
                                "{} '{}' unlock references non-existent exercise '{}'",
                                namespace, id, required
                            ));
                        }
                    }
                }
            }
        }

        errors
    }
}

/// Internal function that actually builds the catalog
fn build_default_catalog_internal() -> Catalog {
    let mut exercises = HashMap::new();
    let mut skills = HashMap::new();
    let mut strength_paths = HashMap::new();

    // ========================================================================
    // Exercises
    // ========================================================================

    let defs = [
        // Push chain
        exercise(
            "wall_pushup",
            "Wall Push-up",
            "Standing push-up against a wall, hands at shoulder height.",
            Category::Push,
            Level::Beginner,
            Equipment::None,
            Target::reps(15),
            &[],
            Some("incline_pushup"),
        ),
        exercise(
            "incline_pushup",
            "Incline Push-up",
            "Push-up with hands elevated on a bench or sturdy surface.",
            Category::Push,
            Level::Beginner,
            Equipment::Bench,
            Target::reps(12),
            &["wall_pushup"],
            Some("pushup"),
        ),
        exercise(
            "pushup",
            "Push-up",
            "Full push-up from the floor, body in a straight line.",
            Category::Push,
            Level::Intermediate,
            Equipment::None,
            Target::reps(10),
            &["incline_pushup"],
            Some("diamond_pushup"),
        ),
        exercise(
            "diamond_pushup",
            "Diamond Push-up",
            "Push-up with hands together under the chest, thumbs and index fingers touching.",
            Category::Push,
            Level::Intermediate,
            Equipment::None,
            Target::reps(10),
            &["pushup"],
            Some("one_arm_pushup"),
        ),
        exercise(
            "one_arm_pushup",
            "One-arm Push-up",
            "Push-up on a single arm, feet wide, free hand behind the back.",
            Category::Push,
            Level::Advanced,
            Equipment::None,
            Target::reps(5),
            &["diamond_pushup"],
            None,
        ),
        // Pull chain
        exercise(
            "australian_row",
            "Australian Row",
            "Horizontal bodyweight row under a low bar, heels on the floor.",
            Category::Pull,
            Level::Beginner,
            Equipment::PullupBar,
            Target::reps(12),
            &[],
            Some("negative_pullup"),
        ),
        exercise(
            "negative_pullup",
            "Negative Pull-up",
            "Jump to the top position and lower under control.",
            Category::Pull,
            Level::Beginner,
            Equipment::PullupBar,
            Target::reps(8),
            &["australian_row"],
            Some("pullup"),
        ),
        exercise(
            "pullup",
            "Pull-up",
            "Dead-hang pull-up, chin clearing the bar.",
            Category::Pull,
            Level::Intermediate,
            Equipment::PullupBar,
            Target::reps(8),
            &["negative_pullup"],
            Some("chest_to_bar_pullup"),
        ),
        exercise(
            "chest_to_bar_pullup",
            "Chest-to-bar Pull-up",
            "Pull-up finishing with the chest touching the bar.",
            Category::Pull,
            Level::Intermediate,
            Equipment::PullupBar,
            Target::reps(6),
            &["pullup"],
            Some("archer_pullup"),
        ),
        exercise(
            "archer_pullup",
            "Archer Pull-up",
            "Pull-up towards one hand, the other arm kept straight.",
            Category::Pull,
            Level::Advanced,
            Equipment::PullupBar,
            Target::reps(5),
            &["chest_to_bar_pullup"],
            None,
        ),
        // Legs chain
        exercise(
            "assisted_squat",
            "Assisted Squat",
            "Squat holding a doorframe or pole for balance.",
            Category::Legs,
            Level::Beginner,
            Equipment::None,
            Target::reps(15),
            &[],
            Some("squat"),
        ),
        exercise(
            "squat",
            "Bodyweight Squat",
            "Full-depth squat, arms extended forward as counterbalance.",
            Category::Legs,
            Level::Beginner,
            Equipment::None,
            Target::reps(20),
            &["assisted_squat"],
            Some("bulgarian_split_squat"),
        ),
        exercise(
            "bulgarian_split_squat",
            "Bulgarian Split Squat",
            "Split squat with the rear foot elevated on a bench.",
            Category::Legs,
            Level::Intermediate,
            Equipment::Bench,
            Target::reps(10),
            &["squat"],
            Some("pistol_squat"),
        ),
        exercise(
            "pistol_squat",
            "Pistol Squat",
            "Single-leg squat to full depth, free leg extended forward.",
            Category::Legs,
            Level::Advanced,
            Equipment::None,
            Target::reps(5),
            &["bulgarian_split_squat"],
            None,
        ),
        // Core chain
        exercise(
            "plank",
            "Plank",
            "Front support hold on forearms, hips level.",
            Category::Core,
            Level::Beginner,
            Equipment::None,
            Target::seconds(30),
            &[],
            Some("hollow_hold"),
        ),
        exercise(
            "hollow_hold",
            "Hollow Hold",
            "Supine hold with shoulders and legs off the floor, lower back pressed down.",
            Category::Core,
            Level::Beginner,
            Equipment::None,
            Target::seconds(20),
            &["plank"],
            Some("hanging_knee_raise"),
        ),
        exercise(
            "hanging_knee_raise",
            "Hanging Knee Raise",
            "Hanging from a bar, raise knees to the chest without swinging.",
            Category::Core,
            Level::Intermediate,
            Equipment::PullupBar,
            Target::reps(10),
            &["hollow_hold"],
            Some("hanging_leg_raise"),
        ),
        exercise(
            "hanging_leg_raise",
            "Hanging Leg Raise",
            "Hanging from a bar, raise straight legs to horizontal or above.",
            Category::Core,
            Level::Advanced,
            Equipment::PullupBar,
            Target::reps(8),
            &["hanging_knee_raise"],
            None,
        ),
        // Skill chain
        exercise(
            "crow_pose",
            "Crow Pose",
            "Balance with knees resting on bent elbows, feet off the floor.",
            Category::Skill,
            Level::Beginner,
            Equipment::None,
            Target::seconds(20),
            &[],
            Some("wall_handstand"),
        ),
        exercise(
            "wall_handstand",
            "Wall Handstand",
            "Handstand hold with heels resting against a wall.",
            Category::Skill,
            Level::Intermediate,
            Equipment::None,
            Target::seconds(30),
            &["crow_pose", "pushup"],
            Some("handstand"),
        ),
        exercise(
            "handstand",
            "Freestanding Handstand",
            "Unsupported handstand hold, body stacked and still.",
            Category::Skill,
            Level::Advanced,
            Equipment::None,
            Target::seconds(15),
            &["wall_handstand"],
            None,
        ),
        // Mobility
        exercise(
            "deep_squat_hold",
            "Deep Squat Hold",
            "Rest at the bottom of a squat, heels down, chest tall.",
            Category::Mobility,
            Level::Beginner,
            Equipment::None,
            Target::seconds(60),
            &[],
            None,
        ),
        exercise(
            "shoulder_bridge",
            "Shoulder Bridge",
            "Supine hip bridge, shoulders grounded, hips pressed high.",
            Category::Mobility,
            Level::Beginner,
            Equipment::None,
            Target::seconds(30),
            &[],
            None,
        ),
    ];

    for def in defs {
        exercises.insert(def.id.clone(), def);
    }

    // ========================================================================
    // Skills
    // ========================================================================

    skills.insert(
        "first_pullup".into(),
        Skill {
            id: "first_pullup".into(),
            name: "First Pull-up".into(),
            description: "From horizontal rows to a full dead-hang pull-up.".into(),
            progression: vec![
                entry("australian_row", 10),
                entry("negative_pullup", 20),
                entry("pullup", 30),
            ],
            unlock_criteria: None,
        },
    );

    skills.insert(
        "handstand".into(),
        Skill {
            id: "handstand".into(),
            name: "Handstand".into(),
            description: "Build overhead balance from crow pose to a freestanding hold.".into(),
            progression: vec![
                entry("crow_pose", 10),
                entry("wall_handstand", 20),
                entry("handstand", 30),
            ],
            unlock_criteria: Some(UnlockCriteria {
                min_level: Level::Intermediate,
                completed_exercise_ids: vec!["pushup".into()],
            }),
        },
    );

    // ========================================================================
    // Strength Paths
    // ========================================================================

    strength_paths.insert(
        "push_power".into(),
        Skill {
            id: "push_power".into(),
            name: "Push Power".into(),
            description: "Pressing strength from the full push-up to the one-arm push-up.".into(),
            progression: vec![
                entry("pushup", 10),
                entry("diamond_pushup", 20),
                entry("one_arm_pushup", 30),
            ],
            unlock_criteria: Some(UnlockCriteria {
                min_level: Level::Intermediate,
                completed_exercise_ids: vec!["incline_pushup".into()],
            }),
        },
    );

    strength_paths.insert(
        "leg_strength".into(),
        Skill {
            id: "leg_strength".into(),
            name: "Leg Strength".into(),
            description: "Single-leg strength from assisted squats to the pistol squat.".into(),
            progression: vec![
                entry("assisted_squat", 10),
                entry("squat", 20),
                entry("bulgarian_split_squat", 30),
                entry("pistol_squat", 40),
            ],
            unlock_criteria: None,
        },
    );

    Catalog {
        exercises,
        skills,
        strength_paths,
    }
}

#[allow(clippy::too_many_arguments)]
fn exercise(
    id: &str,
    name: &str,
    description: &str,
    category: Category,
    level: Level,
    equipment: Equipment,
    target: Target,
    prerequisites: &[&str],
    next_progression_id: Option<&str>,
) -> Exercise {
    Exercise {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        category,
        level,
        equipment,
        target,
        prerequisites: prerequisites.iter().map(|p| p.to_string()).collect(),
        next_progression_id: next_progression_id.map(|n| n.into()),
    }
}

fn entry(exercise_id: &str, order: u32) -> CurriculumEntry {
    CurriculumEntry {
        exercise_id: exercise_id.into(),
        order,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_loads() {
        let catalog = build_default_catalog();
        assert_eq!(catalog.exercises.len(), 23);
        assert_eq!(catalog.skills.len(), 2);
        assert_eq!(catalog.strength_paths.len(), 2);
    }

    #[test]
    fn test_default_catalog_validates() {
        let catalog = build_default_catalog();
        let errors = catalog.validate();
        assert!(
            errors.is_empty(),
            "Default catalog has validation errors: {:?}",
            errors
        );
    }

    #[test]
    fn test_lookup_missing_id_is_none() {
        let catalog = build_default_catalog();
        assert!(catalog.exercise("flying_pushup").is_none());
        assert!(catalog.skill("flying").is_none());
        assert!(catalog.curriculum("flying").is_none());
    }

    #[test]
    fn test_curriculum_checks_both_namespaces() {
        let catalog = build_default_catalog();
        assert!(catalog.curriculum("handstand").is_some());
        assert!(catalog.curriculum("push_power").is_some());
    }

    #[test]
    fn test_beginner_exercises_have_no_prerequisites() {
        let catalog = build_default_catalog();
        let beginners = catalog.beginner_exercises();
        assert!(!beginners.is_empty());
        for exercise in beginners {
            assert_eq!(exercise.level, Level::Beginner);
            assert!(exercise.prerequisites.is_empty());
        }
    }

    #[test]
    fn test_beginner_filter_excludes_gated_beginner_exercises() {
        // incline_pushup is beginner level but gated behind wall_pushup
        let catalog = build_default_catalog();
        let beginners = catalog.beginner_exercises();
        assert!(!beginners.iter().any(|e| e.id == "incline_pushup"));
        assert!(beginners.iter().any(|e| e.id == "wall_pushup"));
    }

    #[test]
    fn test_category_lookup_is_sorted() {
        let catalog = build_default_catalog();
        let push = catalog.exercises_by_category(Category::Push);
        assert_eq!(push.len(), 5);
        let ids: Vec<_> = push.iter().map(|e| e.id.as_str()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_level_lookup() {
        let catalog = build_default_catalog();
        let advanced = catalog.exercises_by_level(Level::Advanced);
        assert!(advanced.iter().any(|e| e.id == "one_arm_pushup"));
        assert!(advanced.iter().all(|e| e.level == Level::Advanced));
    }

    #[test]
    fn test_equipment_lookup() {
        let catalog = build_default_catalog();
        let bar = catalog.exercises_by_equipment(Equipment::PullupBar);
        assert!(bar.iter().any(|e| e.id == "pullup"));
        assert!(bar.iter().all(|e| e.equipment == Equipment::PullupBar));
    }

    #[test]
    fn test_chain_traversal_full_chain() {
        let catalog = build_default_catalog();
        let chain = catalog.chain_from("wall_pushup");
        let ids: Vec<_> = chain.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "wall_pushup",
                "incline_pushup",
                "pushup",
                "diamond_pushup",
                "one_arm_pushup"
            ]
        );
    }

    #[test]
    fn test_chain_from_middle_of_chain() {
        let catalog = build_default_catalog();
        let chain = catalog.chain_from("pushup");
        assert_eq!(chain.len(), 3);
        assert_eq!(chain[0].id, "pushup");
    }

    #[test]
    fn test_chain_from_unknown_id_is_empty() {
        let catalog = build_default_catalog();
        assert!(catalog.chain_from("flying_pushup").is_empty());
    }

    #[test]
    fn test_broken_chain_truncates_silently() {
        let mut catalog = build_default_catalog();
        if let Some(exercise) = catalog.exercises.get_mut("incline_pushup") {
            exercise.next_progression_id = Some("deleted_exercise".into());
        }

        let chain = catalog.chain_from("wall_pushup");
        let ids: Vec<_> = chain.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["wall_pushup", "incline_pushup"]);
    }

    #[test]
    fn test_cyclic_chain_terminates() {
        let mut catalog = build_default_catalog();
        if let Some(exercise) = catalog.exercises.get_mut("pushup") {
            exercise.next_progression_id = Some("wall_pushup".into());
        }

        let chain = catalog.chain_from("wall_pushup");
        let ids: Vec<_> = chain.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["wall_pushup", "incline_pushup", "pushup"]);
    }

    #[test]
    fn test_validate_reports_cycle() {
        let mut catalog = build_default_catalog();
        if let Some(exercise) = catalog.exercises.get_mut("one_arm_pushup") {
            exercise.next_progression_id = Some("wall_pushup".into());
        }

        let errors = catalog.validate();
        assert!(errors.iter().any(|e| e.contains("cycle")));
    }

    #[test]
    fn test_validate_reports_dangling_references() {
        let mut catalog = build_default_catalog();
        if let Some(exercise) = catalog.exercises.get_mut("pullup") {
            exercise.prerequisites.push("missing_exercise".into());
        }

        let errors = catalog.validate();
        assert!(errors.iter().any(|e| e.contains("missing_exercise")));
    }

    #[test]
    fn test_validate_reports_duplicate_order() {
        let mut catalog = build_default_catalog();
        if let Some(skill) = catalog.skills.get_mut("handstand") {
            skill.progression.push(entry("crow_pose", 10));
        }

        let errors = catalog.validate();
        assert!(errors.iter().any(|e| e.contains("duplicate order")));
    }
}
