use chrono::Utc;
use clap::{Parser, Subcommand};
use kalos_core::*;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "kalos")]
#[command(about = "Bodyweight strength progression tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the exercise catalog into the data directory
    Seed {
        /// Reseed even if the catalog is already populated
        #[arg(long)]
        force: bool,
    },

    /// Manage weekly plans
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },

    /// Log the completion of a day's plan
    Log {
        /// Day of week (1 = Monday .. 7 = Sunday)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=7))]
        day: u8,

        /// Comma-separated best value per exercise (defaults to each target)
        #[arg(long)]
        values: Option<String>,
    },

    /// Show curriculum progress and streaks
    Status,

    /// Export workout history to CSV
    Export {
        /// Output file path
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Subcommand)]
enum PlanCommands {
    /// Add a plan for a day of the week
    Add {
        /// Day of week (1 = Monday .. 7 = Sunday)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=7))]
        day: u8,

        /// Build the plan from a skill's full progression
        #[arg(long, conflicts_with_all = ["path", "exercise"])]
        skill: Option<String>,

        /// Build the plan from a strength path's full progression
        #[arg(long, conflicts_with_all = ["skill", "exercise"])]
        path: Option<String>,

        /// Single-exercise plan
        #[arg(long, conflicts_with_all = ["skill", "path"])]
        exercise: Option<String>,

        /// Sets per exercise
        #[arg(long, default_value_t = 3)]
        sets: u32,
    },

    /// List your plans
    List,

    /// Remove the plan for a day
    Remove {
        /// Day of week (1 = Monday .. 7 = Sunday)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=7))]
        day: u8,
    },

    /// Remove all plans
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    kalos_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let store: Arc<dyn DocumentStore> = Arc::new(FsStore::new(&data_dir));
    let user_id = config.user.id.clone();

    match cli.command {
        Commands::Seed { force } => cmd_seed(store.as_ref(), force).await,
        Commands::Plan { command } => match command {
            PlanCommands::Add {
                day,
                skill,
                path,
                exercise,
                sets,
            } => cmd_plan_add(store, &user_id, day, skill, path, exercise, sets).await,
            PlanCommands::List => cmd_plan_list(store, &user_id).await,
            PlanCommands::Remove { day } => cmd_plan_remove(store, &user_id, day).await,
            PlanCommands::Clear => cmd_plan_clear(store, &user_id).await,
        },
        Commands::Log { day, values } => cmd_log(store, &user_id, day, values).await,
        Commands::Status => cmd_status(store, &config).await,
        Commands::Export { out } => cmd_export(store, &user_id, &out).await,
    }
}

/// Load the seeded catalog, falling back to the built-in defaults
async fn load_or_default_catalog(store: &dyn DocumentStore) -> Result<Catalog> {
    let catalog = load_catalog(store).await?;
    if catalog.exercises.is_empty() {
        tracing::info!("Catalog not seeded, using built-in defaults");
        Ok(default_catalog().clone())
    } else {
        Ok(catalog)
    }
}

async fn cmd_seed(store: &dyn DocumentStore, force: bool) -> Result<()> {
    let count = seed_catalog(store, default_catalog(), force).await?;
    if count == 0 {
        println!("Catalog already seeded (use --force to reseed).");
    } else {
        println!("✓ Seeded {} catalog documents", count);
    }
    Ok(())
}

async fn cmd_plan_add(
    store: Arc<dyn DocumentStore>,
    user_id: &str,
    day: u8,
    skill: Option<String>,
    path: Option<String>,
    exercise: Option<String>,
    sets: u32,
) -> Result<()> {
    let catalog = load_or_default_catalog(store.as_ref()).await?;
    let plans = PlanStore::new(store);

    if plans.get_for_day(user_id, day).await?.is_some() {
        println!(
            "Day {} already has a plan. Remove it first with `kalos plan remove --day {}`.",
            day, day
        );
        return Ok(());
    }

    let plan = if let Some(skill_id) = skill {
        let Some(skill) = catalog.skill(&skill_id) else {
            println!("Unknown skill '{}'. Run `kalos seed` and check `kalos status`.", skill_id);
            return Ok(());
        };
        plans
            .create_from_curriculum(user_id, skill, &catalog, day, sets)
            .await?
    } else if let Some(path_id) = path {
        let Some(path) = catalog.strength_path(&path_id) else {
            println!("Unknown strength path '{}'.", path_id);
            return Ok(());
        };
        plans
            .create_from_curriculum(user_id, path, &catalog, day, sets)
            .await?
    } else if let Some(exercise_id) = exercise {
        let Some(exercise) = catalog.exercise(&exercise_id) else {
            println!("Unknown exercise '{}'.", exercise_id);
            return Ok(());
        };
        plans
            .create(NewPlan {
                user_id: user_id.to_string(),
                goal_id: CUSTOM_GOAL.to_string(),
                day_index: day,
                exercises: vec![PlanExercise {
                    exercise_id: exercise.id.clone(),
                    sets,
                    target: exercise.target.clone(),
                }],
            })
            .await?
    } else {
        println!("Specify one of --skill, --path, or --exercise.");
        return Ok(());
    };

    println!(
        "✓ Added plan for Day {} ({}) with {} exercise(s)",
        day,
        weekday_name(day),
        plan.exercises.len()
    );
    Ok(())
}

async fn cmd_plan_list(store: Arc<dyn DocumentStore>, user_id: &str) -> Result<()> {
    let plans = PlanStore::new(store);
    let owned = plans.get_all_for_user(user_id).await?;

    if owned.is_empty() {
        println!("No plans yet. Add one with `kalos plan add`.");
        return Ok(());
    }

    for plan in owned {
        let status = if plan.completed { " [completed]" } else { "" };
        println!(
            "Day {} ({}) — goal: {}{}",
            plan.day_index,
            weekday_name(plan.day_index),
            plan.goal_id,
            status
        );
        for entry in &plan.exercises {
            println!("  → {}: {}", entry.exercise_id, format_dose(entry.sets, &entry.target));
        }
    }
    Ok(())
}

async fn cmd_plan_remove(store: Arc<dyn DocumentStore>, user_id: &str, day: u8) -> Result<()> {
    let plans = PlanStore::new(store);

    let Some(plan) = plans.get_for_day(user_id, day).await? else {
        println!("No plan for Day {}.", day);
        return Ok(());
    };

    plans.delete(&plan.id).await?;
    println!("✓ Removed plan for Day {} ({})", day, weekday_name(day));
    Ok(())
}

async fn cmd_plan_clear(store: Arc<dyn DocumentStore>, user_id: &str) -> Result<()> {
    let plans = PlanStore::new(store);
    let report = plans.delete_all_for_user(user_id).await?;

    println!("✓ Deleted {} plan(s)", report.deleted.len());
    for (id, error) in &report.failed {
        eprintln!("  ! Failed to delete plan {}: {}", id, error);
    }
    Ok(())
}

async fn cmd_log(
    store: Arc<dyn DocumentStore>,
    user_id: &str,
    day: u8,
    values: Option<String>,
) -> Result<()> {
    let catalog = load_or_default_catalog(store.as_ref()).await?;
    let plans = PlanStore::new(store.clone());
    let progress = ProgressStore::new(store.clone());
    let history = HistoryStore::new(store);

    let Some(plan) = plans.get_for_day(user_id, day).await? else {
        println!("No plan for Day {}. Add one with `kalos plan add --day {}`.", day, day);
        return Ok(());
    };

    let logged_values = parse_values(values.as_deref(), plan.exercises.len());
    let now = Utc::now();
    let mut logged = Vec::with_capacity(plan.exercises.len());

    for (i, entry) in plan.exercises.iter().enumerate() {
        let best = logged_values
            .get(i)
            .copied()
            .flatten()
            .unwrap_or(entry.target.value);

        progress
            .record_completion(user_id, &entry.exercise_id, best, now)
            .await?;

        logged.push(HistoryExercise {
            exercise_id: entry.exercise_id.clone(),
            sets: entry.sets,
            completed_sets: entry.sets,
            target: entry.target.clone(),
            actual_values: vec![best; entry.sets as usize],
        });

        if let Some(next) = check_auto_progression(&catalog, &entry.exercise_id, best) {
            let report = auto_progress_plans(&plans, user_id, &entry.exercise_id, &next.id).await?;
            for advance in &report.advanced {
                println!("  ↑ {} → {} on {}", entry.exercise_id, next.name, advance.day);
            }
            for (plan_id, error) in &report.failed {
                eprintln!("  ! Failed to advance plan {}: {}", plan_id, error);
            }
        }
    }

    plans.mark_completed(&plan.id).await?;

    let record = WorkoutHistory {
        id: Uuid::new_v4(),
        user_id: user_id.to_string(),
        plan_id: plan.id,
        day_index: day,
        exercises: logged,
        completed_at: now,
        duration_seconds: None,
    };
    history.append(&record).await?;

    let stats = history.stats(user_id, now).await?;
    println!("✓ Workout logged!");
    println!("  Weekly streak: {} week(s)", stats.weekly_streak);
    Ok(())
}

async fn cmd_status(store: Arc<dyn DocumentStore>, config: &Config) -> Result<()> {
    let catalog = load_or_default_catalog(store.as_ref()).await?;
    let progress = ProgressStore::new(store.clone());
    let history = HistoryStore::new(store);
    let user_id = &config.user.id;

    let completed = progress.completed_ids(user_id).await?;

    println!("Curricula:");
    let mut curricula: Vec<(&Skill, &str)> = catalog
        .skills
        .values()
        .map(|s| (s, "skill"))
        .chain(catalog.strength_paths.values().map(|p| (p, "path")))
        .collect();
    curricula.sort_by(|a, b| a.0.id.cmp(&b.0.id));

    for (curriculum, kind) in curricula {
        if !can_access_skill(curriculum, config.user.level, &completed) {
            println!("  {} [{}] — locked", curriculum.name, kind);
            continue;
        }

        let percent = skill_progress(curriculum, &completed);
        let next = current_skill_exercise(curriculum, &completed)
            .and_then(|entry| catalog.exercise(&entry.exercise_id))
            .map(|exercise| exercise.name.as_str())
            .unwrap_or("—");
        println!("  {} [{}] — {}% (next: {})", curriculum.name, kind, percent, next);
    }

    let stats = history.stats(user_id, Utc::now()).await?;
    println!();
    println!(
        "Workouts: {}  Exercise slots: {}",
        stats.total_workouts, stats.total_exercises
    );
    println!(
        "Weekly streak: {}  Longest: {}",
        stats.weekly_streak, stats.longest_weekly_streak
    );
    Ok(())
}

async fn cmd_export(store: Arc<dyn DocumentStore>, user_id: &str, out: &PathBuf) -> Result<()> {
    let history = HistoryStore::new(store);
    let records = history.all_for_user(user_id).await?;

    let rows = export_history_csv(&records, out)?;
    println!("✓ Exported {} row(s) to {}", rows, out.display());
    Ok(())
}

/// Render a sets × target dose for display
fn format_dose(sets: u32, target: &Target) -> String {
    match target.kind {
        TargetKind::Reps => format!("{}×{} reps", sets, target.value),
        TargetKind::Time => format!("{}×{}s hold", sets, target.value),
    }
}

/// Parse comma-separated logged values; unparseable slots fall back to None
fn parse_values(raw: Option<&str>, slots: usize) -> Vec<Option<u32>> {
    let mut parsed: Vec<Option<u32>> = raw
        .map(|s| {
            s.split(',')
                .map(|v| v.trim().parse::<u32>().ok())
                .collect()
        })
        .unwrap_or_default();
    parsed.resize(slots, None);
    parsed
}
