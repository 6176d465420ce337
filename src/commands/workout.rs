use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    cli::WorkoutCmd,
    store,
    types::{Config, OutputFmt, emit},
    utils::resolve_user_email,
};

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct WorkoutToml {
    user: Option<String>,
    /// `YYYY-MM-DD` or full RFC 3339; defaults to now.
    date: Option<String>,
    notes: Option<String>,
    #[serde(default = "default_true")]
    completed: bool,
    #[serde(default)]
    exercise: Vec<WorkoutExerciseToml>,
}

#[derive(Debug, Deserialize)]
struct WorkoutExerciseToml {
    name: String,
    sets: Vec<SetToml>,
}

#[derive(Debug, Deserialize)]
struct SetToml {
    reps: i64,
    weight: f64,
    rpe: Option<f64>,
    #[serde(default = "default_true")]
    completed: bool,
}

#[derive(Serialize)]
struct WorkoutRowJson {
    idx: i64,
    id: String,
    date: String,
    notes: String,
    completed: bool,
    sets: i64,
}

fn parse_workout_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }

    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Resolve an index (from `workout list`, newest first) or a raw id to
/// the workout id, scoped to the given user.
async fn resolve_workout(pool: &SqlitePool, user_id: &str, workout: &str) -> Result<Option<String>> {
    if let Ok(idx) = workout.parse::<i64>() {
        Ok(sqlx::query_scalar(
            r#"
            SELECT id
            FROM (
              SELECT id, ROW_NUMBER() OVER (ORDER BY date DESC) AS rn
              FROM workouts
              WHERE user_id = ?
            ) t
            WHERE t.rn = ?
            "#,
        )
        .bind(user_id)
        .bind(idx)
        .fetch_optional(pool)
        .await?)
    } else {
        Ok(sqlx::query_scalar("SELECT id FROM workouts WHERE id = ?")
            .bind(workout)
            .fetch_optional(pool)
            .await?)
    }
}

pub async fn handle(cmd: WorkoutCmd, pool: &SqlitePool, cfg: &Config, fmt: OutputFmt) -> Result<()> {
    match cmd {
        WorkoutCmd::Log(args) => {
            let toml_str = tokio::fs::read_to_string(&args.file)
                .await
                .with_context(|| format!("Could not read file: `{}`", args.file))?;

            let workout: WorkoutToml = toml::from_str(&toml_str)
                .with_context(|| format!("Invalid workout file: {}", args.file))?;

            if workout.exercise.is_empty() {
                println!("{} no [[exercise]] entries found", "error:".red().bold());
                return Ok(());
            }

            // Flag wins over the file, the file over the config key.
            let email = match resolve_user_email(args.user.or(workout.user.clone()), cfg) {
                Ok(email) => email,
                Err(e) => {
                    println!("{} {}", "error:".red().bold(), e);
                    return Ok(());
                }
            };

            let Some(user_id) = store::find_user_id(pool, &email).await? else {
                println!("{} no user with email `{}`", "error:".red().bold(), email);
                return Ok(());
            };

            let date = match &workout.date {
                None => Utc::now(),
                Some(raw) => match parse_workout_date(raw) {
                    Some(date) => date,
                    None => {
                        println!(
                            "{} invalid date `{}` (expected YYYY-MM-DD or RFC 3339)",
                            "error:".red().bold(),
                            raw
                        );
                        return Ok(());
                    }
                },
            };

            // Resolve every exercise name before writing anything.
            let mut resolved: Vec<(String, &WorkoutExerciseToml)> = Vec::new();
            for ex in &workout.exercise {
                for set in &ex.sets {
                    if set.reps < 0 || set.weight < 0.0 {
                        println!(
                            "{} `{}`: reps and weight must be non-negative",
                            "error:".red().bold(),
                            ex.name
                        );
                        return Ok(());
                    }
                }

                let id: Option<String> = sqlx::query_scalar("SELECT id FROM exercises WHERE name = ?")
                    .bind(&ex.name)
                    .fetch_optional(pool)
                    .await?;

                match id {
                    Some(id) => resolved.push((id, ex)),
                    None => {
                        println!(
                            "{} no exercise named `{}` — add it with `ex add` or run `seed`",
                            "error:".red().bold(),
                            ex.name
                        );
                        return Ok(());
                    }
                }
            }

            // Start a transaction.
            let mut tx = pool.begin().await?;

            let workout_id = Uuid::new_v4().to_string();
            sqlx::query(
                r#"
                INSERT INTO workouts (id, user_id, date, notes, completed, created_at)
                VALUES (?, ?, ?, ?, ?, datetime('now'))
                "#,
            )
            .bind(&workout_id)
            .bind(&user_id)
            .bind(date)
            .bind(&workout.notes)
            .bind(workout.completed)
            .execute(&mut *tx)
            .await?;

            let mut order_index = 0i64;
            let mut total_sets = 0;
            for (exercise_id, ex) in &resolved {
                for set in &ex.sets {
                    order_index += 1;
                    total_sets += 1;
                    sqlx::query(
                        r#"
                        INSERT INTO sets
                        (id, workout_id, exercise_id, reps, weight, rpe, completed, order_index)
                        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                        "#,
                    )
                    .bind(Uuid::new_v4().to_string())
                    .bind(&workout_id)
                    .bind(exercise_id)
                    .bind(set.reps)
                    .bind(set.weight)
                    .bind(set.rpe)
                    .bind(set.completed)
                    .bind(order_index)
                    .execute(&mut *tx)
                    .await?;
                }
            }

            // Commit the transaction.
            tx.commit().await?;

            println!(
                "{} logged workout for {} ({} exercises, {} sets) — id: {}",
                "ok:".green().bold(),
                date.format("%Y-%m-%d"),
                resolved.len(),
                total_sets,
                workout_id
            );
        }

        WorkoutCmd::List { user, limit } => {
            let email = match resolve_user_email(user, cfg) {
                Ok(email) => email,
                Err(e) => {
                    println!("{} {}", "error:".red().bold(), e);
                    return Ok(());
                }
            };

            let Some(user_id) = store::find_user_id(pool, &email).await? else {
                println!("{} no user with email `{}`", "error:".red().bold(), email);
                return Ok(());
            };

            let rows = sqlx::query_as::<_, (String, DateTime<Utc>, Option<String>, bool, i64)>(
                r#"
                SELECT w.id, w.date, w.notes, w.completed, COUNT(s.id)
                FROM workouts w
                LEFT JOIN sets s ON s.workout_id = w.id
                WHERE w.user_id = ?
                GROUP BY w.id
                ORDER BY w.date DESC
                LIMIT ?
                "#,
            )
            .bind(&user_id)
            .bind(limit)
            .fetch_all(pool)
            .await?;

            let json_rows: Vec<WorkoutRowJson> = rows
                .iter()
                .enumerate()
                .map(|(i, (id, date, notes, completed, sets))| WorkoutRowJson {
                    idx: i as i64 + 1,
                    id: id.clone(),
                    date: date.format("%Y-%m-%d %H:%M").to_string(),
                    notes: notes.clone().unwrap_or_default(),
                    completed: *completed,
                    sets: *sets,
                })
                .collect();

            emit(fmt, &json_rows, || {
                println!("{}", "Workouts:".cyan().bold());

                for w in &json_rows {
                    let idx = format!("{}", w.idx).yellow();
                    let mark = if w.completed {
                        "✓".green().to_string()
                    } else {
                        "…".dimmed().to_string()
                    };
                    let notes = if w.notes.is_empty() {
                        String::new()
                    } else {
                        format!(" – {}", w.notes).dimmed().to_string()
                    };
                    println!(
                        " {} • {} {} ({} sets){}",
                        idx,
                        w.date.bold(),
                        mark,
                        w.sets,
                        notes
                    );
                }

                if json_rows.is_empty() {
                    println!("{}", "  (no workouts found)".dimmed());
                }
            });
        }

        WorkoutCmd::Show { workout, user } => {
            let email = match resolve_user_email(user, cfg) {
                Ok(email) => email,
                Err(e) => {
                    println!("{} {}", "error:".red().bold(), e);
                    return Ok(());
                }
            };

            let Some(user_id) = store::find_user_id(pool, &email).await? else {
                println!("{} no user with email `{}`", "error:".red().bold(), email);
                return Ok(());
            };

            let Some(workout_id) = resolve_workout(pool, &user_id, &workout).await? else {
                println!("{} no such workout `{}`", "error:".red().bold(), workout);
                return Ok(());
            };

            let Some(full) = store::get_workout(pool, &workout_id).await? else {
                println!("{} no such workout `{}`", "error:".red().bold(), workout);
                return Ok(());
            };

            if full.user_id != user_id {
                println!(
                    "{} workout `{}` does not belong to `{}`",
                    "error:".red().bold(),
                    workout_id,
                    email
                );
                return Ok(());
            }

            emit(fmt, &full, || {
                let mark = if full.completed { "✓".green().to_string() } else { "…".dimmed().to_string() };
                println!(
                    "{} {} {}",
                    "Workout:".cyan().bold(),
                    full.date.format("%Y-%m-%d %H:%M").to_string().bold(),
                    mark
                );
                if let Some(notes) = &full.notes {
                    println!("  {}", notes.dimmed());
                }

                let mut current_exercise: Option<String> = None;
                let mut set_num = 0;
                for set in &full.sets {
                    let name = set
                        .exercise
                        .as_ref()
                        .map(|e| e.name.clone())
                        .unwrap_or_else(|| "(deleted exercise)".to_string());

                    if current_exercise.as_deref() != Some(name.as_str()) {
                        println!("\n• {}", name.bold());
                        current_exercise = Some(name);
                        set_num = 0;
                    }

                    set_num += 1;
                    let rpe = set
                        .rpe
                        .map(|r| format!(" @ RPE {}", r))
                        .unwrap_or_default();
                    let mark = if set.completed {
                        "✓".green().to_string()
                    } else {
                        "skipped".dimmed().to_string()
                    };
                    println!(
                        "    {} • {}kg × {}{} {}",
                        format!("{}", set_num).yellow(),
                        set.weight,
                        set.reps,
                        rpe.dimmed(),
                        mark
                    );
                }

                if full.sets.is_empty() {
                    println!("{}", "  (no sets)".dimmed());
                }
            });
        }

        WorkoutCmd::Delete { workout, user } => {
            let email = match resolve_user_email(user, cfg) {
                Ok(email) => email,
                Err(e) => {
                    println!("{} {}", "error:".red().bold(), e);
                    return Ok(());
                }
            };

            let Some(user_id) = store::find_user_id(pool, &email).await? else {
                println!("{} no user with email `{}`", "error:".red().bold(), email);
                return Ok(());
            };

            let Some(workout_id) = resolve_workout(pool, &user_id, &workout).await? else {
                println!("{} no such workout `{}`", "error:".red().bold(), workout);
                return Ok(());
            };

            // The workout must belong to the acting user.
            let owner: String = sqlx::query_scalar("SELECT user_id FROM workouts WHERE id = ?")
                .bind(&workout_id)
                .fetch_one(pool)
                .await?;

            if owner != user_id {
                println!(
                    "{} workout `{}` does not belong to `{}`",
                    "error:".red().bold(),
                    workout_id,
                    email
                );
                return Ok(());
            }

            // Cascade removes the sets.
            sqlx::query("DELETE FROM workouts WHERE id = ?")
                .bind(&workout_id)
                .execute(pool)
                .await?;

            println!("{} deleted workout `{}`", "ok:".green().bold(), workout_id);
        }
    }

    Ok(())
}
