//! Read side of the workout store consumed by the analytics pass.
//!
//! One query for the workouts in the window, then one per workout for its
//! ordered sets with the exercise row left-joined in, so a deleted exercise
//! surfaces as an unresolved reference instead of dropping the set.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::models::{Exercise, Workout, WorkoutSet};
use crate::types::{ExerciseKind, MuscleGroup};

/// Look up a user id by email. `None` means no such user.
pub async fn find_user_id(pool: &SqlitePool, email: &str) -> Result<Option<String>> {
    Ok(sqlx::query_scalar("SELECT id FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?)
}

/// All workouts of `user_id` with `date` inside `[start, end]`, oldest
/// first, each carrying its sets in display order.
pub async fn list_workouts_in_range(
    pool: &SqlitePool,
    user_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<Workout>> {
    let rows = sqlx::query_as::<_, (String, String, DateTime<Utc>, Option<String>, bool)>(
        r#"
        SELECT id, user_id, date, notes, completed
        FROM workouts
        WHERE user_id = ? AND date >= ? AND date <= ?
        ORDER BY date ASC
        "#,
    )
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await
    .context("failed to fetch workouts")?;

    let mut workouts = Vec::with_capacity(rows.len());
    for (id, user_id, date, notes, completed) in rows {
        let sets = list_sets(pool, &id).await?;
        workouts.push(Workout {
            id,
            user_id,
            date,
            notes,
            completed,
            sets,
        });
    }

    Ok(workouts)
}

/// One workout by id, with its ordered sets. `None` if the id is unknown.
pub async fn get_workout(pool: &SqlitePool, workout_id: &str) -> Result<Option<Workout>> {
    let row = sqlx::query_as::<_, (String, String, DateTime<Utc>, Option<String>, bool)>(
        "SELECT id, user_id, date, notes, completed FROM workouts WHERE id = ?",
    )
    .bind(workout_id)
    .fetch_optional(pool)
    .await
    .context("failed to fetch workouts")?;

    let Some((id, user_id, date, notes, completed)) = row else {
        return Ok(None);
    };

    let sets = list_sets(pool, &id).await?;
    Ok(Some(Workout {
        id,
        user_id,
        date,
        notes,
        completed,
        sets,
    }))
}

async fn list_sets(pool: &SqlitePool, workout_id: &str) -> Result<Vec<WorkoutSet>> {
    type SetRow = (
        String,
        i64,
        f64,
        Option<f64>,
        bool,
        i64,
        Option<String>,
        Option<String>,
        Option<String>,
        Option<MuscleGroup>,
        Option<String>,
        Option<ExerciseKind>,
    );

    let rows = sqlx::query_as::<_, SetRow>(
        r#"
        SELECT
            s.id, s.reps, s.weight, s.rpe, s.completed, s.order_index,
            e.id, e.name, e.mn_name, e.muscle_group, e.equipment, e.kind
        FROM sets s
        LEFT JOIN exercises e ON e.id = s.exercise_id
        WHERE s.workout_id = ?
        ORDER BY s.order_index
        "#,
    )
    .bind(workout_id)
    .fetch_all(pool)
    .await
    .context("failed to fetch sets")?;

    let sets = rows
        .into_iter()
        .map(
            |(id, reps, weight, rpe, completed, order_index, ex_id, name, mn_name, muscle, equipment, kind)| {
                let exercise = match (ex_id, name, mn_name, muscle) {
                    (Some(id), Some(name), Some(mn_name), Some(muscle_group)) => Some(Exercise {
                        id,
                        name,
                        mn_name,
                        muscle_group,
                        equipment,
                        kind,
                    }),
                    _ => None,
                };

                WorkoutSet {
                    id,
                    reps,
                    weight,
                    rpe,
                    completed,
                    order_index,
                    exercise,
                }
            },
        )
        .collect();

    Ok(sets)
}
