//! Integration tests against an in-memory SQLite store: schema, window
//! queries, unresolved exercise references and cascades.

use chrono::{DateTime, Duration, Utc};
use ironlog::analytics::{Period, aggregate};
use ironlog::db;
use ironlog::store;
use sqlx::SqlitePool;
use uuid::Uuid;

async fn create_user(pool: &SqlitePool, email: &str) -> String {
    let id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO users (id, email, created_at, updated_at) VALUES (?, ?, datetime('now'), datetime('now'))",
    )
    .bind(&id)
    .bind(email)
    .execute(pool)
    .await
    .unwrap();
    id
}

async fn create_exercise(pool: &SqlitePool, name: &str, muscle: &str) -> String {
    let id = Uuid::new_v4().to_string();
    sqlx::query(
        r#"
        INSERT INTO exercises (id, name, mn_name, muscle_group, is_default, created_at)
        VALUES (?, ?, ?, ?, 0, datetime('now'))
        "#,
    )
    .bind(&id)
    .bind(name)
    .bind(name)
    .bind(muscle)
    .execute(pool)
    .await
    .unwrap();
    id
}

async fn create_workout(pool: &SqlitePool, user_id: &str, date: DateTime<Utc>) -> String {
    let id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO workouts (id, user_id, date, completed, created_at) VALUES (?, ?, ?, 1, datetime('now'))",
    )
    .bind(&id)
    .bind(user_id)
    .bind(date)
    .execute(pool)
    .await
    .unwrap();
    id
}

#[allow(clippy::too_many_arguments)]
async fn create_set(
    pool: &SqlitePool,
    workout_id: &str,
    exercise_id: &str,
    reps: i64,
    weight: f64,
    rpe: Option<f64>,
    completed: bool,
    order_index: i64,
) {
    sqlx::query(
        r#"
        INSERT INTO sets (id, workout_id, exercise_id, reps, weight, rpe, completed, order_index)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(workout_id)
    .bind(exercise_id)
    .bind(reps)
    .bind(weight)
    .bind(rpe)
    .bind(completed)
    .bind(order_index)
    .execute(pool)
    .await
    .unwrap();
}

#[tokio::test]
async fn find_user_id_by_email() {
    let pool = db::open_in_memory().await.unwrap();
    let id = create_user(&pool, "ana@example.com").await;

    let found = store::find_user_id(&pool, "ana@example.com").await.unwrap();
    assert_eq!(found, Some(id));

    let missing = store::find_user_id(&pool, "nobody@example.com").await.unwrap();
    assert_eq!(missing, None);
}

#[tokio::test]
async fn window_query_is_inclusive_at_both_bounds() {
    let pool = db::open_in_memory().await.unwrap();
    let user = create_user(&pool, "ana@example.com").await;

    let now = Utc::now();
    let (start, end) = Period::Week.window(now);

    // Exactly on each boundary, and one second outside each.
    create_workout(&pool, &user, start).await;
    create_workout(&pool, &user, end).await;
    create_workout(&pool, &user, start - Duration::seconds(1)).await;
    create_workout(&pool, &user, end + Duration::seconds(1)).await;

    let workouts = store::list_workouts_in_range(&pool, &user, start, end)
        .await
        .unwrap();
    assert_eq!(workouts.len(), 2);

    // Oldest first.
    assert!(workouts[0].date <= workouts[1].date);
}

#[tokio::test]
async fn month_window_excludes_older_workouts() {
    let pool = db::open_in_memory().await.unwrap();
    let user = create_user(&pool, "ana@example.com").await;

    let now = Utc::now();
    create_workout(&pool, &user, now - Duration::days(25)).await;
    create_workout(&pool, &user, now - Duration::days(40)).await;

    let (start, end) = Period::Month.window(now);
    let workouts = store::list_workouts_in_range(&pool, &user, start, end)
        .await
        .unwrap();
    assert_eq!(workouts.len(), 1);
}

#[tokio::test]
async fn sets_come_back_in_display_order_with_exercises_resolved() {
    let pool = db::open_in_memory().await.unwrap();
    let user = create_user(&pool, "ana@example.com").await;
    let bench = create_exercise(&pool, "Bench Press", "chest").await;

    let now = Utc::now();
    let workout = create_workout(&pool, &user, now).await;

    // Inserted out of order on purpose.
    create_set(&pool, &workout, &bench, 8, 60.0, Some(9.0), true, 2).await;
    create_set(&pool, &workout, &bench, 10, 50.0, Some(8.0), true, 1).await;

    let (start, end) = Period::Week.window(now);
    let workouts = store::list_workouts_in_range(&pool, &user, start, end)
        .await
        .unwrap();

    assert_eq!(workouts.len(), 1);
    let sets = &workouts[0].sets;
    assert_eq!(sets.len(), 2);
    assert_eq!(sets[0].order_index, 1);
    assert_eq!(sets[0].reps, 10);
    assert_eq!(sets[1].order_index, 2);

    let exercise = sets[0].exercise.as_ref().unwrap();
    assert_eq!(exercise.name, "Bench Press");
}

#[tokio::test]
async fn deleted_exercise_leaves_an_unresolved_reference() {
    let pool = db::open_in_memory().await.unwrap();
    let user = create_user(&pool, "ana@example.com").await;
    let bench = create_exercise(&pool, "Bench Press", "chest").await;

    let now = Utc::now();
    let workout = create_workout(&pool, &user, now).await;
    create_set(&pool, &workout, &bench, 10, 50.0, None, true, 1).await;

    sqlx::query("DELETE FROM exercises WHERE id = ?")
        .bind(&bench)
        .execute(&pool)
        .await
        .unwrap();

    let (start, end) = Period::Week.window(now);
    let workouts = store::list_workouts_in_range(&pool, &user, start, end)
        .await
        .unwrap();

    // The set survives without its exercise.
    assert_eq!(workouts[0].sets.len(), 1);
    assert!(workouts[0].sets[0].exercise.is_none());

    // It still feeds the summary, but never the per-exercise structures.
    let analytics = aggregate(&workouts, Period::Week);
    assert_eq!(analytics.summary.total_sets, 1);
    assert_eq!(analytics.summary.total_volume, 500.0);
    assert!(analytics.personal_records.is_empty());
    assert!(analytics.detailed_exercises.is_empty());
}

#[tokio::test]
async fn deleting_a_workout_cascades_to_its_sets() {
    let pool = db::open_in_memory().await.unwrap();
    let user = create_user(&pool, "ana@example.com").await;
    let bench = create_exercise(&pool, "Bench Press", "chest").await;

    let workout = create_workout(&pool, &user, Utc::now()).await;
    create_set(&pool, &workout, &bench, 10, 50.0, None, true, 1).await;

    sqlx::query("DELETE FROM workouts WHERE id = ?")
        .bind(&workout)
        .execute(&pool)
        .await
        .unwrap();

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sets")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}

#[tokio::test]
async fn end_to_end_analytics_over_the_store() {
    let pool = db::open_in_memory().await.unwrap();
    let user = create_user(&pool, "ana@example.com").await;
    let bench = create_exercise(&pool, "Bench Press", "chest").await;
    let squat = create_exercise(&pool, "Squat", "legs").await;

    let now = Utc::now();
    let w1 = create_workout(&pool, &user, now - Duration::days(2)).await;
    create_set(&pool, &w1, &bench, 10, 50.0, Some(8.0), true, 1).await;
    create_set(&pool, &w1, &bench, 8, 60.0, None, true, 2).await;
    create_set(&pool, &w1, &bench, 5, 40.0, None, false, 3).await;

    let w2 = create_workout(&pool, &user, now - Duration::days(1)).await;
    create_set(&pool, &w2, &squat, 5, 100.0, Some(9.0), true, 1).await;

    let (start, end) = Period::Week.window(now);
    let workouts = store::list_workouts_in_range(&pool, &user, start, end)
        .await
        .unwrap();
    let analytics = aggregate(&workouts, Period::Week);

    assert_eq!(analytics.summary.total_workouts, 2);
    assert_eq!(analytics.summary.total_sets, 4);
    assert_eq!(analytics.summary.completed_sets, 3);
    assert_eq!(analytics.summary.total_volume, 1680.0);

    // First-encounter order: bench was logged first.
    assert_eq!(analytics.personal_records.len(), 2);
    assert_eq!(analytics.personal_records[0].exercise.name, "Bench Press");
    assert_eq!(analytics.personal_records[0].pr_weight, 50.0);
    assert_eq!(analytics.personal_records[1].pr_weight, 100.0);

    // Breakdown sorts by volume: bench 980 vs squat 500.
    assert_eq!(analytics.detailed_exercises[0].exercise.name, "Bench Press");
    assert_eq!(analytics.detailed_exercises[1].exercise.name, "Squat");

    assert_eq!(analytics.chart_data.len(), 2);
    assert!(analytics.chart_data[0].date < analytics.chart_data[1].date);
}
