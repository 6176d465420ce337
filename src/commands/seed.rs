use anyhow::Result;
use colored::Colorize;
use sqlx::SqlitePool;
use uuid::Uuid;

/// The stock catalog: (name, localized name, muscle group, equipment, kind).
const DEFAULT_EXERCISES: &[(&str, &str, &str, &str, &str)] = &[
    ("Bench Press", "Бэнч пресс", "chest", "Barbell", "strength"),
    ("Incline Bench Press", "Инклайн бэнч пресс", "chest", "Barbell", "strength"),
    ("Dumbbell Flyes", "Дамббел flyes", "chest", "Dumbbell", "strength"),
    ("Push-ups", "Пушап", "chest", "Bodyweight", "strength"),
    ("Dips", "Дип", "chest", "Bodyweight", "strength"),
    ("Squat", "Скват", "legs", "Barbell", "strength"),
    ("Front Squat", "Фронт скват", "legs", "Barbell", "strength"),
    ("Leg Press", "Лег пресс", "legs", "Machine", "strength"),
    ("Romanian Deadlift", "Румын дэдлифт", "legs", "Barbell", "strength"),
    ("Lunges", "Ланжес", "legs", "Bodyweight", "strength"),
    ("Calf Raises", "Калф raises", "legs", "Machine", "strength"),
    ("Deadlift", "Дэдлифт", "back", "Barbell", "strength"),
    ("Bent Over Row", "Роу", "back", "Barbell", "strength"),
    ("Pull-ups", "Пуллап", "back", "Bodyweight", "strength"),
    ("Chin-ups", "Чинап", "back", "Bodyweight", "strength"),
    ("T-Bar Row", "T-бар роу", "back", "Barbell", "strength"),
    ("Overhead Press", "Оверхед пресс", "shoulders", "Barbell", "strength"),
    ("Lateral Raises", "Латерал raises", "shoulders", "Dumbbell", "strength"),
    ("Face Pulls", "Фейс пулл", "shoulders", "Cable", "strength"),
    ("Shoulder Press", "Шолдер пресс", "shoulders", "Dumbbell", "strength"),
    ("Shrugs", "Шрагс", "shoulders", "Dumbbell", "strength"),
    ("Bicep Curls", "Байцепс curl", "arms", "Dumbbell", "strength"),
    ("Hammer Curls", "Хаммер curl", "arms", "Dumbbell", "strength"),
    ("Skull Crushers", "Скул crushers", "arms", "Barbell", "strength"),
    ("Tricep Pushdowns", "Трайцепс пушдаун", "arms", "Cable", "strength"),
    ("Plank", "Планк", "core", "Bodyweight", "strength"),
    ("Crunches", "Кранчес", "core", "Bodyweight", "strength"),
    ("Leg Raises", "Лег raises", "core", "Bodyweight", "strength"),
    ("Russian Twists", "Рашаан twists", "core", "Bodyweight", "strength"),
    ("Kettlebell Swings", "Кеттбелл swings", "full-body", "Kettlebell", "strength"),
    ("Burpees", "Берпи", "full-body", "Bodyweight", "cardio"),
    ("Farmers Walk", "Фармерс валк", "full-body", "Dumbbell", "strength"),
    ("Running", "Гүйлт", "cardio", "Treadmill", "cardio"),
    ("Cycling", "Дугуй", "cardio", "Bike", "cardio"),
    ("Rowing", "Ровинг", "cardio", "Rower", "cardio"),
    ("Jump Rope", "Jump rope", "cardio", "Jump Rope", "cardio"),
];

/// Install the stock exercise catalog. Safe to re-run: existing names are
/// left untouched.
pub async fn handle(pool: &SqlitePool) -> Result<()> {
    let mut tx = pool.begin().await?;

    let mut inserted = 0;
    let mut skipped = 0;

    for (name, mn_name, muscle_group, equipment, kind) in DEFAULT_EXERCISES {
        let res = sqlx::query(
            r#"
            INSERT OR IGNORE INTO exercises
              (id, name, mn_name, muscle_group, equipment, kind, is_default, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, datetime('now'))
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(name)
        .bind(mn_name)
        .bind(muscle_group)
        .bind(equipment)
        .bind(kind)
        .execute(&mut *tx)
        .await?;

        if res.rows_affected() == 1 {
            inserted += 1;
        } else {
            skipped += 1;
        }
    }

    tx.commit().await?;

    println!(
        "{} {} exercises installed, {} already present",
        "Summary:".cyan().bold(),
        inserted,
        skipped
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::canonical_muscle_group;

    #[test]
    fn every_seed_row_uses_an_allowed_muscle_group() {
        for (name, _, muscle_group, _, kind) in DEFAULT_EXERCISES {
            assert!(
                canonical_muscle_group(muscle_group).is_some(),
                "`{}` has unknown muscle group `{}`",
                name,
                muscle_group
            );
            assert!(
                matches!(*kind, "strength" | "cardio"),
                "`{}` has unknown kind `{}`",
                name,
                kind
            );
        }
    }
}
