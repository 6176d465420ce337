use std::{collections::BTreeSet, path::Path};

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use sqlx::{Row, SqlitePool};

use crate::{
    cli::ExerciseCmd,
    types::{
        ALLOWED_MUSCLE_GROUPS, ExerciseImport, OutputFmt, best_muscle_suggestion,
        canonical_muscle_group, emit,
    },
    utils::plain_len,
};

#[derive(Serialize)]
struct ExJson {
    idx: i64,
    name: String,
    mn_name: String,
    muscle_group: String,
    equipment: String,
    kind: String,
    created_at: String,
}

/// Resolve an index (from `ex list`) or exact name to the exercise id.
async fn resolve_exercise(pool: &SqlitePool, exercise: &str) -> Result<Option<String>> {
    if let Ok(idx) = exercise.parse::<i64>() {
        Ok(sqlx::query_scalar(
            r#"
            SELECT id
            FROM (
              SELECT id, ROW_NUMBER() OVER (ORDER BY rowid) AS rn
              FROM exercises
            ) t
            WHERE t.rn = ?
            "#,
        )
        .bind(idx)
        .fetch_optional(pool)
        .await?)
    } else {
        Ok(sqlx::query_scalar("SELECT id FROM exercises WHERE name = ?")
            .bind(exercise)
            .fetch_optional(pool)
            .await?)
    }
}

pub async fn handle(cmd: ExerciseCmd, pool: &SqlitePool, fmt: OutputFmt) -> Result<()> {
    match cmd {
        ExerciseCmd::Add {
            name,
            muscle,
            mn_name,
            equipment,
            kind,
        } => {
            let Some(muscle_group) = canonical_muscle_group(&muscle) else {
                if let Some(sug) = best_muscle_suggestion(&muscle) {
                    println!(
                        "{} unknown muscle group `{}` -- did you mean: `{}`?",
                        "error:".red().bold(),
                        muscle,
                        sug.green()
                    );
                } else {
                    let allowed = ALLOWED_MUSCLE_GROUPS
                        .iter()
                        .cloned()
                        .collect::<Vec<_>>()
                        .join(", ");
                    println!(
                        "{} unknown muscle group `{}` (allowed: {})",
                        "error:".red().bold(),
                        muscle,
                        allowed
                    );
                }
                return Ok(());
            };

            let kind = match kind.as_deref() {
                None => None,
                Some("strength") => Some("strength"),
                Some("cardio") => Some("cardio"),
                Some(other) => {
                    println!(
                        "{} kind must be `strength` or `cardio`, got `{}`",
                        "error:".red().bold(),
                        other
                    );
                    return Ok(());
                }
            };

            let res = sqlx::query(
                r#"
                INSERT INTO exercises
                (id, name, mn_name, muscle_group, equipment, kind, is_default, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, datetime('now'))
                "#,
            )
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(&name)
            .bind(mn_name.as_deref().unwrap_or(&name))
            .bind(muscle_group.to_string())
            .bind(&equipment)
            .bind(kind)
            .execute(pool)
            .await;

            match res {
                Ok(info) if info.rows_affected() == 1 => {
                    println!("{} exercise \"{}\" added", "info:".blue().bold(), &name)
                }
                Ok(_) => println!(
                    "{} exercise \"{}\" was not inserted",
                    "info:".blue().bold(),
                    &name
                ),
                Err(sqlx::Error::Database(db_err)) if db_err.code() == Some("2067".into()) => {
                    // 2067 = SQLITE_CONSTRAINT_UNIQUE
                    println!(
                        "{} exercise \"{}\" already exists — use `ex list` to view all exercises",
                        "warning:".yellow().bold(),
                        name
                    );
                }
                Err(e) => {
                    println!("{} {}", "error:".red().bold(), e.to_string().red());
                    return Err(e.into());
                }
            }
        }

        ExerciseCmd::Import { file } => {
            let path = Path::new(&file);
            let toml_str = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Could not read file: `{}`", file))?;

            // Parse into Vec<ExerciseDef>.
            let import: ExerciseImport = toml::from_str(&toml_str)
                .context("Failed to parse TOML: Expected `[[exercise]]` entries")?;

            if import.exercise.is_empty() {
                println!(
                    "{}",
                    "warning: no [[exercise]] entries found".yellow().bold()
                );
                return Ok(());
            }

            // Loop and insert/ignore.
            let mut inserted = 0;
            let mut skipped = 0;
            let mut unknowns: BTreeSet<String> = BTreeSet::new();

            for ex in import.exercise {
                assert!(!ex.name.trim().is_empty(), "exercise.name must not be empty");

                // Validate the `muscle_group` field.
                let muscle = match canonical_muscle_group(&ex.muscle_group) {
                    Some(m) => m,
                    None => {
                        // Did you mean?
                        if let Some(sug) = best_muscle_suggestion(&ex.muscle_group) {
                            println!(
                                "{} `{}` skipped – unknown muscle group `{}` -- did you mean: `{}`?",
                                "warning:".yellow().bold(),
                                ex.name,
                                ex.muscle_group,
                                sug.green()
                            );
                        } else {
                            println!(
                                "{} `{}` skipped – unknown muscle group `{}`",
                                "warning:".yellow().bold(),
                                ex.name,
                                ex.muscle_group
                            );
                        }

                        skipped += 1;
                        unknowns.insert(ex.muscle_group);
                        continue;
                    }
                };

                // Anything but strength/cardio is dropped, not stored.
                let kind = match ex.kind.as_deref() {
                    Some("strength") | Some("cardio") => ex.kind.clone(),
                    Some(other) => {
                        println!(
                            "{} `{}`: ignoring unknown kind `{}`",
                            "warning:".yellow().bold(),
                            ex.name,
                            other
                        );
                        None
                    }
                    None => None,
                };

                let res = sqlx::query(
                    r#"
                    INSERT OR IGNORE INTO exercises
                      (id, name, mn_name, muscle_group, equipment, kind, is_default, created_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, datetime('now'))
                    "#,
                )
                .bind(uuid::Uuid::new_v4().to_string())
                .bind(&ex.name)
                .bind(ex.mn_name.as_deref().unwrap_or(&ex.name))
                .bind(muscle.to_string())
                .bind(&ex.equipment)
                .bind(kind)
                .execute(pool)
                .await
                .with_context(|| format!("DB error inserting `{}`", ex.name))?;

                if res.rows_affected() == 1 {
                    inserted += 1;
                    println!("{} `{}`", "ok:".green().bold(), ex.name);
                } else {
                    skipped += 1;
                    println!("{} `{}` (already exists)", "info:".blue().bold(), ex.name);
                }
            }

            // Summary.
            println!(
                "\n{} {} inserted, {} skipped",
                "Summary:".cyan().bold(),
                inserted,
                skipped
            );

            // Print allowed list if at least one entry had an unknown group.
            if !unknowns.is_empty() {
                let allowed = ALLOWED_MUSCLE_GROUPS
                    .iter()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ");

                let bad = unknowns.into_iter().collect::<Vec<_>>().join(", ");

                println!();
                println!("{} {}", "Unknown muscle groups:".yellow().bold(), bad);
                println!("{} {}", "Allowed muscle groups:".cyan().bold(), allowed);
            }
        }

        ExerciseCmd::List { muscle } => {
            let base = "
                SELECT ROW_NUMBER() OVER (ORDER BY rowid) AS idx,
                name, mn_name, muscle_group,
                COALESCE(equipment, '') AS equipment,
                COALESCE(kind, '') AS kind,
                created_at
                FROM exercises
            ";

            // Add a filter if requested.
            let db_rows = if let Some(muscle) = muscle {
                let Some(group) = canonical_muscle_group(&muscle) else {
                    println!("{} unknown muscle group `{}`", "error:".red().bold(), muscle);
                    return Ok(());
                };
                let q = format!("SELECT * FROM ({base}) WHERE muscle_group = ? ORDER BY idx");
                sqlx::query(&q).bind(group.to_string()).fetch_all(pool).await?
            } else {
                let q = format!("{base} ORDER BY idx");
                sqlx::query(&q).fetch_all(pool).await?
            };

            let json_rows: Vec<ExJson> = db_rows
                .iter()
                .map(|r| ExJson {
                    idx: r.get("idx"),
                    name: r.get("name"),
                    mn_name: r.get("mn_name"),
                    muscle_group: r.get("muscle_group"),
                    equipment: r.get("equipment"),
                    kind: r.get("kind"),
                    created_at: r.get("created_at"),
                })
                .collect();

            emit(fmt, &json_rows, || {
                println!("{}", "Exercises:".cyan().bold());

                let idx_w = json_rows
                    .iter()
                    .map(|e| e.idx.to_string().len())
                    .max()
                    .unwrap_or(1);

                // Build all lines first, then pad on printable width.
                let mut left = Vec::<String>::new();
                let mut right = Vec::<String>::new();

                for ex in &json_rows {
                    let idx_col = format!("{:>width$}", ex.idx, width = idx_w).yellow();
                    let localized = if ex.mn_name == ex.name {
                        String::new()
                    } else {
                        format!("– {}", ex.mn_name).dimmed().to_string()
                    };
                    let equipment = if ex.equipment.is_empty() {
                        String::new()
                    } else {
                        format!(" [{}]", ex.equipment).dimmed().to_string()
                    };
                    left.push(format!(
                        " {} • {} ({}){} {}",
                        idx_col,
                        ex.name.bold(),
                        ex.muscle_group.yellow(),
                        equipment,
                        localized
                    ));
                    right.push(
                        format!("added {}", &ex.created_at[..10])
                            .dimmed()
                            .to_string(),
                    );
                }

                let printable_pad = left.iter().map(|s| plain_len(s)).max().unwrap_or(0);

                for (l, r) in left.into_iter().zip(right) {
                    let extra_hidden = l.len() - plain_len(&l);
                    let total_pad = printable_pad + extra_hidden;
                    println!("{:<total_pad$} {} {}", l, "|".blue(), r, total_pad = total_pad);
                }

                if json_rows.is_empty() {
                    println!("{}", "  (no exercises found)".dimmed());
                }
            });
        }

        ExerciseCmd::Delete { exercise } => {
            let Some(id) = resolve_exercise(pool, &exercise).await? else {
                println!("{} no such exercise `{}`", "error:".red().bold(), exercise);
                return Ok(());
            };

            // Get the name for the confirmation message.
            let name: String = sqlx::query_scalar("SELECT name FROM exercises WHERE id = ?")
                .bind(&id)
                .fetch_one(pool)
                .await?;

            // Historical sets keep a NULL exercise reference (SET NULL),
            // program entries for it are removed (CASCADE).
            sqlx::query("DELETE FROM exercises WHERE id = ?")
                .bind(&id)
                .execute(pool)
                .await?;

            println!("{} deleted exercise `{}`", "ok:".green().bold(), name);
        }
    }

    Ok(())
}
