use anyhow::{Context, Result};
use colored::Colorize;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::{
    cli::ProgramCmd,
    store,
    types::{Config, OutputFmt, emit},
    utils::{plain_len, resolve_user_email},
};

#[derive(Debug, Deserialize)]
struct ProgramToml {
    name: String,
    #[serde(default)]
    day: Vec<DayToml>,
}

#[derive(Debug, Deserialize)]
struct DayToml {
    number: i64,
    #[serde(default)]
    rest: bool,
    #[serde(default)]
    deload: bool,
    #[serde(default)]
    exercises: Vec<String>,
}

#[derive(Serialize)]
struct ProgJson {
    idx: i64,
    name: String,
    created_at: String,
    days: i64,
}

/// Resolve an index (from `p list`) or exact name to the program id,
/// scoped to one user.
async fn resolve_program(pool: &SqlitePool, user_id: &str, program: &str) -> Result<Option<String>> {
    if let Ok(idx) = program.parse::<i64>() {
        Ok(sqlx::query_scalar(
            r#"
            SELECT id
            FROM (
              SELECT id, ROW_NUMBER() OVER (ORDER BY created_at, name) AS rn
              FROM programs
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
        Ok(
            sqlx::query_scalar("SELECT id FROM programs WHERE user_id = ? AND name = ?")
                .bind(user_id)
                .bind(program)
                .fetch_optional(pool)
                .await?,
        )
    }
}

async fn import_one(pool: &SqlitePool, user_id: &str, file: &str) -> Result<()> {
    let toml_str = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Could not read file: `{}`", file))?;

    let program: ProgramToml = toml::from_str(&toml_str)
        .with_context(|| format!("Invalid program file: {}", file))?;

    assert!(!program.name.trim().is_empty(), "program.name must not be empty");

    // Resolve every exercise up front so a bad file changes nothing.
    let mut day_exercises: Vec<Vec<String>> = Vec::new();
    for day in &program.day {
        let mut ids = Vec::new();
        for name in &day.exercises {
            let id: Option<String> = sqlx::query_scalar("SELECT id FROM exercises WHERE name = ?")
                .bind(name)
                .fetch_optional(pool)
                .await?;

            match id {
                Some(id) => ids.push(id),
                None => {
                    println!(
                        "{} `{}`: no exercise named `{}` — import skipped",
                        "warning:".yellow().bold(),
                        program.name,
                        name
                    );
                    return Ok(());
                }
            }
        }
        day_exercises.push(ids);
    }

    // Start a transaction.
    let mut tx = pool.begin().await?;

    // Re-importing an existing program replaces its days.
    let existing: Option<String> =
        sqlx::query_scalar("SELECT id FROM programs WHERE user_id = ? AND name = ?")
            .bind(user_id)
            .bind(&program.name)
            .fetch_optional(&mut *tx)
            .await?;

    let (program_id, replaced) = match existing {
        Some(id) => {
            // Cascade removes day_exercises with the days.
            sqlx::query("DELETE FROM program_days WHERE program_id = ?")
                .bind(&id)
                .execute(&mut *tx)
                .await?;
            (id, true)
        }
        None => {
            let id = Uuid::new_v4().to_string();
            sqlx::query(
                "INSERT INTO programs (id, user_id, name, created_at) VALUES (?, ?, ?, datetime('now'))",
            )
            .bind(&id)
            .bind(user_id)
            .bind(&program.name)
            .execute(&mut *tx)
            .await?;
            (id, false)
        }
    };

    for (day, exercise_ids) in program.day.iter().zip(&day_exercises) {
        let day_id = Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO program_days (id, program_id, day_number, is_rest_day, is_deload_week)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&day_id)
        .bind(&program_id)
        .bind(day.number)
        .bind(day.rest)
        .bind(day.deload)
        .execute(&mut *tx)
        .await?;

        for (i, exercise_id) in exercise_ids.iter().enumerate() {
            sqlx::query(
                "INSERT INTO day_exercises (id, day_id, exercise_id, order_index) VALUES (?, ?, ?, ?)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&day_id)
            .bind(exercise_id)
            .bind(i as i64 + 1)
            .execute(&mut *tx)
            .await?;
        }
    }

    // Commit the transaction.
    tx.commit().await?;

    let verb = if replaced { "replaced" } else { "imported" };
    println!(
        "{} {} program `{}` ({} days)",
        "ok:".green().bold(),
        verb,
        program.name.bold(),
        program.day.len()
    );

    Ok(())
}

pub async fn handle(cmd: ProgramCmd, pool: &SqlitePool, cfg: &Config, fmt: OutputFmt) -> Result<()> {
    match cmd {
        ProgramCmd::Import { files, user } => {
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

            if files.is_empty() {
                println!("{} no files given", "error:".red().bold());
                return Ok(());
            }

            for file in &files {
                import_one(pool, &user_id, file).await?;
            }
        }

        ProgramCmd::List { user } => {
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

            let rows = sqlx::query(
                r#"
                SELECT p.name, p.created_at,
                       (SELECT COUNT(*) FROM program_days pd WHERE pd.program_id = p.id) AS days
                FROM programs p
                WHERE p.user_id = ?
                ORDER BY p.created_at, p.name
                "#,
            )
            .bind(&user_id)
            .fetch_all(pool)
            .await?;

            let progs: Vec<ProgJson> = rows
                .iter()
                .enumerate()
                .map(|(i, r)| ProgJson {
                    idx: i as i64 + 1,
                    name: r.get("name"),
                    created_at: r.get("created_at"),
                    days: r.get("days"),
                })
                .collect();

            emit(fmt, &progs, || {
                if progs.is_empty() {
                    println!("{}", "  (no programs found)".dimmed());
                    return;
                }

                println!("{}", "Programs:".cyan().bold());

                let idx_w = progs
                    .iter()
                    .map(|p| p.idx.to_string().len())
                    .max()
                    .unwrap_or(1);

                let mut left = Vec::<String>::new();
                let mut right = Vec::<String>::new();

                for p in &progs {
                    let idx = format!("{:>width$}", p.idx, width = idx_w).yellow();
                    left.push(format!(" {} • {} ({} days)", idx, p.name.bold(), p.days));
                    right.push(format!("added {}", &p.created_at[..10]).dimmed().to_string());
                }

                let pad = left.iter().map(|s| plain_len(s)).max().unwrap_or(0);
                for (l, r) in left.into_iter().zip(right) {
                    let hidden = l.len() - plain_len(&l);
                    println!("{:<width$} {} {}", l, "|".blue(), r, width = pad + hidden);
                }
            });
        }

        ProgramCmd::Show { program, user } => {
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

            let Some(program_id) = resolve_program(pool, &user_id, &program).await? else {
                println!("{} no such program `{}`", "error:".red().bold(), program);
                return Ok(());
            };

            let name: String = sqlx::query_scalar("SELECT name FROM programs WHERE id = ?")
                .bind(&program_id)
                .fetch_one(pool)
                .await?;

            let days = sqlx::query_as::<_, (String, i64, bool, bool)>(
                r#"
                SELECT id, day_number, is_rest_day, is_deload_week
                FROM program_days
                WHERE program_id = ?
                ORDER BY day_number
                "#,
            )
            .bind(&program_id)
            .fetch_all(pool)
            .await?;

            println!("{} {}", "Program:".cyan().bold(), name.bold());

            for (day_id, number, rest, deload) in &days {
                let exercises: Vec<String> = sqlx::query_scalar(
                    r#"
                    SELECT e.name
                    FROM day_exercises de
                    JOIN exercises e ON e.id = de.exercise_id
                    WHERE de.day_id = ?
                    ORDER BY de.order_index
                    "#,
                )
                .bind(day_id)
                .fetch_all(pool)
                .await?;

                let mut tags = Vec::new();
                if *rest {
                    tags.push("rest");
                }
                if *deload {
                    tags.push("deload");
                }
                let tags = if tags.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", tags.join(", ")).dimmed().to_string()
                };

                let listing = if exercises.is_empty() {
                    "—".dimmed().to_string()
                } else {
                    exercises.iter().join(", ")
                };

                println!(
                    "  {} {}{} {}",
                    "Day".yellow(),
                    number.to_string().yellow(),
                    tags,
                    listing
                );
            }

            if days.is_empty() {
                println!("{}", "  (no days)".dimmed());
            }
        }

        ProgramCmd::Delete { program, user } => {
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

            let Some(program_id) = resolve_program(pool, &user_id, &program).await? else {
                println!("{} no such program `{}`", "error:".red().bold(), program);
                return Ok(());
            };

            let name: String = sqlx::query_scalar("SELECT name FROM programs WHERE id = ?")
                .bind(&program_id)
                .fetch_one(pool)
                .await?;

            // Cascade removes days and their exercise rows.
            sqlx::query("DELETE FROM programs WHERE id = ?")
                .bind(&program_id)
                .execute(pool)
                .await?;

            println!("{} deleted program `{}`", "ok:".green().bold(), name);
        }
    }

    Ok(())
}
