use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use sqlx::{Row, SqlitePool};

use crate::{
    cli::UserCmd,
    types::{OutputFmt, emit},
    utils::plain_len,
};

#[derive(Serialize)]
struct UserJson {
    email: String,
    name: String,
    age: Option<i64>,
    gender: Option<String>,
    height: Option<f64>,
    weight: Option<f64>,
    experience_level: Option<String>,
    created_at: String,
}

pub async fn handle(cmd: UserCmd, pool: &SqlitePool, fmt: OutputFmt) -> Result<()> {
    match cmd {
        UserCmd::Add {
            email,
            name,
            age,
            gender,
            height,
            weight,
            level,
        } => {
            let res = sqlx::query(
                r#"
                INSERT INTO users
                (id, email, name, age, gender, height, weight, experience_level, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, datetime('now'), datetime('now'))
                "#,
            )
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(&email)
            .bind(&name)
            .bind(age)
            .bind(&gender)
            .bind(height)
            .bind(weight)
            .bind(&level)
            .execute(pool)
            .await;

            match res {
                Ok(info) if info.rows_affected() == 1 => {
                    println!("{} user `{}` added", "info:".blue().bold(), &email)
                }
                Ok(_) => println!("{} user `{}` was not inserted", "info:".blue().bold(), &email),
                Err(sqlx::Error::Database(db_err)) if db_err.code() == Some("2067".into()) => {
                    // 2067 = SQLITE_CONSTRAINT_UNIQUE
                    println!(
                        "{} a user with email `{}` already exists",
                        "warning:".yellow().bold(),
                        email
                    );
                }
                Err(e) => {
                    println!("{} {}", "error:".red().bold(), e.to_string().red());
                    return Err(e.into());
                }
            }
        }

        UserCmd::List => {
            let rows = sqlx::query(
                r#"
                SELECT email, COALESCE(name, '') AS name, age, gender, height, weight,
                       experience_level, created_at
                FROM users
                ORDER BY created_at
                "#,
            )
            .fetch_all(pool)
            .await?;

            let users: Vec<UserJson> = rows
                .iter()
                .map(|r| UserJson {
                    email: r.get("email"),
                    name: r.get("name"),
                    age: r.get("age"),
                    gender: r.get("gender"),
                    height: r.get("height"),
                    weight: r.get("weight"),
                    experience_level: r.get("experience_level"),
                    created_at: r.get("created_at"),
                })
                .collect();

            emit(fmt, &users, || {
                println!("{}", "Users:".cyan().bold());

                let mut left = Vec::<String>::new();
                let mut right = Vec::<String>::new();

                for (i, u) in users.iter().enumerate() {
                    let idx = format!("{}", i + 1).yellow();
                    let name = if u.name.is_empty() {
                        String::new()
                    } else {
                        format!("– {}", u.name).dimmed().to_string()
                    };
                    left.push(format!(" {} • {} {}", idx, u.email.bold(), name));
                    right.push(format!("added {}", &u.created_at[..10]).dimmed().to_string());
                }

                let pad = left.iter().map(|s| plain_len(s)).max().unwrap_or(0);
                for (l, r) in left.into_iter().zip(right) {
                    let hidden = l.len() - plain_len(&l);
                    println!("{:<width$} {} {}", l, "|".blue(), r, width = pad + hidden);
                }

                if users.is_empty() {
                    println!("{}", "  (no users found)".dimmed());
                }
            });
        }

        UserCmd::Show { email } => {
            let row = sqlx::query(
                r#"
                SELECT email, COALESCE(name, '') AS name, age, gender, height, weight,
                       experience_level, created_at
                FROM users
                WHERE email = ?
                "#,
            )
            .bind(&email)
            .fetch_optional(pool)
            .await?;

            let Some(row) = row else {
                println!("{} no user with email `{}`", "error:".red().bold(), email);
                return Ok(());
            };

            let user = UserJson {
                email: row.get("email"),
                name: row.get("name"),
                age: row.get("age"),
                gender: row.get("gender"),
                height: row.get("height"),
                weight: row.get("weight"),
                experience_level: row.get("experience_level"),
                created_at: row.get("created_at"),
            };

            let workout_count: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM workouts w JOIN users u ON u.id = w.user_id WHERE u.email = ?",
            )
            .bind(&email)
            .fetch_one(pool)
            .await?;

            emit(fmt, &user, || {
                println!("{} {}", "User:".cyan().bold(), user.email.bold());
                if !user.name.is_empty() {
                    println!("  {} {}", "name:".dimmed(), user.name);
                }
                if let Some(age) = user.age {
                    println!("  {} {}", "age:".dimmed(), age);
                }
                if let Some(g) = &user.gender {
                    println!("  {} {}", "gender:".dimmed(), g);
                }
                if let Some(h) = user.height {
                    println!("  {} {} cm", "height:".dimmed(), h);
                }
                if let Some(w) = user.weight {
                    println!("  {} {} kg", "weight:".dimmed(), w);
                }
                if let Some(lvl) = &user.experience_level {
                    println!("  {} {}", "level:".dimmed(), lvl);
                }
                println!("  {} {}", "member since:".dimmed(), &user.created_at[..10]);
                println!("  {} {}", "workouts logged:".dimmed(), workout_count);
            });
        }

        UserCmd::Update {
            email,
            name,
            age,
            gender,
            height,
            weight,
            level,
        } => {
            // COALESCE keeps any field the caller did not pass.
            let res = sqlx::query(
                r#"
                UPDATE users SET
                    name             = COALESCE(?1, name),
                    age              = COALESCE(?2, age),
                    gender           = COALESCE(?3, gender),
                    height           = COALESCE(?4, height),
                    weight           = COALESCE(?5, weight),
                    experience_level = COALESCE(?6, experience_level),
                    updated_at       = datetime('now')
                WHERE email = ?7
                "#,
            )
            .bind(&name)
            .bind(age)
            .bind(&gender)
            .bind(height)
            .bind(weight)
            .bind(&level)
            .bind(&email)
            .execute(pool)
            .await?;

            if res.rows_affected() == 1 {
                println!("{} updated user `{}`", "ok:".green().bold(), email);
            } else {
                println!("{} no user with email `{}`", "error:".red().bold(), email);
            }
        }
    }

    Ok(())
}
