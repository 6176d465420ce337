use std::fmt::Write as _;

use anyhow::{Context, Result};
use chrono::Utc;
use colored::Colorize;
use sqlx::SqlitePool;

use crate::{
    analytics::{Analytics, Period, aggregate},
    store,
    types::Config,
    utils::resolve_user_email,
};

fn render_markdown(email: &str, name: Option<&str>, level: Option<&str>, analytics: &Analytics) -> String {
    let mut out = String::new();
    let s = &analytics.summary;

    // Writing into a String cannot fail; the results are ignored on purpose.
    let _ = writeln!(out, "# Training Report");
    let _ = writeln!(out);

    match name {
        Some(name) if !name.is_empty() => {
            let _ = writeln!(out, "**User:** {} ({})", name, email);
        }
        _ => {
            let _ = writeln!(out, "**User:** {}", email);
        }
    }
    if let Some(level) = level {
        let _ = writeln!(out, "**Experience:** {}", level);
    }
    let _ = writeln!(out, "**Period:** last {}", analytics.period);
    let _ = writeln!(out, "**Generated:** {}", Utc::now().format("%Y-%m-%d %H:%M UTC"));
    let _ = writeln!(out);

    let _ = writeln!(out, "## Summary");
    let _ = writeln!(out);
    let _ = writeln!(out, "| Metric | Value |");
    let _ = writeln!(out, "| --- | --- |");
    let _ = writeln!(out, "| Workouts | {} |", s.total_workouts);
    let _ = writeln!(out, "| Total sets | {} |", s.total_sets);
    let _ = writeln!(out, "| Completed sets | {} |", s.completed_sets);
    let _ = writeln!(out, "| Completion rate | {:.1}% |", s.completion_rate);
    let _ = writeln!(out, "| Total volume | {:.0} kg |", s.total_volume);
    let _ = writeln!(out, "| Average RPE | {} |", s.average_rpe);
    let _ = writeln!(out);

    if !analytics.personal_records.is_empty() {
        let _ = writeln!(out, "## Personal Records");
        let _ = writeln!(out);
        let _ = writeln!(out, "| Exercise | Muscle group | Best set | Volume |");
        let _ = writeln!(out, "| --- | --- | --- | --- |");
        for pr in &analytics.personal_records {
            let _ = writeln!(
                out,
                "| {} | {} | {} kg × {} | {:.0} kg |",
                pr.exercise.name, pr.exercise.muscle_group, pr.pr_weight, pr.reps, pr.volume
            );
        }
        let _ = writeln!(out);
    }

    if !analytics.detailed_exercises.is_empty() {
        let _ = writeln!(out, "## Exercise Breakdown");
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "| Exercise | Sets (done/total) | Volume | Avg weight | Avg reps | Max weight | Avg RPE | Workouts |"
        );
        let _ = writeln!(out, "| --- | --- | --- | --- | --- | --- | --- | --- |");
        for st in &analytics.detailed_exercises {
            let _ = writeln!(
                out,
                "| {} | {}/{} | {:.0} kg | {} kg | {} | {} kg | {} | {} |",
                st.exercise.name,
                st.completed_sets,
                st.total_sets,
                st.total_volume,
                st.avg_weight,
                st.avg_reps,
                st.max_weight,
                st.avg_rpe,
                st.workout_count
            );
        }
        let _ = writeln!(out);
    }

    if !analytics.chart_data.is_empty() {
        let _ = writeln!(out, "## Daily Activity");
        let _ = writeln!(out);
        let _ = writeln!(out, "| Date | Workouts |");
        let _ = writeln!(out, "| --- | --- |");
        for point in &analytics.chart_data {
            let _ = writeln!(out, "| {} | {} |", point.date, point.count);
        }
        let _ = writeln!(out);
    }

    if s.total_workouts == 0 {
        let _ = writeln!(out, "_No workouts logged in this period._");
    }

    out
}

pub async fn handle(
    user: Option<String>,
    period: &str,
    out: Option<String>,
    pool: &SqlitePool,
    cfg: &Config,
) -> Result<()> {
    let email = match resolve_user_email(user, cfg) {
        Ok(email) => email,
        Err(e) => {
            println!("{} {}", "error:".red().bold(), e);
            return Ok(());
        }
    };

    let profile: Option<(String, Option<String>, Option<String>)> = sqlx::query_as(
        "SELECT id, name, experience_level FROM users WHERE email = ?",
    )
    .bind(&email)
    .fetch_optional(pool)
    .await?;

    let Some((user_id, name, level)) = profile else {
        println!("{} no user with email `{}`", "error:".red().bold(), email);
        return Ok(());
    };

    let period = Period::parse(period);
    let (start, end) = period.window(Utc::now());

    let workouts = store::list_workouts_in_range(pool, &user_id, start, end).await?;
    let analytics = aggregate(&workouts, period);

    let markdown = render_markdown(&email, name.as_deref(), level.as_deref(), &analytics);

    let path = out.unwrap_or_else(|| "ironlog-report.md".to_string());
    tokio::fs::write(&path, markdown)
        .await
        .with_context(|| format!("Failed to write report to {}", path))?;

    println!("{} wrote report to {}", "ok:".green().bold(), path.bold());

    Ok(())
}
