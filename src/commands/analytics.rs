use anyhow::Result;
use chrono::{NaiveDate, Utc};
use colored::Colorize;
use sqlx::SqlitePool;

use crate::{
    analytics::{Analytics, Period, aggregate},
    store,
    types::{Config, OutputFmt, emit},
    utils::resolve_user_email,
};

/// Plot a (date, value) series as a dotted ASCII line chart sized to the
/// terminal. Returns the rendered lines.
fn create_ascii_graph(data: &[(NaiveDate, f32)], width: usize, height: usize, title: &str) -> Vec<String> {
    if data.is_empty() {
        return vec!["No data available".to_string()];
    }

    let min_value = data.iter().map(|(_, v)| *v).fold(f32::INFINITY, f32::min);
    let max_value = data.iter().map(|(_, v)| *v).fold(f32::NEG_INFINITY, f32::max);
    let range = max_value - min_value;

    if range == 0.0 {
        return vec![format!("Flat series: {} on every day shown", min_value)];
    }

    let mut grid = vec![vec![' '; width]; height];

    // Place the points, then connect neighbours with interpolated dots.
    for i in 0..data.len() {
        let (_, value) = data[i];
        let x = if data.len() == 1 {
            0
        } else {
            (i as f32 / (data.len() - 1) as f32 * (width - 1) as f32) as usize
        };
        let y = ((value - min_value) / range * (height - 1) as f32) as usize;
        let y = height - 1 - y; // Flip the y-axis.

        if y < height && x < width {
            grid[y][x] = '●';
        }

        if i > 0 {
            let prev_x = ((i - 1) as f32 / (data.len() - 1) as f32 * (width - 1) as f32) as usize;
            let prev_y = ((data[i - 1].1 - min_value) / range * (height - 1) as f32) as usize;
            let prev_y = height - 1 - prev_y;

            let dx = x as isize - prev_x as isize;
            let dy = y as isize - prev_y as isize;
            let steps = dx.abs().max(dy.abs());

            for step in 1..steps {
                let px = prev_x as isize + (dx * step / steps);
                let py = prev_y as isize + (dy * step / steps);

                if px >= 0 && px < width as isize && py >= 0 && py < height as isize {
                    let px = px as usize;
                    let py = py as usize;
                    if grid[py][px] == ' ' {
                        grid[py][px] = '·';
                    }
                }
            }
        }
    }

    let mut result = Vec::new();
    let step = range / (height - 1) as f32;

    result.push(format!("\n{}", title.bold()));
    result.push("─".repeat(width + 7));

    for (i, row) in grid.iter().enumerate() {
        let value = min_value + step * (height - 1 - i) as f32;
        result.push(format!("{:4.0} │{}", value, row.iter().collect::<String>()));
    }

    result.push(format!("     └{}", "─".repeat(width)));

    let first_date = data.first().unwrap().0.format("%Y-%m-%d").to_string();
    let last_date = data.last().unwrap().0.format("%Y-%m-%d").to_string();
    result.push(format!("     {}  {}", first_date, last_date));

    result
}

fn print_text(analytics: &Analytics, graph: bool) {
    let s = &analytics.summary;

    println!(
        "{} (last {})",
        "Training Analytics".cyan().bold(),
        analytics.period
    );
    println!();
    println!("{}: {}", "Workouts".cyan().bold(), s.total_workouts);
    println!(
        "{}: {} ({} completed, {:.1}%)",
        "Total sets".cyan().bold(),
        s.total_sets,
        s.completed_sets,
        s.completion_rate
    );
    println!("{}: {:.0} kg", "Total volume".cyan().bold(), s.total_volume);
    if s.average_rpe > 0.0 {
        println!("{}: {}", "Average RPE".cyan().bold(), s.average_rpe);
    }

    if !analytics.personal_records.is_empty() {
        println!();
        println!("{}", "Personal records:".cyan().bold());
        for pr in &analytics.personal_records {
            println!(
                "  {} — {}kg × {} ({:.0} kg volume)",
                pr.exercise.name.bold(),
                pr.pr_weight,
                pr.reps,
                pr.volume
            );
        }
    }

    if !analytics.detailed_exercises.is_empty() {
        println!();
        println!("{}", "Exercise breakdown:".cyan().bold());
        for stats in &analytics.detailed_exercises {
            let rpe = if stats.avg_rpe > 0.0 {
                format!("  RPE {}", stats.avg_rpe)
            } else {
                String::new()
            };
            println!(
                "  {} — {}/{} sets, {:.0} kg, avg {}kg × {}, max {}kg{} ({} workouts)",
                stats.exercise.name.bold(),
                stats.completed_sets,
                stats.total_sets,
                stats.total_volume,
                stats.avg_weight,
                stats.avg_reps,
                stats.max_weight,
                rpe.dimmed(),
                stats.workout_count
            );
        }
    }

    if analytics.chart_data.is_empty() {
        if s.total_workouts == 0 {
            println!();
            println!("{}", "  (no workouts in this period)".dimmed());
        }
        return;
    }

    if graph {
        let series: Vec<(NaiveDate, f32)> = analytics
            .chart_data
            .iter()
            .map(|p| (p.date, p.count as f32))
            .collect();

        let (term_width, term_height) = term_size::dimensions().unwrap_or((80, 24));
        let width = (term_width / 2).min(60);
        let height = (term_height / 2).min(15);

        for line in create_ascii_graph(&series, width, height, "Workouts per day") {
            println!("{}", line);
        }
    }
}

pub async fn handle(
    user: Option<String>,
    period: &str,
    graph: bool,
    pool: &SqlitePool,
    cfg: &Config,
    fmt: OutputFmt,
) -> Result<()> {
    // Caller error, checked before any store access.
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

    let period = Period::parse(period);
    let (start, end) = period.window(Utc::now());

    // Store failures propagate as-is; there is no retry and no partial
    // result.
    let workouts = store::list_workouts_in_range(pool, &user_id, start, end).await?;
    let analytics = aggregate(&workouts, period);

    emit(fmt, &analytics, || print_text(&analytics, graph));

    Ok(())
}
