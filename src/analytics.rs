//! Workout analytics aggregation.
//!
//! A single read-and-compute pass: fetch every workout of a user inside a
//! look-back window, then fold all sets into summary totals, per-exercise
//! records and stats, and a daily workout-count series. No state survives
//! between calls; each invocation recomputes from the store.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Duration, Months, NaiveDate, Utc};
use itertools::Itertools;
use serde::Serialize;

use crate::models::{Exercise, Workout};

/// Summary totals deliberately count *every* set, completed or not.
/// Per-exercise records and stats are completed-only; the summary keeps the
/// historical all-sets behavior.
pub const SUMMARY_VOLUME_INCLUDES_INCOMPLETE: bool = true;

/// Look-back window selector bounding which workouts are aggregated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Period {
    Week,
    Month,
    Year,
}

impl Period {
    /// Unrecognized values fall back to `Week` without erroring.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "month" => Self::Month,
            "year" => Self::Year,
            _ => Self::Week,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    /// Window bounds `[now - period, now]`, both inclusive. Month and year
    /// step back by calendar units, not fixed day counts.
    pub fn window(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = match self {
            Self::Week => now - Duration::days(7),
            Self::Month => now - Months::new(1),
            Self::Year => now - Months::new(12),
        };

        (start, now)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_workouts: i64,
    pub total_sets: i64,
    pub completed_sets: i64,
    /// Percentage 0-100; 0 when there are no sets at all.
    pub completion_rate: f64,
    pub total_volume: f64,
    #[serde(rename = "averageRPE")]
    pub average_rpe: f64,
}

/// The single best completed set for an exercise: highest `weight × reps`
/// volume, ties broken by higher weight.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalRecord {
    pub exercise: Exercise,
    pub pr_weight: f64,
    pub reps: i64,
    pub volume: f64,
}

/// Per-exercise aggregates over completed sets only.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseStats {
    pub exercise: Exercise,
    pub total_sets: i64,
    pub completed_sets: i64,
    pub total_volume: f64,
    pub avg_weight: f64,
    pub avg_reps: f64,
    pub max_weight: f64,
    #[serde(rename = "avgRPE")]
    pub avg_rpe: f64,
    pub workout_count: i64,
}

/// One point of the daily workout-count series.
#[derive(Debug, Clone, Serialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub summary: Summary,
    pub personal_records: Vec<PersonalRecord>,
    pub detailed_exercises: Vec<ExerciseStats>,
    pub chart_data: Vec<ChartPoint>,
    pub period: String,
}

/// Round to one decimal for displayed averages.
fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 { 0.0 } else { num / den }
}

#[derive(Default)]
struct ExerciseAcc {
    total_sets: i64,
    completed_sets: i64,
    volume: f64,
    reps: i64,
    max_weight: f64,
    rpe_sum: f64,
    rpe_count: i64,
    workouts: HashSet<String>,
    // (volume, weight, reps) of the best completed set so far.
    best: Option<(f64, f64, i64)>,
}

/// Fold the fetched workouts into a complete analytics result.
///
/// Pure and idempotent: identical input always yields an identical result.
/// Sets whose exercise reference is unresolved still count toward the
/// summary totals but are excluded from records and per-exercise stats.
pub fn aggregate(workouts: &[Workout], period: Period) -> Analytics {
    let mut total_sets = 0i64;
    let mut completed_sets = 0i64;
    let mut total_volume = 0.0f64;
    let mut rpe_sum = 0.0f64;
    let mut rpe_count = 0i64;

    let mut by_exercise: HashMap<String, (Exercise, ExerciseAcc)> = HashMap::new();
    let mut first_seen: Vec<String> = Vec::new();
    let mut by_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();

    for workout in workouts {
        *by_day.entry(workout.date.date_naive()).or_default() += 1;

        for set in &workout.sets {
            total_sets += 1;
            if set.completed {
                completed_sets += 1;
            }

            // All sets count here, incomplete included.
            total_volume += set.volume();

            if let Some(rpe) = set.rpe
                && rpe > 0.0
            {
                rpe_sum += rpe;
                rpe_count += 1;
            }

            let Some(exercise) = &set.exercise else {
                // Unresolved reference: summary-only contribution.
                continue;
            };

            let (_, acc) = by_exercise
                .entry(exercise.id.clone())
                .or_insert_with(|| {
                    first_seen.push(exercise.id.clone());
                    (exercise.clone(), ExerciseAcc::default())
                });

            acc.total_sets += 1;

            if !set.completed {
                continue;
            }

            acc.completed_sets += 1;
            acc.volume += set.volume();
            acc.reps += set.reps;
            acc.max_weight = acc.max_weight.max(set.weight);
            acc.workouts.insert(workout.id.clone());

            if let Some(rpe) = set.rpe
                && rpe > 0.0
            {
                acc.rpe_sum += rpe;
                acc.rpe_count += 1;
            }

            let candidate = (set.volume(), set.weight, set.reps);
            acc.best = match acc.best {
                None => Some(candidate),
                Some((best_vol, best_weight, _))
                    if candidate.0 > best_vol
                        || (candidate.0 == best_vol && candidate.1 > best_weight) =>
                {
                    Some(candidate)
                }
                other => other,
            };
        }
    }

    let summary = Summary {
        total_workouts: workouts.len() as i64,
        total_sets,
        completed_sets,
        completion_rate: ratio(completed_sets as f64, total_sets as f64) * 100.0,
        total_volume,
        average_rpe: round1(ratio(rpe_sum, rpe_count as f64)),
    };

    // Records keep first-encounter order; consumers may re-sort for display.
    let personal_records = first_seen
        .iter()
        .filter_map(|id| {
            let (exercise, acc) = &by_exercise[id];
            acc.best.map(|(volume, weight, reps)| PersonalRecord {
                exercise: exercise.clone(),
                pr_weight: weight,
                reps,
                volume,
            })
        })
        .collect();

    let detailed_exercises = first_seen
        .iter()
        .map(|id| {
            let (exercise, acc) = &by_exercise[id];
            ExerciseStats {
                exercise: exercise.clone(),
                total_sets: acc.total_sets,
                completed_sets: acc.completed_sets,
                total_volume: acc.volume,
                avg_weight: round1(ratio(acc.volume, acc.reps as f64)),
                avg_reps: round1(ratio(acc.reps as f64, acc.completed_sets as f64)),
                max_weight: acc.max_weight,
                avg_rpe: round1(ratio(acc.rpe_sum, acc.rpe_count as f64)),
                workout_count: acc.workouts.len() as i64,
            }
        })
        .sorted_by(|a, b| b.total_volume.total_cmp(&a.total_volume))
        .collect();

    let chart_data = by_day
        .into_iter()
        .map(|(date, count)| ChartPoint { date, count })
        .collect();

    Analytics {
        summary,
        personal_records,
        detailed_exercises,
        chart_data,
        period: period.label().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkoutSet;
    use crate::types::MuscleGroup;
    use chrono::TimeZone;

    fn exercise(id: &str, name: &str) -> Exercise {
        Exercise {
            id: id.to_string(),
            name: name.to_string(),
            mn_name: name.to_string(),
            muscle_group: MuscleGroup::Chest,
            equipment: None,
            kind: None,
        }
    }

    fn set(ex: Option<Exercise>, reps: i64, weight: f64, rpe: Option<f64>, completed: bool) -> WorkoutSet {
        WorkoutSet {
            id: format!("set-{}-{}", reps, weight),
            reps,
            weight,
            rpe,
            completed,
            order_index: 0,
            exercise: ex,
        }
    }

    fn workout(id: &str, date: DateTime<Utc>, sets: Vec<WorkoutSet>) -> Workout {
        Workout {
            id: id.to_string(),
            user_id: "user-1".to_string(),
            date,
            notes: None,
            completed: true,
            sets,
        }
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, d, 10, 0, 0).unwrap()
    }

    #[test]
    fn empty_store_yields_zero_result() {
        let out = aggregate(&[], Period::Week);
        assert_eq!(out.summary.total_workouts, 0);
        assert_eq!(out.summary.total_sets, 0);
        assert_eq!(out.summary.completion_rate, 0.0);
        assert_eq!(out.summary.total_volume, 0.0);
        assert_eq!(out.summary.average_rpe, 0.0);
        assert!(out.personal_records.is_empty());
        assert!(out.detailed_exercises.is_empty());
        assert!(out.chart_data.is_empty());
        assert_eq!(out.period, "week");
    }

    #[test]
    fn bench_press_scenario_matches_hand_computation() {
        let bench = exercise("ex-1", "Bench Press");
        let w = workout(
            "w-1",
            day(1),
            vec![
                set(Some(bench.clone()), 10, 50.0, Some(8.0), true),
                set(Some(bench.clone()), 8, 60.0, None, true),
                set(Some(bench.clone()), 5, 40.0, None, false),
            ],
        );

        let out = aggregate(&[w], Period::Week);
        assert_eq!(out.summary.total_sets, 3);
        assert_eq!(out.summary.completed_sets, 2);
        // Incomplete sets still count: 500 + 480 + 200.
        assert_eq!(out.summary.total_volume, 1180.0);
        assert!((out.summary.completion_rate - 66.666).abs() < 0.01);
        assert_eq!(out.summary.average_rpe, 8.0);

        // Set 1 (10×50 = 500) beats set 2 (8×60 = 480).
        assert_eq!(out.personal_records.len(), 1);
        assert_eq!(out.personal_records[0].pr_weight, 50.0);
        assert_eq!(out.personal_records[0].volume, 500.0);

        let stats = &out.detailed_exercises[0];
        assert_eq!(stats.total_sets, 3);
        assert_eq!(stats.completed_sets, 2);
        assert_eq!(stats.total_volume, 980.0);
        // 980 volume over 18 completed reps.
        assert_eq!(stats.avg_weight, 54.4);
        assert_eq!(stats.avg_reps, 9.0);
        assert_eq!(stats.max_weight, 60.0);
        assert_eq!(stats.workout_count, 1);
    }

    #[test]
    fn incomplete_sets_never_reach_records_or_stats() {
        let squat = exercise("ex-2", "Squat");
        let w = workout(
            "w-1",
            day(2),
            vec![
                set(Some(squat.clone()), 5, 100.0, Some(9.0), true),
                // Heavier but not completed: must not become the PR.
                set(Some(squat.clone()), 5, 500.0, Some(10.0), false),
            ],
        );

        let out = aggregate(&[w], Period::Week);
        assert_eq!(out.personal_records[0].pr_weight, 100.0);

        let stats = &out.detailed_exercises[0];
        assert_eq!(stats.total_sets, 2);
        assert_eq!(stats.completed_sets, 1);
        assert_eq!(stats.total_volume, 500.0);
        assert_eq!(stats.max_weight, 100.0);
        assert_eq!(stats.avg_rpe, 9.0);
    }

    #[test]
    fn pr_tie_breaks_on_higher_weight() {
        let dead = exercise("ex-3", "Deadlift");
        let w = workout(
            "w-1",
            day(3),
            vec![
                // Both 500 volume; the 100 kg set wins.
                set(Some(dead.clone()), 10, 50.0, None, true),
                set(Some(dead.clone()), 5, 100.0, None, true),
            ],
        );

        let out = aggregate(&[w], Period::Week);
        assert_eq!(out.personal_records[0].pr_weight, 100.0);
        assert_eq!(out.personal_records[0].reps, 5);
    }

    #[test]
    fn exercise_with_no_completed_sets_has_zero_averages() {
        let row = exercise("ex-4", "Bent Over Row");
        let w = workout("w-1", day(4), vec![set(Some(row), 8, 60.0, Some(7.0), false)]);

        let out = aggregate(&[w], Period::Week);
        assert!(out.personal_records.is_empty());

        let stats = &out.detailed_exercises[0];
        assert_eq!(stats.total_sets, 1);
        assert_eq!(stats.completed_sets, 0);
        assert_eq!(stats.avg_weight, 0.0);
        assert_eq!(stats.avg_reps, 0.0);
        assert_eq!(stats.avg_rpe, 0.0);
        assert_eq!(stats.workout_count, 0);
    }

    #[test]
    fn unresolved_exercise_counts_toward_summary_only() {
        let w = workout(
            "w-1",
            day(5),
            vec![set(None, 10, 30.0, Some(6.0), true)],
        );

        let out = aggregate(&[w], Period::Week);
        assert_eq!(out.summary.total_sets, 1);
        assert_eq!(out.summary.completed_sets, 1);
        assert_eq!(out.summary.total_volume, 300.0);
        assert_eq!(out.summary.average_rpe, 6.0);
        assert!(out.personal_records.is_empty());
        assert!(out.detailed_exercises.is_empty());
    }

    #[test]
    fn zero_rpe_is_treated_as_unset() {
        let bench = exercise("ex-1", "Bench Press");
        let w = workout(
            "w-1",
            day(6),
            vec![
                set(Some(bench.clone()), 10, 50.0, Some(0.0), true),
                set(Some(bench.clone()), 10, 50.0, Some(8.0), true),
            ],
        );

        let out = aggregate(&[w], Period::Week);
        assert_eq!(out.summary.average_rpe, 8.0);
        assert_eq!(out.detailed_exercises[0].avg_rpe, 8.0);
    }

    #[test]
    fn chart_groups_by_calendar_date_ascending() {
        let bench = exercise("ex-1", "Bench Press");
        let workouts = vec![
            workout("w-3", day(9), vec![set(Some(bench.clone()), 5, 50.0, None, true)]),
            workout("w-1", day(7), vec![set(Some(bench.clone()), 5, 50.0, None, true)]),
            // Same calendar date as w-3, different time of day.
            Workout {
                date: Utc.with_ymd_and_hms(2026, 8, 9, 20, 30, 0).unwrap(),
                ..workout("w-4", day(9), vec![])
            },
            workout("w-2", day(8), vec![]),
        ];

        let out = aggregate(&workouts, Period::Month);
        let dates: Vec<NaiveDate> = out.chart_data.iter().map(|p| p.date).collect();
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(out.chart_data.len(), 3);

        let nine = NaiveDate::from_ymd_opt(2026, 8, 9).unwrap();
        let point = out.chart_data.iter().find(|p| p.date == nine).unwrap();
        assert_eq!(point.count, 2);
    }

    #[test]
    fn detailed_stats_sort_by_volume_descending() {
        let bench = exercise("ex-1", "Bench Press");
        let squat = exercise("ex-2", "Squat");
        let w = workout(
            "w-1",
            day(10),
            vec![
                set(Some(bench.clone()), 5, 20.0, None, true),
                set(Some(squat.clone()), 5, 200.0, None, true),
            ],
        );

        let out = aggregate(&[w], Period::Week);
        assert_eq!(out.detailed_exercises[0].exercise.id, "ex-2");
        assert_eq!(out.detailed_exercises[1].exercise.id, "ex-1");
    }

    #[test]
    fn aggregation_is_idempotent() {
        let bench = exercise("ex-1", "Bench Press");
        let workouts = vec![workout(
            "w-1",
            day(11),
            vec![
                set(Some(bench.clone()), 10, 50.0, Some(8.0), true),
                set(Some(bench.clone()), 8, 60.0, Some(9.0), false),
            ],
        )];

        let a = serde_json::to_string(&aggregate(&workouts, Period::Year)).unwrap();
        let b = serde_json::to_string(&aggregate(&workouts, Period::Year)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn unrecognized_period_falls_back_to_week() {
        assert_eq!(Period::parse("fortnight"), Period::Week);
        assert_eq!(Period::parse(""), Period::Week);
        assert_eq!(Period::parse("MONTH"), Period::Month);
        assert_eq!(Period::parse("Year"), Period::Year);
    }

    #[test]
    fn window_bounds_match_period() {
        let now = Utc.with_ymd_and_hms(2026, 8, 8, 12, 0, 0).unwrap();

        let (start, end) = Period::Week.window(now);
        assert_eq!(end, now);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap());

        let (start, _) = Period::Month.window(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 7, 8, 12, 0, 0).unwrap());

        let (start, _) = Period::Year.window(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 8, 8, 12, 0, 0).unwrap());
    }

    #[test]
    fn rounding_is_one_decimal() {
        assert_eq!(round1(7.25), 7.3);
        assert_eq!(round1(7.24), 7.2);
        assert_eq!(round1(0.0), 0.0);
    }
}
