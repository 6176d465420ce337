use std::{
    collections::{BTreeMap, HashSet},
    fmt::Display,
    path::Path,
};

use anyhow::{Context, Result};
use clap::ValueEnum;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use sqlx::prelude::Type;
use strsim::jaro_winkler;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize, Type)]
#[sqlx(type_name = "TEXT", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum MuscleGroup {
    Chest,
    Back,
    Legs,
    Shoulders,
    Arms,
    Core,
    FullBody,
    Cardio,
}

impl Display for MuscleGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Chest => "chest",
            Self::Back => "back",
            Self::Legs => "legs",
            Self::Shoulders => "shoulders",
            Self::Arms => "arms",
            Self::Core => "core",
            Self::FullBody => "full-body",
            Self::Cardio => "cardio",
        };

        write!(f, "{}", s)
    }
}

/// Strength vs. cardio tag on an exercise. Optional in the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize, Type)]
#[sqlx(type_name = "TEXT", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ExerciseKind {
    Strength,
    Cardio,
}

impl Display for ExerciseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strength => write!(f, "strength"),
            Self::Cardio => write!(f, "cardio"),
        }
    }
}

pub static ALLOWED_MUSCLE_GROUPS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "chest",
        "back",
        "legs",
        "shoulders",
        "arms",
        "core",
        "full-body",
        "cardio",
    ])
});

/// Returns the canonical muscle group or `None` if not allowed.
/// `"Full Body"`, `"FULL-BODY"` and `"full-body"` all normalize the same way.
pub fn canonical_muscle_group<S: AsRef<str>>(m: S) -> Option<MuscleGroup> {
    let raw = m.as_ref();
    assert!(raw.chars().all(|c| !c.is_control()), "received control chars in muscle group: {raw:?}");

    let norm = raw.trim().to_ascii_lowercase().replace([' ', '_'], "-");
    match norm.as_str() {
        "chest" => Some(MuscleGroup::Chest),
        "back" => Some(MuscleGroup::Back),
        "legs" => Some(MuscleGroup::Legs),
        "shoulders" => Some(MuscleGroup::Shoulders),
        "arms" => Some(MuscleGroup::Arms),
        "core" => Some(MuscleGroup::Core),
        "full-body" => Some(MuscleGroup::FullBody),
        "cardio" => Some(MuscleGroup::Cardio),
        _ => None,
    }
}

/// Return the closest allowed muscle group for `input`
/// if similarity ≥ 0.80 *and* clearly better than the runner-up.
/// Otherwise return `None` (no suggestion shown).
pub fn best_muscle_suggestion(input: &str) -> Option<&'static str> {
    assert!(!ALLOWED_MUSCLE_GROUPS.is_empty(), "ALLOWED_MUSCLE_GROUPS must contain at least one entry");

    let inp = input.trim().to_ascii_lowercase();
    if inp.is_empty() {
        return None;
    }

    // Collect (group, score) pairs.
    let mut scores: Vec<(&'static str, f64)> = ALLOWED_MUSCLE_GROUPS
        .iter()
        .copied()
        .map(|m| (m, jaro_winkler(&inp, m)))
        .collect();

    // Highest score first.
    scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());

    let (best, best_score) = scores[0];
    let second_score = scores.get(1).map(|(_, s)| *s).unwrap_or(0.0);

    const MIN_SCORE: f64 = 0.80;
    const GAP: f64 = 0.02;

    if best_score >= MIN_SCORE && best_score - second_score >= GAP {
        Some(best)
    } else {
        None
    }
}

#[derive(Deserialize)]
pub struct ExerciseDef {
    pub name: String,
    pub mn_name: Option<String>,
    pub muscle_group: String,
    pub equipment: Option<String>,
    pub kind: Option<String>,
}

#[derive(Deserialize)]
pub struct ExerciseImport {
    pub exercise: Vec<ExerciseDef>,
}

//
// Output format
//

/// Whether a command renders colorful text or machine-readable JSON.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFmt {
    Text,
    Json,
}

/// Emit `val` as pretty JSON, or run the text renderer.
pub fn emit<T: Serialize>(fmt: OutputFmt, val: &T, text: impl FnOnce()) {
    match fmt {
        OutputFmt::Json => match serde_json::to_string_pretty(val) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("error: failed to serialize output: {}", e),
        },
        OutputFmt::Text => text(),
    }
}

//
// Config
//

/// Flat key-value config stored as TOML. Recognized keys are `user`
/// (default user email) and `db-path`; unknown keys are kept as-is.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub map: BTreeMap<String, String>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|s| s.as_str())
    }
}

/// Path of the ironlog config file under the platform config directory.
pub fn config_path() -> Result<std::path::PathBuf> {
    dirs::config_dir()
        .map(|d| d.join("ironlog").join("config"))
        .context("Could not determine config directory")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn muscle_group_normalizes_case_and_spaces() {
        assert_eq!(canonical_muscle_group("Chest"), Some(MuscleGroup::Chest));
        assert_eq!(canonical_muscle_group("FULL BODY"), Some(MuscleGroup::FullBody));
        assert_eq!(canonical_muscle_group("full_body"), Some(MuscleGroup::FullBody));
        assert_eq!(canonical_muscle_group("quads"), None);
    }

    #[test]
    fn near_miss_gets_a_suggestion() {
        assert_eq!(best_muscle_suggestion("shoulder"), Some("shoulders"));
        // Garbage should not produce a confident suggestion.
        assert_eq!(best_muscle_suggestion("xyzzy"), None);
    }

    #[test]
    fn config_round_trips_flat_keys() {
        let mut cfg = Config::default();
        cfg.map.insert("user".into(), "ana@example.com".into());
        cfg.map.insert("db-path".into(), "/tmp/iron.db".into());

        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let back: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(back.get("user"), Some("ana@example.com"));
        assert_eq!(back.get("db-path"), Some("/tmp/iron.db"));
    }
}
