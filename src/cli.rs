use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ironlog", version, about = "CLI fitness tracker")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Emit machine-readable JSON instead of colorful text.
    #[arg(global = true, long)]
    pub json: bool,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// User profiles
    #[command(subcommand, visible_alias = "u")]
    User(UserCmd),

    /// Exercise catalog
    #[command(subcommand, visible_alias = "ex")]
    Exercise(ExerciseCmd),

    /// Workout logging
    #[command(subcommand, visible_alias = "w")]
    Workout(WorkoutCmd),

    /// Program management
    #[command(subcommand, visible_alias = "p")]
    Program(ProgramCmd),

    /// Aggregate training analytics for a look-back window
    #[command(visible_alias = "a")]
    Analytics {
        /// User email (defaults to the `user` config key)
        #[arg(short, long)]
        user: Option<String>,

        /// Look-back window: week, month or year
        #[arg(short, long, default_value = "week")]
        period: String,

        /// Show an ASCII chart of daily workout counts
        #[arg(short, long)]
        graph: bool,
    },

    /// Write a Markdown training report
    Report {
        /// User email (defaults to the `user` config key)
        #[arg(short, long)]
        user: Option<String>,

        /// Look-back window: week, month or year
        #[arg(short, long, default_value = "week")]
        period: String,

        /// Output file (defaults to ironlog-report.md)
        #[arg(short, long)]
        out: Option<String>,
    },

    /// Install the default exercise catalog
    Seed,

    /// View or edit ironlog config
    #[command(subcommand)]
    Config(ConfigCmd),
}

//
// Commands
//

#[derive(Subcommand)]
pub enum UserCmd {
    /// Add a new user
    #[command(visible_alias = "a")]
    Add {
        /// Email address (the CLI handle for everything else)
        email: String,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(long)]
        age: Option<i64>,

        #[arg(long)]
        gender: Option<String>,

        /// Height in cm
        #[arg(long)]
        height: Option<f64>,

        /// Bodyweight in kg
        #[arg(long)]
        weight: Option<f64>,

        /// Training experience (beginner/intermediate/advanced)
        #[arg(long)]
        level: Option<String>,
    },

    /// List all users
    #[command(visible_alias = "l")]
    List,

    /// Show a user profile
    #[command(visible_alias = "s")]
    Show { email: String },

    /// Update profile fields (only the provided ones change)
    Update {
        email: String,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(long)]
        age: Option<i64>,

        #[arg(long)]
        gender: Option<String>,

        #[arg(long)]
        height: Option<f64>,

        #[arg(long)]
        weight: Option<f64>,

        #[arg(long)]
        level: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum ExerciseCmd {
    /// Add a new exercise
    #[command(visible_alias = "a")]
    Add {
        /// Exercise name
        name: String,

        /// Muscle group
        #[arg(short, long)]
        muscle: String,

        /// Localized display name (defaults to the English name)
        #[arg(long)]
        mn_name: Option<String>,

        /// Equipment tag (barbell, dumbbell, machine, ...)
        #[arg(short, long)]
        equipment: Option<String>,

        /// strength or cardio
        #[arg(short, long)]
        kind: Option<String>,
    },

    /// Import exercises from a TOML file
    #[command(visible_alias = "i")]
    Import {
        /// Path to TOML file
        file: String,
    },

    /// List all exercises
    #[command(visible_alias = "l")]
    List {
        /// Filter by muscle group
        #[arg(short, long)]
        muscle: Option<String>,
    },

    /// Delete an exercise
    #[command(visible_alias = "d")]
    Delete {
        /// Exercise index or name
        exercise: String,
    },
}

#[derive(Subcommand)]
pub enum WorkoutCmd {
    /// Log a workout from a TOML file
    #[command(visible_alias = "l")]
    Log(LogArgs),

    /// List workouts, newest first
    List {
        /// User email (defaults to the `user` config key)
        #[arg(short, long)]
        user: Option<String>,

        /// Maximum number of workouts to show
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// Show one workout in detail
    #[command(visible_alias = "s")]
    Show {
        /// Workout index (from `workout list`) or id
        workout: String,

        /// User email (defaults to the `user` config key)
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Delete a workout and its sets
    #[command(visible_alias = "d")]
    Delete {
        /// Workout index (from `workout list`) or id
        workout: String,

        /// User email (defaults to the `user` config key)
        #[arg(short, long)]
        user: Option<String>,
    },
}

#[derive(Args)]
pub struct LogArgs {
    /// Path to the workout TOML file
    pub file: String,

    /// User email override (wins over the file and the config)
    #[arg(short, long)]
    pub user: Option<String>,
}

#[derive(Subcommand)]
pub enum ProgramCmd {
    /// Import one or more programs (re-import replaces a program's days)
    #[command(visible_alias = "i")]
    Import {
        files: Vec<String>,

        /// User email (defaults to the `user` config key)
        #[arg(short, long)]
        user: Option<String>,
    },

    /// List programs
    #[command(visible_alias = "l")]
    List {
        /// User email (defaults to the `user` config key)
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Show a single program in detail
    #[command(visible_alias = "s")]
    Show {
        /// Program index (from `p list`) or exact name
        program: String,

        /// User email (defaults to the `user` config key)
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Delete a program
    #[command(visible_alias = "d")]
    Delete {
        /// Program index (from `p list`) or exact name
        program: String,

        /// User email (defaults to the `user` config key)
        #[arg(short, long)]
        user: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// Show all config keys
    List,

    /// Get the value of a key
    Get { key: String },

    /// Set or override a key
    Set { key: String, val: String },

    /// Remove a key
    Unset { key: String },
}
