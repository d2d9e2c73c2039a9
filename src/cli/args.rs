use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "vigil", version, about = "Check-in streaks and journey progress for daily habits")]
pub struct Cli {
    /// Treat this day (YYYY-MM-DD) as today instead of reading the clock
    #[arg(long, global = true, value_name = "DATE")]
    pub today: Option<String>,

    /// Print machine-readable JSON where supported
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Challenge management
    Challenge {
        #[command(subcommand)]
        action: ChallengeCommands,
    },
    /// Check in to a challenge for today
    Checkin {
        /// Challenge id
        id: i64,
        /// Reflection to store with today's check-in
        #[arg(long)]
        reflection: Option<String>,
    },
    /// Show current and best streak across all challenges
    Streak,
    /// Show active days, streaks and recent trophies
    Progress,
    /// Show where a journey stands and its day-by-day trail
    Journey {
        /// Challenge id
        id: i64,
        /// Show one day's chapter and check-in instead of the whole trail
        #[arg(long)]
        day: Option<u32>,
    },
    /// Set the chapter title for one journey day
    Chapter {
        /// Challenge id
        id: i64,
        /// Day index (1-based)
        day: u32,
        /// Chapter title
        title: String,
        /// Focus of the day
        #[arg(long)]
        focus: Option<String>,
    },
    /// List every completed challenge
    Trophies,
    /// Show one challenge's period, check-ins and reflections
    Trophy {
        /// Challenge id
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
pub enum ChallengeCommands {
    /// Create a challenge and join it
    Add {
        /// Title
        title: String,
        /// Kind: reading, meditation, fasting or communion
        #[arg(long)]
        kind: Option<String>,
        /// Duration in days
        #[arg(long, allow_negative_numbers = true)]
        days: Option<i64>,
        /// First day (YYYY-MM-DD); defaults to today
        #[arg(long)]
        start: Option<String>,
    },
    /// List challenges
    List,
    /// Mark your participation in a challenge as completed
    Complete {
        /// Challenge id
        id: i64,
    },
    /// Cancel a challenge; it stops accepting check-ins
    Cancel {
        /// Challenge id
        id: i64,
    },
    /// Leave a challenge; your check-ins stay but no new ones are accepted
    Leave {
        /// Challenge id
        id: i64,
    },
}
