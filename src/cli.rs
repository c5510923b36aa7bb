use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::domain::round::{Round, parse_round};
use crate::domain::GroupId;

#[derive(Parser, Debug)]
#[command(author, version, about = "Standings of a recurring multi-round tournament")]
pub struct Cli {
    /// Score database (overrides DATABASE_PATH)
    #[arg(long, global = true)]
    pub database: Option<String>,

    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Drop and recreate the score database
    Setup,
    /// Record the points of one participant for one group and round
    Record(RecordArgs),
    /// Compute the standings of one or several groups
    Rank(RankArgs),
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct RecordArgs {
    #[arg(short, long)]
    pub group: GroupId,

    /// Name for the group if it does not exist yet
    #[arg(long)]
    pub group_name: Option<String>,

    #[arg(short, long)]
    pub login: String,

    /// Day number or YYYY-MM-DD
    #[arg(short, long, value_parser = parse_round)]
    pub round: Round,

    #[arg(short, long)]
    pub points: f64,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct RankArgs {
    /// Group ids; several groups only count rounds played in all of them
    #[arg(short, long = "group", required = true, num_args = 1..)]
    pub groups: Vec<GroupId>,

    /// First round of the window (day number or YYYY-MM-DD)
    #[arg(short, long, value_parser = parse_round)]
    pub from: Round,

    /// Last round of the window, defaults to --from
    #[arg(short, long, value_parser = parse_round)]
    pub to: Option<Round>,

    /// First round of the comparison window
    #[arg(long, value_parser = parse_round, requires = "to_prev")]
    pub from_prev: Option<Round>,

    /// Last round of the comparison window
    #[arg(long, value_parser = parse_round, requires = "from_prev")]
    pub to_prev: Option<Round>,

    /// Cache namespace
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Login whose scores fill in for skipped rounds
    #[arg(long)]
    pub substitute: Option<String>,

    /// Maximum points per round and group
    #[arg(long)]
    pub points_max: Option<f64>,

    /// Caption of the current window
    #[arg(long)]
    pub label: Option<String>,

    /// Caption of the comparison window
    #[arg(long)]
    pub label_prev: Option<String>,

    /// Cache directory (overrides RANKING_CACHE_DIR)
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Always recompute and leave the cache untouched
    #[arg(long)]
    pub no_cache: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}
