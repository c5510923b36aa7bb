pub mod ranking;
pub mod recording;
pub mod setup;

pub use ranking::RankingService;
pub use recording::RecordingService;
pub use setup::SetupService;
