pub mod challenge;
pub mod chapter;
pub mod checkin;

pub use challenge::{Challenge, ChallengeKind, ChallengeStatus, ParticipantStatus, Participation};
pub use chapter::JourneyChapter;
pub use checkin::Checkin;
