pub mod cache;
pub mod consensus;
pub mod extract;
pub mod orchestrator;
pub mod patterns;

pub use cache::{AvatarCache, InMemoryAvatarCache, NoopAvatarCache};
pub use consensus::{resolve, Confidence, ConsensusResult};
pub use extract::{ExtractionAttempt, Extractor};
pub use orchestrator::{FetchRequest, FetchResponse, FollowerFetcher};
