pub mod backend;
pub mod http;
pub mod session;

pub use backend::RecommendationBackend;
#[cfg(test)]
pub use backend::MockRecommendationBackend;
pub use http::HttpBackend;
pub use session::{JsonFileSessionStore, MemorySessionStore, SessionEntry, SessionKey, SessionStore};
