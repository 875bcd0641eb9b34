/// Result memoization: key derivation, the lookup store, durable artifacts and
/// per-key single-flight locks
mod file_backed;
mod inflight;
mod memory;
mod types;

pub use file_backed::FileArtifactStore;
pub use inflight::InflightLocks;
pub use memory::InMemoryCacheStore;
pub use types::*;
