mod client;
mod types;

pub use client::{OpenAiClient, DEFAULT_BASE_URL};
