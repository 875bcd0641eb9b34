/// Clients for the capabilities the pipeline depends on
pub mod completion;
pub mod fetch;
pub mod openai;

pub use completion::{CompletionError, CompletionProvider};
pub use fetch::{DocumentFetcher, FetchError, HttpFetcher};
pub use openai::OpenAiClient;
