// Adapters layer: concrete implementations of the domain ports for Azure services.

pub mod azure_openai;
pub mod azure_search;
pub mod history;
pub mod http;

pub use azure_openai::AzureOpenAiClient;
pub use azure_search::AzureSearchClient;
pub use history::InMemoryHistory;
