use crate::adapters::http::UpstreamClient;
use crate::config::{HttpClientConfig, SearchConfig};
use crate::domain::model::{SearchDocument, SearchStrategy};
use crate::domain::ports::{EmbeddingModel, SearchProvider};
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Azure AI Search "docs/search" client.
pub struct AzureSearchClient {
    http: UpstreamClient,
    config: SearchConfig,
    embeddings: Option<Arc<dyn EmbeddingModel>>,
}

#[derive(Debug, Serialize)]
struct SearchQuery {
    search: String,
    top: usize,
    #[serde(rename = "queryType", skip_serializing_if = "Option::is_none")]
    query_type: Option<&'static str>,
    #[serde(rename = "semanticConfiguration", skip_serializing_if = "Option::is_none")]
    semantic_configuration: Option<String>,
    #[serde(rename = "vectorQueries", skip_serializing_if = "Vec::is_empty")]
    vector_queries: Vec<VectorQuery>,
}

#[derive(Debug, Serialize)]
struct VectorQuery {
    kind: &'static str,
    vector: Vec<f32>,
    fields: String,
    k: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResults {
    value: Vec<SearchDocument>,
}

impl AzureSearchClient {
    pub fn new(config: SearchConfig, http: HttpClientConfig) -> Self {
        Self {
            http: UpstreamClient::new("Azure AI Search", http),
            config,
            embeddings: None,
        }
    }

    /// Vector strategies embed the query text with this model.
    pub fn with_embeddings(mut self, embeddings: Arc<dyn EmbeddingModel>) -> Self {
        self.embeddings = Some(embeddings);
        self
    }

    fn search_url(&self) -> String {
        format!(
            "{}/indexes/{}/docs/search?api-version={}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.index_name,
            self.config.api_version
        )
    }

    async fn build_query(&self, text: &str, top: usize) -> Result<SearchQuery> {
        let mut query = SearchQuery {
            search: text.to_string(),
            top,
            query_type: None,
            semantic_configuration: None,
            vector_queries: Vec::new(),
        };

        let Some(strategy) = self.config.strategy else {
            return Ok(query);
        };

        let embeddings = self.embeddings.as_ref().ok_or_else(|| AppError::ConfigError {
            message: format!(
                "search strategy '{}' needs an embedding model",
                strategy.as_str()
            ),
        })?;
        let embedding = embeddings.embed(text, None).await?;

        query.vector_queries.push(VectorQuery {
            kind: "vector",
            vector: embedding.vector,
            fields: self.config.vector_field.clone(),
            k: top,
        });

        match strategy {
            SearchStrategy::Similarity => query.search = "*".to_string(),
            SearchStrategy::Hybrid => {}
            SearchStrategy::SemanticHybrid => {
                query.query_type = Some("semantic");
                query.semantic_configuration = Some(self.config.semantic_configuration.clone());
            }
        }

        Ok(query)
    }
}

#[async_trait]
impl SearchProvider for AzureSearchClient {
    async fn search(&self, text: &str, top: usize) -> Result<Vec<SearchDocument>> {
        let query = self.build_query(text, top).await?;
        let results: SearchResults = self
            .http
            .post_json(&self.search_url(), &self.config.admin_key, &query)
            .await?;

        tracing::debug!(
            "{} returned {} documents from index '{}'",
            self.http.service(),
            results.value.len(),
            self.config.index_name
        );
        Ok(results.value)
    }
}
