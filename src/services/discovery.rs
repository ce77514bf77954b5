use crate::core::filters::RankFilters;
use crate::core::ranker::{CandidateRanker, RankResult};
use crate::core::sequence::{RankSequencer, RankTicket};
use crate::core::taxonomy::{SharedTaxonomy, StyleTaxonomy};
use crate::models::{ScoringWeights, SeekerPreference};
use crate::services::store::{CandidateDirectory, StoreError, TaxonomySource};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by partner discovery
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Failed to fetch candidate pool: {0}")]
    CandidatePool(#[source] StoreError),
}

/// Outcome of one discovery call
#[derive(Debug)]
pub enum DiscoveryOutcome {
    Ranked(RankResult),
    /// A newer call for the same seeker completed first; this result is dropped
    Stale(RankTicket),
}

/// Result of a taxonomy refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxonomyStatus {
    pub entries: usize,
    pub fallback: bool,
}

/// Fetch-then-rank orchestration over the external collaborators
///
/// Holds the session taxonomy and one sequencer per seeker so rapid filter
/// changes from the same seeker never let an older result win.
pub struct DiscoveryService {
    directory: Arc<dyn CandidateDirectory>,
    taxonomy_source: Arc<dyn TaxonomySource>,
    taxonomy: SharedTaxonomy,
    weights: ScoringWeights,
    sequencers: moka::future::Cache<String, Arc<RankSequencer>>,
}

impl DiscoveryService {
    pub fn new(
        directory: Arc<dyn CandidateDirectory>,
        taxonomy_source: Arc<dyn TaxonomySource>,
        weights: ScoringWeights,
    ) -> Self {
        Self {
            directory,
            taxonomy_source,
            taxonomy: SharedTaxonomy::default(),
            weights,
            sequencers: moka::future::CacheBuilder::new(10_000)
                .time_to_idle(Duration::from_secs(30 * 60))
                .build(),
        }
    }

    /// Current taxonomy snapshot
    pub fn taxonomy(&self) -> Arc<StyleTaxonomy> {
        self.taxonomy.snapshot()
    }

    /// Rebuild the taxonomy from the collaborator and swap it in
    ///
    /// An empty collection or a failed fetch falls back to the built-in table.
    pub async fn refresh_taxonomy(&self) -> TaxonomyStatus {
        let taxonomy = match self.taxonomy_source.fetch_style_taxonomy().await {
            Ok(entries) => StyleTaxonomy::from_entries_or_builtin(&entries),
            Err(e) => {
                tracing::warn!("Failed to fetch style taxonomy, using built-in fallback: {}", e);
                StyleTaxonomy::builtin()
            }
        };

        let status = TaxonomyStatus {
            entries: taxonomy.len(),
            fallback: taxonomy.is_fallback(),
        };
        self.taxonomy.replace(taxonomy);

        tracing::info!(
            "Style taxonomy loaded ({} entries, fallback: {})",
            status.entries,
            status.fallback
        );
        status
    }

    async fn sequencer_for(&self, seeker_id: &str) -> Arc<RankSequencer> {
        self.sequencers
            .get_with(seeker_id.to_string(), async { Arc::new(RankSequencer::new()) })
            .await
    }

    /// Fetch the pool for a seeker and rank it
    ///
    /// A fetch failure is returned as an error; no partial ranking is produced.
    pub async fn discover(
        &self,
        seeker_id: &str,
        filters: &RankFilters,
        preference: Option<&SeekerPreference>,
        limit: Option<usize>,
    ) -> Result<DiscoveryOutcome, DiscoveryError> {
        let sequencer = self.sequencer_for(seeker_id).await;
        let ticket = sequencer.issue();

        let pool = self
            .directory
            .fetch_candidate_pool(seeker_id)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch candidate pool for {}: {}", seeker_id, e);
                DiscoveryError::CandidatePool(e)
            })?;

        let pool = pool.into_iter().filter(|c| c.user_id != seeker_id).collect();

        let ranker = CandidateRanker::new(self.taxonomy.snapshot(), self.weights);
        let mut result = ranker.rank(pool, filters, preference);
        if let Some(limit) = limit {
            result.candidates.truncate(limit);
        }

        if !sequencer.complete(ticket) {
            tracing::debug!(
                "Discarding stale ranking #{} for {}",
                ticket.value(),
                seeker_id
            );
            return Ok(DiscoveryOutcome::Stale(ticket));
        }

        Ok(DiscoveryOutcome::Ranked(result))
    }
}
