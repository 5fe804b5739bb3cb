//! Saved-search history service
//!
//! Snapshots every executed search as JSON and replays the most recent one
//! for the repeat-last-search command. Snapshots from older releases that no
//! longer deserialize are treated as absent rather than surfaced as errors.

use tracing::{debug, warn};

use crate::database::repositories::SearchHistoryRepository;
use crate::state::SearchParameters;
use crate::utils::errors::Result;

#[derive(Debug, Clone)]
pub struct HistoryService {
    repository: SearchHistoryRepository,
}

impl HistoryService {
    pub fn new(repository: SearchHistoryRepository) -> Self {
        Self { repository }
    }

    /// Snapshot the parameters of a search that just executed
    pub async fn record(&self, params: &SearchParameters) -> Result<()> {
        let snapshot = serde_json::to_value(params)?;
        self.repository
            .save(
                params.user_id,
                params.flow.name(),
                params.departure_iata.as_deref(),
                snapshot,
            )
            .await?;
        debug!(user_id = params.user_id, flow = params.flow.name(), "Search snapshot saved");
        Ok(())
    }

    /// Most recent snapshot for a user, if any still deserializes
    pub async fn load_latest(&self, user_id: i64) -> Result<Option<SearchParameters>> {
        let Some(record) = self.repository.load_latest(user_id).await? else {
            return Ok(None);
        };

        match serde_json::from_value::<SearchParameters>(record.params) {
            Ok(params) => Ok(Some(params)),
            Err(e) => {
                warn!(user_id, error = %e, "Stored snapshot no longer deserializes");
                Ok(None)
            }
        }
    }
}
