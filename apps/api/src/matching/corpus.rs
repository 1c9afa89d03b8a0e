//! Skill corpus — previously recorded skill strings supplied by the surrounding system.
//!
//! Consumed by the requirement miner (corpus-derived level) and by the heuristic
//! extraction tier as extra keywords.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::time::{timeout, Instant};
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("skill corpus query failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("skill corpus query timed out after {0:?}")]
    TimedOut(Duration),
}

#[async_trait]
pub trait SkillCorpusProvider: Send + Sync {
    /// Distinct, trimmed, non-empty skill strings.
    async fn distinct_skills(&self) -> Result<Vec<String>, CorpusError>;
}

/// Fixed in-memory corpus. Used when no database is configured, and in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticSkillCorpus {
    skills: Vec<String>,
}

impl StaticSkillCorpus {
    pub fn new<I, S>(skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut skills: Vec<String> = skills
            .into_iter()
            .map(|s| s.into().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        skills.sort();
        skills.dedup();
        Self { skills }
    }
}

#[async_trait]
impl SkillCorpusProvider for StaticSkillCorpus {
    async fn distinct_skills(&self) -> Result<Vec<String>, CorpusError> {
        Ok(self.skills.clone())
    }
}

/// Skills recorded in the `applications` table, split on commas.
const DISTINCT_SKILLS_SQL: &str = r#"
    SELECT DISTINCT TRIM(skill) AS skill
    FROM (
        SELECT UNNEST(STRING_TO_ARRAY(primary_skill, ',')) AS skill
        FROM applications
        WHERE primary_skill IS NOT NULL AND primary_skill <> ''
        UNION ALL
        SELECT UNNEST(STRING_TO_ARRAY(secondary_skill, ',')) AS skill
        FROM applications
        WHERE secondary_skill IS NOT NULL AND secondary_skill <> ''
    ) recorded
    WHERE TRIM(skill) <> ''
    ORDER BY skill
"#;

/// Corpus read from the surrounding system's PostgreSQL database. Read-only.
#[derive(Clone)]
pub struct PgSkillCorpus {
    db: PgPool,
}

impl PgSkillCorpus {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SkillCorpusProvider for PgSkillCorpus {
    async fn distinct_skills(&self) -> Result<Vec<String>, CorpusError> {
        let skills = sqlx::query_scalar::<_, String>(DISTINCT_SKILLS_SQL)
            .fetch_all(&self.db)
            .await?;
        debug!("Loaded {} distinct skills from corpus", skills.len());
        Ok(skills)
    }
}

struct CacheSlot {
    loaded_at: Instant,
    skills: Arc<Vec<String>>,
}

/// Caches another provider's corpus for `ttl`. Each refresh is bounded by
/// `refresh_timeout`; when it fails or times out and a previous load exists, the stale
/// corpus is served. Only one task refreshes at a time, and callers holding a stale
/// corpus never wait for it.
pub struct CachedSkillCorpus<P> {
    inner: P,
    ttl: Duration,
    refresh_timeout: Duration,
    slot: RwLock<Option<CacheSlot>>,
    refreshing: Mutex<()>,
}

impl<P: SkillCorpusProvider> CachedSkillCorpus<P> {
    pub fn new(inner: P, ttl: Duration, refresh_timeout: Duration) -> Self {
        Self {
            inner,
            ttl,
            refresh_timeout,
            slot: RwLock::new(None),
            refreshing: Mutex::new(()),
        }
    }

    fn fresh(&self, slot: &Option<CacheSlot>) -> Option<Arc<Vec<String>>> {
        slot.as_ref()
            .filter(|s| s.loaded_at.elapsed() < self.ttl)
            .map(|s| Arc::clone(&s.skills))
    }

    async fn load(&self) -> Result<Vec<String>, CorpusError> {
        timeout(self.refresh_timeout, self.inner.distinct_skills())
            .await
            .unwrap_or(Err(CorpusError::TimedOut(self.refresh_timeout)))
    }
}

#[async_trait]
impl<P: SkillCorpusProvider> SkillCorpusProvider for CachedSkillCorpus<P> {
    async fn distinct_skills(&self) -> Result<Vec<String>, CorpusError> {
        let stale = {
            let slot = self.slot.read().await;
            if let Some(skills) = self.fresh(&slot) {
                return Ok(skills.to_vec());
            }
            slot.as_ref().map(|s| Arc::clone(&s.skills))
        };

        let _refreshing = match (self.refreshing.try_lock(), &stale) {
            (Ok(guard), _) => guard,
            // another task is refreshing; serve what we have
            (Err(_), Some(stale)) => return Ok(stale.to_vec()),
            (Err(_), None) => self.refreshing.lock().await,
        };

        // another task may have refreshed while we waited for the lock
        if let Some(skills) = self.fresh(&*self.slot.read().await) {
            return Ok(skills.to_vec());
        }

        match self.load().await {
            Ok(skills) => {
                let skills = Arc::new(skills);
                *self.slot.write().await = Some(CacheSlot {
                    loaded_at: Instant::now(),
                    skills: Arc::clone(&skills),
                });
                Ok(skills.to_vec())
            }
            Err(e) => match stale {
                Some(stale) => {
                    warn!("Skill corpus refresh failed, serving stale corpus: {e}");
                    Ok(stale.to_vec())
                }
                None => Err(e),
            },
        }
    }
}
