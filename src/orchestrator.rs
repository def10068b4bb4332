//! The refinement loop.
//!
//! For each query the orchestrator runs:
//! 1. PROXIMITY: suggest the best prior result from memory
//! 2. GENERATE: fetch the initial hypothesis (once per query)
//! 3. CYCLES: validate, rank, evolve, persist and review, a fixed number of times
//!
//! Each cycle feeds its refined idea and score into the next. Storage failures
//! abort the run; idea-source failures never reach this layer.

use chrono::Utc;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, OwnedMutexGuard, Semaphore};
use tracing::{debug, info, warn, Level};
use uuid::Uuid;

use crate::agents::{
    Evolver, ProximityAdvisor, ProximitySuggestion, Reflector, Review, ReviewClassifier,
    SimilarityRanker,
};
use crate::config::LoopConfig;
use crate::error::{Error, Result};
use crate::memory::{CycleEntry, SqliteMemoryStore};
use crate::random::IncrementSource;
use crate::source::IdeaSource;
use crate::trajectory::{EventEmitter, NullEmitter, RunEvent, RunEventType};

/// Outcome of one refinement cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    pub cycle: u32,
    /// Reflector confirmation text
    pub validation: String,
    /// `"<idea> - Score: <score>/10"` from the ranker
    pub ranked_label: String,
    pub initial_score: u32,
    pub refined_idea: String,
    pub final_score: u32,
    /// Whether the evolver produced a new idea
    pub refined: bool,
    pub review: Review,
}

/// Outcome of a full run for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub query: String,
    pub proximity: ProximitySuggestion,
    /// Idea returned by the generation step
    pub initial_idea: String,
    pub cycles: Vec<CycleReport>,
    pub final_idea: String,
    pub final_score: u32,
}

/// Per-query async locks so one query never runs two cycles at once.
///
/// An entry lives only while some run holds or waits for it.
#[derive(Default)]
struct QueryLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl QueryLocks {
    async fn acquire(&self, query: &str) -> Result<QueryGuard<'_>> {
        let lock = {
            let mut locks = self
                .locks
                .lock()
                .map_err(|e| Error::Internal(format!("Failed to lock query table: {}", e)))?;
            Arc::clone(locks.entry(query.to_string()).or_default())
        };

        Ok(QueryGuard {
            locks: self,
            query: query.to_string(),
            guard: Some(lock.lock_owned().await),
        })
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().map(|locks| locks.len()).unwrap_or_default()
    }
}

/// Held for the duration of one run; releases the query and prunes its entry.
struct QueryGuard<'a> {
    locks: &'a QueryLocks,
    query: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for QueryGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());

        let Ok(mut locks) = self.locks.locks.lock() else {
            return;
        };
        // Only the table still points at the lock: nobody holds or awaits it
        if locks
            .get(&self.query)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.query);
        }
    }
}

/// Drives the refinement loop against one memory store.
pub struct Orchestrator {
    config: LoopConfig,
    memory: SqliteMemoryStore,
    source: Arc<dyn IdeaSource>,
    reflector: Reflector,
    ranker: SimilarityRanker,
    evolver: Evolver,
    reviewer: ReviewClassifier,
    proximity: ProximityAdvisor,
    emitter: Arc<dyn EventEmitter>,
    locks: QueryLocks,
}

impl Orchestrator {
    /// Wire all agents around `memory`. `source` serves both generation and
    /// evolution; `increments` drives the evolver's score bumps.
    pub fn new(
        config: LoopConfig,
        memory: SqliteMemoryStore,
        source: Arc<dyn IdeaSource>,
        increments: Arc<dyn IncrementSource>,
    ) -> Self {
        let evolver = Evolver::new(Arc::clone(&source), increments);
        let proximity = ProximityAdvisor::with_limit(config.top_results_limit);

        Self {
            config,
            memory,
            source,
            reflector: Reflector::new(),
            ranker: SimilarityRanker::new(),
            evolver,
            reviewer: ReviewClassifier::new(),
            proximity,
            emitter: Arc::new(NullEmitter),
            locks: QueryLocks::default(),
        }
    }

    /// Send progress events to `emitter`.
    pub fn with_emitter(mut self, emitter: Arc<dyn EventEmitter>) -> Self {
        self.emitter = emitter;
        self
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    pub fn memory(&self) -> &SqliteMemoryStore {
        &self.memory
    }

    /// Run every cycle for `query`, or stop at the first storage failure.
    pub async fn execute(&self, query: &str) -> Result<RunReport> {
        let _guard = self.locks.acquire(query).await?;
        let run_id = Uuid::new_v4();

        info!(%run_id, query, source = self.source.name(), "Processing query");
        self.emit(RunEvent::new(run_id, RunEventType::RunStart, 0, query));

        match self.run_cycles(run_id, query).await {
            Ok(report) => {
                info!(
                    %run_id,
                    final_idea = %report.final_idea,
                    final_score = report.final_score,
                    "Run complete"
                );
                self.emit(
                    RunEvent::new(
                        run_id,
                        RunEventType::RunComplete,
                        0,
                        format!("{} - Score: {}/10", report.final_idea, report.final_score),
                    )
                    .with_metadata("final_score", report.final_score),
                );
                Ok(report)
            }
            Err(err) => {
                self.emit(RunEvent::new(run_id, RunEventType::Error, 0, err.to_string()));
                Err(err)
            }
        }
    }

    async fn run_cycles(&self, run_id: Uuid, query: &str) -> Result<RunReport> {
        let proximity = self.proximity.advise(query, &self.memory)?;
        info!(%run_id, "{}", proximity);
        self.emit(RunEvent::new(run_id, RunEventType::Proximity, 0, proximity.to_string()));

        let mut hypothesis = self.source.fetch(query).await;
        let initial_idea = hypothesis.idea.clone();
        self.emit(
            RunEvent::new(run_id, RunEventType::Generate, 0, hypothesis.idea.clone())
                .with_metadata("info", hypothesis.info.clone())
                .with_metadata("alternates", hypothesis.alt_ideas.len()),
        );

        let mut cycles = Vec::with_capacity(self.config.cycles as usize);

        for cycle in 1..=self.config.cycles {
            info!(%run_id, cycle, idea = %hypothesis.idea, "Cycle started");

            let validation = self.reflector.validate(&hypothesis);
            self.emit(RunEvent::new(run_id, RunEventType::Validate, cycle, validation.clone()));

            let ranking = self.ranker.rank(query, &mut hypothesis);
            let initial_score = ranking.score;
            self.emit(
                RunEvent::new(run_id, RunEventType::Rank, cycle, ranking.label.clone())
                    .with_metadata("score", initial_score),
            );

            // Alternates are not carried into evolution
            let evolution = self.evolver.evolve(&hypothesis.idea, initial_score).await;
            self.emit(
                RunEvent::new(
                    run_id,
                    RunEventType::Evolve,
                    cycle,
                    format!("'{}' -> '{}'", hypothesis.idea, evolution.idea),
                )
                .with_metadata("score", evolution.score)
                .with_metadata("refined", evolution.refined),
            );

            self.memory.store(query, &evolution.idea, evolution.score)?;
            self.emit(RunEvent::new(
                run_id,
                RunEventType::Persist,
                cycle,
                format!("{} - Score: {}/10", evolution.idea, evolution.score),
            ));
            if tracing::enabled!(Level::DEBUG) {
                let stored = self
                    .memory
                    .retrieve_top_results(self.config.top_results_limit)?;
                debug!(?stored, "Stored queries after cycle");
            }

            let review = self
                .reviewer
                .review(&evolution.idea, initial_score, evolution.score);
            self.memory.record_cycle(&CycleEntry {
                query: query.to_string(),
                cycle,
                idea: evolution.idea.clone(),
                initial_score,
                final_score: evolution.score,
                tier: review.tier.to_string(),
                recorded_at: Utc::now(),
            })?;
            info!(%run_id, cycle, tier = %review.tier, delta = review.delta, "{}", review);
            self.emit(
                RunEvent::new(run_id, RunEventType::Review, cycle, review.to_string())
                    .with_metadata("tier", review.tier.to_string()),
            );

            cycles.push(CycleReport {
                cycle,
                validation,
                ranked_label: ranking.label,
                initial_score,
                refined_idea: evolution.idea.clone(),
                final_score: evolution.score,
                refined: evolution.refined,
                review,
            });

            hypothesis.idea = evolution.idea;
            hypothesis.score = Some(evolution.score);
        }

        Ok(RunReport {
            run_id,
            query: query.to_string(),
            proximity,
            initial_idea,
            cycles,
            final_idea: hypothesis.idea,
            final_score: hypothesis.score.unwrap_or_default(),
        })
    }

    /// Run several queries as concurrent tokio tasks, at most `max_parallel`
    /// at a time.
    ///
    /// Tasks report over a channel as they finish; results are returned in
    /// input order. A failure in one query does not stop the others.
    pub async fn execute_many<S: AsRef<str>>(
        self: &Arc<Self>,
        queries: &[S],
    ) -> Vec<Result<RunReport>> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_parallel.max(1)));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let handles: Vec<_> = queries
            .iter()
            .enumerate()
            .map(|(index, query)| {
                let orchestrator = Arc::clone(self);
                let semaphore = Arc::clone(&semaphore);
                let query = query.as_ref().to_string();
                let tx = tx.clone();

                tokio::spawn(async move {
                    let result = match semaphore.acquire_owned().await {
                        Ok(_permit) => orchestrator.execute(&query).await,
                        Err(e) => Err(Error::Internal(format!("Semaphore closed: {}", e))),
                    };
                    if tx.send((index, result)).is_err() {
                        warn!(index, "Result receiver dropped");
                    }
                })
            })
            .collect();
        drop(tx);

        let mut slots: Vec<Option<Result<RunReport>>> = queries.iter().map(|_| None).collect();
        while let Some((index, result)) = rx.recv().await {
            debug!(index, ok = result.is_ok(), "Query finished");
            slots[index] = Some(result);
        }

        for joined in join_all(handles).await {
            if let Err(e) = joined {
                warn!(error = %e, "Query task failed");
            }
        }

        slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| Err(Error::Internal("Query task produced no result".to_string())))
            })
            .collect()
    }

    fn emit(&self, event: RunEvent) {
        self.emitter.emit(event);
    }
}
