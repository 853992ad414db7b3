//! Topic traversal
//!
//! Threads of a topic form a doubly linked chain: each thread's head points
//! at the previous and next thread. Starting from one thread (id 0), the
//! traverser assembles it, then explores `prev` as id - 1 and `next` as
//! id + 1, each as its own task. The loop draining those tasks is the only
//! place that touches the visited map and the result set, so claiming an id
//! and inserting its thread never race.

use crate::config::CrawlerConfig;
use crate::crawler::limiter::{pace, DelaySchedule, FixedDelay};
use crate::crawler::{Assembler, CancelToken};
use crate::model::Thread;
use crate::source::PageSource;
use crate::state::BranchState;
use crate::url::thread_base;
use crate::TrailError;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Result of a traversal
#[derive(Debug, Clone, Default)]
pub struct Topic {
    /// Assembled threads, ascending by id
    pub threads: Vec<Thread>,

    /// Branches that could not be assembled, ascending by id
    pub failures: Vec<BranchFailure>,
}

impl Topic {
    /// Ids of all assembled threads, ascending
    pub fn ids(&self) -> Vec<i64> {
        self.threads.iter().map(|t| t.id).collect()
    }

    /// Looks up a thread by its signed id
    pub fn thread(&self, id: i64) -> Option<&Thread> {
        self.threads.iter().find(|t| t.id == id)
    }

    /// Total number of comments across all threads
    pub fn comment_count(&self) -> usize {
        self.threads.iter().map(|t| t.contents.len()).sum()
    }

    /// Returns true if no branch failed
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A thread that was discovered but could not be assembled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchFailure {
    pub id: i64,
    pub address: String,
    pub error: String,
}

/// Bookkeeping for one claimed id
#[derive(Debug)]
struct Branch {
    address: String,
    state: BranchState,
}

/// What a branch task hands back to the traversal loop
struct BranchOutcome {
    id: i64,
    address: String,
    result: Result<Thread, TrailError>,
}

/// Discovers and assembles every thread linked from a start thread
#[derive(Debug)]
pub struct Traverser<S> {
    assembler: Arc<Assembler<S>>,
    schedule: Arc<dyn DelaySchedule>,
    max_threads: Option<u32>,
}

impl<S: PageSource + 'static> Traverser<S> {
    /// Creates a traverser with the default fixed delay between threads
    ///
    /// The traverser shares the assembler's cancel token.
    pub fn new(assembler: Assembler<S>) -> Self {
        let defaults = CrawlerConfig::default();
        Self {
            assembler: Arc::new(assembler),
            schedule: Arc::new(FixedDelay {
                delay: defaults.thread_delay(),
            }),
            max_threads: defaults.max_threads,
        }
    }

    /// Builds assembler and traverser from the crawler settings
    pub fn from_config(source: Arc<S>, config: &CrawlerConfig, cancel: CancelToken) -> Self {
        let assembler = Assembler::from_config(source, config).with_cancel(cancel);
        Self {
            assembler: Arc::new(assembler),
            schedule: Arc::new(FixedDelay {
                delay: config.thread_delay(),
            }),
            max_threads: config.max_threads,
        }
    }

    /// Replaces the delay applied before expanding each sibling thread
    pub fn with_schedule(mut self, schedule: Arc<dyn DelaySchedule>) -> Self {
        self.schedule = schedule;
        self
    }

    /// Stops following links once `max_threads` ids have been claimed
    pub fn with_max_threads(mut self, max_threads: Option<u32>) -> Self {
        self.max_threads = max_threads;
        self
    }

    /// Traverses the topic containing `start`
    ///
    /// # Failure Policy
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | Start thread fails | Abort, return the error |
    /// | Other thread fails | Record in `failures`, stop that direction |
    /// | Link missing | End of chain in that direction |
    /// | Link unparseable | Logged, end of chain in that direction |
    /// | Id already claimed | Ignored |
    /// | Address already claimed under another id | Logged, ignored |
    /// | Cancelled | Pending branches recorded as failures |
    pub async fn traverse(&self, start: &str) -> Result<Topic, TrailError> {
        let start = thread_base(start)?;
        tracing::info!("Starting traversal at {}", start);

        let mut branches: HashMap<i64, Branch> = HashMap::new();
        let mut addresses: HashMap<String, i64> = HashMap::new();
        let mut threads: BTreeMap<i64, Thread> = BTreeMap::new();
        let mut failures: Vec<BranchFailure> = Vec::new();
        let mut tasks: JoinSet<BranchOutcome> = JoinSet::new();
        let mut expansions: u32 = 0;

        self.claim(&mut branches, &mut addresses, 0, &start)?;
        self.spawn_branch(&mut tasks, 0, start, expansions);

        while let Some(joined) = tasks.join_next().await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    // The branch stays in Fetching and is reported below.
                    tracing::error!("Branch task did not finish: {}", e);
                    continue;
                }
            };

            let BranchOutcome {
                id,
                address,
                result,
            } = outcome;

            let thread = match result {
                Ok(thread) => thread,
                Err(e) if id == 0 => {
                    tasks.abort_all();
                    tracing::error!("Start thread {} failed: {}", address, e);
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(
                        "Thread {} at {} failed, not following it: {}",
                        id,
                        address,
                        e
                    );
                    if let Some(branch) = branches.get_mut(&id) {
                        branch.state.transition(BranchState::Failed)?;
                    }
                    failures.push(BranchFailure {
                        id,
                        address,
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            tracing::info!(
                "Thread {} at {}: {} comments",
                id,
                address,
                thread.contents.len()
            );
            if let Some(branch) = branches.get_mut(&id) {
                branch.state.transition(BranchState::Assembled)?;
                branch.state.transition(BranchState::Expanding)?;
            }

            let neighbours = [
                (thread.head.prev.as_deref(), id - 1),
                (thread.head.next.as_deref(), id + 1),
            ];
            for (link, neighbour_id) in neighbours {
                let Some(link) = link else {
                    tracing::debug!("Chain ends after thread {}", id);
                    continue;
                };

                let neighbour = match thread_base(link) {
                    Ok(base) => base,
                    Err(e) => {
                        tracing::warn!("Ignoring link {} from thread {}: {}", link, id, e);
                        continue;
                    }
                };

                if let Some(limit) = self.max_threads {
                    if branches.len() >= limit as usize && !branches.contains_key(&neighbour_id) {
                        tracing::info!(
                            "Thread limit of {} reached, not following {}",
                            limit,
                            neighbour
                        );
                        continue;
                    }
                }

                if self.claim(&mut branches, &mut addresses, neighbour_id, &neighbour)? {
                    expansions += 1;
                    self.spawn_branch(&mut tasks, neighbour_id, neighbour, expansions);
                }
            }

            if let Some(branch) = branches.get_mut(&id) {
                branch.state.transition(BranchState::Done)?;
            }
            threads.insert(id, thread);
        }

        for (id, branch) in &branches {
            if branch.state.is_active() {
                failures.push(BranchFailure {
                    id: *id,
                    address: branch.address.clone(),
                    error: format!("branch ended while {}", branch.state),
                });
            }
        }
        failures.sort_by_key(|f| f.id);

        let topic = Topic {
            threads: threads.into_values().collect(),
            failures,
        };
        tracing::info!(
            "Traversal finished: {} threads, {} comments, {} failures",
            topic.threads.len(),
            topic.comment_count(),
            topic.failures.len()
        );
        Ok(topic)
    }

    /// Claims `id` for `address`, returning false if either is already taken
    fn claim(
        &self,
        branches: &mut HashMap<i64, Branch>,
        addresses: &mut HashMap<String, i64>,
        id: i64,
        address: &str,
    ) -> Result<bool, TrailError> {
        let mut state = BranchState::Unvisited;

        if branches.contains_key(&id) {
            tracing::trace!("Thread {} already discovered", id);
            state.transition(BranchState::Done)?;
            return Ok(false);
        }

        if let Some(existing) = addresses.get(address) {
            tracing::warn!(
                "Chain links back to {} (already thread {}) as thread {}",
                address,
                existing,
                id
            );
            state.transition(BranchState::Done)?;
            return Ok(false);
        }

        state.transition(BranchState::Fetching)?;
        branches.insert(
            id,
            Branch {
                address: address.to_string(),
                state,
            },
        );
        addresses.insert(address.to_string(), id);
        Ok(true)
    }

    fn spawn_branch(
        &self,
        tasks: &mut JoinSet<BranchOutcome>,
        id: i64,
        address: String,
        expansion: u32,
    ) {
        let assembler = Arc::clone(&self.assembler);
        let schedule = Arc::clone(&self.schedule);

        tasks.spawn(async move {
            let result = async {
                if id != 0 {
                    pace(schedule.as_ref(), expansion, assembler.cancel_token()).await?;
                }
                assembler.assemble(id, &address).await
            }
            .await;

            BranchOutcome {
                id,
                address,
                result,
            }
        });
    }
}
