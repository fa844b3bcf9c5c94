//! Level-to-destination routing
//!
//! Decides which ranks own an output file and hands out the lazily opened
//! writer handle for each of them. All methods expect the caller to hold the
//! logger's shared lock; handles themselves are written outside of it.

use super::appender::{Appender, AppenderFactory};
use super::error::{LoggerError, Result};
use super::level_registry::LevelRegistry;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Writer handle shared between the routing table and the dispatch thread
pub type SharedAppender = Arc<Mutex<Box<dyn Appender>>>;

/// Minimum rank, fan-out flag, and the handles of the active levels
pub struct RoutingConfig {
    min_level: i64,
    fan_out: bool,
    /// `(rank, level name)` of every level that owns a file, ascending by rank
    active: Vec<(usize, String)>,
    writers: HashMap<usize, SharedAppender>,
    /// Set once at shutdown; no level is routed afterwards
    retired: bool,
}

impl RoutingConfig {
    pub fn new(min_level: i64, fan_out: bool) -> Self {
        Self {
            min_level,
            fan_out,
            active: Vec::new(),
            writers: HashMap::new(),
            retired: false,
        }
    }

    /// Clamp a requested minimum into `[0, level_count - 1]`
    pub fn clamp(requested: i64, level_count: usize) -> usize {
        if requested <= 0 || level_count == 0 {
            return 0;
        }
        let max = level_count - 1;
        usize::try_from(requested).map_or(max, |rank| rank.min(max))
    }

    /// Close every handle and recompute the active levels
    ///
    /// Handles are reopened on demand by [`writer_for`](Self::writer_for).
    /// Returns the first error raised while closing.
    pub fn rebuild(&mut self, registry: &LevelRegistry) -> Option<LoggerError> {
        let close_error = self.close_all();

        let min_rank = Self::clamp(self.min_level, registry.len());
        self.min_level = min_rank as i64;

        if self.retired {
            self.active.clear();
            return close_error;
        }

        self.active = registry
            .ranks()
            .filter(|(rank, _)| {
                if self.fan_out {
                    *rank >= min_rank
                } else {
                    *rank == min_rank
                }
            })
            .map(|(rank, name)| (rank, name.to_string()))
            .collect();

        close_error
    }

    /// Close and forget all open handles
    pub fn close_all(&mut self) -> Option<LoggerError> {
        let mut first_error = None;
        for (_, writer) in self.writers.drain() {
            if let Err(e) = writer.lock().close() {
                first_error.get_or_insert(e);
            }
        }
        first_error
    }

    /// Close every handle and stop routing for good
    ///
    /// Later rebuilds keep the active set empty, so
    /// [`writer_for`](Self::writer_for) never opens another handle.
    pub fn retire(&mut self) -> Option<LoggerError> {
        self.retired = true;
        self.active.clear();
        self.close_all()
    }

    pub fn is_retired(&self) -> bool {
        self.retired
    }

    pub fn set_min_level(&mut self, min_level: i64) {
        self.min_level = min_level;
    }

    pub fn set_fan_out(&mut self, fan_out: bool) {
        self.fan_out = fan_out;
    }

    /// Effective minimum rank (clamped by the last rebuild)
    pub fn min_rank(&self) -> usize {
        usize::try_from(self.min_level).unwrap_or(0)
    }

    pub fn fan_out(&self) -> bool {
        self.fan_out
    }

    pub fn active_levels(&self) -> &[(usize, String)] {
        &self.active
    }

    pub fn is_active(&self, rank: usize) -> bool {
        self.active.iter().any(|(r, _)| *r == rank)
    }

    /// Active levels an entry of `entry_rank` is written to
    pub fn targets_for(&self, entry_rank: usize) -> impl Iterator<Item = &(usize, String)> {
        self.active.iter().filter(move |(rank, _)| entry_rank >= *rank)
    }

    /// Handle for an active rank, opening it on first use
    ///
    /// Returns `Ok(None)` when the rank is not active.
    pub fn writer_for(
        &mut self,
        rank: usize,
        dir: &Path,
        factory: &dyn AppenderFactory,
    ) -> Result<Option<SharedAppender>> {
        if let Some(writer) = self.writers.get(&rank) {
            return Ok(Some(Arc::clone(writer)));
        }

        let Some((_, name)) = self.active.iter().find(|(r, _)| *r == rank) else {
            return Ok(None);
        };

        let writer: SharedAppender = Arc::new(Mutex::new(factory.open(dir, name)?));
        self.writers.insert(rank, Arc::clone(&writer));
        Ok(Some(writer))
    }

    /// Handles opened so far, for syncing
    pub fn open_writers(&self) -> Vec<SharedAppender> {
        self.writers.values().cloned().collect()
    }

    pub fn open_writer_count(&self) -> usize {
        self.writers.len()
    }
}
