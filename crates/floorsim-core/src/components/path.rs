//! Append-only waypoint sequences with a one-way cursor.

use serde::{Deserialize, Serialize};

use super::common::Position;
use crate::error::PathError;

/// Ordered waypoints plus a cursor marking how many have been consumed.
///
/// Consumed waypoints are never revisited; a fresh traversal needs a new
/// path (or [`Path::clear`] followed by new appends).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Path {
    nodes: Vec<Position>,
    cursor: usize,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a path from candidate waypoints, skipping any that are not valid positions.
    pub fn from_waypoints<I>(candidates: I) -> Self
    where
        I: IntoIterator,
        I::Item: TryInto<Position>,
    {
        let mut path = Self::new();
        path.append(candidates);
        path
    }

    /// Append candidates in order. Entries that cannot become a [`Position`]
    /// are skipped without aborting the batch. Returns how many were added.
    pub fn append<I>(&mut self, candidates: I) -> usize
    where
        I: IntoIterator,
        I::Item: TryInto<Position>,
    {
        let before = self.nodes.len();
        for candidate in candidates {
            if let Ok(pos) = candidate.try_into() {
                self.nodes.push(pos);
            }
        }
        self.nodes.len() - before
    }

    /// Append copies of every waypoint of `other`, consumed or not.
    pub fn concat(&mut self, other: &Path) {
        self.nodes.extend_from_slice(&other.nodes);
    }

    /// Summed Euclidean distance over the waypoints not yet consumed.
    pub fn length(&self) -> f64 {
        self.remaining()
            .windows(2)
            .map(|w| w[0].distance(&w[1]))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// There is at least one waypoint left to consume.
    pub fn is_iterable(&self) -> bool {
        self.cursor < self.nodes.len()
    }

    /// Total number of waypoints, consumed or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn consumed(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> &[Position] {
        &self.nodes[self.cursor..]
    }

    pub fn waypoints(&self) -> &[Position] {
        &self.nodes
    }

    /// Consume and return the next waypoint.
    pub fn step(&mut self) -> Result<Position, PathError> {
        let next = *self.nodes.get(self.cursor).ok_or(PathError::EndOfPath)?;
        self.cursor += 1;
        Ok(next)
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }
}
