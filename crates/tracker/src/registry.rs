// SPDX-FileCopyrightText: Copyright 2025 Au-Zone Technologies
// SPDX-License-Identifier: Apache-2.0

use crate::{ActiveTrack, Centroid};

/// Insertion-ordered map from identity to centroid.
///
/// Lookups scan in insertion order so the first match is reproducible. While
/// a frame is being processed, entries are only appended or overwritten in
/// place, so indices stay valid until [`Registry::end_frame`].
#[derive(Debug, Default, Clone)]
pub(crate) struct Registry {
    entries: Vec<ActiveTrack>,
    // per-entry flag: emitted during the frame in progress
    emitted: Vec<bool>,
    // entry indices in order of first emission this frame
    order: Vec<usize>,
}

impl Registry {
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveTrack> {
        self.entries.iter()
    }

    /// Index of the first entry strictly closer than `threshold`. Entries
    /// already emitted this frame are skipped when `skip_emitted` is set.
    pub fn find_first_within(
        &self,
        centroid: &Centroid,
        threshold: f64,
        skip_emitted: bool,
    ) -> Option<usize> {
        self.entries.iter().enumerate().position(|(i, entry)| {
            !(skip_emitted && self.emitted[i]) && entry.centroid.distance(centroid) < threshold
        })
    }

    pub fn id(&self, index: usize) -> u64 {
        self.entries[index].id
    }

    /// Overwrites the centroid of an entry and marks it emitted.
    pub fn refresh(&mut self, index: usize, centroid: Centroid) {
        self.entries[index].centroid = centroid;
        self.mark_emitted(index);
    }

    /// Appends a new entry and marks it emitted.
    pub fn insert(&mut self, id: u64, centroid: Centroid) {
        self.entries.push(ActiveTrack { id, centroid });
        self.emitted.push(false);
        self.mark_emitted(self.entries.len() - 1);
    }

    fn mark_emitted(&mut self, index: usize) {
        if !self.emitted[index] {
            self.emitted[index] = true;
            self.order.push(index);
        }
    }

    /// Rebuilds the registry from the entries emitted since the last call,
    /// in order of first emission. Returns the identities that were dropped.
    pub fn end_frame(&mut self) -> Vec<u64> {
        let evicted = self
            .entries
            .iter()
            .zip(&self.emitted)
            .filter(|(_, emitted)| !**emitted)
            .map(|(entry, _)| entry.id)
            .collect();

        let kept = self.order.iter().map(|&i| self.entries[i]).collect();
        self.entries = kept;
        self.emitted.clear();
        self.emitted.resize(self.entries.len(), false);
        self.order.clear();

        evicted
    }
}
