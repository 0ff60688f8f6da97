// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Runtime configuration for the [`Director`](crate::director::Director).

use understory_scene::DEFAULT_SNAPSHOT_CAPACITY;

/// Director settings.
///
/// ```
/// use understory_director::config::DirectorConfig;
///
/// let config = DirectorConfig {
///     min_switch_duration: 0.1,
///     ..Default::default()
/// };
/// assert_eq!(config.snapshot_capacity, 256);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectorConfig {
    /// Shortest accepted switch effect, in seconds.
    pub min_switch_duration: f64,
    /// Snapshot capacity for scenes created with
    /// [`Director::new_scene`](crate::director::Director::new_scene).
    pub snapshot_capacity: usize,
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            min_switch_duration: 0.05,
            snapshot_capacity: DEFAULT_SNAPSHOT_CAPACITY,
        }
    }
}
