// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::demand::Demand;
use backflux_error::BackfluxError;

/// Point-in-time view of an operator's internal counters.
///
/// Produced by [`Subscription::snapshot`](crate::Subscription::snapshot). Taking
/// a snapshot has no side effects.
#[derive(Debug, Clone)]
pub struct OperatorSnapshot {
    /// Name of the upstream subscription, once subscribed.
    pub parent: Option<&'static str>,
    /// Name of the downstream subscriber.
    pub actual: &'static str,
    pub prefetch: usize,
    /// Queue capacity, `prefetch + 1`.
    pub capacity: usize,
    /// Elements held: queued plus the one being evaluated or awaiting demand.
    pub buffered: usize,
    /// Demand granted downstream and not yet fulfilled.
    pub requested_from_downstream: Demand,
    /// The terminal error, once one was retained.
    pub error: Option<BackfluxError>,
    pub cancelled: bool,
    /// Completed or errored.
    pub terminated: bool,
    /// Whether upstream is polled directly instead of pushing.
    pub fused: bool,
}
