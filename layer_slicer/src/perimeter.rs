use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::{
    segments::{point_key, PointKey, Segment},
    Point,
};

/// Chain of segments where each segment starts where the previous one ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Perimeter {
    segments: Vec<Segment>,
}

impl Perimeter {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// A perimeter is closed when its last segment ends where the first one
    /// starts.
    pub fn is_closed(&self) -> bool {
        match (self.segments.first(), self.segments.last()) {
            (Some(first), Some(last)) => first.a == last.b,
            _ => false,
        }
    }

    /// Vertices of the outline in order. The end point is only repeated for
    /// open perimeters.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        let end = (!self.is_closed()).then(|| self.segments.last().map(|x| x.b));
        self.segments.iter().map(|x| x.a).chain(end.flatten())
    }

    /// Largest x of the start point of any segment.
    pub fn max_start_x(&self) -> f32 {
        self.segments
            .iter()
            .map(|x| x.a.x)
            .fold(f32::NEG_INFINITY, f32::max)
    }
}

/// Chains an unordered set of segments into perimeters, consuming them.
///
/// A perimeter is started with the first unused segment and grown by
/// repeatedly appending the first unused segment (in input order) that
/// touches its trailing end, flipped if needed. It ends once it closes on its
/// start or when nothing touches the trailing end; in the latter case the
/// open chain is still returned.
pub fn reconstruct(segments: Vec<Segment>) -> Vec<Perimeter> {
    // Segments touching each endpoint. Indices are pushed in order so every
    // list is sorted, so the first unused entry is the one a linear scan over
    // the remaining segments would find.
    let mut endpoints = HashMap::<PointKey, Vec<usize>>::new();
    for (idx, segment) in segments.iter().enumerate() {
        endpoints.entry(point_key(&segment.a)).or_default().push(idx);
        if segment.b != segment.a {
            endpoints.entry(point_key(&segment.b)).or_default().push(idx);
        }
    }

    let mut used = vec![false; segments.len()];
    let mut perimeters = Vec::new();

    let mut next = 0;
    while let Some(start) = (next..segments.len()).find(|&x| !used[x]) {
        next = start + 1;
        used[start] = true;

        let first = segments[start];
        let mut chain = vec![first];
        let mut tail = first.b;

        while tail != first.a {
            let candidate = endpoints
                .get(&point_key(&tail))
                .and_then(|x| x.iter().copied().find(|&x| !used[x]));
            let Some(idx) = candidate else {
                debug!(
                    "Open perimeter of {} segments from ({}, {}) to ({}, {})",
                    chain.len(),
                    first.a.x,
                    first.a.y,
                    tail.x,
                    tail.y
                );
                break;
            };

            used[idx] = true;
            let segment = segments[idx];
            let segment = if segment.a == tail {
                segment
            } else {
                segment.reversed()
            };

            tail = segment.b;
            chain.push(segment);
        }

        perimeters.push(Perimeter::new(chain));
    }

    perimeters
}
