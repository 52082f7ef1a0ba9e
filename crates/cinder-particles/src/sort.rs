//! Back-to-front ordering for alpha-blended drawing

use crate::particle::Particle;
use std::cmp::Ordering;

/// Stable sort of the whole pool by descending view distance.
///
/// Far particles come first so nearer ones blend over them. Dead slots
/// carry `-inf` and sink to the end, leaving the live particles as a prefix.
pub fn sort_back_to_front(particles: &mut [Particle]) {
    particles.sort_by(|a, b| {
        b.view_distance
            .partial_cmp(&a.view_distance)
            .unwrap_or(Ordering::Equal)
    });
}
