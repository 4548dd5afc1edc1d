//! Per-cycle ordering of candidate session servers

use crate::types::ServerDescriptor;
use rand::{Rng, seq::SliceRandom};

/// Uniformly random permutation of `servers`
pub fn shuffled_with<R: Rng + ?Sized>(
    servers: &[ServerDescriptor],
    rng: &mut R,
) -> Vec<ServerDescriptor> {
    let mut order = servers.to_vec();
    order.shuffle(rng);
    order
}

pub fn shuffled(servers: &[ServerDescriptor]) -> Vec<ServerDescriptor> {
    shuffled_with(servers, &mut rand::thread_rng())
}

/// Holds the configured servers and hands out a fresh order per cycle
///
/// The configured list is never reordered in place.
#[derive(Debug, Clone)]
pub struct EndpointSelector {
    servers: Vec<ServerDescriptor>,
}

impl EndpointSelector {
    pub fn new(servers: Vec<ServerDescriptor>) -> Self {
        Self { servers }
    }

    pub fn servers(&self) -> &[ServerDescriptor] {
        &self.servers
    }

    /// Order in which this cycle tries the servers
    pub fn working_order(&self) -> Vec<ServerDescriptor> {
        shuffled(&self.servers)
    }
}
