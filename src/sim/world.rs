//! Ground segment ring
//!
//! A fixed number of road slabs stream toward the camera. When one passes the
//! near cutoff it jumps back by exactly the ring length, so the ring always
//! tiles the same stretch of road with no gaps or overlaps.

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::state::{Decor, ProxyCommand};
use crate::tuning::Tuning;

/// One road slab; `z` is its centre
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub z: f32,
    pub decor: Decor,
    /// Times this slab has wrapped
    pub recycles: u32,
}

/// Ring of ground segments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldRing {
    pub segments: Vec<Segment>,
    pub segment_length: f32,
}

impl WorldRing {
    /// Lay out the ring from the player forward and announce every slab
    pub fn new(tuning: &Tuning, rng: &mut Pcg32, commands: &mut Vec<ProxyCommand>) -> Self {
        let count = tuning.segment_count().max(1);
        let segment_length = tuning.segment_length;
        let segments = (0..count)
            .map(|index| {
                let z = -(index as f32) * segment_length;
                let decor = roll_decor(tuning, rng);
                commands.push(ProxyCommand::PlaceSegment { index, z, decor });
                Segment {
                    z,
                    decor,
                    recycles: 0,
                }
            })
            .collect();
        Self {
            segments,
            segment_length,
        }
    }

    /// Road length covered by the ring
    #[inline]
    pub fn ring_length(&self) -> f32 {
        self.segments.len() as f32 * self.segment_length
    }

    /// Segments past this z are behind the camera
    #[inline]
    pub fn near_cutoff(&self) -> f32 {
        self.segment_length
    }

    /// Stream every segment forward by `speed`, wrapping the ones that pass the cutoff
    pub fn advance(
        &mut self,
        speed: f32,
        tuning: &Tuning,
        rng: &mut Pcg32,
        commands: &mut Vec<ProxyCommand>,
    ) {
        let ring_length = self.ring_length();
        let cutoff = self.near_cutoff();
        for (index, segment) in self.segments.iter_mut().enumerate() {
            segment.z += speed;
            if segment.z > cutoff {
                segment.z -= ring_length;
                segment.decor = roll_decor(tuning, rng);
                segment.recycles += 1;
                log::debug!("Recycled segment {} to z={:.2}", index, segment.z);
                commands.push(ProxyCommand::RecycleSegment {
                    index,
                    z: segment.z,
                    decor: segment.decor,
                });
            }
        }
    }
}

fn roll_decor(tuning: &Tuning, rng: &mut Pcg32) -> Decor {
    Decor {
        lamps: rng.random_bool(tuning.lamp_chance),
        trees: rng.random_bool(tuning.tree_chance),
        buildings: rng.random_bool(tuning.building_chance),
    }
}
