//! memoization of stop time templates across trips that share a shape,
//! stop set, and speed profile. most trips of a group differ only by their
//! start time, so the template is computed once at start time zero and each
//! trip applies its own offset.
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use crate::protofeed::StopRecord;
use crate::synth::{RoutePath, SpeedSample, StopTimeTemplateRow};

/// cache key over everything the stop time template depends on, computed as
/// an explicit content hash: canonical coordinate bit sequences, stop ids
/// and positions, profile rows, and the default speed. two distinct
/// in-memory inputs with identical content produce the same key; the trip
/// start time is deliberately excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TemplateKey(u64);

impl TemplateKey {
    pub fn new(
        path: &RoutePath,
        stops: &[StopRecord],
        route_type: u16,
        profile: &[SpeedSample],
        default_speed: f64,
    ) -> TemplateKey {
        let mut hasher = DefaultHasher::new();
        path.shape_id.hash(&mut hasher);
        for coord in path.geometry.coords() {
            coord.x.to_bits().hash(&mut hasher);
            coord.y.to_bits().hash(&mut hasher);
        }
        route_type.hash(&mut hasher);
        stops.len().hash(&mut hasher);
        for stop in stops.iter() {
            stop.stop_id.hash(&mut hasher);
            stop.stop_lon.to_bits().hash(&mut hasher);
            stop.stop_lat.to_bits().hash(&mut hasher);
        }
        profile.len().hash(&mut hasher);
        for sample in profile.iter() {
            sample.distance.to_bits().hash(&mut hasher);
            sample.position.hash(&mut hasher);
            sample.zone_id.hash(&mut hasher);
            sample.speed.to_bits().hash(&mut hasher);
        }
        default_speed.to_bits().hash(&mut hasher);
        TemplateKey(hasher.finish())
    }
}

/// process-local template store scoped to one generation run: written once
/// per distinct key, read once per trip
#[derive(Debug, Default)]
pub struct TemplateCache {
    entries: HashMap<TemplateKey, Vec<StopTimeTemplateRow>>,
}

impl TemplateCache {
    pub fn new() -> TemplateCache {
        TemplateCache {
            entries: HashMap::new(),
        }
    }

    /// the template for `key`, computing and storing it on first use
    pub fn get_or_insert_with<F>(&mut self, key: TemplateKey, compute: F) -> &[StopTimeTemplateRow]
    where
        F: FnOnce() -> Vec<StopTimeTemplateRow>,
    {
        self.entries.entry(key).or_insert_with(compute)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// drop all templates. called at the end of a generation run to bound
    /// the memory held through large geometry keys.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
