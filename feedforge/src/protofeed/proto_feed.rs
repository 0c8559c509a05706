use std::collections::HashMap;

use crate::protofeed::{
    protofeed_ops, FrequencyRow, FrequencySpec, Meta, ProtoShape, ServiceWindow, SpeedZone,
    StopRecord,
};

/// the in-memory source data from which a GTFS feed is synthesized. built
/// from files via `protofeed_ops::read_protofeed`, or assembled directly in
/// tests. immutable once constructed.
#[derive(Debug, Clone)]
pub struct ProtoFeed {
    pub meta: Meta,
    pub service_windows: Vec<ServiceWindow>,
    pub shapes: Vec<ProtoShape>,
    pub frequencies: Vec<FrequencySpec>,
    /// pre-supplied stop table; when absent, stops are generated at shape
    /// endpoints during feed assembly
    pub stops: Option<Vec<StopRecord>>,
    /// tidied speed zones: per route type, a partition of the service area
    /// where uncovered regions carry the unbounded sentinel speed
    pub speed_zones: Vec<SpeedZone>,
}

impl ProtoFeed {
    pub fn new(
        meta: Meta,
        service_windows: Vec<ServiceWindow>,
        shapes: Vec<ProtoShape>,
        frequency_rows: Vec<FrequencyRow>,
        stops: Option<Vec<StopRecord>>,
        speed_zones: Vec<SpeedZone>,
    ) -> ProtoFeed {
        let frequencies = frequency_rows
            .into_iter()
            .map(|row| FrequencySpec::resolve(row, &meta))
            .collect();
        let speed_zones = protofeed_ops::tidy_speed_zones(speed_zones, &shapes);
        ProtoFeed {
            meta,
            service_windows,
            shapes,
            frequencies,
            stops,
            speed_zones,
        }
    }

    pub fn window(&self, service_window_id: &str) -> Option<&ServiceWindow> {
        self.service_windows
            .iter()
            .find(|w| w.service_window_id == service_window_id)
    }

    /// for each shape referenced by the frequencies, the trip directions
    /// using it: 0, 1, or 2 (both). a shape referenced with more than one
    /// distinct direction counts as 2.
    pub fn directions_by_shape(&self) -> HashMap<String, u8> {
        let mut directions: HashMap<String, Vec<u8>> = HashMap::new();
        for spec in self.frequencies.iter() {
            let seen = directions.entry(spec.shape_id.clone()).or_default();
            if !seen.contains(&spec.direction) {
                seen.push(spec.direction);
            }
        }
        directions
            .into_iter()
            .map(|(shape_id, dirs)| {
                let dir = if dirs.len() > 1 || dirs.contains(&2) {
                    2
                } else {
                    dirs[0]
                };
                (shape_id, dir)
            })
            .collect()
    }
}
