use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use geo::{coord, BooleanOps, BoundingRect, MultiPolygon, Polygon, Rect};
use geojson::GeoJson;
use serde::de::DeserializeOwned;

use crate::protofeed::{
    FrequencyRow, Meta, ProtoFeed, ProtoFeedError, ProtoShape, ServiceWindow, SpeedZone,
    StopRecord, DEFAULT_ZONE_ID,
};

/// meters to expand the bounding box of the shapes by when deriving the
/// service area that speed zones are clipped to
pub const SERVICE_AREA_MARGIN: f64 = 1000.0;

/// read the protofeed files in the given directory and assemble a
/// [ProtoFeed]. required: meta.csv, service_windows.csv, frequencies.csv,
/// shapes.geojson. optional: stops.csv, speed_zones.geojson.
///
/// schema-level validation beyond what deserialization enforces is out of
/// scope here and assumed done upstream.
pub fn read_protofeed(dir: &Path) -> Result<ProtoFeed, ProtoFeedError> {
    let mut meta_rows: Vec<Meta> = read_csv_rows(&dir.join("meta.csv"))?;
    if meta_rows.len() != 1 {
        return Err(ProtoFeedError::InvalidMetaError);
    }
    let meta = meta_rows.remove(0);

    let service_windows: Vec<ServiceWindow> = read_csv_rows(&dir.join("service_windows.csv"))?;
    let frequency_rows: Vec<FrequencyRow> = read_csv_rows(&dir.join("frequencies.csv"))?;
    let shapes = read_shapes(&dir.join("shapes.geojson"))?;

    let stops_path = dir.join("stops.csv");
    let stops: Option<Vec<StopRecord>> = if stops_path.exists() {
        Some(read_csv_rows(&stops_path)?)
    } else {
        None
    };

    let zones_path = dir.join("speed_zones.geojson");
    let speed_zones = if zones_path.exists() {
        read_speed_zones(&zones_path)?
    } else {
        Vec::new()
    };

    log::info!(
        "read protofeed from {}: {} service windows, {} shapes, {} frequencies, {} stops, {} speed zones",
        dir.display(),
        service_windows.len(),
        shapes.len(),
        frequency_rows.len(),
        stops.as_ref().map(|s| s.len()).unwrap_or(0),
        speed_zones.len()
    );

    Ok(ProtoFeed::new(
        meta,
        service_windows,
        shapes,
        frequency_rows,
        stops,
        speed_zones,
    ))
}

/// deserialize all rows of a headered CSV file
fn read_csv_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, ProtoFeedError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| ProtoFeedError::CsvReadError {
            path: path.display().to_string(),
            message: format!("{e}"),
        })?;

    let mut rows = Vec::new();
    for result in reader.deserialize::<T>() {
        let row = result.map_err(|e| ProtoFeedError::CsvReadError {
            path: path.display().to_string(),
            message: format!("{e}"),
        })?;
        rows.push(row);
    }
    Ok(rows)
}

fn read_feature_collection(path: &Path) -> Result<geojson::FeatureCollection, ProtoFeedError> {
    let text = fs::read_to_string(path).map_err(|e| ProtoFeedError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    let geojson: GeoJson = text.parse().map_err(|e| ProtoFeedError::GeoJsonReadError {
        path: path.display().to_string(),
        message: format!("{e}"),
    })?;
    match geojson {
        GeoJson::FeatureCollection(collection) => Ok(collection),
        _ => Err(ProtoFeedError::GeoJsonReadError {
            path: path.display().to_string(),
            message: String::from("expected a FeatureCollection"),
        }),
    }
}

fn read_shapes(path: &Path) -> Result<Vec<ProtoShape>, ProtoFeedError> {
    let collection = read_feature_collection(path)?;
    let mut shapes = Vec::with_capacity(collection.features.len());
    for feature in collection.features {
        let shape_id = feature
            .property("shape_id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ProtoFeedError::MissingPropertyError(String::from("shape_id")))?
            .to_string();
        let geometry = feature.geometry.ok_or_else(|| {
            ProtoFeedError::InvalidGeometryError(
                shape_id.clone(),
                String::from("feature has no geometry"),
            )
        })?;
        let linestring = geo::LineString::<f64>::try_from(geometry.value)
            .map_err(|e| ProtoFeedError::InvalidGeometryError(shape_id.clone(), format!("{e}")))?;
        shapes.push(ProtoShape {
            shape_id,
            geometry: linestring,
        });
    }
    Ok(shapes)
}

fn read_speed_zones(path: &Path) -> Result<Vec<SpeedZone>, ProtoFeedError> {
    let collection = read_feature_collection(path)?;
    let mut zones = Vec::with_capacity(collection.features.len());
    for feature in collection.features {
        let zone_id = feature
            .property("zone_id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ProtoFeedError::MissingPropertyError(String::from("zone_id")))?
            .to_string();
        let route_type = feature
            .property("route_type")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| ProtoFeedError::MissingPropertyError(String::from("route_type")))?
            as u16;
        // a zone without its own speed is an unbounded zone
        let speed = feature
            .property("speed")
            .and_then(|v| v.as_f64())
            .unwrap_or(f64::INFINITY);
        let geometry = feature.geometry.ok_or_else(|| {
            ProtoFeedError::InvalidGeometryError(
                zone_id.clone(),
                String::from("feature has no geometry"),
            )
        })?;
        let polygons = match geometry.value {
            value @ geojson::Value::Polygon(_) => {
                let polygon = Polygon::<f64>::try_from(value).map_err(|e| {
                    ProtoFeedError::InvalidGeometryError(zone_id.clone(), format!("{e}"))
                })?;
                MultiPolygon::new(vec![polygon])
            }
            value @ geojson::Value::MultiPolygon(_) => MultiPolygon::<f64>::try_from(value)
                .map_err(|e| {
                    ProtoFeedError::InvalidGeometryError(zone_id.clone(), format!("{e}"))
                })?,
            _ => {
                return Err(ProtoFeedError::InvalidGeometryError(
                    zone_id,
                    String::from("expected Polygon or MultiPolygon geometry"),
                ))
            }
        };
        zones.push(SpeedZone {
            zone_id,
            route_type,
            speed,
            geometry: polygons,
        });
    }
    Ok(zones)
}

/// clip the speed zones of each route type to the service area (the
/// bounding box of all shapes expanded by [SERVICE_AREA_MARGIN]) and cover
/// the remainder with an unbounded `default` zone, so every route type with
/// zones gets a full partition of the service area. route types with no
/// zones stay zone-less and fall back entirely to their default speed.
pub fn tidy_speed_zones(zones: Vec<SpeedZone>, shapes: &[ProtoShape]) -> Vec<SpeedZone> {
    if zones.is_empty() {
        return zones;
    }
    let service_area = match service_area(shapes) {
        Some(area) => area,
        None => return zones,
    };

    let mut by_type: BTreeMap<u16, Vec<SpeedZone>> = BTreeMap::new();
    for zone in zones {
        by_type.entry(zone.route_type).or_default().push(zone);
    }

    let mut tidied = Vec::new();
    for (route_type, group) in by_type {
        let mut covered: MultiPolygon<f64> = MultiPolygon::new(vec![]);
        let mut kept = Vec::new();
        for zone in group {
            let clipped = zone.geometry.intersection(&service_area);
            if clipped.0.is_empty() {
                log::warn!(
                    "speed zone {} (route type {}) lies outside the service area",
                    zone.zone_id,
                    route_type
                );
                continue;
            }
            covered = covered.union(&clipped);
            kept.push(SpeedZone {
                geometry: clipped,
                ..zone
            });
        }
        let remainder = service_area.difference(&covered);
        if !remainder.0.is_empty() {
            kept.push(SpeedZone {
                zone_id: DEFAULT_ZONE_ID.to_string(),
                route_type,
                speed: f64::INFINITY,
                geometry: remainder,
            });
        }
        kept.sort_by(|a, b| a.zone_id.cmp(&b.zone_id));
        tidied.extend(kept);
    }
    tidied
}

fn service_area(shapes: &[ProtoShape]) -> Option<Polygon<f64>> {
    let mut bounds: Option<Rect<f64>> = None;
    for shape in shapes {
        if let Some(rect) = shape.geometry.bounding_rect() {
            bounds = Some(match bounds {
                None => rect,
                Some(acc) => Rect::new(
                    coord! {
                        x: acc.min().x.min(rect.min().x),
                        y: acc.min().y.min(rect.min().y),
                    },
                    coord! {
                        x: acc.max().x.max(rect.max().x),
                        y: acc.max().y.max(rect.max().y),
                    },
                ),
            });
        }
    }
    let rect = bounds?;
    Some(
        Rect::new(
            coord! {
                x: rect.min().x - SERVICE_AREA_MARGIN,
                y: rect.min().y - SERVICE_AREA_MARGIN,
            },
            coord! {
                x: rect.max().x + SERVICE_AREA_MARGIN,
                y: rect.max().y + SERVICE_AREA_MARGIN,
            },
        )
        .to_polygon(),
    )
}
