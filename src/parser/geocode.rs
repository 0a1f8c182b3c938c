//! Placeholder coordinates derived from address text.
//!
//! These are not geocodes. Two independent checksums of the address (plus the
//! grid reference) pick a point inside the configured bounding box, so markers
//! spread out on the map and the same address always lands on the same spot.

use crate::config::BoundingBox;
use crate::record::IncidentRecord;

/// Appended before the second checksum so the two axes don't move together.
const SECOND_AXIS_SUFFIX: &[u8] = b"#lon";

/// 32-bit checksum over a byte sequence.
pub trait Checksum {
    fn checksum(&self, bytes: &[u8]) -> u32;
}

/// IEEE CRC-32.
#[derive(Debug, Clone, Copy, Default)]
pub struct Crc32;

impl Checksum for Crc32 {
    fn checksum(&self, bytes: &[u8]) -> u32 {
        crc32fast::hash(bytes)
    }
}

/// Deterministic `(lat, lon)` for an address, or `None` when the address is
/// too short or the `"nan"` placeholder.
pub fn pseudo_geocode<C: Checksum + ?Sized>(
    address: &str,
    aux: &str,
    bbox: &BoundingBox,
    checksum: &C,
) -> Option<(f64, f64)> {
    let address = address.trim();
    if address.chars().count() < 3 || address == "nan" {
        return None;
    }

    let mut bytes = Vec::with_capacity(address.len() + aux.len() + SECOND_AXIS_SUFFIX.len());
    bytes.extend_from_slice(address.as_bytes());
    bytes.extend_from_slice(aux.as_bytes());
    let seed_a = checksum.checksum(&bytes);
    bytes.extend_from_slice(SECOND_AXIS_SUFFIX);
    let seed_b = checksum.checksum(&bytes);

    let lat = bbox.lat_min + unit(seed_a) * (bbox.lat_max - bbox.lat_min);
    let lon = bbox.lon_min + unit(seed_b) * (bbox.lon_max - bbox.lon_min);
    Some((lat, lon))
}

/// Set location on every record from its address and `Key Map` fields.
pub fn assign_locations<C: Checksum + ?Sized>(
    records: &mut [IncidentRecord],
    bbox: &BoundingBox,
    checksum: &C,
) {
    for record in records.iter_mut() {
        let coords = record.address_text().and_then(|address| {
            let aux = record.key_map.as_deref().unwrap_or("");
            pseudo_geocode(address, aux, bbox, checksum)
        });
        record.set_location(coords);
    }
}

/// Seed into [0, 1) with three decimal steps.
fn unit(seed: u32) -> f64 {
    (seed % 1000) as f64 / 1000.0
}

// ── Tests ──
