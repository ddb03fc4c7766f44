//! Thermal zone enumeration from `/sys/class/thermal`.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::collector::traits::FileSystem;

const SYS_CLASS_THERMAL: &str = "/sys/class/thermal";
const ZONE_PREFIX: &str = "thermal_zone";

/// Current reading of one thermal zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThermalZone {
    /// Directory name, e.g. `thermal_zone0`.
    pub name: String,
    /// Driver-reported type, e.g. `x86_pkg_temp`.
    pub kind: String,
    /// Temperature in millidegrees Celsius.
    pub millidegrees: i64,
    /// Critical trip point in millidegrees Celsius, if the zone declares one.
    pub critical: Option<i64>,
}

fn read_i64(fs: &dyn FileSystem, path: &Path) -> Option<i64> {
    fs.read_to_string(path).ok()?.trim().parse().ok()
}

fn critical_trip(fs: &dyn FileSystem, zone: &Path) -> Option<i64> {
    (0..16).find_map(|i| {
        let kind = fs
            .read_to_string(&zone.join(format!("trip_point_{i}_type")))
            .ok()?;
        if kind.trim() != "critical" {
            return None;
        }
        read_i64(fs, &zone.join(format!("trip_point_{i}_temp")))
    })
}

/// Lists readable thermal zones ordered by zone index.
///
/// Zones whose `temp` cannot be read are skipped; a missing thermal class
/// yields an empty list.
pub fn list_thermal_zones(fs: &dyn FileSystem) -> Vec<ThermalZone> {
    let Ok(entries) = fs.read_dir(Path::new(SYS_CLASS_THERMAL)) else {
        return Vec::new();
    };

    let mut zones: Vec<(u32, PathBuf)> = entries
        .into_iter()
        .filter_map(|path| {
            let index = path
                .file_name()?
                .to_str()?
                .strip_prefix(ZONE_PREFIX)?
                .parse()
                .ok()?;
            Some((index, path))
        })
        .collect();
    zones.sort_by_key(|(index, _)| *index);

    zones
        .into_iter()
        .filter_map(|(index, dir)| {
            let Some(millidegrees) = read_i64(fs, &dir.join("temp")) else {
                debug!(zone = index, "skipping thermal zone without a readable temperature");
                return None;
            };
            let kind = fs
                .read_to_string(&dir.join("type"))
                .map(|k| k.trim().to_string())
                .unwrap_or_default();
            Some(ThermalZone {
                name: format!("{ZONE_PREFIX}{index}"),
                kind,
                millidegrees,
                critical: critical_trip(fs, &dir),
            })
        })
        .collect()
}
