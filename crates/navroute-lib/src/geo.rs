//! Geographic primitives used by the routing core.
//!
//! Positions enter the library as longitude/latitude pairs ([`Pos`]) and are
//! converted once into earth-centred Cartesian coordinates ([`Point3D`]) so
//! that the spatial index and the search can work with plain Euclidean
//! arithmetic.

use serde::{Deserialize, Serialize};

/// Mean earth radius in meters.
pub const EARTH_RADIUS_METER: f64 = 6_371_000.0;

const METER_PER_NM: f32 = 1852.0;
const METER_PER_FOOT: f32 = 0.3048;

/// Convert nautical miles to meters.
pub fn nm_to_meter(nm: f32) -> f32 {
    nm * METER_PER_NM
}

/// Convert meters to nautical miles.
pub fn meter_to_nm(meter: f32) -> f32 {
    meter / METER_PER_NM
}

/// Convert feet to meters.
pub fn feet_to_meter(feet: f32) -> f32 {
    feet * METER_PER_FOOT
}

/// Geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pos {
    pub lon_x: f32,
    pub lat_y: f32,
}

impl Pos {
    pub fn new(lon_x: f32, lat_y: f32) -> Self {
        Self { lon_x, lat_y }
    }

    /// A position is valid when both coordinates are finite and in range.
    pub fn is_valid(&self) -> bool {
        self.lon_x.is_finite()
            && self.lat_y.is_finite()
            && (-180.0..=180.0).contains(&self.lon_x)
            && (-90.0..=90.0).contains(&self.lat_y)
    }

    /// Great-circle distance using the haversine formula.
    pub fn distance_meter_to(&self, other: &Pos) -> f32 {
        let lat1 = f64::from(self.lat_y).to_radians();
        let lat2 = f64::from(other.lat_y).to_radians();
        let dlat = lat2 - lat1;
        let dlon = (f64::from(other.lon_x) - f64::from(self.lon_x)).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        (2.0 * EARTH_RADIUS_METER * a.sqrt().min(1.0).asin()) as f32
    }
}

/// Earth-centred Cartesian coordinate in meters.
///
/// The all-zero point is used as the invalid marker since no surface position
/// can map onto the earth's centre.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3D {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3D {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn is_valid(&self) -> bool {
        !(self.x == 0.0 && self.y == 0.0 && self.z == 0.0)
    }

    /// Squared Euclidean distance. Only useful for ranking.
    pub fn comparable_distance(&self, other: &Point3D) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    /// Straight line (chord) distance through the earth.
    ///
    /// Always less than or equal to the great-circle distance.
    pub fn direct_distance_meter(&self, other: &Point3D) -> f32 {
        self.comparable_distance(other).sqrt()
    }

    /// Great-circle distance derived from the chord length.
    pub fn gc_distance_meter(&self, other: &Point3D) -> f32 {
        gc_from_chord(f64::from(self.direct_distance_meter(other)))
    }

    /// Coordinates as an array in the layout used by the KD-tree.
    pub fn coords(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    /// Project back onto the sphere. Returns `None` for the invalid point.
    pub fn to_pos(&self) -> Option<Pos> {
        if !self.is_valid() {
            return None;
        }
        let (x, y, z) = (f64::from(self.x), f64::from(self.y), f64::from(self.z));
        let lat = z.atan2((x * x + y * y).sqrt()).to_degrees();
        let lon = y.atan2(x).to_degrees();
        Some(Pos::new(lon as f32, lat as f32))
    }
}

impl From<Pos> for Point3D {
    fn from(pos: Pos) -> Self {
        if !pos.is_valid() {
            return Point3D::default();
        }
        let lon = f64::from(pos.lon_x).to_radians();
        let lat = f64::from(pos.lat_y).to_radians();
        Point3D {
            x: (EARTH_RADIUS_METER * lat.cos() * lon.cos()) as f32,
            y: (EARTH_RADIUS_METER * lat.cos() * lon.sin()) as f32,
            z: (EARTH_RADIUS_METER * lat.sin()) as f32,
        }
    }
}

/// `asin` is clamped since rounding can push the ratio slightly above one for
/// almost antipodal points.
fn gc_from_chord(chord: f64) -> f32 {
    let ratio = (chord / (2.0 * EARTH_RADIUS_METER)).min(1.0);
    (2.0 * EARTH_RADIUS_METER * ratio.asin()) as f32
}
