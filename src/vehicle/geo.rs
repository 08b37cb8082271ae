use std::fmt::{Display, Formatter};

/// Mean earth radius used by the local tangent plane projection.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A global position in WGS84 degrees with altitude above mean sea level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalPosition {
    pub lat_deg: f64,
    pub lon_deg: f64,
    pub alt_amsl_m: f64,
}

impl GlobalPosition {
    /// Horizontal acceptance for waypoint checks, in degrees.
    pub const LAT_LON_TOL_DEG: f64 = 1.0e-5;
    /// Vertical acceptance for waypoint checks, in meters.
    pub const ALT_TOL_M: f64 = 1.0;

    pub const fn new(lat_deg: f64, lon_deg: f64, alt_amsl_m: f64) -> Self {
        Self { lat_deg, lon_deg, alt_amsl_m }
    }

    pub const fn unknown() -> Self { Self::new(f64::NAN, f64::NAN, f64::NAN) }

    pub fn is_finite(&self) -> bool {
        self.lat_deg.is_finite() && self.lon_deg.is_finite() && self.alt_amsl_m.is_finite()
    }

    /// Returns `true` if `other` lies within the waypoint acceptance box around
    /// `self`. Any NaN component makes the check fail.
    pub fn within_tolerance(&self, other: &GlobalPosition) -> bool {
        (self.lat_deg - other.lat_deg).abs() <= Self::LAT_LON_TOL_DEG
            && (self.lon_deg - other.lon_deg).abs() <= Self::LAT_LON_TOL_DEG
            && (self.alt_amsl_m - other.alt_amsl_m).abs() <= Self::ALT_TOL_M
    }
}

impl Display for GlobalPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[lat {:.7} deg, lon {:.7} deg, alt {:.2} m AMSL]",
            self.lat_deg, self.lon_deg, self.alt_amsl_m
        )
    }
}

/// A position in the autopilot's local NED frame, in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalPosition {
    pub north_m: f64,
    pub east_m: f64,
    pub down_m: f64,
}

impl LocalPosition {
    pub const fn new(north_m: f64, east_m: f64, down_m: f64) -> Self {
        Self { north_m, east_m, down_m }
    }

    pub const fn unknown() -> Self { Self::new(f64::NAN, f64::NAN, f64::NAN) }

    /// Rotates a body-frame offset (x forward, y right) by `yaw_rad` and adds it
    /// to this position. The vertical component is left untouched.
    pub fn offset_by_body(&self, offset_x: f64, offset_y: f64, yaw_rad: f64) -> LocalPosition {
        let (sin_y, cos_y) = yaw_rad.sin_cos();
        LocalPosition::new(
            cos_y * offset_x - sin_y * offset_y + self.north_m,
            sin_y * offset_x + cos_y * offset_y + self.east_m,
            self.down_m,
        )
    }
}

/// Latitude/longitude of the local frame's origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalOrigin {
    pub lat_deg: f64,
    pub lon_deg: f64,
}

impl GlobalOrigin {
    /// Projects a local NED position back onto the globe using the azimuthal
    /// equidistant projection around this origin. Returns `(lat_deg, lon_deg)`.
    pub fn global_from_local(&self, local: &LocalPosition) -> (f64, f64) {
        let x_rad = local.north_m / EARTH_RADIUS_M;
        let y_rad = local.east_m / EARTH_RADIUS_M;
        let c = x_rad.hypot(y_rad);
        let ref_lat = self.lat_deg.to_radians();
        let ref_lon = self.lon_deg.to_radians();
        let (sin_c, cos_c) = c.sin_cos();
        let (sin_ref, cos_ref) = ref_lat.sin_cos();

        let (lat, lon) = if c == 0.0 {
            (ref_lat, ref_lon)
        } else {
            let lat = (cos_c * sin_ref + (x_rad * sin_c * cos_ref) / c).asin();
            let lon = ref_lon + (y_rad * sin_c).atan2(c * cos_ref * cos_c - x_rad * sin_ref * sin_c);
            (lat, lon)
        };
        (lat.to_degrees(), lon.to_degrees())
    }
}

/// The reposition target most recently commanded by the decision engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct WaypointTarget {
    target: Option<GlobalPosition>,
    last_commanded: Option<GlobalPosition>,
}

impl WaypointTarget {
    pub fn new() -> Self { Self::default() }

    pub fn target(&self) -> Option<GlobalPosition> { self.target }

    /// Sets a new target, superseding any previous one.
    pub fn set(&mut self, pos: GlobalPosition) {
        self.target = Some(pos);
        self.last_commanded = Some(pos);
    }

    pub fn clear(&mut self) { self.target = None; }

    /// Whether `pos` equals the last commanded waypoint within tolerance,
    /// even if that waypoint was already reached and cleared.
    pub fn was_commanded(&self, pos: &GlobalPosition) -> bool {
        self.last_commanded.is_some_and(|prev| prev.within_tolerance(pos))
    }

    /// Checks whether `current` is within the acceptance box of the active
    /// target. Without a target this is always `false`.
    pub fn arrived(&self, current: &GlobalPosition) -> bool {
        self.target.is_some_and(|t| t.within_tolerance(current))
    }
}
