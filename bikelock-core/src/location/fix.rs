//! Position fix type

/// Sentinel coordinate meaning "no fix yet"
///
/// Outside every valid latitude and longitude.
pub const NO_FIX: f32 = 1000.0;

/// One acquired position sample
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Fix {
    /// Latitude in degrees (-90 to 90)
    pub latitude: f32,
    /// Longitude in degrees (-180 to 180)
    pub longitude: f32,
}

impl Fix {
    /// Create a fix, rejecting out-of-range coordinates
    pub fn new(latitude: f32, longitude: f32) -> Option<Self> {
        let fix = Self {
            latitude,
            longitude,
        };
        fix.is_valid().then_some(fix)
    }

    /// Check that both coordinates are in range
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_fix() {
        let fix = Fix::new(31.2304, 121.4737).unwrap();
        assert!(fix.is_valid());
    }

    #[test]
    fn test_sentinel_is_invalid() {
        assert!(Fix::new(NO_FIX, NO_FIX).is_none());
        assert!(Fix::new(91.0, 0.0).is_none());
        assert!(Fix::new(0.0, -180.5).is_none());
        assert!(Fix::new(f32::NAN, 0.0).is_none());
    }
}
