//! ADC battery gauge
//!
//! The pack voltage is divided down to the ADC range and converted to a
//! charge estimate with a lookup table of a single Li-ion cell's
//! discharge curve.

use bikelock_core::traits::BatteryGauge;

/// Cell voltage to charge lookup table
///
/// Table format: (cell_mv, percent)
/// Sorted by decreasing voltage. Readings above the first entry count as
/// full, readings below the last as empty.
const CHARGE_TABLE: &[(u16, u8)] = &[
    (4200, 100),
    (4100, 90),
    (4000, 78),
    (3900, 65),
    (3800, 52),
    (3700, 38),
    (3600, 20),
    (3500, 8),
    (3300, 0),
];

/// Readings below this many millivolts mean the divider is disconnected
const DISCONNECTED_MV: u32 = 500;

/// ADC reading trait for platform abstraction
pub trait AdcReader {
    /// Read ADC value (12-bit, 0-4095)
    #[allow(clippy::result_unit_err)]
    fn read(&mut self) -> Result<u16, ()>;
}

/// Battery gauge errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BatteryError {
    /// ADC conversion failed
    Conversion,
    /// Reading too low to come from a connected battery
    Disconnected,
}

/// Battery gauge behind a resistor divider
///
/// Circuit: VBAT -- r_top -- ADC_PIN -- r_bottom -- GND
pub struct AdcBattery<ADC> {
    adc: ADC,
    /// ADC reference voltage in mV
    vref_mv: u16,
    /// Upper divider resistor in ohms
    r_top_ohms: u32,
    /// Lower divider resistor in ohms
    r_bottom_ohms: u32,
    /// ADC resolution (typically 4096 for 12-bit)
    adc_max: u16,
}

impl<ADC> AdcBattery<ADC> {
    /// Create a new battery gauge
    ///
    /// # Arguments
    /// - `adc`: ADC channel wired to the divider midpoint
    /// - `vref_mv`: Reference voltage in millivolts (typically 3300)
    /// - `r_top_ohms`, `r_bottom_ohms`: Divider resistors
    pub fn new(adc: ADC, vref_mv: u16, r_top_ohms: u32, r_bottom_ohms: u32) -> Self {
        Self {
            adc,
            vref_mv,
            r_top_ohms,
            r_bottom_ohms,
            adc_max: 4096, // 12-bit ADC
        }
    }

    /// Convert an ADC reading to battery millivolts
    pub fn adc_to_millivolts(&self, adc_value: u16) -> Result<u32, BatteryError> {
        let pin_mv = adc_value as u64 * self.vref_mv as u64 / self.adc_max as u64;
        let divider = (self.r_top_ohms as u64 + self.r_bottom_ohms as u64).max(1);
        let bottom = (self.r_bottom_ohms as u64).max(1);
        let battery_mv = (pin_mv * divider / bottom) as u32;

        if battery_mv < DISCONNECTED_MV {
            return Err(BatteryError::Disconnected);
        }
        Ok(battery_mv)
    }

    /// Estimate charge from cell voltage using the lookup table
    ///
    /// Returns 0.0 to 100.0 with linear interpolation between entries.
    pub fn millivolts_to_percent(mv: u32) -> f32 {
        let (full_mv, _) = CHARGE_TABLE[0];
        let (empty_mv, _) = CHARGE_TABLE[CHARGE_TABLE.len() - 1];
        if mv >= full_mv as u32 {
            return 100.0;
        }
        if mv <= empty_mv as u32 {
            return 0.0;
        }

        for pair in CHARGE_TABLE.windows(2) {
            let (v_high, p_high) = pair[0];
            let (v_low, p_low) = pair[1];

            if mv <= v_high as u32 && mv >= v_low as u32 {
                let v_range = (v_high - v_low) as f32;
                let p_range = (p_high - p_low) as f32;
                let v_offset = (mv - v_low as u32) as f32;
                return p_low as f32 + p_range * v_offset / v_range;
            }
        }

        0.0
    }
}

impl<ADC: AdcReader> BatteryGauge for AdcBattery<ADC> {
    type Error = BatteryError;

    fn level_percent(&mut self) -> Result<f32, BatteryError> {
        let adc_value = self.adc.read().map_err(|_| BatteryError::Conversion)?;
        let mv = self.adc_to_millivolts(adc_value)?;
        Ok(Self::millivolts_to_percent(mv))
    }
}

/// Dummy ADC for testing (returns a fixed value)
#[cfg(test)]
pub struct DummyAdc(pub Option<u16>);

#[cfg(test)]
impl AdcReader for DummyAdc {
    fn read(&mut self) -> Result<u16, ()> {
        self.0.ok_or(())
    }
}
