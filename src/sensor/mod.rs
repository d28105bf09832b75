// src/sensor/mod.rs

// Sensor reading sources. A source couples one hardware driver with the
// identity of the sensor it reads (kind + instance id) and turns a raw
// acquisition into a `Reading`. Scheduling lives in `crate::scheduler`.

use core::convert::Infallible;

use crate::common::{Reading, SensorDriver, SensorKind, SequenceCounter};

/// One physical sensor instance and its driver.
#[derive(Debug)]
pub struct SensorSource<D> {
    kind: SensorKind,
    sensor_id: u8,
    driver: D,
}

impl<D: SensorDriver> SensorSource<D> {
    pub fn new(kind: SensorKind, sensor_id: u8, driver: D) -> Self {
        SensorSource {
            kind,
            sensor_id,
            driver,
        }
    }

    /// TSL2591 light sensor on the I2C bus.
    pub fn irradiance(sensor_id: u8, driver: D) -> Self {
        Self::new(SensorKind::Irradiance, sensor_id, driver)
    }

    /// MAX31865 RTD front end behind SPI chip select `probe`.
    pub fn temperature(probe: u8, driver: D) -> Self {
        Self::new(SensorKind::Temperature, probe, driver)
    }

    #[inline]
    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    #[inline]
    pub fn sensor_id(&self) -> u8 {
        self.sensor_id
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Performs one acquisition. The sequence number is only consumed when
    /// the driver succeeds, so gaps never appear on the bus.
    pub fn read(&mut self, sequence: &mut SequenceCounter) -> Result<Reading, D::Error> {
        let value = self.driver.sample()?;
        Ok(Reading::new(self.kind, self.sensor_id, value, sequence.next()))
    }
}

/// Driver that always returns the same value.
///
/// Stands in for the TSL2591 and MAX31865 acquisitions until their register
/// sequences and calibration are written; the boards report `0.0` meanwhile.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConstantDriver {
    value: f32,
}

impl ConstantDriver {
    pub const fn new(value: f32) -> Self {
        ConstantDriver { value }
    }
}

impl SensorDriver for ConstantDriver {
    type Error = Infallible;

    fn sample(&mut self) -> Result<f32, Self::Error> {
        Ok(self.value)
    }
}
