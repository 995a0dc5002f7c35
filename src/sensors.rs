//! Live changes of the active sensor set.

use bitflags::bitflags;

use crate::{state::State, transport::Transport, Dmp, Error, Platform};

bitflags! {
  /// Sensor axes and the DMP processor, as requested by the application.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
  pub struct Sensors: u32 {
    const X_GYRO = 0x0001;
    const Y_GYRO = 0x0002;
    const Z_GYRO = 0x0004;
    const DMP_PROCESSOR = 0x0008;
    const X_ACCEL = 0x0010;
    const Y_ACCEL = 0x0020;
    const Z_ACCEL = 0x0040;
    const X_COMPASS = 0x0080;
    const Y_COMPASS = 0x0100;
    const Z_COMPASS = 0x0200;
    const X_PRESSURE = 0x0400;
    const Y_PRESSURE = 0x0800;
    const Z_PRESSURE = 0x1000;

    const THREE_AXIS_GYRO = Self::X_GYRO.bits() | Self::Y_GYRO.bits() | Self::Z_GYRO.bits();
    const THREE_AXIS_ACCEL = Self::X_ACCEL.bits() | Self::Y_ACCEL.bits() | Self::Z_ACCEL.bits();
    const THREE_AXIS_COMPASS = Self::X_COMPASS.bits() | Self::Y_COMPASS.bits() | Self::Z_COMPASS.bits();
    const THREE_AXIS_PRESSURE = Self::X_PRESSURE.bits() | Self::Y_PRESSURE.bits() | Self::Z_PRESSURE.bits();
    const SIX_AXIS = Self::THREE_AXIS_GYRO.bits() | Self::THREE_AXIS_ACCEL.bits();
    const NINE_AXIS = Self::SIX_AXIS.bits() | Self::THREE_AXIS_COMPASS.bits();
  }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Sensors {
  fn format(&self, f: defmt::Formatter) {
    defmt::write!(f, "Sensors({=u32:#x})", self.bits())
  }
}

/// Accelerometer interrupt mode after resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccelIrq {
  None,
  DataReady,
}

/// Accelerometer settings that take effect on resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccelConfig {
  /// Output data rate in mHz.
  OdrResume(u32),
  IrqResume(AccelIrq),
}

/// Sensor power layer.
#[allow(async_fn_in_trait)]
pub trait SensorControl {
  async fn start_sensors<T: Transport>(&mut self, bus: &mut T, sensors: Sensors) -> Result<(), Error<T::Error>>;
  async fn stop_sensors<T: Transport>(&mut self, bus: &mut T, sensors: Sensors) -> Result<(), Error<T::Error>>;
  /// `apply` pushes the setting to a running sensor; otherwise it is staged.
  async fn config_accel<T: Transport>(
    &mut self,
    bus: &mut T,
    config: AccelConfig,
    apply: bool,
  ) -> Result<(), Error<T::Error>>;
  fn sampling_rate_hz(&self) -> u32;
}

/// Called with `(old, new)` before a sensor-set change is committed.
pub type ModeChangeFn<E> = fn(Sensors, Sensors) -> Result<(), Error<E>>;

fn check_group<E>(sensors: Sensors, group: Sensors, present: bool) -> Result<(), Error<E>> {
  let requested = sensors & group;
  if requested.is_empty() {
    return Ok(());
  }
  if requested != group {
    warn!("partial sensor triplet {}", requested);
    return Err(Error::NotImplemented);
  }
  if !present {
    warn!("no descriptor for {}", group);
    return Err(Error::DeviceNotRecognized);
  }
  Ok(())
}

impl<T, P> Dmp<T, P>
where
  T: Transport,
  P: Platform,
{
  pub fn requested_sensors(&self) -> Sensors {
    self.requested
  }

  pub fn register_mode_change_callback(&mut self, f: Option<ModeChangeFn<T::Error>>) {
    self.mode_change = f;
  }

  /// Switch the active sensor set. Applied live when the DMP is running.
  pub async fn set_mpu_sensors(&mut self, sensors: Sensors) -> Result<(), Error<T::Error>> {
    self.require_at_least(State::DmpOpened)?;
    check_group(sensors, Sensors::THREE_AXIS_ACCEL, self.device.accel.is_some())?;
    check_group(sensors, Sensors::THREE_AXIS_COMPASS, self.device.compass.is_some())?;
    check_group(sensors, Sensors::THREE_AXIS_PRESSURE, self.device.pressure.is_some())?;

    let started = self.state == State::DmpStarted;
    let old = self.requested;

    if !old.contains(Sensors::DMP_PROCESSOR) && sensors.contains(Sensors::DMP_PROCESSOR) {
      let odr = self.platform.sampling_rate_hz() * 1000;
      self.platform.config_accel(&mut self.bus, AccelConfig::OdrResume(odr), started).await?;
      self.platform.config_accel(&mut self.bus, AccelConfig::IrqResume(AccelIrq::None), started).await?;
      self.platform.init_fifo_hardware(&mut self.bus).await?;
    }

    if let Some(cb) = self.mode_change {
      cb(old, sensors)?;
    }

    let fifo_rate = self.platform.fifo_rate();
    self.requested = sensors;
    debug!("sensors {} -> {}", old, sensors);

    if started {
      self.platform.start_sensors(&mut self.bus, sensors).await?;
      self.reset_motion().await?;
      self.platform.stop_sensors(&mut self.bus, !sensors).await?;
    }

    self.platform.set_fifo_rate(&mut self.bus, fifo_rate).await?;

    if !sensors.contains(Sensors::DMP_PROCESSOR) && sensors.intersects(Sensors::THREE_AXIS_ACCEL) {
      self.platform.config_accel(&mut self.bus, AccelConfig::IrqResume(AccelIrq::DataReady), started).await?;
    }
    Ok(())
  }

  pub fn gyro_present(&self) -> bool {
    self.requested.intersects(Sensors::THREE_AXIS_GYRO)
  }
}
