//! Bias-tracking policy.
//!
//! [`Dmp::set_bias_update`] decides which bias sources run and reprograms the
//! DMP to match: the low-pass filter program, the dead zone, the gyro data
//! source fed to the FIFO, and the temperature slope. The estimators
//! themselves live behind [`BiasTracker`].

use bitflags::bitflags;
use micromath::vector::Vector3d;

use crate::{
  defs::*,
  fifo::{Axes, GyroSource, Width},
  state::State,
  transport::Transport,
  Dmp, DmpKey, Error, Platform, Sensors,
};

bitflags! {
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
  pub struct BiasMode: u16 {
    const FROM_NO_MOTION = 0x0001;
    const FROM_GRAVITY = 0x0002;
    const FROM_TEMPERATURE = 0x0004;
    const FROM_LPF = 0x0008;
    const MAG_FROM_MOTION = 0x0010;
    const MAG_FROM_GYRO = 0x0020;
    const LEARN_FROM_TEMPERATURE = 0x0040;
    const AUTO_RESET_MAG_BIAS = 0x0080;
    const REJECT_MAG_DISTURBANCE = 0x0100;
    const PROGRESSIVE_NO_MOTION = 0x0200;
    const FROM_FAST_NO_MOTION = 0x0400;
  }
}

#[cfg(feature = "defmt")]
impl defmt::Format for BiasMode {
  fn format(&self, f: defmt::Formatter) {
    defmt::write!(f, "BiasMode({=u16:#x})", self.bits())
  }
}

// FCFG_5 program with and without the gyro low-pass filter.
const FCFG_5_LPF: [u8; 4] = [DINA80 + 2, DINA2D, DINA55, DINA7D];
const FCFG_5_NO_LPF: [u8; 4] = [DINA80 + 7, DINA2D, DINA35, DINA3D];

/// Bias estimators driven by the no-motion detector.
#[allow(async_fn_in_trait)]
pub trait BiasTracker {
  fn enable_no_motion(&mut self);
  fn disable_no_motion(&mut self);
  async fn set_gyro_temp_slope<T: Transport>(&mut self, bus: &mut T, slope: Vector3d<i32>) -> Result<(), Error<T::Error>>;
}

impl<T, P> Dmp<T, P>
where
  T: Transport,
  P: Platform,
{
  /// Active bias sources. Never contains `FROM_NO_MOTION`.
  pub fn bias_mode(&self) -> BiasMode {
    self.bias_mode
  }

  /// Select the bias sources and reprogram the DMP to match.
  pub async fn set_bias_update(&mut self, function: BiasMode) -> Result<(), Error<T::Error>> {
    self.require(State::DmpOpened)?;

    let mut mode = function;
    if mode.contains(BiasMode::PROGRESSIVE_NO_MOTION) {
      warn!("progressive no-motion bias is not supported, ignoring");
    }
    mode.remove(BiasMode::PROGRESSIVE_NO_MOTION | BiasMode::FROM_FAST_NO_MOTION);
    if self.fast_no_motion {
      mode.insert(BiasMode::FROM_FAST_NO_MOTION);
    }

    let compass = self.device.compass.is_some() && self.requested.intersects(Sensors::THREE_AXIS_COMPASS);
    if compass {
      mode.remove(BiasMode::FROM_LPF);
    } else {
      mode.remove(BiasMode::MAG_FROM_GYRO | BiasMode::MAG_FROM_MOTION);
    }

    if mode.contains(BiasMode::FROM_NO_MOTION) {
      self.platform.enable_no_motion();
    } else {
      self.platform.disable_no_motion();
    }
    mode.remove(BiasMode::FROM_NO_MOTION);
    self.bias_mode = mode;
    debug!("bias mode {}", mode);

    let lpf = mode.contains(BiasMode::FROM_LPF);
    self.write_mem(DmpKey::FCFG_5, if lpf { &FCFG_5_LPF } else { &FCFG_5_NO_LPF }).await?;
    self.write_dead_zone().await?;

    let source = if mode.contains(BiasMode::FROM_GRAVITY) && !compass { GyroSource::Quaternion } else { GyroSource::Raw };
    self.platform.set_gyro_data_source(&mut self.bus, source).await?;

    let tc = self.device.offset_tc;
    if tc.x != 0 || tc.y != 0 || tc.z != 0 {
      self.obj.factory_temp_comp = true;
      self.bias_mode.remove(BiasMode::LEARN_FROM_TEMPERATURE);
    } else {
      self.obj.factory_temp_comp = false;
      let slope = if mode.contains(BiasMode::FROM_TEMPERATURE) { self.obj.temp_slope } else { Vector3d { x: 0, y: 0, z: 0 } };
      self.platform.set_gyro_temp_slope(&mut self.bus, slope).await?;
    }

    let wide = (mode.contains(BiasMode::FROM_GRAVITY) && compass)
      || mode.intersects(BiasMode::MAG_FROM_GYRO | BiasMode::MAG_FROM_MOTION);
    if wide {
      self.platform.send_accel(&mut self.bus, Axes::all(), Width::Bits32).await?;
      self.platform.send_gyro(&mut self.bus, Axes::all(), Width::Bits32).await?;
    }
    Ok(())
  }

  /// Keep fast no-motion bias on across later [`set_bias_update`](Self::set_bias_update) calls.
  pub fn enable_fast_no_motion(&mut self) -> Result<(), Error<T::Error>> {
    self.require(State::DmpOpened)?;
    self.fast_no_motion = true;
    self.bias_mode.insert(BiasMode::FROM_FAST_NO_MOTION);
    Ok(())
  }

  pub fn disable_fast_no_motion(&mut self) -> Result<(), Error<T::Error>> {
    self.require(State::DmpOpened)?;
    self.fast_no_motion = false;
    self.bias_mode.remove(BiasMode::FROM_FAST_NO_MOTION);
    Ok(())
  }

  /// Force the gyro dead zone on. Written immediately.
  pub async fn set_dead_zone(&mut self, on: bool) -> Result<(), Error<T::Error>> {
    self.require_at_least(State::DmpOpened)?;
    self.dead_zone = on;
    self.write_dead_zone().await
  }

  /// Slope applied when `FROM_TEMPERATURE` is on.
  pub fn set_temp_slope(&mut self, slope: Vector3d<i32>) {
    self.obj.temp_slope = slope;
  }

  async fn write_dead_zone(&mut self) -> Result<(), Error<T::Error>> {
    let dz = if self.dead_zone {
      0x08
    } else if self.bias_mode.contains(BiasMode::FROM_LPF) {
      0x02
    } else {
      0
    };
    self.write_mem_u8(DmpKey::D_0_163, dz).await
  }
}
