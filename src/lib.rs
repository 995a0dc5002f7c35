#![no_std]
#![doc = include_str!("../README.md")]
//!
//! ## Module Organization
//!
//! - [`state`]: Lifecycle gate (serial and DMP open/start)
//! - [`orient`]: Mounting matrix encoding
//! - [`calib`]: Gyro, accel and compass calibration
//! - [`bias`]: Bias-tracking policy
//! - [`interrupt`]: Motion / FIFO interrupt sources and callbacks
//! - [`sensors`]: Live sensor set changes
//! - [`motion`]: Motion detector reset and state
//! - [`fifo`]: FIFO collaborator and the per-interrupt `update()`
//! - [`transport`]: Serial access, with an I2C implementation
//!
//! ## Basic Usage
//!
//! ```no_run
//! # async fn example<T, P>(mut dmp: inv_dmp::Dmp<T, P>) -> Result<(), inv_dmp::Error<T::Error>>
//! # where T: inv_dmp::transport::Transport<Port = u8>, P: inv_dmp::Platform {
//! use inv_dmp::BiasMode;
//!
//! dmp.open(0x68).await?;
//! dmp.dmp_open().await?;
//! dmp.apply_calibration().await?;
//! dmp.set_bias_update(BiasMode::FROM_GRAVITY | BiasMode::FROM_NO_MOTION).await?;
//! dmp.dmp_start().await?;
//! dmp.update().await?;
//! # Ok(())
//! # }
//! ```

#[macro_use]
mod fmt;

pub mod bias;
pub mod calib;
mod defs;
pub mod fifo;
mod fusion;
pub mod interrupt;
pub mod motion;
pub mod orient;
pub(crate) mod rw;
pub mod sensors;
pub mod state;
pub mod transport;
mod types;

pub use bias::{BiasMode, BiasTracker};
pub use fifo::Fifo;
pub use fusion::*;
pub use interrupt::{InterruptCallback, InterruptTrigger, MAX_INTERRUPT_PROCESSES};
pub use motion::{MotionCallback, MotionState};
pub use orient::MountingMatrix;
pub use sensors::{ModeChangeFn, SensorControl, Sensors};
pub use state::State;
pub use types::*;

use transport::Transport;

/// Driver error type.
///
/// Wraps the transport error and adds the DMP core's own failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
  /// Serial transport failure, passed through untouched
  Transport(E),
  /// Operation not allowed in the current lifecycle state
  ImproperState,
  /// Argument or device configuration out of range
  InvalidParameter,
  /// Requested combination is not supported (e.g. a partial sensor triplet)
  NotImplemented,
  /// No descriptor for a sensor the request needs
  DeviceNotRecognized,
  /// All interrupt callback slots are taken
  CallbackTableFull,
}

/// Everything the core delegates to besides the transport.
pub trait Platform: Fifo + InterruptTrigger + SensorControl + BiasTracker {}

impl<P> Platform for P where P: Fifo + InterruptTrigger + SensorControl + BiasTracker {}

/// DMP configuration core.
///
/// Owns the transport `T` and the collaborator bundle `P`, and keeps the
/// lifecycle state, the [`FusionState`] mirror and the registered callbacks.
/// All methods take `&mut self`; there is no global state.
pub struct Dmp<T: Transport, P> {
  bus: T,
  platform: P,
  device: DeviceConfig,
  state: State,
  obj: FusionState,
  bias_mode: BiasMode,
  dead_zone: bool,
  fast_no_motion: bool,
  requested: Sensors,
  callbacks: heapless::Vec<InterruptCallback, MAX_INTERRUPT_PROCESSES>,
  mode_change: Option<ModeChangeFn<T::Error>>,
  motion_cb: Option<MotionCallback>,
}

impl<T, P> Dmp<T, P>
where
  T: Transport,
{
  /// Create a driver in [`State::SerialClosed`].
  ///
  /// The requested sensor set starts as the gyro, the DMP processor and every
  /// sensor `device` describes.
  pub fn new(bus: T, platform: P, device: DeviceConfig) -> Self {
    let mut requested = Sensors::THREE_AXIS_GYRO | Sensors::DMP_PROCESSOR;
    if device.accel.is_some() {
      requested |= Sensors::THREE_AXIS_ACCEL;
    }
    if device.compass.is_some() {
      requested |= Sensors::THREE_AXIS_COMPASS;
    }
    if device.pressure.is_some() {
      requested |= Sensors::THREE_AXIS_PRESSURE;
    }

    Self {
      bus,
      platform,
      obj: FusionState::new(&device),
      device,
      state: State::SerialClosed,
      bias_mode: BiasMode::FROM_NO_MOTION | BiasMode::FROM_GRAVITY,
      dead_zone: false,
      fast_no_motion: false,
      requested,
      callbacks: heapless::Vec::new(),
      mode_change: None,
      motion_cb: None,
    }
  }

  /// Give back the transport and collaborators.
  pub fn release(self) -> (T, P) {
    (self.bus, self.platform)
  }

  pub fn fusion(&self) -> &FusionState {
    &self.obj
  }

  pub fn device(&self) -> &DeviceConfig {
    &self.device
  }

  pub fn platform(&self) -> &P {
    &self.platform
  }

  pub fn platform_mut(&mut self) -> &mut P {
    &mut self.platform
  }
}
