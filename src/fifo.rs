//! FIFO collaborator and the per-interrupt entry point.
//!
//! Packet parsing belongs to the [`Fifo`] implementation. The core only tells
//! it what to emit and when to drain.

use bitflags::bitflags;

use crate::{
  interrupt::IntSource,
  state::State,
  transport::Transport,
  Dmp, Error, Platform, Sensors,
};

/// Packets drained per `update()` when the DMP is processing.
pub const MAX_FIFO_PACKETS: u16 = 100;

bitflags! {
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
  pub struct Axes: u8 {
    const X = 0x1;
    const Y = 0x2;
    const Z = 0x4;
  }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Axes {
  fn format(&self, f: defmt::Formatter) {
    defmt::write!(f, "Axes({=u8:#x})", self.bits())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Width {
  Bits16,
  Bits32,
}

/// What the DMP pushes as gyro data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GyroSource {
  Raw,
  Quaternion,
}

#[allow(async_fn_in_trait)]
pub trait Fifo {
  /// Read and dispatch up to `max_packets`; returns how many were consumed.
  async fn read_and_process<T: Transport>(&mut self, bus: &mut T, max_packets: u16) -> Result<u16, Error<T::Error>>;
  /// Outcome of the last drain.
  async fn fifo_status<T: Transport>(&mut self, bus: &mut T) -> Result<(), Error<T::Error>>;
  /// Rate divider currently programmed.
  fn fifo_rate(&self) -> u16;
  async fn set_fifo_rate<T: Transport>(&mut self, bus: &mut T, rate: u16) -> Result<(), Error<T::Error>>;
  async fn init_fifo_hardware<T: Transport>(&mut self, bus: &mut T) -> Result<(), Error<T::Error>>;
  async fn send_accel<T: Transport>(&mut self, bus: &mut T, axes: Axes, width: Width) -> Result<(), Error<T::Error>>;
  async fn send_gyro<T: Transport>(&mut self, bus: &mut T, axes: Axes, width: Width) -> Result<(), Error<T::Error>>;
  async fn set_gyro_data_source<T: Transport>(&mut self, bus: &mut T, source: GyroSource) -> Result<(), Error<T::Error>>;
}

impl<T, P> Dmp<T, P>
where
  T: Transport,
  P: Platform,
{
  /// Service one interrupt: drain the FIFO, acknowledge the latches and run
  /// the interrupt callbacks if the MPU line fired.
  pub async fn update(&mut self) -> Result<(), Error<T::Error>> {
    self.require(State::DmpStarted)?;

    let max = if self.requested.contains(Sensors::DMP_PROCESSOR) { MAX_FIFO_PACKETS } else { 1 };
    let n = self.platform.read_and_process(&mut self.bus, max).await?;
    trace!("fifo: {} packets", n);

    if self.platform.triggered(IntSource::Aux1) {
      self.platform.clear_trigger(IntSource::Aux1);
    }
    if self.platform.triggered(IntSource::Mpu) {
      self.platform.clear_trigger(IntSource::Mpu);
      self.run_interrupt_callbacks();
    }

    self.platform.fifo_status(&mut self.bus).await
  }
}
