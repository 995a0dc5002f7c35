//! Recording stand-in for the FIFO, interrupt, sensor and bias collaborators

use inv_dmp::fifo::{Axes, GyroSource, Width};
use inv_dmp::interrupt::IntSource;
use inv_dmp::sensors::AccelConfig;
use inv_dmp::transport::Transport;
use inv_dmp::{BiasTracker, Error, Fifo, InterruptTrigger, SensorControl, Sensors};
use micromath::vector::Vector3d;
use std::cell::RefCell;
use std::rc::Rc;

/// One collaborator call, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
  ReadFifo(u16),
  FifoStatus,
  SetFifoRate(u16),
  InitFifo,
  SendAccel(Axes, Width),
  SendGyro(Axes, Width),
  GyroSource(GyroSource),
  Start(Sensors),
  Stop(Sensors),
  ConfigAccel(AccelConfig, bool),
  NoMotion(bool),
  TempSlope(i32, i32, i32),
  ClearTrigger(IntSource),
}

#[derive(Debug)]
struct PlatformState {
  calls: Vec<Call>,
  mpu: bool,
  aux1: bool,
  fifo_rate: u16,
  sampling_rate_hz: u32,
  fail_start: bool,
  fail_status: bool,
}

#[derive(Debug, Clone)]
pub struct MockPlatform {
  state: Rc<RefCell<PlatformState>>,
}

impl Default for MockPlatform {
  fn default() -> Self {
    Self::new()
  }
}

impl MockPlatform {
  pub fn new() -> Self {
    Self {
      state: Rc::new(RefCell::new(PlatformState {
        calls: Vec::new(),
        mpu: false,
        aux1: false,
        fifo_rate: 4,
        sampling_rate_hz: 200,
        fail_start: false,
        fail_status: false,
      })),
    }
  }

  pub fn calls(&self) -> Vec<Call> {
    self.state.borrow().calls.clone()
  }

  pub fn clear(&self) {
    self.state.borrow_mut().calls.clear();
  }

  /// Latch an interrupt line as the ISR would
  pub fn trigger(&self, source: IntSource) {
    let mut s = self.state.borrow_mut();
    match source {
      IntSource::Mpu => s.mpu = true,
      IntSource::Aux1 => s.aux1 = true,
    }
  }

  pub fn is_triggered(&self, source: IntSource) -> bool {
    let s = self.state.borrow();
    match source {
      IntSource::Mpu => s.mpu,
      IntSource::Aux1 => s.aux1,
    }
  }

  pub fn fail_start(&self) {
    self.state.borrow_mut().fail_start = true;
  }

  pub fn fail_status(&self) {
    self.state.borrow_mut().fail_status = true;
  }

  fn record(&self, call: Call) {
    self.state.borrow_mut().calls.push(call);
  }
}

impl Fifo for MockPlatform {
  async fn read_and_process<T: Transport>(&mut self, _bus: &mut T, max_packets: u16) -> Result<u16, Error<T::Error>> {
    self.record(Call::ReadFifo(max_packets));
    Ok(max_packets)
  }

  async fn fifo_status<T: Transport>(&mut self, _bus: &mut T) -> Result<(), Error<T::Error>> {
    self.record(Call::FifoStatus);
    if self.state.borrow().fail_status {
      return Err(Error::NotImplemented);
    }
    Ok(())
  }

  fn fifo_rate(&self) -> u16 {
    self.state.borrow().fifo_rate
  }

  async fn set_fifo_rate<T: Transport>(&mut self, _bus: &mut T, rate: u16) -> Result<(), Error<T::Error>> {
    self.record(Call::SetFifoRate(rate));
    self.state.borrow_mut().fifo_rate = rate;
    Ok(())
  }

  async fn init_fifo_hardware<T: Transport>(&mut self, _bus: &mut T) -> Result<(), Error<T::Error>> {
    self.record(Call::InitFifo);
    Ok(())
  }

  async fn send_accel<T: Transport>(&mut self, _bus: &mut T, axes: Axes, width: Width) -> Result<(), Error<T::Error>> {
    self.record(Call::SendAccel(axes, width));
    Ok(())
  }

  async fn send_gyro<T: Transport>(&mut self, _bus: &mut T, axes: Axes, width: Width) -> Result<(), Error<T::Error>> {
    self.record(Call::SendGyro(axes, width));
    Ok(())
  }

  async fn set_gyro_data_source<T: Transport>(
    &mut self,
    _bus: &mut T,
    source: GyroSource,
  ) -> Result<(), Error<T::Error>> {
    self.record(Call::GyroSource(source));
    Ok(())
  }
}

impl InterruptTrigger for MockPlatform {
  fn triggered(&self, source: IntSource) -> bool {
    self.is_triggered(source)
  }

  fn clear_trigger(&mut self, source: IntSource) {
    self.record(Call::ClearTrigger(source));
    let mut s = self.state.borrow_mut();
    match source {
      IntSource::Mpu => s.mpu = false,
      IntSource::Aux1 => s.aux1 = false,
    }
  }
}

impl SensorControl for MockPlatform {
  async fn start_sensors<T: Transport>(&mut self, _bus: &mut T, sensors: Sensors) -> Result<(), Error<T::Error>> {
    self.record(Call::Start(sensors));
    if self.state.borrow().fail_start {
      return Err(Error::NotImplemented);
    }
    Ok(())
  }

  async fn stop_sensors<T: Transport>(&mut self, _bus: &mut T, sensors: Sensors) -> Result<(), Error<T::Error>> {
    self.record(Call::Stop(sensors));
    Ok(())
  }

  async fn config_accel<T: Transport>(
    &mut self,
    _bus: &mut T,
    config: AccelConfig,
    apply: bool,
  ) -> Result<(), Error<T::Error>> {
    self.record(Call::ConfigAccel(config, apply));
    Ok(())
  }

  fn sampling_rate_hz(&self) -> u32 {
    self.state.borrow().sampling_rate_hz
  }
}

impl BiasTracker for MockPlatform {
  fn enable_no_motion(&mut self) {
    self.record(Call::NoMotion(true));
  }

  fn disable_no_motion(&mut self) {
    self.record(Call::NoMotion(false));
  }

  async fn set_gyro_temp_slope<T: Transport>(
    &mut self,
    _bus: &mut T,
    slope: Vector3d<i32>,
  ) -> Result<(), Error<T::Error>> {
    self.record(Call::TempSlope(slope.x, slope.y, slope.z));
    Ok(())
  }
}
