//! Device lifecycle.
//!
//! ```text
//! SerialClosed -> SerialOpened -> DmpOpened -> DmpStarted
//! ```
//!
//! Stepping down is allowed one level at a time, and any state may drop
//! straight to `SerialClosed`. Every gated operation checks the state before
//! touching anything and fails with [`Error::ImproperState`].

use crate::{transport::Transport, Dmp, Error, FusionState, Platform, Sensors};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
  SerialClosed,
  SerialOpened,
  DmpOpened,
  DmpStarted,
}

impl State {
  pub fn can_transition(self, next: State) -> bool {
    match next {
      State::SerialClosed => true,
      State::SerialOpened => matches!(self, State::SerialClosed | State::DmpOpened),
      State::DmpOpened => matches!(self, State::SerialOpened | State::DmpStarted),
      State::DmpStarted => self == State::DmpOpened,
    }
  }
}

impl<T, P> Dmp<T, P>
where
  T: Transport,
{
  pub fn state(&self) -> State {
    self.state
  }

  pub(crate) fn transition(&mut self, next: State) -> Result<(), Error<T::Error>> {
    if !self.state.can_transition(next) {
      warn!("illegal transition {} -> {}", self.state, next);
      return Err(Error::ImproperState);
    }
    trace!("state {} -> {}", self.state, next);
    self.state = next;
    Ok(())
  }

  pub(crate) fn require(&self, state: State) -> Result<(), Error<T::Error>> {
    if self.state != state {
      debug!("needs {}, in {}", state, self.state);
      return Err(Error::ImproperState);
    }
    Ok(())
  }

  pub(crate) fn require_at_least(&self, state: State) -> Result<(), Error<T::Error>> {
    if self.state < state {
      debug!("needs at least {}, in {}", state, self.state);
      return Err(Error::ImproperState);
    }
    Ok(())
  }

  /// Open the serial link. No-op when already open.
  ///
  /// A failed physical open rolls the state back to `SerialClosed`.
  pub async fn open(&mut self, port: T::Port) -> Result<(), Error<T::Error>> {
    if self.state >= State::SerialOpened {
      return Ok(());
    }
    self.transition(State::SerialOpened)?;
    if let Err(e) = self.bus.open(port).await {
      error!("serial open failed");
      self.state = State::SerialClosed;
      return Err(Error::Transport(e));
    }
    Ok(())
  }

  /// Close the serial link from any state. No-op when already closed.
  ///
  /// The physical close is attempted even if the state change is refused.
  /// Its failure wins over a transition failure.
  pub async fn close(&mut self) -> Result<(), Error<T::Error>> {
    if self.state == State::SerialClosed {
      return Ok(());
    }
    let moved = self.transition(State::SerialClosed);
    if moved.is_err() {
      error!("state change on close refused");
    }
    let closed = self.bus.close().await.map_err(|e| {
      error!("serial close failed");
      Error::Transport(e)
    });
    closed.and(moved)
  }
}

impl<T, P> Dmp<T, P>
where
  T: Transport,
  P: Platform,
{
  /// Bring the DMP up: fresh [`FusionState`], empty callback table.
  pub async fn dmp_open(&mut self) -> Result<(), Error<T::Error>> {
    self.require(State::SerialOpened)?;
    self.obj = FusionState::new(&self.device);
    self.callbacks.clear();
    self.transition(State::DmpOpened)
  }

  /// Power the requested sensors and arm the motion detector.
  pub async fn dmp_start(&mut self) -> Result<(), Error<T::Error>> {
    self.require(State::DmpOpened)?;
    self.platform.start_sensors(&mut self.bus, self.requested).await?;
    self.reset_motion().await?;
    self.transition(State::DmpStarted)
  }

  pub async fn dmp_stop(&mut self) -> Result<(), Error<T::Error>> {
    self.require(State::DmpStarted)?;
    self.platform.stop_sensors(&mut self.bus, Sensors::all()).await?;
    self.transition(State::DmpOpened)
  }

  /// Stops first when running.
  pub async fn dmp_close(&mut self) -> Result<(), Error<T::Error>> {
    self.require_at_least(State::DmpOpened)?;
    if self.state == State::DmpStarted {
      self.dmp_stop().await?;
    }
    self.transition(State::SerialOpened)
  }
}
