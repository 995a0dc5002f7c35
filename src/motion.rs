use crate::{defs::*, state::State, transport::Transport, Dmp, DmpKey, Error, Platform};

/// Motion state reported to the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionState {
  Motion,
  NoMotion,
}

/// Internal state of the no-motion detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InternalMotionState {
  Moving,
  NoMotion,
  BiasInProgress,
}

pub type MotionCallback = fn(MotionState);

const CFG_18_RESET: [u8; 3] = [DINAD8 + 2, DINA0C, DINAD8 + 1];

impl<T, P> Dmp<T, P>
where
  T: Transport,
  P: Platform,
{
  /// Restart the DMP motion detector and report `Motion`.
  pub async fn reset_motion(&mut self) -> Result<(), Error<T::Error>> {
    self.require_at_least(State::DmpOpened)?;
    self.obj.motion_state = MotionState::Motion;

    self.write_mem(DmpKey::CFG_18, &CFG_18_RESET).await?;
    self.write_mem_u16(DmpKey::D_1_106, self.obj.motion_duration).await?;
    self.write_mem(DmpKey::D_1_96, &[0; 8]).await?;
    self.write_mem_i32(DmpKey::D_0_96, 0x4000_0000).await?;

    self.set_motion_state(MotionState::Motion);
    Ok(())
  }

  pub fn motion_state(&self) -> MotionState {
    self.obj.motion_state
  }

  /// Record a new motion state. The motion callback only hears about changes.
  pub fn set_motion_state(&mut self, state: MotionState) -> bool {
    if self.obj.motion_state == state {
      return false;
    }
    self.obj.motion_state = state;
    debug!("motion state {}", state);
    if let Some(cb) = self.motion_cb {
      cb(state);
    }
    true
  }

  pub fn register_motion_callback(&mut self, cb: Option<MotionCallback>) {
    self.motion_cb = cb;
  }
}
