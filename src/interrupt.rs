//! DMP interrupt sources and the interrupt callback table.
//!
//! Motion and FIFO interrupts share the MPU's `DMP_INT_EN` bit. The bit is
//! set when the first source turns on and cleared when the last one turns
//! off; each source also has its own one-byte switch in DMP memory.
//!
//! # Examples
//!
//! ```no_run
//! # async fn example<T: inv_dmp::transport::Transport, P: inv_dmp::Platform>(
//! #   mut dmp: inv_dmp::Dmp<T, P>,
//! # ) -> Result<(), inv_dmp::Error<T::Error>> {
//! fn on_data(fusion: &inv_dmp::FusionState) {
//!   let _ = fusion.motion_state;
//! }
//!
//! dmp.register_interrupt_callback(on_data)?;
//! dmp.set_fifo_interrupt(true).await?;
//! # Ok(())
//! # }
//! ```

use bitflags::bitflags;

use crate::{defs::*, state::State, transport::Transport, Dmp, DmpKey, Error, FusionState, Platform};

/// Capacity of the interrupt callback table.
pub const MAX_INTERRUPT_PROCESSES: usize = 5;

/// Runs after every `update()` that saw the MPU interrupt.
pub type InterruptCallback = fn(&FusionState);

bitflags! {
  /// DMP interrupt sources currently switched on.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
  pub struct InterruptSources: u8 {
    const FIFO = 0x01;
    const MOTION = 0x04;
  }
}

#[cfg(feature = "defmt")]
impl defmt::Format for InterruptSources {
  fn format(&self, f: defmt::Formatter) {
    defmt::write!(f, "InterruptSources({=u8:#x})", self.bits())
  }
}

/// Interrupt lines the host latches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IntSource {
  Mpu,
  Aux1,
}

/// Latched interrupt flags, usually set from an ISR or a GPIO wait.
pub trait InterruptTrigger {
  fn triggered(&self, source: IntSource) -> bool;
  fn clear_trigger(&mut self, source: IntSource);
}

impl<T, P> Dmp<T, P>
where
  T: Transport,
  P: Platform,
{
  /// Switch the motion / no-motion interrupt.
  pub async fn set_motion_interrupt(&mut self, on: bool) -> Result<(), Error<T::Error>> {
    self.set_interrupt_source(InterruptSources::MOTION, DmpKey::CFG_7, on).await
  }

  /// Switch the FIFO-ready interrupt.
  pub async fn set_fifo_interrupt(&mut self, on: bool) -> Result<(), Error<T::Error>> {
    self.set_interrupt_source(InterruptSources::FIFO, DmpKey::CFG_6, on).await
  }

  pub fn interrupt_sources(&self) -> InterruptSources {
    self.obj.interrupt_sources
  }

  /// Append to the callback table. Callbacks run in registration order.
  pub fn register_interrupt_callback(&mut self, cb: InterruptCallback) -> Result<(), Error<T::Error>> {
    self.callbacks.push(cb).map_err(|_| {
      warn!("interrupt callback table full");
      Error::CallbackTableFull
    })
  }

  async fn set_interrupt_source(&mut self, source: InterruptSources, key: DmpKey, on: bool) -> Result<(), Error<T::Error>> {
    self.require_at_least(State::DmpOpened)?;

    if on {
      if self.obj.interrupt_sources.is_empty() {
        self.write_int_enable(true).await?;
      }
      self.obj.interrupt_sources.insert(source);
    } else {
      self.obj.interrupt_sources.remove(source);
      if self.obj.interrupt_sources.is_empty() {
        self.write_int_enable(false).await?;
      }
    }

    self.write_mem_u8(key, if on { DINAFE } else { DINAD8 }).await
  }

  async fn write_int_enable(&mut self, dmp: bool) -> Result<(), Error<T::Error>> {
    let reg = IntEnable { data_rdy_en: false, dmp_int_en: dmp, i2c_mst_int_en: false, fifo_oflow_en: false, mot_en: false };
    let [raw]: [u8; 1] = reg.try_into().map_err(|_| Error::InvalidParameter)?;
    self.write(Reg::IntEnable, reg).await?;
    self.obj.int_config = raw;
    Ok(())
  }

  pub(crate) fn run_interrupt_callbacks(&self) {
    for cb in self.callbacks.iter() {
      cb(&self.obj);
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[packbits::pack(bytes = 1)]
struct IntEnable {
  #[bits(1)]
  pub data_rdy_en: bool,
  #[bits(1)]
  pub dmp_int_en: bool,
  #[skip(1)]
  #[bits(1)]
  pub i2c_mst_int_en: bool,
  #[bits(1)]
  pub fifo_oflow_en: bool,
  #[skip(1)]
  #[bits(1)]
  pub mot_en: bool,
}
