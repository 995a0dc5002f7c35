//! Serial access to MPU registers and DMP memory.
//!
//! The core only talks through [`Transport`]. [`I2cTransport`] is the stock
//! implementation for an MPU on an `embedded-hal-async` I2C bus; it reaches DMP
//! memory through the `BANK_SEL` / `MEM_START_ADDR` / `MEM_R_W` window.

use embedded_hal_async::{delay::DelayNs, i2c::*};

use crate::{
  defs::{Reg, DMP_BANK_SIZE, DMP_MEM_CHUNK, WHO_AM_I_MPU},
  DmpKey,
};

#[allow(async_fn_in_trait)]
pub trait Transport {
  /// Whatever identifies the device on the bus.
  type Port;
  type Error;

  async fn open(&mut self, port: Self::Port) -> Result<(), Self::Error>;
  async fn close(&mut self) -> Result<(), Self::Error>;
  async fn write_mem(&mut self, key: DmpKey, data: &[u8]) -> Result<(), Self::Error>;
  async fn read_mem(&mut self, key: DmpKey, buf: &mut [u8]) -> Result<(), Self::Error>;
  async fn write_reg(&mut self, reg: u8, data: &[u8]) -> Result<(), Self::Error>;
  async fn read_reg(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), Self::Error>;
  /// Whether the loaded firmware image defines `key`.
  fn key_supported(&self, key: DmpKey) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError<E> {
  I2c(E),
  /// No device address yet; call `open` first.
  NotOpen,
  /// `WHO_AM_I` did not identify an MPU.
  WrongChip(u8),
  /// Key is not in the firmware key table.
  UnknownKey(DmpKey),
}

/// [`Transport`] over I2C.
///
/// `keys` maps firmware-relative keys to DMP addresses for the image that was
/// loaded. Data-memory keys resolve without it.
pub struct I2cTransport<I, D> {
  i2c: I,
  delay: D,
  addr: Option<u8>,
  keys: &'static [(DmpKey, u16)],
}

impl<I, D, E> I2cTransport<I, D>
where
  I: I2c<SevenBitAddress, Error = E>,
  D: DelayNs,
{
  pub fn new(i2c: I, delay: D, keys: &'static [(DmpKey, u16)]) -> Self {
    Self { i2c, delay, addr: None, keys }
  }

  pub fn release(self) -> (I, D) {
    (self.i2c, self.delay)
  }

  fn address(&self, key: DmpKey) -> Option<u16> {
    self.keys.iter().find(|(k, _)| *k == key).map(|(_, a)| *a).or(key.data_address())
  }

  async fn write_bytes(&mut self, reg: u8, data: &[u8]) -> Result<(), BusError<E>> {
    let addr = self.addr.ok_or(BusError::NotOpen)?;
    debug_assert!(data.len() <= DMP_MEM_CHUNK, "write_bytes burst too large");
    let mut buf = [0u8; DMP_MEM_CHUNK + 1];
    let len = 1 + data.len();
    buf[0] = reg;
    buf[1..len].copy_from_slice(data);
    self.i2c.write(addr, &buf[..len]).await.map_err(BusError::I2c)
  }

  async fn read_bytes(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), BusError<E>> {
    let addr = self.addr.ok_or(BusError::NotOpen)?;
    self.i2c.write_read(addr, &[reg], buf).await.map_err(BusError::I2c)
  }

  async fn select(&mut self, mem_addr: u16) -> Result<(), BusError<E>> {
    let [bank, start] = mem_addr.to_be_bytes();
    self.write_bytes(Reg::BankSel.into(), &[bank]).await?;
    self.write_bytes(Reg::MemStartAddr.into(), &[start]).await
  }

  /// Length of the next burst at `at`: capped by the chunk size and the bank end.
  fn burst(at: u16, remaining: usize) -> usize {
    let room = DMP_BANK_SIZE - (at as usize % DMP_BANK_SIZE);
    remaining.min(room).min(DMP_MEM_CHUNK)
  }
}

impl<I, D, E> Transport for I2cTransport<I, D>
where
  I: I2c<SevenBitAddress, Error = E>,
  D: DelayNs,
{
  type Port = u8;
  type Error = BusError<E>;

  async fn open(&mut self, port: u8) -> Result<(), Self::Error> {
    self.addr = Some(port);
    let mut id = [0u8; 1];
    if let Err(e) = self.read_bytes(Reg::WhoAmI.into(), &mut id).await {
      self.addr = None;
      return Err(e);
    }
    if id[0] != WHO_AM_I_MPU {
      self.addr = None;
      return Err(BusError::WrongChip(id[0]));
    }
    Ok(())
  }

  async fn close(&mut self) -> Result<(), Self::Error> {
    self.addr = None;
    Ok(())
  }

  async fn write_mem(&mut self, key: DmpKey, data: &[u8]) -> Result<(), Self::Error> {
    let base = self.address(key).ok_or(BusError::UnknownKey(key))?;
    let mut done = 0;
    while done < data.len() {
      let at = base.wrapping_add(done as u16);
      let n = Self::burst(at, data.len() - done);
      self.select(at).await?;
      self.write_bytes(Reg::MemRw.into(), &data[done..done + n]).await?;
      self.delay.delay_us(20).await;
      done += n;
    }
    Ok(())
  }

  async fn read_mem(&mut self, key: DmpKey, buf: &mut [u8]) -> Result<(), Self::Error> {
    let base = self.address(key).ok_or(BusError::UnknownKey(key))?;
    let mut done = 0;
    while done < buf.len() {
      let at = base.wrapping_add(done as u16);
      let n = Self::burst(at, buf.len() - done);
      self.select(at).await?;
      self.read_bytes(Reg::MemRw.into(), &mut buf[done..done + n]).await?;
      done += n;
    }
    Ok(())
  }

  async fn write_reg(&mut self, reg: u8, data: &[u8]) -> Result<(), Self::Error> {
    for (i, chunk) in data.chunks(DMP_MEM_CHUNK).enumerate() {
      self.write_bytes(reg.wrapping_add((i * DMP_MEM_CHUNK) as u8), chunk).await?;
    }
    Ok(())
  }

  async fn read_reg(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
    self.read_bytes(reg, buf).await
  }

  fn key_supported(&self, key: DmpKey) -> bool {
    self.address(key).is_some()
  }
}
