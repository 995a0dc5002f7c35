use crate::{defs::Reg, transport::Transport, Dmp, DmpKey, Error};

impl<T, P> Dmp<T, P>
where
  T: Transport,
{
  pub(crate) async fn write_mem(&mut self, key: DmpKey, data: &[u8]) -> Result<(), Error<T::Error>> {
    self.bus.write_mem(key, data).await.map_err(|e| {
      error!("dmp write to {} failed", key);
      Error::Transport(e)
    })
  }

  pub(crate) async fn write_mem_u8(&mut self, key: DmpKey, value: u8) -> Result<(), Error<T::Error>> {
    self.write_mem(key, &[value]).await
  }

  // DMP memory is big endian.
  pub(crate) async fn write_mem_u16(&mut self, key: DmpKey, value: u16) -> Result<(), Error<T::Error>> {
    self.write_mem(key, &value.to_be_bytes()).await
  }

  pub(crate) async fn write_mem_i32(&mut self, key: DmpKey, value: i32) -> Result<(), Error<T::Error>> {
    self.write_mem(key, &value.to_be_bytes()).await
  }

  pub(crate) async fn write<const N: usize, R: TryInto<[u8; N]>>(&mut self, reg: Reg, v: R) -> Result<(), Error<T::Error>> {
    let b = v.try_into().map_err(|_| Error::InvalidParameter)?;
    self.bus.write_reg(reg.into(), &b).await.map_err(|e| {
      error!("register {=u8:#x} write failed", u8::from(reg));
      Error::Transport(e)
    })
  }
}
