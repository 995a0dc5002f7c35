//! Recording transport for driving the DMP core without hardware

use inv_dmp::transport::Transport;
use inv_dmp::DmpKey;
use std::cell::RefCell;
use std::rc::Rc;

/// One call made on the transport, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
  Open(u8),
  Close,
  WriteMem(DmpKey, Vec<u8>),
  WriteReg(u8, Vec<u8>),
}

/// Error returned by an injected failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusFault;

#[derive(Debug, Default)]
struct BusState {
  ops: Vec<Op>,
  fail_open: bool,
  fail_close: bool,
  fail_keys: Vec<DmpKey>,
  unsupported: Vec<DmpKey>,
}

/// Clones share state, so a test keeps one handle while the driver owns another
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
  state: Rc<RefCell<BusState>>,
}

impl MockTransport {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn fail_open(&self) {
    self.state.borrow_mut().fail_open = true;
  }

  pub fn fail_close(&self) {
    self.state.borrow_mut().fail_close = true;
  }

  /// Writes to `key` are recorded, then fail
  pub fn fail_key(&self, key: DmpKey) {
    self.state.borrow_mut().fail_keys.push(key);
  }

  /// Pretend the firmware image has no such key
  pub fn unsupported(&self, key: DmpKey) {
    self.state.borrow_mut().unsupported.push(key);
  }

  pub fn ops(&self) -> Vec<Op> {
    self.state.borrow().ops.clone()
  }

  pub fn clear(&self) {
    self.state.borrow_mut().ops.clear();
  }

  pub fn mem_writes(&self) -> Vec<(DmpKey, Vec<u8>)> {
    self.ops()
      .into_iter()
      .filter_map(|op| match op {
        Op::WriteMem(k, d) => Some((k, d)),
        _ => None,
      })
      .collect()
  }

  pub fn mem_keys(&self) -> Vec<DmpKey> {
    self.mem_writes().into_iter().map(|(k, _)| k).collect()
  }

  pub fn reg_writes(&self) -> Vec<(u8, Vec<u8>)> {
    self.ops()
      .into_iter()
      .filter_map(|op| match op {
        Op::WriteReg(r, d) => Some((r, d)),
        _ => None,
      })
      .collect()
  }

  /// Every payload written to `key`, oldest first
  pub fn writes_to(&self, key: DmpKey) -> Vec<Vec<u8>> {
    self.mem_writes()
      .into_iter()
      .filter(|(k, _)| *k == key)
      .map(|(_, d)| d)
      .collect()
  }
}

impl Transport for MockTransport {
  type Port = u8;
  type Error = BusFault;

  async fn open(&mut self, port: u8) -> Result<(), BusFault> {
    let mut s = self.state.borrow_mut();
    s.ops.push(Op::Open(port));
    if s.fail_open {
      Err(BusFault)
    } else {
      Ok(())
    }
  }

  async fn close(&mut self) -> Result<(), BusFault> {
    let mut s = self.state.borrow_mut();
    s.ops.push(Op::Close);
    if s.fail_close {
      Err(BusFault)
    } else {
      Ok(())
    }
  }

  async fn write_mem(&mut self, key: DmpKey, data: &[u8]) -> Result<(), BusFault> {
    let mut s = self.state.borrow_mut();
    s.ops.push(Op::WriteMem(key, data.to_vec()));
    if s.fail_keys.contains(&key) {
      Err(BusFault)
    } else {
      Ok(())
    }
  }

  async fn read_mem(&mut self, _key: DmpKey, buf: &mut [u8]) -> Result<(), BusFault> {
    buf.fill(0);
    Ok(())
  }

  async fn write_reg(&mut self, reg: u8, data: &[u8]) -> Result<(), BusFault> {
    self.state.borrow_mut().ops.push(Op::WriteReg(reg, data.to_vec()));
    Ok(())
  }

  async fn read_reg(&mut self, _reg: u8, buf: &mut [u8]) -> Result<(), BusFault> {
    buf.fill(0);
    Ok(())
  }

  fn key_supported(&self, key: DmpKey) -> bool {
    !self.state.borrow().unsupported.contains(&key)
  }
}
