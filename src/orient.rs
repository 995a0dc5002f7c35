//! Mounting matrices and their DMP encoding.
//!
//! A mounting matrix maps chip axes onto body axes. The DMP wants it folded
//! into a 9-bit scalar, three bits per row: bits 0-1 hold the column of the
//! row's nonzero entry, bit 2 its sign.
//!
//! ```
//! use inv_dmp::orient::MountingMatrix;
//!
//! let m = MountingMatrix::new([0, 1, 0, -1, 0, 0, 0, 0, 1]).unwrap();
//! assert_eq!(m.scalar(), 0b010_100_001);
//! assert_eq!(MountingMatrix::from_scalar(m.scalar()), Some(m));
//! ```

use crate::defs::Q30;

/// Signed permutation matrix, row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MountingMatrix([i8; 9]);

impl MountingMatrix {
  pub const IDENTITY: Self = Self([1, 0, 0, 0, 1, 0, 0, 0, 1]);

  /// Accepts exactly one ±1 per row, each in a different column.
  pub fn new(m: [i8; 9]) -> Option<Self> {
    let mut used = [false; 3];
    for row in m.chunks_exact(3) {
      let mut col = None;
      for (c, &v) in row.iter().enumerate() {
        match v {
          0 => {}
          1 | -1 if col.is_none() => col = Some(c),
          _ => return None,
        }
      }
      let c = col?;
      if used[c] {
        return None;
      }
      used[c] = true;
    }
    Some(Self(m))
  }

  /// Inverse of [`scalar`](Self::scalar).
  pub fn from_scalar(scalar: u16) -> Option<Self> {
    if scalar >> 9 != 0 {
      return None;
    }
    let mut m = [0i8; 9];
    for row in 0..3 {
      let field = (scalar >> (3 * row)) & 0x7;
      let col = (field & 0x3) as usize;
      if col == 3 {
        return None;
      }
      m[row * 3 + col] = if field & 0x4 != 0 { -1 } else { 1 };
    }
    Self::new(m)
  }

  pub const fn as_array(&self) -> &[i8; 9] {
    &self.0
  }

  pub fn scalar(&self) -> u16 {
    orientation_to_scalar(&self.0)
  }

  /// Entries scaled by `scale`, in Q30.
  pub(crate) fn to_q30(&self, scale: f32) -> [i32; 9] {
    core::array::from_fn(|i| (scale * self.0[i] as f32 * Q30 as f32) as i32)
  }
}

impl Default for MountingMatrix {
  fn default() -> Self {
    Self::IDENTITY
  }
}

impl TryFrom<[i8; 9]> for MountingMatrix {
  type Error = ();

  fn try_from(m: [i8; 9]) -> Result<Self, Self::Error> {
    Self::new(m).ok_or(())
  }
}

/// Encode one matrix row. An all-zero row yields 7, the column-3 sentinel.
pub fn row_to_scale(row: &[i8]) -> u16 {
  match row {
    [x, ..] if *x > 0 => 0,
    [x, ..] if *x < 0 => 4,
    [_, y, ..] if *y > 0 => 1,
    [_, y, ..] if *y < 0 => 5,
    [_, _, z, ..] if *z > 0 => 2,
    [_, _, z, ..] if *z < 0 => 6,
    _ => 7,
  }
}

/// Pack a row-major 3x3 into the 9-bit DMP orientation scalar.
pub fn orientation_to_scalar(mtx: &[i8; 9]) -> u16 {
  row_to_scale(&mtx[0..3]) | row_to_scale(&mtx[3..6]) << 3 | row_to_scale(&mtx[6..9]) << 6
}

/// Axis routing program for one sensor: a selector byte per row picked by the
/// row's column, and a sign byte per row with bit 0 set for a negated axis.
pub(crate) fn axis_program(m: &MountingMatrix, selectors: &[u8; 3], sign_bases: &[u8; 3]) -> ([u8; 3], [u8; 3]) {
  let scalar = m.scalar();
  let mut sel = [0u8; 3];
  let mut sign = [0u8; 3];
  for row in 0..3 {
    let field = scalar >> (3 * row);
    sel[row] = selectors[(field & 0x3) as usize];
    sign[row] = sign_bases[row] | if field & 0x4 != 0 { 1 } else { 0 };
  }
  (sel, sign)
}
