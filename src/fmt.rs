//! Log macros. Forward to `defmt` when the feature is on, vanish otherwise.
#![allow(unused_macros)]

macro_rules! trace {
  ($s:literal $(, $x:expr)* $(,)?) => {{
    #[cfg(feature = "defmt")]
    ::defmt::trace!($s $(, $x)*);
    #[cfg(not(feature = "defmt"))]
    let _ = ($( & $x ),*);
  }};
}

macro_rules! debug {
  ($s:literal $(, $x:expr)* $(,)?) => {{
    #[cfg(feature = "defmt")]
    ::defmt::debug!($s $(, $x)*);
    #[cfg(not(feature = "defmt"))]
    let _ = ($( & $x ),*);
  }};
}

macro_rules! warn {
  ($s:literal $(, $x:expr)* $(,)?) => {{
    #[cfg(feature = "defmt")]
    ::defmt::warn!($s $(, $x)*);
    #[cfg(not(feature = "defmt"))]
    let _ = ($( & $x ),*);
  }};
}

macro_rules! error {
  ($s:literal $(, $x:expr)* $(,)?) => {{
    #[cfg(feature = "defmt")]
    ::defmt::error!($s $(, $x)*);
    #[cfg(not(feature = "defmt"))]
    let _ = ($( & $x ),*);
  }};
}
