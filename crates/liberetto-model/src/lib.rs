pub mod base_libretto;
pub mod timing_overlay;
pub mod interchange;

pub use base_libretto::*;
pub use timing_overlay::*;
pub use interchange::*;
