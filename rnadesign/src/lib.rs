#[cfg(feature = "core")]
#[doc(inline)]
pub use rnadesign_core as core;

#[cfg(feature = "mutate")]
#[doc(inline)]
pub use rnadesign_mutate as mutate;

#[cfg(feature = "helix")]
#[doc(inline)]
pub use rnadesign_helix as helix;
