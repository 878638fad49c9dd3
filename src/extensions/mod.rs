//! Optional extensions to the base camera controller.

#[cfg(feature = "extension_anchor_indicator")]
pub mod anchor_indicator;
