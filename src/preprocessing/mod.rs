//! Audio preprocessing modules
//!
//! This module contains utilities for preparing audio for analysis:
//! - Channel mixing (multi-channel to mono)
//! - Cropping and slicing by time

pub mod channel_mixer;
pub mod crop;
