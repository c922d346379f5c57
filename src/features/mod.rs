//! Feature extraction modules
//!
//! This module contains the tonal feature pipeline:
//! - Chroma extraction (STFT, CQT, CENS)
//! - Key template matching

pub mod chroma;
pub mod key;
