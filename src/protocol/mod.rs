//! # Telemetry Protocol Module
//!
//! Implementation of the aircraft telemetry wire protocol.
//!
//! This module handles:
//! - Wire constants and signed fixed-point values (scale 10⁴)
//! - Byte-to-word framing with burst sentinel detection
//! - Record decoding into track records
//! - Producer-side encoding for loopback feeds and fixtures

pub mod wire;
pub mod framer;
pub mod record;
pub mod encoder;
