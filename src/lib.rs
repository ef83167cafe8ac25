//! # Aircraft Radar Library
//!
//! Real-time core of a radar-style aircraft display.
//!
//! This library decodes the aircraft telemetry stream arriving on a serial
//! link, keeps a tear-free double-buffered table of tracks, projects them
//! onto the display around a fixed reference point and lets an operator
//! change the range and page through tracks with buttons and a stick.

pub mod config;
pub mod control;
pub mod error;
pub mod harness;
pub mod ingest;
pub mod input;
pub mod projection;
pub mod protocol;
pub mod render;
pub mod selection;
pub mod serial;
pub mod signal;
pub mod telemetry;
pub mod track;
