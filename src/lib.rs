//! Control surface for a real-time voice anonymisation pipeline.
//!
//! The pipeline itself (capture, speech recognition, synthesis, playback)
//! lives elsewhere; this crate decides *which* devices, voice and silence
//! threshold it runs with, keeps that choice persisted across restarts, and
//! mirrors the pipeline's live status into a record a UI can render.
//!
//! * [`config`]   — persisted settings record and where it lives on disk.
//! * [`catalog`]  — device and voice catalogs.
//! * [`pipeline`] — command interface, status channel and a loopback backend.
//! * [`control`]  — startup resolution, user changes and status projection.

pub mod catalog;
pub mod config;
pub mod control;
pub mod pipeline;
