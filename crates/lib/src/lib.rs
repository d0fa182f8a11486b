//! Lingo core library: LINE webhook gateway, Papago language detection and
//! translation, target-language resolution, and the per-event reply pipeline.

pub mod channels;
pub mod config;
pub mod gateway;
pub mod init;
pub mod pipeline;
pub mod target;
pub mod translate;
