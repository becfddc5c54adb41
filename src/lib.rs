//! Graf - random-access decoder for header/binary simulation result files
//!
//! A result is a header (stage range, scenarios, block layout, agent names)
//! plus a payload of `f32` records, one per (stage, scenario, block), each
//! holding one value per agent.
//!
//! ```no_run
//! use std::path::Path;
//!
//! use graf::config::Config;
//! use graf::storage::open_file_set;
//!
//! let (header, mut session) = open_file_set(Path::new("results/coster"), &Config::default())?;
//! for stage in header.min_stage()..=header.max_stage() {
//!     let blocks = session.blocks(stage)?;
//!     let record = session.read(stage, 1, blocks)?;
//!     println!("{stage}: {record:?}");
//! }
//! session.close();
//! # Ok::<(), graf::GrafError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::cargo)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::field_reassign_with_default,
    clippy::multiple_crate_versions
)]

pub mod codec;
pub mod config;
pub mod error;
pub mod storage;

pub use codec::TextEncoding;
pub use error::{Dimension, GrafError, Result};
pub use storage::{decode_header, BinarySession, Coordinate, Header, PayloadMode};
