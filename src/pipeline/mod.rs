//! Pipeline stages for plugin XML generation.
//!
//! Each submodule implements exactly one transformation step, so every stage
//! can be tested on its own and the builder in [`crate::convert`] stays a
//! thin driver.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ source ──▶ encode ──▶ document ──▶ serialize
//! (JSON)    (bytes)    (base64)   (tree)       (XML text)
//!              guid ─────────────────┘
//! ```
//!
//! 1. [`input`]    : parse the `plugins` JSON into descriptors
//! 2. [`source`]   : read each plugin's Lua file as bytes
//! 3. [`encode`]   : cut the file into blocks and base64-encode them
//! 4. [`guid`]     : supply missing guids from the injected CSPRNG
//! 5. [`document`] : assemble the ordered element tree
//! 6. [`serialize`]: write the declaration and indented elements

pub mod document;
pub mod encode;
pub mod guid;
pub mod input;
pub mod serialize;
pub mod source;
