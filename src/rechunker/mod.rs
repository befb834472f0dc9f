//! Re-framing engine for processing byte streams.
//!
//! - [`Rechunker`] - Stateful engine with `push()`/`finish()`/`abort()` API
//! - [`Transform`] - Hooks applied to the first, other and last chunks
//! - [`RechunkIter`] - Pull adapter over [`std::io::Read`]
//! - [`RechunkWriter`] - Push adapter over [`std::io::Write`]

mod engine;
mod iter;
mod transform;
mod writer;

pub use engine::Rechunker;
pub use iter::{DEFAULT_READ_SIZE, RechunkIter};
pub use transform::{FnTransform, Identity, Transform};
pub use writer::RechunkWriter;
