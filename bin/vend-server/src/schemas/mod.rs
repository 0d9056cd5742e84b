//! Wire types: request bodies (validated) and response bodies.

pub mod v1;
