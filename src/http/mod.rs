//! Minimal HTTP framing.
//!
//! Just enough HTTP to read one bounded request and write one response:
//! no chunked transfer encoding, no keep-alive, no method or path
//! routing. The only header the framer ever interprets is
//! `content-length`.
//!
//! The HTTP layer is organized into three submodules:
//!
//! - **`codec`**: extracts one complete request from a connection's
//!   accumulated bytes and serializes replies
//! - **`request`**: the parsed request representation
//! - **`response`**: the response preamble applied to every reply

pub mod codec;
pub mod request;
pub mod response;
