//! Raw HTTP/1 helpers shared by the proxy crates.
//!
//! Nothing here owns a socket: functions take byte slices or request text and
//! return plain values, except `responses`, which writes canned replies.

use tokio::io::{AsyncRead, AsyncWrite};

pub mod censor;
pub mod message;
pub mod responses;
pub mod scanner;

pub use censor::CensorList;
pub use message::MessageError;

/// Anything the proxy can talk HTTP over on the client side.
pub trait ClientStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T> ClientStream for T where T: AsyncRead + AsyncWrite + Unpin + Send {}
