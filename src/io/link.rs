//! Serial link abstraction for the meter's TIC output.
//!
//! Link configuration (baud rate from [`TicMode::baud_rate`], 7E1, pins) is
//! the implementor's business. The router only pulls bytes.
//!
//! [`TicMode::baud_rate`]: crate::tic::TicMode::baud_rate

use crate::error::Result;

/// Asynchronous source of raw bytes from the meter.
///
/// # Examples
///
/// ```rust,ignore
/// use tic_router::io::ByteSource;
///
/// struct UartSource { /* uart handle */ }
///
/// impl ByteSource for UartSource {
///     async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
///         // Fill buf with whatever the UART has received
///         Ok(n)
///     }
/// }
/// ```
#[allow(async_fn_in_trait)]
pub trait ByteSource {
    /// Wait for bytes and copy them into `buf`.
    ///
    /// # Returns
    ///
    /// The number of bytes written; `0` means the stream has ended and no
    /// more bytes will follow.
    ///
    /// # Errors
    ///
    /// Returns a link error on framing, overrun or hardware failures.
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read(buf).await
    }
}
