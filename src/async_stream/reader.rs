//! Async stream adapter over `futures_io::AsyncRead`.

use std::io::ErrorKind;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_core::Stream;
use futures_io::AsyncRead;
use pin_project_lite::pin_project;

use super::Driver;
use crate::error::RechunkError;
use crate::rechunker::{DEFAULT_READ_SIZE, Rechunker, Transform};

pin_project! {
    /// A stream that yields re-framed chunks read from an async reader.
    ///
    /// End of input finishes the rechunker. A read error aborts it: the
    /// buffered remainder is discarded and the error is yielded once.
    pub struct RechunkStream<R, T> {
        #[pin]
        reader: R,
        driver: Driver<T>,
        buffer: Vec<u8>,
    }
}

impl<R, T> RechunkStream<R, T> {
    /// Returns the rechunker driving this stream.
    pub fn rechunker(&self) -> &Rechunker<T> {
        &self.driver.rechunker
    }
}

impl<R: AsyncRead, T: Transform> Stream for RechunkStream<R, T> {
    type Item = Result<Bytes, RechunkError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            if let Some(poll) = this.driver.poll_ready() {
                return poll;
            }

            match this.reader.as_mut().poll_read(cx, this.buffer.as_mut_slice()) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Ok(0)) => {
                    if let Some(err) = this.driver.complete() {
                        return Poll::Ready(Some(err));
                    }
                }
                Poll::Ready(Ok(n)) => {
                    if let Some(err) = this.driver.accept(&this.buffer[..n]) {
                        return Poll::Ready(Some(err));
                    }
                }
                Poll::Ready(Err(e)) if e.kind() == ErrorKind::Interrupted => continue,
                Poll::Ready(Err(e)) => return Poll::Ready(Some(this.driver.fail(e.into()))),
            }
        }
    }
}

/// Creates a stream of re-framed chunks from an async reader.
///
/// Uses `futures_io::AsyncRead` for runtime-agnostic async I/O. For tokio
/// readers, convert with `tokio_util::compat`:
///
/// ```ignore
/// use tokio_util::compat::TokioAsyncReadCompatExt;
/// use rechunkrs::{aes_cbc_encryptor, rechunk_async, EncryptConfig};
///
/// let file = tokio::fs::File::open("plain.txt").await?;
/// let encryptor = aes_cbc_encryptor(&key, EncryptConfig::new(iv))?;
/// let stream = rechunk_async(file.compat(), encryptor);
/// ```
///
/// # Arguments
///
/// * `reader` - An async reader implementing `AsyncRead`
/// * `rechunker` - The engine (and its transform) to run the data through
pub fn rechunk_async<R: AsyncRead, T: Transform>(
    reader: R,
    rechunker: Rechunker<T>,
) -> RechunkStream<R, T> {
    RechunkStream {
        reader,
        driver: Driver::new(rechunker),
        buffer: vec![0u8; DEFAULT_READ_SIZE],
    }
}
