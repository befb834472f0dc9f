//! Async adapter over a `Stream` of byte chunks.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_core::Stream;
use pin_project_lite::pin_project;

use super::Driver;
use crate::error::RechunkError;
use crate::rechunker::{Rechunker, Transform};

pin_project! {
    /// A stream that re-frames the chunks of an upstream stream.
    ///
    /// Upstream errors abort the rechunker and are yielded, converted into
    /// [`RechunkError`], as the last item.
    pub struct RechunkPipe<S, T> {
        #[pin]
        upstream: S,
        driver: Driver<T>,
    }
}

impl<S, T> RechunkPipe<S, T> {
    /// Returns the rechunker driving this stream.
    pub fn rechunker(&self) -> &Rechunker<T> {
        &self.driver.rechunker
    }
}

impl<S, B, E, T> Stream for RechunkPipe<S, T>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<RechunkError>,
    T: Transform,
{
    type Item = Result<Bytes, RechunkError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            if let Some(poll) = this.driver.poll_ready() {
                return poll;
            }

            match this.upstream.as_mut().poll_next(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(None) => {
                    if let Some(err) = this.driver.complete() {
                        return Poll::Ready(Some(err));
                    }
                }
                Poll::Ready(Some(Ok(chunk))) => {
                    if let Some(err) = this.driver.accept(chunk.as_ref()) {
                        return Poll::Ready(Some(err));
                    }
                }
                Poll::Ready(Some(Err(e))) => return Poll::Ready(Some(this.driver.fail(e.into()))),
            }
        }
    }
}

/// Re-frames a stream of byte chunks, e.g. a body stream or a channel.
///
/// # Example
///
/// ```ignore
/// use futures_util::StreamExt;
/// use rechunkrs::{aes_cbc_decryptor, rechunk_stream, DecryptConfig, Padding};
///
/// let decryptor = aes_cbc_decryptor(&key, DecryptConfig::new().with_padding(Padding::Pkcs7))?;
/// let mut plaintext = rechunk_stream(body, decryptor);
/// while let Some(chunk) = plaintext.next().await {
///     sink.write_all(&chunk?).await?;
/// }
/// ```
pub fn rechunk_stream<S, T: Transform>(upstream: S, rechunker: Rechunker<T>) -> RechunkPipe<S, T> {
    RechunkPipe {
        upstream,
        driver: Driver::new(rechunker),
    }
}
