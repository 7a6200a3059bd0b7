//! Upload progress observation.
//!
//! [`ProgressReader`] wraps the archive file handle and publishes an integer
//! percentage on a watch channel as the multipart body is consumed. Progress
//! counts bytes handed to the transport, not bytes acknowledged by the peer.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, ReadBuf};
use tokio::sync::watch;

/// Byte-counting reader feeding a `watch::Sender<u8>` with 0-100 percent.
///
/// The published value is monotone by construction: `sent` only grows and a
/// new percentage is sent only when it exceeds the last published one.
pub struct ProgressReader<R> {
    inner: R,
    sent: u64,
    total: u64,
    progress: watch::Sender<u8>,
}

impl<R> ProgressReader<R> {
    pub fn new(inner: R, total: u64, progress: watch::Sender<u8>) -> Self {
        progress.send_replace(0);
        Self {
            inner,
            sent: 0,
            total,
            progress,
        }
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for ProgressReader<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let before = buf.filled().len();
        match Pin::new(&mut this.inner).poll_read(cx, buf) {
            Poll::Ready(Ok(())) => {
                this.sent += (buf.filled().len() - before) as u64;
                let pct = percent(this.sent, this.total);
                if pct > *this.progress.borrow() {
                    let _ = this.progress.send(pct);
                }
                Poll::Ready(Ok(()))
            }
            other => other,
        }
    }
}

/// `round(sent * 100 / total)`, clamped to 100. A zero-byte total counts as
/// fully sent.
pub fn percent(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let pct = (sent as f64 * 100.0 / total as f64).round();
    pct.min(100.0) as u8
}
