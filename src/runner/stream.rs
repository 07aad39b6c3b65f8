//! Incremental reading of a child's output stream.

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc::Sender;

use super::{RunChunk, RunError};

/// Read `reader` to EOF in reads of at most `chunk_size` bytes, sending each
/// decoded piece as soon as it is read. Returns the number of bytes read.
///
/// UTF-8 sequences split across reads are held back until complete; invalid
/// bytes become U+FFFD.
pub async fn pump<R>(
    mut reader: R,
    chunk_size: usize,
    sender: &Sender<RunChunk>,
    wrap: fn(String) -> RunChunk,
) -> Result<usize, RunError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut decoder = Utf8Decoder::default();
    let mut total = 0;

    loop {
        let n = reader.read(&mut buf).await.map_err(RunError::Io)?;
        if n == 0 {
            break;
        }
        total += n;
        let text = decoder.push(&buf[..n]);
        if !text.is_empty() {
            sender
                .send(wrap(text))
                .await
                .map_err(|_| RunError::ChannelClosed)?;
        }
    }

    let rest = decoder.finish();
    if !rest.is_empty() {
        sender
            .send(wrap(rest))
            .await
            .map_err(|_| RunError::ChannelClosed)?;
    }
    Ok(total)
}

/// Holds back an incomplete trailing UTF-8 sequence between reads.
#[derive(Default)]
struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    fn push(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::new();

        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(s) => {
                    out.push_str(s);
                    self.pending.clear();
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + len);
                        }
                        // Incomplete sequence at the end: wait for more bytes
                        None => {
                            self.pending.drain(..valid);
                            break;
                        }
                    }
                }
            }
        }

        out
    }

    fn finish(self) -> String {
        String::from_utf8_lossy(&self.pending).into_owned()
    }
}
