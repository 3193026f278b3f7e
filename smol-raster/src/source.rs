// sequential byte source with a running offset; every short read becomes
// a TruncatedStream naming the offset where the data ran out

use std::io::{self, BufRead, Read};

use crate::error::{DecodeError, Location, Result};

pub(crate) struct Source<R> {
    inner: R,
    pos: u64,
}

impl<R: BufRead> Source<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self { inner, pos: 0 }
    }

    pub(crate) fn position(&self) -> u64 {
        self.pos
    }

    pub(crate) fn at(&self) -> Location {
        Location::Offset(self.pos)
    }

    fn fill(&mut self) -> Result<&[u8]> {
        loop {
            match self.inner.fill_buf() {
                Ok(_) => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(DecodeError::Io(e)),
            }
        }
        self.inner.fill_buf().map_err(DecodeError::Io)
    }

    pub(crate) fn peek(&mut self) -> Result<Option<u8>> {
        Ok(self.fill()?.first().copied())
    }

    pub(crate) fn next_byte(&mut self) -> Result<Option<u8>> {
        let b = self.peek()?;
        if b.is_some() {
            self.inner.consume(1);
            self.pos += 1;
        }
        Ok(b)
    }

    pub(crate) fn read_exact(&mut self, buf: &mut [u8], what: &'static str) -> Result<()> {
        let mut done = 0usize;
        while done < buf.len() {
            let avail = self.fill()?;
            if avail.is_empty() {
                return Err(DecodeError::truncated(what, self.at()));
            }
            let n = avail.len().min(buf.len() - done);
            buf[done..done + n].copy_from_slice(&avail[..n]);
            self.inner.consume(n);
            self.pos += n as u64;
            done += n;
        }
        Ok(())
    }

    pub(crate) fn read_array<const N: usize>(&mut self, what: &'static str) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        self.read_exact(&mut out, what)?;
        Ok(out)
    }

    // grows with the data actually present, so a bogus length in a
    // truncated file fails at EOF instead of reserving the declared size
    pub(crate) fn read_vec(&mut self, len: usize, what: &'static str) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let got = (&mut self.inner).take(len as u64).read_to_end(&mut out)?;
        self.pos += got as u64;
        if got < len {
            return Err(DecodeError::truncated(what, self.at()));
        }
        Ok(out)
    }

    pub(crate) fn skip(&mut self, mut n: u64, what: &'static str) -> Result<()> {
        while n > 0 {
            let avail = self.fill()?.len();
            if avail == 0 {
                return Err(DecodeError::truncated(what, self.at()));
            }
            let step = (avail as u64).min(n) as usize;
            self.inner.consume(step);
            self.pos += step as u64;
            n -= step as u64;
        }
        Ok(())
    }

    pub(crate) fn at_eof(&mut self) -> Result<bool> {
        Ok(self.fill()?.is_empty())
    }
}
