use super::event::MessageRecord;

pub const DEFAULT_DELIMITER: u8 = b'|';

/// How record boundaries are found in the raw stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// Records end with a reserved byte, e.g. `"msg1|msg2|"`.
    Delimited { delimiter: u8 },
    /// Every read is exactly one record.
    ChunkPerRecord,
}

impl Default for Framing {
    fn default() -> Self {
        Framing::Delimited {
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

/// An unterminated record outgrew the bound and was dropped. The bytes that
/// follow, up to its delimiter, are dropped as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramerOverflow {
    pub limit: usize,
    pub discarded: usize,
}

/// Result of feeding one chunk.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Framed {
    pub records: Vec<MessageRecord>,
    pub overflow: Option<FramerOverflow>,
}

/// Turns raw chunks into complete records.
///
/// Single writer: the owning loop is the only caller of `feed`.
#[derive(Debug)]
pub struct StreamFramer {
    framing: Framing,
    pending: Vec<u8>,
    max_pending: Option<usize>,
    skipping: bool,
}

impl StreamFramer {
    pub fn new(framing: Framing) -> Self {
        Self {
            framing,
            pending: Vec::new(),
            max_pending: None,
            skipping: false,
        }
    }

    /// Bounds the pending buffer. Complete records are released early once the
    /// bound is crossed; an unterminated tail longer than `limit` is dropped.
    /// Without a bound the buffer grows until a delimiter arrives.
    pub fn with_max_pending(mut self, limit: usize) -> Self {
        self.max_pending = Some(limit);
        self
    }

    pub fn framing(&self) -> Framing {
        self.framing
    }

    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    pub fn feed(&mut self, chunk: &[u8]) -> Framed {
        match self.framing {
            Framing::ChunkPerRecord => {
                let mut framed = Framed::default();
                if !chunk.is_empty() {
                    framed.records.push(MessageRecord::from_bytes(chunk));
                }
                framed
            }
            Framing::Delimited { delimiter } => self.feed_delimited(chunk, delimiter),
        }
    }

    fn feed_delimited(&mut self, chunk: &[u8], delimiter: u8) -> Framed {
        let mut framed = Framed::default();
        let Some(chunk) = self.skip_cut_record(chunk, delimiter) else {
            return framed;
        };
        self.pending.extend_from_slice(chunk);

        if self.pending.last() == Some(&delimiter) {
            let buffered = std::mem::take(&mut self.pending);
            // Drop the final delimiter so split() does not yield a trailing empty segment.
            framed.records = split_records(&buffered[..buffered.len() - 1], delimiter);
            return framed;
        }

        // Unbounded: a partial record is never emitted, keep everything until
        // the buffer ends on a delimiter.
        let Some(limit) = self.max_pending else {
            return framed;
        };
        if self.pending.len() <= limit {
            return framed;
        }

        // Over the bound: release the complete records so only the
        // unterminated tail stays pending.
        if let Some(last) = self.pending.iter().rposition(|b| *b == delimiter) {
            let tail = self.pending.split_off(last + 1);
            let complete = std::mem::replace(&mut self.pending, tail);
            framed.records = split_records(&complete[..last], delimiter);
        }

        if self.pending.len() > limit {
            framed.overflow = Some(FramerOverflow {
                limit,
                discarded: self.pending.len(),
            });
            self.pending.clear();
            self.skipping = true;
        }
        framed
    }

    /// After an overflow the rest of the cut record is dropped up to and
    /// including its delimiter. `None` means the whole chunk was dropped.
    fn skip_cut_record<'a>(&mut self, chunk: &'a [u8], delimiter: u8) -> Option<&'a [u8]> {
        if !self.skipping {
            return Some(chunk);
        }
        let end = chunk.iter().position(|b| *b == delimiter)?;
        self.skipping = false;
        Some(&chunk[end + 1..])
    }
}

fn split_records(body: &[u8], delimiter: u8) -> Vec<MessageRecord> {
    body.split(|b| *b == delimiter)
        .map(MessageRecord::from_bytes)
        .collect()
}

impl Default for StreamFramer {
    fn default() -> Self {
        Self::new(Framing::default())
    }
}
