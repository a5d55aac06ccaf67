use std::{
    fs,
    io::{self, BufRead, BufReader, Read},
    path::PathBuf,
    thread::{self, JoinHandle},
};

use crossbeam::channel::{Receiver, Sender};
use xz2::read::XzDecoder;

use crate::{cache::Op, error::TraceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Access {
    pub op: Op,
    pub addr: u64,
}

impl Access {
    /// Parses `<R|W> <address>`, the address in hex with an optional `0x`.
    /// Blank lines and `#` comments give `Ok(None)`.
    pub fn parse(line_no: usize, text: &str) -> Result<Option<Access>, TraceError> {
        let text = text.trim();
        if text.is_empty() || text.starts_with('#') {
            return Ok(None);
        }

        let mut fields = text.split_whitespace();
        let (Some(op), Some(addr)) = (fields.next(), fields.next()) else {
            return Err(TraceError::Truncated { line: line_no });
        };
        let op = Op::parse(op).ok_or_else(|| TraceError::BadOp {
            line: line_no,
            op: op.to_owned(),
        })?;
        let digits = addr
            .strip_prefix("0x")
            .or_else(|| addr.strip_prefix("0X"))
            .unwrap_or(addr);
        let addr = u64::from_str_radix(digits, 16).map_err(|_| TraceError::BadAddress {
            line: line_no,
            text: addr.to_owned(),
        })?;
        Ok(Some(Access { op, addr }))
    }
}

/// A trace streamed from disk by a background thread, in blocks of accesses.
/// The channel closes at the end of the file or after the first error.
pub struct Trace {
    pub rec: Receiver<Result<Vec<Access>, TraceError>>,
    _thread: JoinHandle<()>,
}

impl Trace {
    pub fn read(
        path: PathBuf,
        accesses_per_block: usize,
        blocks_per_queue: usize,
    ) -> io::Result<Trace> {
        let file = fs::File::open(&path)?;
        let stream: Box<dyn Read + Send> = if path.extension().is_some_and(|ext| ext == "xz") {
            Box::new(XzDecoder::new(file))
        } else {
            Box::new(file)
        };
        let (sender, receiver) = crossbeam::channel::bounded(blocks_per_queue);

        let t = thread::spawn(move || {
            Trace::run_thread(BufReader::new(stream), accesses_per_block.max(1), sender)
        });

        Ok(Trace {
            rec: receiver,
            _thread: t,
        })
    }

    fn run_thread(
        stream: impl BufRead,
        accesses_per_block: usize,
        queue: Sender<Result<Vec<Access>, TraceError>>,
    ) {
        let mut block = Vec::with_capacity(accesses_per_block);
        for (idx, line) in stream.lines().enumerate() {
            let parsed = line
                .map_err(TraceError::from)
                .and_then(|line| Access::parse(idx + 1, &line));
            match parsed {
                Ok(Some(access)) => block.push(access),
                Ok(None) => {}
                Err(err) => {
                    // a receiver that hung up is fine, the run is over either way
                    let _ = queue.send(Err(err));
                    return;
                }
            }
            if block.len() == accesses_per_block {
                let full = std::mem::replace(&mut block, Vec::with_capacity(accesses_per_block));
                if queue.send(Ok(full)).is_err() {
                    return;
                }
            }
        }
        if !block.is_empty() {
            let _ = queue.send(Ok(block));
        }
    }
}
