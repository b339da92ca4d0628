//! Synchronous rank-to-rank communication.
//!
//! Every collective is a blocking, all-participant rendezvous: no rank
//! proceeds until every rank has arrived, and there is no cancellation short
//! of process termination. A rank that dies mid-collective aborts the whole
//! run (the remaining ranks panic), because later collectives assume
//! universal participation.

use std::cell::RefCell;
use std::sync::mpsc::{channel, Receiver, Sender};

/// Blocking collectives over a fixed group of ranks.
///
/// Payloads are flat `f64` coordinate buffers or `usize` connectivity
/// buffers; callers do their own (de)serialization into points and cells.
pub trait Communicator {
    /// This rank's id; rank 0 is the coordinator.
    fn rank(&self) -> usize;

    /// Number of participating ranks.
    fn size(&self) -> usize;

    /// Every rank contributes a buffer; every rank receives all buffers,
    /// indexed by source rank.
    fn all_gather(&self, mine: &[f64]) -> Vec<Vec<f64>>;

    /// Personalized exchange: `sends[r]` goes to rank `r`; the result holds
    /// one buffer per source rank (the own slot passes through unchanged).
    fn all_to_all(&self, sends: Vec<Vec<f64>>) -> Vec<Vec<f64>>;

    /// Gather coordinate buffers onto `root`. Returns `Some` on the root,
    /// `None` elsewhere.
    fn gather_floats(&self, mine: &[f64], root: usize) -> Option<Vec<Vec<f64>>>;

    /// Gather connectivity buffers onto `root`.
    fn gather_cells(&self, mine: &[usize], root: usize) -> Option<Vec<Vec<usize>>>;

    /// Global minimum reduction.
    fn allreduce_min(&self, value: f64) -> f64 {
        self.all_gather(&[value])
            .iter()
            .flat_map(|buf| buf.iter().copied())
            .fold(f64::INFINITY, f64::min)
    }
}

/// The degenerate single-rank communicator.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialComm;

impl Communicator for SerialComm {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn all_gather(&self, mine: &[f64]) -> Vec<Vec<f64>> {
        vec![mine.to_vec()]
    }

    fn all_to_all(&self, sends: Vec<Vec<f64>>) -> Vec<Vec<f64>> {
        sends
    }

    fn gather_floats(&self, mine: &[f64], _root: usize) -> Option<Vec<Vec<f64>>> {
        Some(vec![mine.to_vec()])
    }

    fn gather_cells(&self, mine: &[usize], _root: usize) -> Option<Vec<Vec<usize>>> {
        Some(vec![mine.to_vec()])
    }

    fn allreduce_min(&self, value: f64) -> f64 {
        value
    }
}

enum Payload {
    Floats(Vec<f64>),
    Cells(Vec<usize>),
}

struct Envelope {
    from: usize,
    payload: Payload,
}

/// Channel-backed communicator connecting ranks inside one process.
///
/// Each endpoint belongs to exactly one thread. All ranks execute the same
/// sequence of collectives in lockstep, so a per-sender FIFO plus a stash
/// for early arrivals is enough to match messages to collectives.
pub struct LocalComm {
    rank: usize,
    peers: Vec<Sender<Envelope>>,
    inbox: Receiver<Envelope>,
    stash: RefCell<Vec<Envelope>>,
}

impl LocalComm {
    /// Create `size` connected endpoints; endpoint `r` is rank `r`.
    pub fn create(size: usize) -> Vec<LocalComm> {
        let (senders, receivers): (Vec<_>, Vec<_>) = (0..size).map(|_| channel()).unzip();
        receivers
            .into_iter()
            .enumerate()
            .map(|(rank, inbox)| LocalComm {
                rank,
                peers: senders.clone(),
                inbox,
                stash: RefCell::new(Vec::new()),
            })
            .collect()
    }

    fn send(&self, to: usize, payload: Payload) {
        let envelope = Envelope {
            from: self.rank,
            payload,
        };
        self.peers[to]
            .send(envelope)
            .expect("rank terminated during a collective");
    }

    fn recv_from(&self, from: usize) -> Payload {
        let mut stash = self.stash.borrow_mut();
        if let Some(pos) = stash.iter().position(|e| e.from == from) {
            return stash.remove(pos).payload;
        }
        loop {
            let envelope = self
                .inbox
                .recv()
                .expect("rank terminated during a collective");
            if envelope.from == from {
                return envelope.payload;
            }
            stash.push(envelope);
        }
    }

    fn recv_floats(&self, from: usize) -> Vec<f64> {
        match self.recv_from(from) {
            Payload::Floats(buf) => buf,
            Payload::Cells(_) => unreachable!("collective payload mismatch"),
        }
    }

    fn recv_cells(&self, from: usize) -> Vec<usize> {
        match self.recv_from(from) {
            Payload::Cells(buf) => buf,
            Payload::Floats(_) => unreachable!("collective payload mismatch"),
        }
    }
}

impl Communicator for LocalComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.peers.len()
    }

    fn all_gather(&self, mine: &[f64]) -> Vec<Vec<f64>> {
        for r in 0..self.size() {
            if r != self.rank {
                self.send(r, Payload::Floats(mine.to_vec()));
            }
        }
        (0..self.size())
            .map(|r| {
                if r == self.rank {
                    mine.to_vec()
                } else {
                    self.recv_floats(r)
                }
            })
            .collect()
    }

    fn all_to_all(&self, mut sends: Vec<Vec<f64>>) -> Vec<Vec<f64>> {
        debug_assert_eq!(sends.len(), self.size());
        for (r, buf) in sends.iter_mut().enumerate() {
            if r != self.rank {
                self.send(r, Payload::Floats(std::mem::take(buf)));
            }
        }
        (0..self.size())
            .map(|r| {
                if r == self.rank {
                    std::mem::take(&mut sends[r])
                } else {
                    self.recv_floats(r)
                }
            })
            .collect()
    }

    fn gather_floats(&self, mine: &[f64], root: usize) -> Option<Vec<Vec<f64>>> {
        if self.rank == root {
            Some(
                (0..self.size())
                    .map(|r| {
                        if r == root {
                            mine.to_vec()
                        } else {
                            self.recv_floats(r)
                        }
                    })
                    .collect(),
            )
        } else {
            self.send(root, Payload::Floats(mine.to_vec()));
            None
        }
    }

    fn gather_cells(&self, mine: &[usize], root: usize) -> Option<Vec<Vec<usize>>> {
        if self.rank == root {
            Some(
                (0..self.size())
                    .map(|r| {
                        if r == root {
                            mine.to_vec()
                        } else {
                            self.recv_cells(r)
                        }
                    })
                    .collect(),
            )
        } else {
            self.send(root, Payload::Cells(mine.to_vec()));
            None
        }
    }
}
