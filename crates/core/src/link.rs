//! Two-endpoint link over a noisy channel.
//!
//! A [`Link`] owns exactly two endpoint slots and one [`Channel`]. Sending
//! from slot `i` runs every package through the channel, in order, and then
//! hands the whole batch to the endpoint at the other slot.
//!
//! # Mailbox
//!
//! Each endpoint has a single-slot mailbox. Delivery replaces whatever batch
//! is pending (last delivered batch wins); there is no queueing and no
//! backpressure. Receivers block on a condition variable instead of polling.
//!
//! # Thread Safety
//!
//! `Link` and `Endpoint` are `Send + Sync`. The channel and the slot table
//! sit behind mutexes; a batch is moved wholesale from sender to receiver, so
//! a package is never reachable from both sides at once.

use crate::channel::{Channel, ChannelStats};
use crate::error::{LinkError, Result};
use crate::package::Package;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Number of endpoint slots on a link.
pub const SLOT_COUNT: usize = 2;

/// Single-slot blocking handoff.
#[derive(Debug, Default)]
struct Mailbox {
    pending: Mutex<Option<Vec<Package>>>,
    ready: Condvar,
}

impl Mailbox {
    fn deliver(&self, batch: Vec<Package>) {
        *self.pending.lock() = Some(batch);
        self.ready.notify_all();
    }

    fn has_pending(&self) -> bool {
        self.pending.lock().is_some()
    }

    fn try_take(&self) -> Option<Vec<Package>> {
        self.pending.lock().take()
    }

    fn take(&self) -> Vec<Package> {
        let mut pending = self.pending.lock();
        loop {
            if let Some(batch) = pending.take() {
                return batch;
            }
            self.ready.wait(&mut pending);
        }
    }

    fn take_timeout(&self, timeout: Duration) -> Option<Vec<Package>> {
        let deadline = Instant::now() + timeout;
        let mut pending = self.pending.lock();

        while pending.is_none() {
            if self.ready.wait_until(&mut pending, deadline).timed_out() {
                break;
            }
        }

        pending.take()
    }
}

#[derive(Debug)]
struct LinkInner {
    channel: Mutex<Channel>,
    slots: Mutex<Vec<Arc<Mailbox>>>,
}

/// Fixed two-party link. Cloning yields another handle to the same link.
#[derive(Debug, Clone)]
pub struct Link {
    inner: Arc<LinkInner>,
}

impl Link {
    /// Create a link with no endpoints connected.
    pub fn new(channel: Channel) -> Self {
        Self {
            inner: Arc::new(LinkInner {
                channel: Mutex::new(channel),
                slots: Mutex::new(Vec::with_capacity(SLOT_COUNT)),
            }),
        }
    }

    /// Create a link and connect both endpoints (slot 0, slot 1).
    pub fn with_endpoints(channel: Channel) -> Result<(Self, Endpoint, Endpoint)> {
        let link = Self::new(channel);
        let first = link.connect()?;
        let second = link.connect()?;
        Ok((link, first, second))
    }

    /// Register a new endpoint in the next free slot.
    ///
    /// # Errors
    /// `LinkError::LinkFull` once both slots are taken.
    pub fn connect(&self) -> Result<Endpoint> {
        let mut slots = self.inner.slots.lock();
        if slots.len() >= SLOT_COUNT {
            return Err(LinkError::LinkFull.into());
        }

        let mailbox = Arc::new(Mailbox::default());
        slots.push(Arc::clone(&mailbox));

        Ok(Endpoint {
            slot: slots.len() - 1,
            mailbox,
            link: self.clone(),
        })
    }

    /// Number of connected endpoints (0, 1 or 2).
    pub fn connected(&self) -> usize {
        self.inner.slots.lock().len()
    }

    /// Apply noise to every package and deliver the batch to the endpoint
    /// opposite `sender_slot`.
    ///
    /// # Errors
    /// - `LinkError::InvalidSlot` if `sender_slot` is not 0 or 1
    /// - `LinkError::PeerNotConnected` if the other slot is empty
    pub fn send(&self, packages: Vec<Package>, sender_slot: usize) -> Result<()> {
        if sender_slot >= SLOT_COUNT {
            return Err(LinkError::InvalidSlot(sender_slot).into());
        }

        let peer_slot = SLOT_COUNT - 1 - sender_slot;
        let peer = self
            .inner
            .slots
            .lock()
            .get(peer_slot)
            .cloned()
            .ok_or(LinkError::PeerNotConnected { slot: peer_slot })?;

        let noisy = {
            let mut channel = self.inner.channel.lock();
            packages
                .into_iter()
                .map(|package| channel.apply_noise(package))
                .collect()
        };

        peer.deliver(noisy);
        Ok(())
    }

    /// Statistics of the underlying channel.
    pub fn stats(&self) -> ChannelStats {
        self.inner.channel.lock().stats()
    }
}

/// One side of a [`Link`].
#[derive(Debug)]
pub struct Endpoint {
    slot: usize,
    mailbox: Arc<Mailbox>,
    link: Link,
}

impl Endpoint {
    /// Slot this endpoint occupies (0 or 1).
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Send a batch to the peer endpoint through the channel.
    pub fn transmit(&self, packages: Vec<Package>) -> Result<()> {
        self.link.send(packages, self.slot)
    }

    /// Whether a batch is waiting in the mailbox.
    pub fn is_data_received(&self) -> bool {
        self.mailbox.has_pending()
    }

    /// Take the pending batch without waiting.
    pub fn try_recv(&self) -> Option<Vec<Package>> {
        self.mailbox.try_take()
    }

    /// Block until a batch arrives and take it.
    pub fn recv(&self) -> Vec<Package> {
        self.mailbox.take()
    }

    /// Block up to `timeout` for a batch.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Vec<Package>> {
        self.mailbox.take_timeout(timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::NoiseModel;
    use crate::codec::Codec;
    use crate::error::Error;
    use std::thread;

    fn make_packages(data: &[u8]) -> Vec<Package> {
        Codec::new(7, 1).unwrap().pack(data).unwrap()
    }

    #[test]
    fn test_slots_fill_in_order() {
        let link = Link::new(Channel::perfect());
        assert_eq!(link.connected(), 0);

        let a = link.connect().unwrap();
        let b = link.connect().unwrap();
        assert_eq!(a.slot(), 0);
        assert_eq!(b.slot(), 1);
        assert_eq!(link.connected(), 2);

        assert!(matches!(link.connect(), Err(Error::Link(LinkError::LinkFull))));
    }

    #[test]
    fn test_send_delivers_to_peer() {
        let (_link, a, b) = Link::with_endpoints(Channel::perfect()).unwrap();
        let packages = make_packages(b"hi");

        a.transmit(packages.clone()).unwrap();
        assert!(b.is_data_received());
        assert!(!a.is_data_received());
        assert_eq!(b.try_recv(), Some(packages.clone()));
        assert!(!b.is_data_received());

        b.transmit(packages.clone()).unwrap();
        assert_eq!(a.try_recv(), Some(packages));
    }

    #[test]
    fn test_last_batch_wins() {
        let (_link, a, b) = Link::with_endpoints(Channel::perfect()).unwrap();

        a.transmit(make_packages(b"first")).unwrap();
        a.transmit(make_packages(b"second")).unwrap();

        assert_eq!(b.try_recv(), Some(make_packages(b"second")));
        assert_eq!(b.try_recv(), None);
    }

    #[test]
    fn test_peer_not_connected() {
        let link = Link::new(Channel::perfect());
        let a = link.connect().unwrap();

        let result = a.transmit(make_packages(b"x"));
        assert!(matches!(
            result,
            Err(Error::Link(LinkError::PeerNotConnected { slot: 1 }))
        ));
    }

    #[test]
    fn test_invalid_slot() {
        let (link, _a, _b) = Link::with_endpoints(Channel::perfect()).unwrap();
        assert!(matches!(
            link.send(Vec::new(), 2),
            Err(Error::Link(LinkError::InvalidSlot(2)))
        ));
    }

    #[test]
    fn test_send_applies_noise() {
        let channel = Channel::new(NoiseModel::IndependentBitFlip(1.0), 1).unwrap();
        let (link, a, b) = Link::with_endpoints(channel).unwrap();

        a.transmit(make_packages(&[0x0F, 0xF0])).unwrap();
        let received = b.recv();

        assert_eq!(received[0].payload(), Some(&[0xF0][..]));
        assert_eq!(received[1].payload(), Some(&[0x0F][..]));
        assert_eq!(link.stats().packages_seen, 2);
        assert_eq!(link.stats().bits_flipped, 16);
    }

    #[test]
    fn test_blocking_recv_across_threads() {
        let (_link, a, b) = Link::with_endpoints(Channel::perfect()).unwrap();
        let expected = make_packages(b"threaded");

        let receiver = thread::spawn(move || b.recv());
        a.transmit(expected.clone()).unwrap();

        assert_eq!(receiver.join().unwrap(), expected);
    }

    #[test]
    fn test_recv_timeout() {
        let (_link, a, b) = Link::with_endpoints(Channel::perfect()).unwrap();
        assert!(b.recv_timeout(Duration::from_millis(10)).is_none());

        a.transmit(make_packages(b"late")).unwrap();
        assert_eq!(
            b.recv_timeout(Duration::from_millis(10)),
            Some(make_packages(b"late"))
        );
    }
}
