//! Tracking of connected clients and their outbound queues.
//!
//! Each connection gets a dedicated writer task fed by one unbounded
//! channel, so broadcasts and direct replies are serialized per connection
//! and never interleave on the wire. The registry maps player ids to those
//! channels; it lives behind its own lock, separate from the world lock.

use log::info;
use std::collections::HashMap;
use tokio::sync::mpsc::UnboundedSender;

pub struct ClientRegistry {
    clients: HashMap<u32, UnboundedSender<String>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self {
            clients: HashMap::new(),
        }
    }

    pub fn insert(&mut self, id: u32, tx: UnboundedSender<String>) {
        self.clients.insert(id, tx);
    }

    /// Drops a client's outbound queue; its writer task then drains and
    /// exits. Returns false if the client was already gone.
    pub fn remove(&mut self, id: u32) -> bool {
        if self.clients.remove(&id).is_some() {
            info!("Client {} disconnected.", id);
            true
        } else {
            false
        }
    }

    /// Queues `frame` on every connection. A send is accepted, not
    /// delivered; a rejected send means the writer task is gone and the
    /// returned ids should be pruned.
    pub fn broadcast(&self, frame: &str) -> Vec<u32> {
        let mut failed = Vec::new();
        for (id, tx) in &self.clients {
            if tx.send(frame.to_string()).is_err() {
                failed.push(*id);
            }
        }
        failed
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_insert_and_remove() {
        let mut registry = ClientRegistry::new();
        assert!(registry.is_empty());

        let (tx, _rx) = mpsc::unbounded_channel();
        registry.insert(1, tx);
        assert_eq!(registry.len(), 1);

        assert!(registry.remove(1));
        assert!(!registry.remove(1));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_broadcast_reaches_every_queue() {
        let mut registry = ClientRegistry::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        registry.insert(1, tx1);
        registry.insert(2, tx2);

        let failed = registry.broadcast("frame\n");
        assert!(failed.is_empty());
        assert_eq!(rx1.try_recv().unwrap(), "frame\n");
        assert_eq!(rx2.try_recv().unwrap(), "frame\n");
    }

    #[test]
    fn test_broadcast_reports_dead_queues() {
        let mut registry = ClientRegistry::new();
        let (tx1, rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        registry.insert(1, tx1);
        registry.insert(2, tx2);
        drop(rx1);

        let failed = registry.broadcast("frame\n");
        assert_eq!(failed, vec![1]);
    }
}
