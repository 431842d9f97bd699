//! Configuration change bus
//!
//! Topic-prefix publish/subscribe over 32-bit route hashes. A single
//! delivery task consumes an unbounded channel of written paths and fans
//! each one out to every subscriber whose topic is a prefix of the path,
//! with or without the scope qualifier. The order in which subscribers of
//! one event are called is unspecified; across events delivery is FIFO.
//!
//! A subscriber that panics or returns an error is evicted after the
//! fan-out and never crashes the bus.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;

use crate::prelude::*;
use confstore_types::path::hash32;

/// Receives change notifications for subscribed topics. Returning an error
/// unsubscribes the receiver.
pub trait MessageReceiver: Send + Sync {
	fn message_config(&self, path: &Path) -> CsResult<()>;
}

impl<F> MessageReceiver for F
where
	F: Fn(&Path) -> CsResult<()> + Send + Sync,
{
	fn message_config(&self, path: &Path) -> CsResult<()> {
		self(path)
	}
}

enum Msg {
	Publish(Path),
	Stop,
}

/// topic hash -> subscription id -> receiver
struct Subscribers {
	map: HashMap<u32, HashMap<usize, Arc<dyn MessageReceiver>>>,
	auto_inc: usize,
}

impl Subscribers {
	fn remove(&mut self, id: usize) {
		// subscriptions are expected O(100), a scan is fine
		self.map.retain(|_, bucket| {
			bucket.remove(&id);
			!bucket.is_empty()
		});
	}
}

pub struct PubSub {
	subs: Arc<RwLock<Subscribers>>,
	tx: flume::Sender<Msg>,
	closed: AtomicBool,
	ack: parking_lot::Mutex<Option<oneshot::Receiver<()>>>,
}

impl PubSub {
	/// Creates the bus and spawns its delivery task. Must be called inside
	/// a tokio runtime.
	pub fn new() -> PubSub {
		let subs = Arc::new(RwLock::new(Subscribers { map: HashMap::new(), auto_inc: 0 }));
		let (tx, rx) = flume::unbounded::<Msg>();
		let (ack_tx, ack_rx) = oneshot::channel();

		let task_subs = subs.clone();
		tokio::spawn(async move {
			while let Ok(msg) = rx.recv_async().await {
				match msg {
					Msg::Publish(path) => deliver(&task_subs, &path),
					Msg::Stop => break,
				}
			}
			let _ = ack_tx.send(());
		});

		PubSub {
			subs,
			tx,
			closed: AtomicBool::new(false),
			ack: parking_lot::Mutex::new(Some(ack_rx)),
		}
	}

	/// Subscribes a receiver to a topic. The topic is any route prefix,
	/// with or without the scope qualifier: `system`, `system/smtp`,
	/// `system/smtp/host`, `stores/5/system/smtp`, ... It cannot be empty,
	/// you cannot listen to everything. Returns the subscription id.
	pub fn subscribe(&self, topic: &str, receiver: Arc<dyn MessageReceiver>) -> CsResult<usize> {
		if topic.is_empty() {
			return Err(Error::Empty("subscription topic".into()));
		}
		let mut subs = self.subs.write();
		subs.auto_inc += 1;
		let id = subs.auto_inc;
		subs.map.entry(hash32(topic.as_bytes())).or_default().insert(id, receiver);
		Ok(id)
	}

	/// Removes a subscription by id. Unknown ids are ignored.
	pub fn unsubscribe(&self, id: usize) -> CsResult<()> {
		self.subs.write().remove(id);
		Ok(())
	}

	/// Enqueues a change event. Never blocks; a closed bus drops the event.
	pub fn publish(&self, path: Path) {
		if !self.closed.load(Ordering::Acquire) {
			let _ = self.tx.send(Msg::Publish(path));
		}
	}

	/// Stops the delivery task after draining queued events. A second call
	/// returns `AlreadyClosed`.
	pub async fn close(&self) -> CsResult<()> {
		if self.closed.swap(true, Ordering::AcqRel) {
			return Err(Error::AlreadyClosed);
		}
		let _ = self.tx.send(Msg::Stop);
		let ack = self.ack.lock().take();
		if let Some(ack) = ack {
			let _ = ack.await;
		}
		Ok(())
	}

	#[cfg(test)]
	fn subscriber_count(&self) -> usize {
		self.subs.read().map.values().map(|b| b.len()).sum()
	}
}

impl Default for PubSub {
	fn default() -> Self {
		PubSub::new()
	}
}

impl std::fmt::Debug for PubSub {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		f.debug_struct("PubSub")
			.field("topics", &self.subs.read().map.len())
			.field("closed", &self.closed.load(Ordering::Relaxed))
			.finish()
	}
}

/// Fan a single path out to every matching topic bucket. Both hash variants
/// are looked up per level, so `system/smtp` and `stores/5/system/smtp`
/// subscribers each see a write to `stores/5/system/smtp/host`.
fn deliver(subs: &RwLock<Subscribers>, path: &Path) {
	let mut evict: Vec<usize> = Vec::new();
	{
		let guard = subs.read();
		if guard.map.is_empty() {
			return;
		}
		for level in [1, 2, -1] {
			for hash in [path.hash(level), path.hash_scoped(level)] {
				let Some(bucket) = guard.map.get(&hash) else { continue };
				for (id, receiver) in bucket {
					match catch_unwind(AssertUnwindSafe(|| receiver.message_config(path))) {
						Ok(Ok(())) => {}
						Ok(Err(err)) => {
							debug!("evicting subscriber {} for {}: {}", id, path, err);
							evict.push(*id);
						}
						Err(_panic) => {
							debug!("evicting panicked subscriber {} for {}", id, path);
							evict.push(*id);
						}
					}
				}
			}
		}
	}

	if !evict.is_empty() {
		let mut guard = subs.write();
		for id in evict {
			guard.remove(id);
		}
	}
}


// vim: ts=4
