//! The keyed list reconciler.
//!
//! [`KeyedList`] owns the rendered blocks of one list between updates. Each call
//! to [`KeyedList::reconcile`] transforms the previous sequence into one matching
//! fresh data: blocks are reused by key and patched in place, vanished keys are
//! destroyed, unseen keys are created, and of two blocks competing for a
//! position the one that drifted furthest is the one physically moved.

use crate::{
	block::Block,
	outro::{OutroGroup, OutroHandle},
	temp_set::TempKeySets,
};
use core::{fmt, fmt::Debug, hash::Hash, mem};
use hashbrown::{hash_map::Entry, HashMap};
use tracing::{info, instrument, trace, trace_span};

/// The view layer's side of a [`KeyedList`].
///
/// The reconciler decides *which* blocks to create, patch, mount, move or
/// destroy; the driver carries those decisions out against its container.
pub trait ListDriver<K, T> {
	/// Render state bound to each block.
	type Bound;

	/// Extracts the identity of `item` at `index`.
	///
	/// Must be deterministic for a given item and position. `None` marks the
	/// item as unkeyable and fails the pass with [`KeyError::Missing`].
	fn key(&self, item: &T, index: usize) -> Option<K>;

	/// Renders fresh state for a key with no existing block.
	///
	/// The result is not mounted yet; [`mount`](Self::mount) follows once the
	/// block's final position is known.
	fn create(&mut self, key: &K, item: &T, index: usize) -> Self::Bound;

	/// Updates a surviving block in place with its new item.
	///
	/// `block.index()` already reflects the new position.
	fn patch(&mut self, block: &mut Block<K, Self::Bound>, item: &T);

	/// Physically places `block`'s output directly before `anchor`, or at the
	/// end of the container for `None`.
	///
	/// Called both for first-time insertions and for moves of already-mounted
	/// blocks.
	fn mount(&mut self, block: &mut Block<K, Self::Bound>, anchor: Option<&Block<K, Self::Bound>>);

	/// Takes ownership of a block whose key vanished from the data.
	///
	/// The driver may detach immediately or run an exit effect first; either
	/// way completion is reported through `outro`. The block is already gone
	/// from the list's bookkeeping when this is called.
	fn destroy(&mut self, block: Block<K, Self::Bound>, outro: OutroHandle);
}

/// A malformed key supply within a single reconciliation pass.
///
/// Both variants are raised before any block is created, patched, mounted or
/// destroyed, so a failed pass leaves the list exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError<K: Debug> {
	/// Two items of one pass produced the same key.
	#[error("duplicate key within one reconciliation pass: {key:?} (items {first} and {second})")]
	Duplicate {
		key: K,
		/// Position of the first item with this key.
		first: usize,
		/// Position of the offending item.
		second: usize,
	},
	/// An item produced no key at all.
	#[error("item {index} produced no key")]
	Missing { index: usize },
}

/// Rendered state of one keyed list, preserved across updates.
///
/// This replaces the kind of process-wide block registry a compiled view layer
/// might keep: all bookkeeping for a list lives here, and `&mut self` on
/// [`reconcile`](Self::reconcile) guarantees passes for one list are never
/// interleaved.
pub struct KeyedList<K, B> {
	/// Keys in render order.
	order: Vec<K>,
	/// Key → surviving block. Blocks are owned here between passes.
	lookup: HashMap<K, Block<K, B>>,
	temp: TempKeySets<K>,
}
impl<K, B> KeyedList<K, B>
where
	K: Clone + Eq + Hash + Debug,
{
	#[must_use]
	pub fn new() -> Self {
		Self {
			order: Vec::new(),
			lookup: HashMap::new(),
			temp: TempKeySets::new(),
		}
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.order.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.order.is_empty()
	}

	#[must_use]
	pub fn contains_key(&self, key: &K) -> bool {
		self.lookup.contains_key(key)
	}

	#[must_use]
	pub fn get(&self, key: &K) -> Option<&Block<K, B>> {
		self.lookup.get(key)
	}

	/// Keys in render order.
	pub fn keys(&self) -> impl Iterator<Item = &K> {
		self.order.iter()
	}

	/// Blocks in render order.
	pub fn blocks(&self) -> impl Iterator<Item = &Block<K, B>> {
		self.order.iter().filter_map(move |key| self.lookup.get(key))
	}

	/// Transforms the rendered sequence to match `items`.
	///
	/// Keys are extracted and validated up front; on [`KeyError`] nothing has
	/// been mutated. On success the list's keys equal the keys of `items`, in
	/// order, and every block whose key survived kept its identity.
	///
	/// The returned [`OutroGroup`] settles once all exit effects of blocks
	/// destroyed by this pass have completed; it is already settled if nothing
	/// was destroyed (or every destroy finished synchronously).
	///
	/// # Errors
	///
	/// [`KeyError::Missing`] if an item yields no key, [`KeyError::Duplicate`]
	/// if two items of this pass yield the same key.
	#[instrument(skip(self, items, driver), fields(old_len = self.order.len(), new_len = items.len()))]
	pub fn reconcile<T, D>(&mut self, items: &[T], driver: &mut D) -> Result<OutroGroup, KeyError<K>>
	where
		D: ListDriver<K, T, Bound = B>,
	{
		self.temp.clear();

		// Validate the whole key sequence before touching any block; a bad key
		// must not leave a half-reconciled list behind.
		let mut keys = Vec::with_capacity(items.len());
		for (i, item) in items.iter().enumerate() {
			let key = driver.key(item, i).ok_or(KeyError::Missing { index: i })?;
			match self.temp.new_index.entry(key.clone()) {
				Entry::Occupied(first) => {
					return Err(KeyError::Duplicate {
						key,
						first: *first.get(),
						second: i,
					})
				}
				Entry::Vacant(vacant) => {
					vacant.insert(i);
				}
			}
			keys.push(key);
		}

		for (i, key) in self.order.iter().enumerate() {
			self.temp.old_index.insert(key.clone(), i);
		}

		// Assemble the full set of needed blocks, newest position first,
		// recording how far each surviving key drifted.
		let mut fresh: HashMap<K, Block<K, B>> = HashMap::new();
		for i in (0..keys.len()).rev() {
			let key = &keys[i];
			if let Some(block) = self.lookup.get_mut(key) {
				block.set_index(i);
				driver.patch(block, &items[i]);
			} else {
				trace!(key = ?key, index = i, "Creating block.");
				let bound = driver.create(key, &items[i], i);
				fresh.insert(key.clone(), Block::new(key.clone(), i, bound));
			}
			if let Some(&old_i) = self.temp.old_index.get(key) {
				self.temp.deltas.insert(key.clone(), old_i.abs_diff(i));
			}
		}

		let group = OutroGroup::new();
		let old = mem::take(&mut self.order);
		let mut o = old.len();
		let mut n = keys.len();
		let mut next_key: Option<&K> = None;

		{
			let span = trace_span!("Converging", old_len = o, new_len = n);
			let _enter = span.enter();
			while o > 0 && n > 0 {
				let new_key = &keys[n - 1];
				let old_key = &old[o - 1];
				if new_key == old_key {
					// Unchanged run; the block stays put.
					next_key = Some(new_key);
					o -= 1;
					n -= 1;
				} else if !self.temp.new_index.contains_key(old_key) {
					// Old key vanished from the data.
					let block = self
						.lookup
						.remove(old_key)
						.expect("keyed-dom bug: no block for removed key");
					trace!(key = ?old_key, "Destroying block.");
					driver.destroy(block, group.handle());
					o -= 1;
				} else if !self.lookup.contains_key(new_key) || self.temp.will_move.contains(new_key) {
					// Brand-new block, or one already committed to moving.
					mount_block(&mut self.lookup, &mut fresh, driver, new_key, next_key);
					next_key = Some(new_key);
					n -= 1;
				} else if self.temp.did_move.contains(old_key) {
					// Already mounted out of turn further back.
					o -= 1;
				} else if self.temp.deltas[new_key] > self.temp.deltas[old_key] {
					// The block that drifted furthest moves now. Strictly
					// greater: on a tie the old cursor's block yields instead.
					self.temp.did_move.insert(new_key.clone());
					mount_block(&mut self.lookup, &mut fresh, driver, new_key, next_key);
					next_key = Some(new_key);
					n -= 1;
				} else {
					self.temp.will_move.insert(old_key.clone());
					o -= 1;
				}
			}

			while o > 0 {
				o -= 1;
				let old_key = &old[o];
				if !self.temp.new_index.contains_key(old_key) {
					let block = self
						.lookup
						.remove(old_key)
						.expect("keyed-dom bug: no block for removed key");
					trace!(key = ?old_key, "Destroying block.");
					driver.destroy(block, group.handle());
				}
			}

			while n > 0 {
				let new_key = &keys[n - 1];
				mount_block(&mut self.lookup, &mut fresh, driver, new_key, next_key);
				next_key = Some(new_key);
				n -= 1;
			}
		}

		debug_assert!(fresh.is_empty(), "keyed-dom bug: created block was never mounted");
		self.order = keys;
		group.close();

		info!("Block count/lookup capacity: {}/{}", self.lookup.len(), self.lookup.capacity());
		info!("Diff scratch capacity (keys): {}", self.temp.capacity());
		Ok(group)
	}
}
impl<K, B> Default for KeyedList<K, B>
where
	K: Clone + Eq + Hash + Debug,
{
	fn default() -> Self {
		Self::new()
	}
}
impl<K: Debug, B> fmt::Debug for KeyedList<K, B> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("KeyedList").field("order", &self.order).finish()
	}
}

/// Mounts the pending block for `key` before `anchor_key`'s block (or at the
/// container end) and returns it to the lookup.
fn mount_block<K, B, T, D>(
	lookup: &mut HashMap<K, Block<K, B>>,
	fresh: &mut HashMap<K, Block<K, B>>,
	driver: &mut D,
	key: &K,
	anchor_key: Option<&K>,
) where
	K: Clone + Eq + Hash + Debug,
	D: ListDriver<K, T, Bound = B>,
{
	let mut block = fresh
		.remove(key)
		.or_else(|| lookup.remove(key))
		.expect("keyed-dom bug: no block for key scheduled to mount");
	trace!(key = ?key, anchor = ?anchor_key, "Mounting block.");
	driver.mount(&mut block, anchor_key.and_then(|k| lookup.get(k)));
	lookup.insert(key.clone(), block);
}
