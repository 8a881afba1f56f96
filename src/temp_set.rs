use core::hash::Hash;
use hashbrown::{HashMap, HashSet};

/// Scratch collections for a single reconciliation pass.
///
/// The collections are cleared at the start of each pass but keep their
/// allocations, so steady-state updates of a list don't re-allocate. `capacity`
/// is reported without clearing so it can be logged after a pass.
pub(crate) struct TempKeySets<K> {
	/// Old key → old position, snapshotted before the pass mutates anything.
	pub old_index: HashMap<K, usize>,
	/// New key → new position; doubles as the duplicate-key check.
	pub new_index: HashMap<K, usize>,
	/// |old position − new position| for keys present in both sequences.
	pub deltas: HashMap<K, usize>,
	/// Old blocks left in place for now, to be mounted when the new cursor reaches them.
	pub will_move: HashSet<K>,
	/// New blocks already mounted out of turn; the old cursor skips them.
	pub did_move: HashSet<K>,
}
impl<K: Eq + Hash> TempKeySets<K> {
	pub fn new() -> Self {
		Self {
			old_index: HashMap::new(),
			new_index: HashMap::new(),
			deltas: HashMap::new(),
			will_move: HashSet::new(),
			did_move: HashSet::new(),
		}
	}

	pub fn clear(&mut self) {
		self.old_index.clear();
		self.new_index.clear();
		self.deltas.clear();
		self.will_move.clear();
		self.did_move.clear();
	}

	/// Retrieves the largest cached capacity without clearing anything first.
	pub fn capacity(&self) -> usize {
		self.old_index
			.capacity()
			.max(self.new_index.capacity())
			.max(self.deltas.capacity())
			.max(self.will_move.capacity())
			.max(self.did_move.capacity())
	}
}
