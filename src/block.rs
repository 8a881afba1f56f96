/// One reusable render unit of a [`KeyedList`](crate::KeyedList).
///
/// A block pairs a stable `key` with whatever rendered state the view layer
/// bound to it (`B`, e.g. a [`web_sys::Node`]). Its identity is preserved for as
/// long as its key keeps appearing in the data; `index` is rewritten on every
/// reconciliation pass before the block is patched.
#[derive(Debug)]
pub struct Block<K, B> {
	key: K,
	index: usize,
	bound: B,
}
impl<K, B> Block<K, B> {
	pub(crate) fn new(key: K, index: usize, bound: B) -> Self {
		Self { key, index, bound }
	}

	#[must_use]
	pub fn key(&self) -> &K {
		&self.key
	}

	/// The block's position as of the most recent reconciliation pass.
	#[must_use]
	pub fn index(&self) -> usize {
		self.index
	}

	pub(crate) fn set_index(&mut self, index: usize) {
		self.index = index;
	}

	#[must_use]
	pub fn bound(&self) -> &B {
		&self.bound
	}

	pub fn bound_mut(&mut self) -> &mut B {
		&mut self.bound
	}

	/// Unwraps the bound render state, e.g. to hand it to an exit animation.
	#[must_use]
	pub fn into_bound(self) -> B {
		self.bound
	}
}
