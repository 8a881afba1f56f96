//! A [`ListDriver`] for real DOM containers.
//!
//! [`DomListDriver`] mounts block output as child nodes of one
//! [`web_sys::Element`], using [***insertBefore***](https://developer.mozilla.org/en-US/docs/Web/API/Node/insertBefore)
//! for insertions and moves alike. Rendering and patching stay with the view
//! layer through [`DomBind`]; its `exit` hook decides whether removed nodes
//! detach immediately or after an exit effect.
//!
//! DOM failures are logged and skipped rather than unwound: a list update that
//! raced an external DOM mutation should degrade, not abort the view.

use crate::{
	block::Block,
	diff::ListDriver,
	outro::OutroHandle,
};
use tracing::{error, instrument};
use web_sys::Node;

/// View-layer bindings for one DOM-backed list.
pub trait DomBind<K, T> {
	/// See [`ListDriver::key`].
	fn key(&self, item: &T, index: usize) -> Option<K>;

	/// Renders `item` to a detached node. The driver mounts it.
	fn create(&mut self, key: &K, item: &T, index: usize) -> Node;

	/// Updates a mounted node in place with `item`.
	fn patch(&mut self, node: &Node, item: &T, index: usize);

	/// Removes `node` from the document, possibly after an exit effect.
	///
	/// The default detaches immediately and finishes the handle. An override
	/// may start an animation, keep `outro` alive for its duration and finish
	/// it (or just drop it) from the completion callback, calling [`detach`]
	/// there itself.
	fn exit(&mut self, node: Node, outro: OutroHandle) {
		detach(&node);
		outro.finish();
	}
}

/// Drives a [`KeyedList`](crate::KeyedList) against the child nodes of one
/// container element.
#[derive(Debug)]
pub struct DomListDriver<V> {
	container: web_sys::Element,
	bind: V,
}
impl<V> DomListDriver<V> {
	pub fn new(container: web_sys::Element, bind: V) -> Self {
		Self { container, bind }
	}

	#[must_use]
	pub fn container(&self) -> &web_sys::Element {
		&self.container
	}

	#[must_use]
	pub fn bind(&self) -> &V {
		&self.bind
	}

	pub fn bind_mut(&mut self) -> &mut V {
		&mut self.bind
	}
}
impl<K, T, V> ListDriver<K, T> for DomListDriver<V>
where
	V: DomBind<K, T>,
{
	type Bound = Node;

	fn key(&self, item: &T, index: usize) -> Option<K> {
		self.bind.key(item, index)
	}

	fn create(&mut self, key: &K, item: &T, index: usize) -> Node {
		self.bind.create(key, item, index)
	}

	fn patch(&mut self, block: &mut Block<K, Node>, item: &T) {
		let index = block.index();
		self.bind.patch(block.bound(), item, index);
	}

	fn mount(&mut self, block: &mut Block<K, Node>, anchor: Option<&Block<K, Node>>) {
		if let Err(error) = self.container.insert_before(block.bound(), anchor.map(Block::bound)) {
			error!("Failed to insert node: {:?}", error);
		}
	}

	fn destroy(&mut self, block: Block<K, Node>, outro: OutroHandle) {
		self.bind.exit(block.into_bound(), outro);
	}
}

/// Removes `node` from its parent, if it still has one.
#[instrument]
pub fn detach(node: &Node) {
	match node.parent_node() {
		Some(parent) => {
			if let Err(error) = parent.remove_child(node) {
				error!("Failed to remove the node: {:?}", error);
			}
		}
		None => error!("Could not find parent node of node to remove. Ignoring."),
	}
}
