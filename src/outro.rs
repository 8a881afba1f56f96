use core::{cell::RefCell, fmt, mem};
use std::rc::Rc;
use tracing::trace;

struct GroupState {
	pending: usize,
	open: bool,
	callbacks: Vec<Box<dyn FnOnce()>>,
}
impl GroupState {
	fn is_settled(&self) -> bool {
		!self.open && self.pending == 0
	}
}

/// Tracks the exit effects of all blocks destroyed in one reconciliation pass.
///
/// Reconciliation never waits on exit effects: a destroyed block leaves the
/// list's bookkeeping immediately, while its physical detachment may be deferred
/// behind an animation. The group settles once the pass has ended *and* every
/// [`OutroHandle`] it issued has completed.
///
/// A pass that destroys nothing returns an already-settled group.
#[derive(Clone)]
pub struct OutroGroup {
	state: Rc<RefCell<GroupState>>,
}
impl OutroGroup {
	pub(crate) fn new() -> Self {
		Self {
			state: Rc::new(RefCell::new(GroupState {
				pending: 0,
				open: true,
				callbacks: Vec::new(),
			})),
		}
	}

	pub(crate) fn handle(&self) -> OutroHandle {
		self.state.borrow_mut().pending += 1;
		OutroHandle {
			state: Rc::clone(&self.state),
			finished: false,
		}
	}

	/// Marks the pass as ended. No further handles are issued afterwards.
	pub(crate) fn close(&self) {
		self.state.borrow_mut().open = false;
		try_settle(&self.state);
	}

	#[must_use]
	pub fn is_settled(&self) -> bool {
		self.state.borrow().is_settled()
	}

	/// Exit effects still in flight.
	#[must_use]
	pub fn pending(&self) -> usize {
		self.state.borrow().pending
	}

	/// Runs `f` once all exit effects of the pass have completed.
	///
	/// If the group is already settled, `f` runs immediately.
	pub fn on_settled(&self, f: impl FnOnce() + 'static) {
		let settled = self.state.borrow().is_settled();
		if settled {
			f()
		} else {
			self.state.borrow_mut().callbacks.push(Box::new(f))
		}
	}
}
impl fmt::Debug for OutroGroup {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.state.borrow();
		f.debug_struct("OutroGroup")
			.field("pending", &state.pending)
			.field("open", &state.open)
			.finish()
	}
}

/// Completion token for one destroyed block's exit effect.
///
/// [`ListDriver::destroy`](crate::ListDriver::destroy) receives one of these per
/// destroyed block. A driver that detaches immediately calls [`finish`](Self::finish)
/// right away; one that animates holds the handle and finishes it from the
/// effect's completion callback. Dropping an unfinished handle counts as
/// completion, so a cancelled or superseded effect never wedges its group.
pub struct OutroHandle {
	state: Rc<RefCell<GroupState>>,
	finished: bool,
}
impl OutroHandle {
	pub fn finish(mut self) {
		self.complete();
	}

	fn complete(&mut self) {
		if !self.finished {
			self.finished = true;
			{
				let mut state = self.state.borrow_mut();
				state.pending -= 1;
				trace!(pending = state.pending, "Exit effect completed.");
			}
			try_settle(&self.state);
		}
	}
}
impl Drop for OutroHandle {
	fn drop(&mut self) {
		self.complete();
	}
}
impl fmt::Debug for OutroHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("OutroHandle").field("finished", &self.finished).finish()
	}
}

fn try_settle(state: &Rc<RefCell<GroupState>>) {
	let callbacks = {
		let mut state = state.borrow_mut();
		if !state.is_settled() {
			return;
		}
		mem::take(&mut state.callbacks)
	};
	// Run outside the borrow; a callback may query or re-register on the group.
	for f in callbacks {
		f()
	}
}
