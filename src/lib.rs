#![doc(html_root_url = "https://docs.rs/keyed-dom/0.1.0")]
#![warn(clippy::pedantic)]

//! A keyed list reconciler for DOM-backed views.
//!
//! Given an old rendered sequence and fresh data, [`KeyedList::reconcile`] reuses
//! every block whose key survives, creates blocks for new keys, destroys blocks
//! for vanished keys and physically moves as few blocks as possible. The view
//! layer plugs in through [`ListDriver`]; a [`web_sys`]-backed driver lives in
//! [`dom`].

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod diff;
pub mod dom;

mod block;
mod outro;
mod temp_set;

pub use block::Block;
pub use diff::{KeyError, KeyedList, ListDriver};
pub use outro::{OutroGroup, OutroHandle};
