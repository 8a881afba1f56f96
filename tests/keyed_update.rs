use keyed_dom::{Block, KeyError, KeyedList, ListDriver, OutroHandle};
use std::mem;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Op {
	Create(u32),
	Patch(u32),
	Mount { key: u32, anchor: Option<u32> },
	Destroy(u32),
}
impl Op {
	fn is_mount(&self) -> bool {
		matches!(self, Op::Mount { .. })
	}
}

type Item = (Option<u32>, &'static str);
/// (instance id, bound text) — the id tells reused blocks apart from recreated ones.
type Bound = (u32, String);

struct Recorder {
	ops: Vec<Op>,
	next_instance: u32,
}
impl Recorder {
	fn new() -> Self {
		init_tracing();
		Self {
			ops: Vec::new(),
			next_instance: 0,
		}
	}

	fn take_ops(&mut self) -> Vec<Op> {
		mem::take(&mut self.ops)
	}
}
impl ListDriver<u32, Item> for Recorder {
	type Bound = Bound;

	fn key(&self, item: &Item, _index: usize) -> Option<u32> {
		item.0
	}

	fn create(&mut self, key: &u32, item: &Item, _index: usize) -> Bound {
		self.ops.push(Op::Create(*key));
		let instance = self.next_instance;
		self.next_instance += 1;
		(instance, item.1.to_string())
	}

	fn patch(&mut self, block: &mut Block<u32, Bound>, item: &Item) {
		self.ops.push(Op::Patch(*block.key()));
		block.bound_mut().1 = item.1.to_string();
	}

	fn mount(&mut self, block: &mut Block<u32, Bound>, anchor: Option<&Block<u32, Bound>>) {
		self.ops.push(Op::Mount {
			key: *block.key(),
			anchor: anchor.map(|anchor| *anchor.key()),
		});
	}

	fn destroy(&mut self, block: Block<u32, Bound>, outro: OutroHandle) {
		self.ops.push(Op::Destroy(*block.key()));
		outro.finish();
	}
}

fn init_tracing() {
	let _ = tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.try_init();
}

fn keyed(keys: &[u32]) -> Vec<Item> {
	keys.iter().map(|&key| (Some(key), "")).collect()
}

fn order(list: &KeyedList<u32, Bound>) -> Vec<u32> {
	list.keys().copied().collect()
}

#[test]
fn empty_old_sequence_is_all_inserts() {
	let mut driver = Recorder::new();
	let mut list = KeyedList::new();

	list.reconcile(&keyed(&[1, 2, 3]), &mut driver).unwrap();

	assert_eq!(order(&list), vec![1, 2, 3]);
	// Built back to front: the trailing block is appended, the rest anchor on it.
	assert_eq!(
		driver.take_ops(),
		vec![
			Op::Create(3),
			Op::Create(2),
			Op::Create(1),
			Op::Mount { key: 3, anchor: None },
			Op::Mount { key: 2, anchor: Some(3) },
			Op::Mount { key: 1, anchor: Some(2) },
		]
	);
}

#[test]
fn identical_sequences_patch_only() {
	let mut driver = Recorder::new();
	let mut list = KeyedList::new();

	list.reconcile(&keyed(&[1, 2, 3]), &mut driver).unwrap();
	driver.take_ops();

	list.reconcile(&[(Some(1), "a"), (Some(2), "b"), (Some(3), "c")], &mut driver)
		.unwrap();

	assert_eq!(driver.take_ops(), vec![Op::Patch(3), Op::Patch(2), Op::Patch(1)]);
	assert_eq!(order(&list), vec![1, 2, 3]);
	assert_eq!(list.get(&2).unwrap().bound().1, "b");
}

#[test]
fn disjoint_key_sets_replace_everything() {
	let mut driver = Recorder::new();
	let mut list = KeyedList::new();

	list.reconcile(&keyed(&[1, 2]), &mut driver).unwrap();
	driver.take_ops();

	list.reconcile(&keyed(&[3, 4]), &mut driver).unwrap();

	let ops = driver.take_ops();
	assert!(!ops.contains(&Op::Patch(1)) && !ops.contains(&Op::Patch(2)));
	assert_eq!(
		ops,
		vec![
			Op::Create(4),
			Op::Create(3),
			Op::Destroy(2),
			Op::Destroy(1),
			Op::Mount { key: 4, anchor: None },
			Op::Mount { key: 3, anchor: Some(4) },
		]
	);
	assert_eq!(order(&list), vec![3, 4]);
}

#[test]
fn rotation_moves_only_the_furthest_drifted_block() {
	let mut driver = Recorder::new();
	let mut list = KeyedList::new();

	list.reconcile(&keyed(&[1, 2, 3]), &mut driver).unwrap();
	driver.take_ops();

	// 3 drifted by two positions, 1 and 2 by one each: only 3 moves.
	list.reconcile(&keyed(&[3, 1, 2]), &mut driver).unwrap();

	let ops = driver.take_ops();
	let mounts: Vec<&Op> = ops.iter().filter(|op| op.is_mount()).collect();
	assert_eq!(mounts, vec![&Op::Mount { key: 3, anchor: Some(1) }]);
	assert!(!ops.iter().any(|op| matches!(op, Op::Destroy(_))));
	assert_eq!(order(&list), vec![3, 1, 2]);
}

#[test]
fn swap_moves_exactly_one_block() {
	let mut driver = Recorder::new();
	let mut list = KeyedList::new();

	list.reconcile(&keyed(&[1, 2]), &mut driver).unwrap();
	driver.take_ops();

	list.reconcile(&keyed(&[2, 1]), &mut driver).unwrap();

	let ops = driver.take_ops();
	assert_eq!(ops.iter().filter(|op| op.is_mount()).count(), 1);
	assert_eq!(order(&list), vec![2, 1]);
}

#[test]
fn removed_key_is_destroyed_and_new_key_created() {
	let mut driver = Recorder::new();
	let mut list = KeyedList::new();

	// old = [a, b], new = [a, c] with numeric keys.
	list.reconcile(&keyed(&[1, 2]), &mut driver).unwrap();
	driver.take_ops();

	list.reconcile(&keyed(&[1, 3]), &mut driver).unwrap();

	assert_eq!(
		driver.take_ops(),
		vec![
			Op::Create(3),
			Op::Patch(1),
			Op::Destroy(2),
			Op::Mount { key: 3, anchor: None },
		]
	);
	assert_eq!(order(&list), vec![1, 3]);
}

#[test]
fn empty_new_sequence_destroys_every_block() {
	let mut driver = Recorder::new();
	let mut list = KeyedList::new();

	list.reconcile(&keyed(&[1, 2]), &mut driver).unwrap();
	driver.take_ops();

	list.reconcile(&[], &mut driver).unwrap();

	assert_eq!(driver.take_ops(), vec![Op::Destroy(2), Op::Destroy(1)]);
	assert!(list.is_empty());
}

#[test]
fn permutation_round_trip_restores_identities() {
	let mut driver = Recorder::new();
	let mut list = KeyedList::new();

	list.reconcile(&keyed(&[1, 2, 3]), &mut driver).unwrap();
	let instances: Vec<u32> = [1, 2, 3].iter().map(|key| list.get(key).unwrap().bound().0).collect();

	list.reconcile(&keyed(&[3, 1, 2]), &mut driver).unwrap();
	list.reconcile(&keyed(&[1, 2, 3]), &mut driver).unwrap();

	assert_eq!(order(&list), vec![1, 2, 3]);
	let restored: Vec<u32> = [1, 2, 3].iter().map(|key| list.get(key).unwrap().bound().0).collect();
	assert_eq!(restored, instances);
	assert!(!driver.take_ops().iter().any(|op| matches!(op, Op::Create(_) | Op::Destroy(_))));
}

#[test]
fn surviving_keys_always_match_the_data() {
	let mut driver = Recorder::new();
	let mut list = KeyedList::new();

	list.reconcile(&keyed(&[5, 1, 2]), &mut driver).unwrap();
	list.reconcile(&keyed(&[2, 9]), &mut driver).unwrap();

	assert_eq!(order(&list), vec![2, 9]);
	assert!(list.contains_key(&2) && list.contains_key(&9));
	assert!(!list.contains_key(&5) && !list.contains_key(&1));
	for (i, block) in list.blocks().enumerate() {
		assert_eq!(block.index(), i);
	}
}

#[test]
fn duplicate_key_fails_before_any_mutation() {
	let mut driver = Recorder::new();
	let mut list = KeyedList::new();

	list.reconcile(&keyed(&[1, 2]), &mut driver).unwrap();
	driver.take_ops();

	let result = list.reconcile(&[(Some(1), "x"), (Some(3), "y"), (Some(1), "z")], &mut driver);

	assert_eq!(
		result.unwrap_err(),
		KeyError::Duplicate {
			key: 1,
			first: 0,
			second: 2
		}
	);
	assert_eq!(driver.take_ops(), vec![]);
	assert_eq!(order(&list), vec![1, 2]);
}

#[test]
fn missing_key_fails_before_any_mutation() {
	let mut driver = Recorder::new();
	let mut list = KeyedList::new();

	list.reconcile(&keyed(&[1]), &mut driver).unwrap();
	driver.take_ops();

	let result = list.reconcile(&[(Some(1), "x"), (None, "y")], &mut driver);

	assert_eq!(result.unwrap_err(), KeyError::Missing { index: 1 });
	assert_eq!(driver.take_ops(), vec![]);
	assert_eq!(order(&list), vec![1]);
}
