use std::sync::mpsc;
use std::thread;

/// Number of chunks per CPU.
const CHUNKS_PER_CPU: usize = 8;

/// Splits `items` into chunks, runs `work` on each chunk in a worker thread,
/// and returns the partial results in chunk order.
///
/// # Behavior
/// - Chunk count is `cpus * 8`, chunk size is rounded up.
/// - Results are collected through an MPSC channel, tagged with the chunk
///   index, then sorted back into input order.
/// - An empty input yields no chunk at all.
pub(crate) fn map_chunks<T, R, F>(items: &[T], work: F) -> Vec<R>
where
	T: Sync,
	R: Send,
	F: Fn(&[T]) -> R + Sync,
{
	if items.is_empty() {
		return Vec::new();
	}

	let chunks = num_cpus::get() * CHUNKS_PER_CPU;
	let chunk_size = items.len().div_ceil(chunks);

	let (tx, rx) = mpsc::channel();
	thread::scope(|scope| {
		for (index, chunk) in items.chunks(chunk_size).enumerate() {
			let tx = tx.clone();
			let work = &work;
			scope.spawn(move || {
				// The receiver outlives the scope, sending cannot fail
				let _ = tx.send((index, work(chunk)));
			});
		}
	});
	drop(tx);

	let mut partials: Vec<(usize, R)> = rx.iter().collect();
	partials.sort_by_key(|(index, _)| *index);
	partials.into_iter().map(|(_, partial)| partial).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn keeps_input_order() {
		let items: Vec<usize> = (0..1000).collect();
		let sums: Vec<Vec<usize>> = map_chunks(&items, |chunk| chunk.iter().map(|x| x * 2).collect());
		let flat: Vec<usize> = sums.into_iter().flatten().collect();
		assert_eq!(flat, items.iter().map(|x| x * 2).collect::<Vec<_>>());
	}

	#[test]
	fn empty_input_has_no_chunks() {
		let items: Vec<u8> = Vec::new();
		assert!(map_chunks(&items, |chunk| chunk.len()).is_empty());
	}
}
