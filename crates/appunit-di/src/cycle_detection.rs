//! Task-local circular dependency detection
//!
//! Every provider invocation runs inside a task-local scope holding the path
//! of interfaces currently being built above it. Re-entering an interface
//! already on the path is a cycle.
//!
//! The path is copied into each nested scope rather than shared, so sibling
//! resolutions driven concurrently by one task (for example through
//! `futures::join!`) never see each other's entries.
//!
//! Cached lookups never get here: only provider invocations are tracked.

use std::future::Future;

use crate::error::{DiError, DiResult};
use crate::provider::InterfaceKey;

/// Maximum resolution depth (prevents pathological cases)
pub const MAX_RESOLUTION_DEPTH: usize = 100;

tokio::task_local! {
	/// Interfaces being built by the enclosing provider invocations, outermost first.
	static RESOLUTION_PATH: Vec<InterfaceKey>;
}

/// Run `provide` as the construction of `key`, failing fast on cycles and
/// runaway depth.
pub(crate) async fn track_resolution<F, T>(key: InterfaceKey, provide: F) -> DiResult<T>
where
	F: Future<Output = DiResult<T>>,
{
	let mut path = RESOLUTION_PATH
		.try_with(|path| path.clone())
		.unwrap_or_default();

	if path.contains(&key) {
		return Err(DiError::CircularDependency {
			interface: key.name(),
			path: format_cycle(&path, key),
		});
	}
	if path.len() >= MAX_RESOLUTION_DEPTH {
		return Err(DiError::ResolutionDepthExceeded(path.len() + 1));
	}

	path.push(key);
	RESOLUTION_PATH.scope(path, provide).await
}

/// Current resolution depth, zero outside any provider.
pub fn resolution_depth() -> usize {
	RESOLUTION_PATH.try_with(Vec::len).unwrap_or(0)
}

fn format_cycle(path: &[InterfaceKey], repeated: InterfaceKey) -> String {
	let start = path.iter().position(|k| *k == repeated).unwrap_or(0);
	let mut names: Vec<&str> = path[start..].iter().map(InterfaceKey::name).collect();
	names.push(repeated.name());
	names.join(" -> ")
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	struct TypeA;
	struct TypeB;

	#[rstest]
	#[tokio::test]
	async fn test_reentering_key_is_a_cycle() {
		// Arrange
		let a = InterfaceKey::of::<TypeA>();
		let b = InterfaceKey::of::<TypeB>();

		// Act
		let result: DiResult<()> = track_resolution(a, async move {
			track_resolution(b, async move { track_resolution(a, async { Ok(()) }).await })
				.await
		})
		.await;

		// Assert
		match result {
			Err(DiError::CircularDependency { path, .. }) => {
				assert!(path.ends_with("TypeA"));
				assert_eq!(path.matches(" -> ").count(), 2);
			}
			other => panic!("expected a cycle, got {other:?}"),
		}
	}

	#[rstest]
	#[tokio::test]
	async fn test_depth_is_restored_after_nested_scope() {
		let a = InterfaceKey::of::<TypeA>();

		let inner = track_resolution(a, async { Ok(resolution_depth()) })
			.await
			.unwrap();

		assert_eq!(inner, 1);
		assert_eq!(resolution_depth(), 0);
	}

	#[rstest]
	#[tokio::test]
	async fn test_siblings_do_not_share_path() {
		let a = InterfaceKey::of::<TypeA>();

		let (left, right) = futures::join!(
			track_resolution(a, async {
				tokio::task::yield_now().await;
				Ok(())
			}),
			track_resolution(a, async { Ok(()) }),
		);

		assert!(left.is_ok());
		assert!(right.is_ok());
	}

	#[rstest]
	#[tokio::test]
	async fn test_depth_limit() {
		// Arrange: a path already at the limit
		let path: Vec<InterfaceKey> = (0..MAX_RESOLUTION_DEPTH)
			.map(|_| InterfaceKey::of::<TypeB>())
			.collect();
		let result: DiResult<()> = RESOLUTION_PATH
			.scope(path, track_resolution(InterfaceKey::of::<TypeA>(), async { Ok(()) }))
			.await;

		assert!(matches!(result, Err(DiError::ResolutionDepthExceeded(101))));
	}
}
