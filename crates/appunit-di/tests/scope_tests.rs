//! Singleton and request scope caching
//!
//! These tests verify that:
//! 1. Request-scoped interfaces are cached per installed request context
//! 2. Singleton interfaces are shared across request contexts
//! 3. Request-scoped resolution outside a context never runs the provider
//! 4. Concurrent requests never observe each other's request cache

use appunit_di::{Container, DiError, Production, Provide, Scope, ScopeStrategy, context};
use appunit_http::Request;
use async_trait::async_trait;
use rstest::{fixture, rstest};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Barrier;

// Counts how many times its provider ran
struct Tracked {
	serial: usize,
}

fn request(path: &str) -> Request {
	Request::builder().uri(path).build().unwrap()
}

fn bind_tracked(container: &Container, scope: Scope) -> Arc<AtomicUsize> {
	let calls = Arc::new(AtomicUsize::new(0));
	let counter = calls.clone();
	container.bind::<Tracked>(
		Provide::factory(move |_| {
			let serial = counter.fetch_add(1, Ordering::SeqCst) + 1;
			Ok(Arc::new(Tracked { serial }))
		}),
		scope,
	);
	calls
}

#[fixture]
fn container() -> Container {
	Container::new()
}

#[rstest]
#[tokio::test]
async fn test_request_scope_cached_within_request(container: Container) {
	// Arrange
	let calls = bind_tracked(&container, Scope::Request);

	// Act
	let (first, second) = context::with_request(request("/a"), async {
		let first = container.resolve::<Tracked>().await.unwrap();
		let second = container.resolve::<Tracked>().await.unwrap();
		(first, second)
	})
	.await;

	// Assert
	assert!(Arc::ptr_eq(&first, &second));
	assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[rstest]
#[tokio::test]
async fn test_request_scope_distinct_across_requests(container: Container) {
	// Arrange
	let calls = bind_tracked(&container, Scope::Request);

	// Act
	let first = context::with_request(request("/a"), container.resolve::<Tracked>())
		.await
		.unwrap();
	let second = context::with_request(request("/b"), container.resolve::<Tracked>())
		.await
		.unwrap();

	// Assert
	assert!(!Arc::ptr_eq(&first, &second));
	assert_eq!((first.serial, second.serial), (1, 2));
	assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[rstest]
#[tokio::test]
async fn test_singleton_shared_across_requests(container: Container) {
	// Arrange
	let calls = bind_tracked(&container, Scope::Singleton);
	let mut seen = Vec::new();

	// Act
	for path in ["/a", "/b", "/c"] {
		let value = context::with_request(request(path), container.resolve::<Tracked>())
			.await
			.unwrap();
		seen.push(value);
	}
	let outside = container.resolve::<Tracked>().await.unwrap();

	// Assert
	assert!(seen.iter().all(|v| Arc::ptr_eq(v, &outside)));
	assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[rstest]
#[tokio::test]
async fn test_request_scope_without_context_never_runs_provider(container: Container) {
	// Arrange
	let calls = bind_tracked(&container, Scope::Request);

	// Act
	let result = container.resolve::<Tracked>().await;

	// Assert
	assert!(matches!(result, Err(DiError::NoActiveRequest)));
	assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[rstest]
#[tokio::test]
async fn test_transient_runs_provider_every_time(container: Container) {
	let calls = bind_tracked(&container, Scope::Transient);

	let first = container.resolve::<Tracked>().await.unwrap();
	let second = container.resolve::<Tracked>().await.unwrap();

	assert!(!Arc::ptr_eq(&first, &second));
	assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[rstest]
#[tokio::test]
async fn test_scope_override_caches_per_request(container: Container) {
	// Arrange: bound transient, resolved request-scoped
	let calls = bind_tracked(&container, Scope::Transient);

	// Act
	let same = context::with_request(request("/a"), async {
		let a = container
			.resolve_with_scope::<Tracked>(Scope::Request)
			.await
			.unwrap();
		let b = container
			.resolve_with_scope::<Tracked>(Scope::Request)
			.await
			.unwrap();
		Arc::ptr_eq(&a, &b)
	})
	.await;

	// Assert
	assert!(same);
	assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_requests_are_isolated(container: Container) {
	// Arrange
	let calls = bind_tracked(&container, Scope::Request);
	let barrier = Arc::new(Barrier::new(2));

	let run = |path: &'static str| {
		let container = container.clone();
		let barrier = barrier.clone();
		tokio::spawn(context::with_request(request(path), async move {
			let before = container.resolve::<Tracked>().await.unwrap();
			// Both requests have cached their instance before either continues
			barrier.wait().await;
			let after = container.resolve::<Tracked>().await.unwrap();
			let current = context::current_request().unwrap();
			(before, after, current.path().to_string())
		}))
	};

	// Act
	let a = run("/a");
	let b = run("/b");
	let (a_before, a_after, a_path) = a.await.unwrap();
	let (b_before, b_after, b_path) = b.await.unwrap();

	// Assert
	assert!(Arc::ptr_eq(&a_before, &a_after));
	assert!(Arc::ptr_eq(&b_before, &b_after));
	assert!(!Arc::ptr_eq(&a_before, &b_before));
	assert_eq!((a_path.as_str(), b_path.as_str()), ("/a", "/b"));
	assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[rstest]
#[tokio::test]
async fn test_concurrent_first_resolution_within_request_settles_on_one_instance(
	container: Container,
) {
	// Arrange: a provider that yields, so both resolutions miss the cache
	let calls = Arc::new(AtomicUsize::new(0));
	let counter = calls.clone();
	container.bind::<Tracked>(
		Provide::async_factory(move |_: Container| {
			let counter = counter.clone();
			async move {
				tokio::task::yield_now().await;
				let serial = counter.fetch_add(1, Ordering::SeqCst) + 1;
				Ok(Arc::new(Tracked { serial }))
			}
		}),
		Scope::Request,
	);

	// Act
	let (first, second, third) = context::with_request(request("/a"), async {
		let (first, second) = futures::join!(
			container.resolve::<Tracked>(),
			container.resolve::<Tracked>()
		);
		let third = container.resolve::<Tracked>().await.unwrap();
		(first.unwrap(), second.unwrap(), third)
	})
	.await;

	// Assert: duplicate construction is allowed, but the first insert wins
	assert!(calls.load(Ordering::SeqCst) >= 1);
	assert!(Arc::ptr_eq(&first, &third));
	assert!(Arc::ptr_eq(&second, &third));
}

struct CountingStrategy {
	hits: AtomicUsize,
}

#[async_trait]
impl ScopeStrategy for CountingStrategy {
	async fn get_or_provide(
		&self,
		production: Production<'_>,
	) -> appunit_di::DiResult<appunit_di::Instance> {
		self.hits.fetch_add(1, Ordering::SeqCst);
		production.run().await
	}

	fn name(&self) -> &'static str {
		"counting"
	}
}

#[rstest]
#[tokio::test]
async fn test_custom_scope_strategy(container: Container) {
	// Arrange
	let strategy = Arc::new(CountingStrategy {
		hits: AtomicUsize::new(0),
	});
	let calls = bind_tracked(&container, Scope::Custom(strategy.clone()));

	// Act
	container.resolve::<Tracked>().await.unwrap();
	container.resolve::<Tracked>().await.unwrap();

	// Assert
	assert_eq!(strategy.hits.load(Ordering::SeqCst), 2);
	assert_eq!(calls.load(Ordering::SeqCst), 2);
	assert_eq!(format!("{:?}", Scope::Custom(strategy)), "Custom(counting)");
}
