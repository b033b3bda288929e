//! Ambient request context
//!
//! The context layer installs the in-flight [`Request`] together with a fresh
//! [`RequestScope`] in a tokio task-local slot. Code anywhere below it, on the
//! same logical task, can recover both without having them passed down.
//!
//! The slot follows the task across worker threads, so requests interleaved
//! on one worker or spread over many never observe each other's values.
//!
//! Installs nest and are stack-disciplined: [`install`] returns a token and
//! [`restore`] only accepts the token of the innermost frame. Prefer
//! [`with_request`]: it runs its future in a slot of its own, seeded with a
//! copy of the caller's frames, so concurrent requests polled from one task
//! stay apart and nothing leaks back to the caller on any exit path.
//!
//! ```
//! use appunit_di::context;
//! use appunit_http::Request;
//!
//! # tokio_test::block_on(async {
//! let request = Request::builder().uri("/orders/1").build().unwrap();
//!
//! let path = context::with_request(request, async {
//!     context::current_request().unwrap().path().to_string()
//! })
//! .await;
//!
//! assert_eq!(path, "/orders/1");
//! assert!(context::current_request().is_err());
//! # });
//! ```

use appunit_http::Request;
use std::cell::RefCell;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{DiError, DiResult};
use crate::scope::RequestScope;

static NEXT_FRAME_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone)]
struct Frame {
	id: u64,
	request: Request,
	scope: RequestScope,
}

impl Frame {
	fn new(request: Request) -> Self {
		Self {
			id: NEXT_FRAME_ID.fetch_add(1, Ordering::Relaxed),
			request,
			scope: RequestScope::new(),
		}
	}
}

#[derive(Default)]
struct AmbientStack {
	frames: Vec<Frame>,
}

tokio::task_local! {
	static AMBIENT: RefCell<AmbientStack>;
}

/// Proof of one [`install`]. Hand it back to [`restore`].
#[derive(Debug)]
#[must_use = "an installed request context must be restored"]
pub struct ContextToken {
	id: u64,
}

/// Run `f` with the context slot established for this task.
///
/// If a slot is already established the future runs directly within it.
pub async fn scope<F: Future>(f: F) -> F::Output {
	if AMBIENT.try_with(|_| ()).is_ok() {
		f.await
	} else {
		AMBIENT.scope(RefCell::new(AmbientStack::default()), f).await
	}
}

/// Synchronous variant of [`scope`].
pub fn sync_scope<R>(f: impl FnOnce() -> R) -> R {
	if AMBIENT.try_with(|_| ()).is_ok() {
		f()
	} else {
		AMBIENT.sync_scope(RefCell::new(AmbientStack::default()), f)
	}
}

/// Make `request` the current request, with a fresh empty request cache.
///
/// # Errors
///
/// [`DiError::ContextScopeMissing`] outside [`scope`] / [`sync_scope`].
pub fn install(request: Request) -> DiResult<ContextToken> {
	let frame = Frame::new(request);
	let id = frame.id;
	AMBIENT
		.try_with(|stack| stack.borrow_mut().frames.push(frame))
		.map_err(|_| DiError::ContextScopeMissing)?;
	tracing::trace!(frame = id, "request context installed");
	Ok(ContextToken { id })
}

/// Remove the frame created by the [`install`] that returned `token`, making
/// the previously installed request (if any) current again.
///
/// # Errors
///
/// [`DiError::TokenMismatch`] if `token` is not the innermost frame; nothing
/// is changed in that case.
pub fn restore(token: ContextToken) -> DiResult<()> {
	AMBIENT
		.try_with(|stack| {
			let mut stack = stack.borrow_mut();
			let is_top = stack.frames.last().is_some_and(|f| f.id == token.id);
			if !is_top {
				return Err(DiError::TokenMismatch);
			}
			stack.frames.pop();
			tracing::trace!(frame = token.id, "request context restored");
			Ok(())
		})
		.map_err(|_| DiError::ContextScopeMissing)?
}

/// The request installed by the innermost context frame.
///
/// # Errors
///
/// [`DiError::NoActiveRequest`] if no request is installed.
pub fn current_request() -> DiResult<Request> {
	with_top(|frame| frame.request.clone())
}

/// Edit the request of the innermost context frame in place. Its request
/// cache is kept.
///
/// The router uses this to publish matched path parameters to everything
/// that resolves the current request afterwards. `f` runs on a copy, so it
/// may read the context itself.
pub fn update_request(f: impl FnOnce(&mut Request)) -> DiResult<()> {
	let (id, mut request) = with_top(|frame| (frame.id, frame.request.clone()))?;
	f(&mut request);
	AMBIENT
		.try_with(|stack| {
			stack
				.borrow_mut()
				.frames
				.iter_mut()
				.rfind(|frame| frame.id == id)
				.map(|frame| frame.request = request)
		})
		.ok()
		.flatten()
		.ok_or(DiError::NoActiveRequest)
}

/// The request cache of the innermost context frame.
pub fn request_scope() -> DiResult<RequestScope> {
	with_top(|frame| frame.scope.clone())
}

/// Whether a request is currently installed.
pub fn is_active() -> bool {
	with_top(|_| ()).is_ok()
}

fn with_top<R>(f: impl FnOnce(&Frame) -> R) -> DiResult<R> {
	AMBIENT
		.try_with(|stack| stack.borrow().frames.last().map(f))
		.ok()
		.flatten()
		.ok_or(DiError::NoActiveRequest)
}

/// Run `f` with `request` installed on top of a copy of the caller's frames.
///
/// `f` gets a slot of its own, so futures joined on one task never see each
/// other's frames, and the caller's context is untouched when `f` completes,
/// fails or is dropped.
pub async fn with_request<F: Future>(request: Request, f: F) -> F::Output {
	let mut frames = AMBIENT
		.try_with(|stack| stack.borrow().frames.clone())
		.unwrap_or_default();
	let frame = Frame::new(request);
	tracing::trace!(frame = frame.id, "request context installed");
	frames.push(frame);
	AMBIENT
		.scope(RefCell::new(AmbientStack { frames }), f)
		.await
}

/// RAII form of [`install`] / [`restore`].
///
/// Dropping the guard also discards any frames installed above it and never
/// restored, so the context always returns to its state before `enter`.
#[derive(Debug)]
#[must_use = "the request context is restored when the guard is dropped"]
pub struct ContextGuard {
	id: u64,
}

impl ContextGuard {
	pub fn enter(request: Request) -> DiResult<Self> {
		let ContextToken { id } = install(request)?;
		Ok(Self { id })
	}
}

impl Drop for ContextGuard {
	fn drop(&mut self) {
		let _ = AMBIENT.try_with(|stack| {
			let mut stack = stack.borrow_mut();
			if let Some(pos) = stack.frames.iter().rposition(|f| f.id == self.id) {
				let leaked = stack.frames.len() - pos - 1;
				if leaked > 0 {
					tracing::warn!(leaked, "discarding request contexts that were never restored");
				}
				stack.frames.truncate(pos);
			}
		});
	}
}

/// Spawn a task that sees the current request context, sharing its cache.
///
/// Plain `tokio::spawn` starts the new task with no request installed.
pub fn spawn<F>(future: F) -> tokio::task::JoinHandle<F::Output>
where
	F: Future + Send + 'static,
	F::Output: Send + 'static,
{
	let frame = with_top(Frame::clone).ok();
	tokio::spawn(async move {
		match frame {
			Some(frame) => {
				let stack = AmbientStack {
					frames: vec![frame],
				};
				AMBIENT.scope(RefCell::new(stack), future).await
			}
			None => future.await,
		}
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn request(path: &str) -> Request {
		Request::builder().uri(path).build().unwrap()
	}

	#[rstest]
	#[tokio::test]
	async fn test_install_outside_scope_fails() {
		let result = install(request("/"));
		assert!(matches!(result, Err(DiError::ContextScopeMissing)));
	}

	#[rstest]
	#[tokio::test]
	async fn test_nested_install_and_restore() {
		scope(async {
			// Arrange
			let outer = install(request("/outer")).unwrap();
			let inner = install(request("/inner")).unwrap();
			assert_eq!(current_request().unwrap().path(), "/inner");

			// Act & Assert: restoring out of order is rejected
			assert!(matches!(restore(outer), Err(DiError::TokenMismatch)));
			assert_eq!(current_request().unwrap().path(), "/inner");

			restore(inner).unwrap();
			assert_eq!(current_request().unwrap().path(), "/outer");
		})
		.await;
	}

	#[rstest]
	#[tokio::test]
	async fn test_update_request_keeps_cache() {
		with_request(request("/users/42"), async {
			// Arrange
			let before = request_scope().unwrap();

			// Act
			update_request(|r| r.set_path_param("id", "42")).unwrap();

			// Assert
			assert_eq!(current_request().unwrap().path_param("id"), Some("42"));
			assert!(request_scope().unwrap().same_cache(&before));
		})
		.await;
		assert!(matches!(
			update_request(|_| ()),
			Err(DiError::NoActiveRequest)
		));
	}

	#[rstest]
	#[tokio::test]
	async fn test_update_request_closure_may_read_context() {
		let seen = with_request(request("/orders/7"), async {
			update_request(|r| {
				let path = current_request().unwrap().path().to_string();
				r.set_path_param("path", path);
			})
			.unwrap();
			current_request().unwrap().path_param("path").map(str::to_string)
		})
		.await;

		assert_eq!(seen.as_deref(), Some("/orders/7"));
	}

	#[rstest]
	fn test_guard_discards_leaked_frames() {
		sync_scope(|| {
			let guard = ContextGuard::enter(request("/guarded")).unwrap();
			let _leaked = install(request("/leaked")).unwrap();

			drop(guard);

			assert!(!is_active());
		});
	}
}
