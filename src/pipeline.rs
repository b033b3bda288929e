//! Middleware stack assembly
//!
//! The composed stack, outermost first:
//!
//! 1. [`ServerErrorMiddleware`] with the catastrophic handler (registered
//!    under `500` or [`ExceptionKey::Any`]) and the debug flag
//! 2. [`RequestScopeMiddleware`]
//! 3. user layers in registration order
//! 4. [`ExceptionMiddleware`] with every other exception handler
//! 5. the route dispatcher

use appunit_http::{ExceptionHandler, Handler, Middleware, MiddlewareChain};
use appunit_middleware::{
	ExceptionKey, ExceptionMiddleware, RequestScopeMiddleware, ServerErrorMiddleware,
};
use indexmap::IndexMap;
use std::sync::Arc;

/// Exception handlers in registration order.
pub type ExceptionHandlers = IndexMap<ExceptionKey, Arc<dyn ExceptionHandler>>;

/// Identity of a registered user layer, used to remove it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub(crate) u64);

/// One user middleware layer.
#[derive(Clone)]
pub struct MiddlewareLayer {
	pub id: LayerId,
	pub name: String,
	pub middleware: Arc<dyn Middleware>,
}

impl std::fmt::Debug for MiddlewareLayer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MiddlewareLayer")
			.field("id", &self.id)
			.field("name", &self.name)
			.finish_non_exhaustive()
	}
}

/// Compose the middleware stack around `dispatcher`.
///
/// When several catastrophic handlers are registered the last one wins.
pub fn build_middleware_stack(
	debug_mode: bool,
	handlers: &ExceptionHandlers,
	layers: &[MiddlewareLayer],
	dispatcher: Arc<dyn Handler>,
) -> Arc<dyn Handler> {
	let mut catastrophic = None;
	let mut typed = Vec::new();
	for (key, handler) in handlers {
		if key.is_catastrophic() {
			catastrophic = Some(handler.clone());
		} else {
			typed.push((*key, handler.clone()));
		}
	}

	tracing::debug!(
		debug_mode,
		catastrophic = catastrophic.is_some(),
		typed = typed.len(),
		layers = layers.len(),
		"building middleware stack"
	);

	let mut chain = MiddlewareChain::new(dispatcher)
		.with_middleware(Arc::new(ServerErrorMiddleware::new(catastrophic, debug_mode)))
		.with_middleware(Arc::new(RequestScopeMiddleware::new()));
	for layer in layers {
		chain.add_middleware(layer.middleware.clone());
	}
	chain
		.with_middleware(Arc::new(ExceptionMiddleware::new(typed)))
		.build()
}
