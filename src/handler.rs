//! Dependency-injected callables
//!
//! A handler declares what it needs through its parameter types. Every
//! parameter after the call site's fixed leading arguments implements
//! [`Dependency`] and is resolved from the container right before the
//! handler runs:
//!
//! ```
//! use appunit::handler::InjectFn;
//! use appunit_di::{Container, Injected};
//! use std::sync::Arc;
//!
//! struct Greeting(String);
//!
//! async fn greet(greeting: Injected<Greeting>, loud: Option<Injected<bool>>) -> String {
//!     match loud {
//!         Some(flag) if *flag => greeting.0.0.to_uppercase(),
//!         _ => greeting.0.0.clone(),
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let container = Container::new();
//! container.bind_instance(Arc::new(Greeting("hello".into())));
//!
//! let output = greet.invoke(&container, ()).await.unwrap();
//! assert_eq!(output, "hello");
//! # });
//! ```
//!
//! Synchronous functions are wrapped with [`blocking`] and run inline once
//! their dependencies are resolved.

use appunit_commands::BoxError;
use appunit_di::{Container, Dependency, DiResult};
use appunit_http::Response;
use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::marker::PhantomData;

/// A callable whose trailing parameters are resolved from a [`Container`].
///
/// `Ext` is the tuple of leading arguments supplied by the call site:
/// `()` for hooks and routes, `(Request, Error)` for exception handlers,
/// `(Request, Next)` for middleware and `(ArgMatches,)` for commands. `Marker`
/// only disambiguates implementations and is always inferred.
pub trait InjectFn<Ext, Marker>: Send + Sync + 'static {
	type Output: Send + 'static;

	/// Resolve the dependencies, then call the function.
	///
	/// Dependencies are resolved in parameter order. The first failure aborts
	/// the call without running the function.
	fn invoke<'a>(&'a self, container: &'a Container, ext: Ext) -> BoxFuture<'a, DiResult<Self::Output>>;
}

/// Marker for async functions taking dependencies `D`.
pub struct AsyncCall<D>(PhantomData<fn() -> D>);

/// Marker for [`blocking`] functions taking dependencies `D`.
pub struct BlockingCall<D>(PhantomData<fn() -> D>);

/// A synchronous function made usable as a handler. See [`blocking`].
#[derive(Debug, Clone, Copy)]
pub struct BlockingFn<F>(pub F);

/// Use a synchronous function as a handler.
///
/// The function runs on the calling task after its dependencies resolve, so
/// it should not block for long.
pub fn blocking<F>(f: F) -> BlockingFn<F> {
	BlockingFn(f)
}

macro_rules! impl_inject_fn {
	([$($ext:ident),*], [$($dep:ident),*]) => {
		#[allow(non_snake_case, unused_variables)]
		impl<F, Fut, $($ext,)* $($dep,)*> InjectFn<($($ext,)*), AsyncCall<($($dep,)*)>> for F
		where
			F: Fn($($ext,)* $($dep,)*) -> Fut + Send + Sync + 'static,
			Fut: Future + Send + 'static,
			Fut::Output: Send + 'static,
			$($ext: Send + 'static,)*
			$($dep: Dependency,)*
		{
			type Output = Fut::Output;

			fn invoke<'a>(
				&'a self,
				container: &'a Container,
				ext: ($($ext,)*),
			) -> BoxFuture<'a, DiResult<Self::Output>> {
				let ($($ext,)*) = ext;
				Box::pin(async move {
					$(let $dep = <$dep as Dependency>::resolve(container).await?;)*
					Ok((self)($($ext,)* $($dep,)*).await)
				})
			}
		}

		#[allow(non_snake_case, unused_variables)]
		impl<F, R, $($ext,)* $($dep,)*> InjectFn<($($ext,)*), BlockingCall<($($dep,)*)>> for BlockingFn<F>
		where
			F: Fn($($ext,)* $($dep,)*) -> R + Send + Sync + 'static,
			R: Send + 'static,
			$($ext: Send + 'static,)*
			$($dep: Dependency,)*
		{
			type Output = R;

			fn invoke<'a>(
				&'a self,
				container: &'a Container,
				ext: ($($ext,)*),
			) -> BoxFuture<'a, DiResult<Self::Output>> {
				let ($($ext,)*) = ext;
				Box::pin(async move {
					$(let $dep = <$dep as Dependency>::resolve(container).await?;)*
					Ok((self.0)($($ext,)* $($dep,)*))
				})
			}
		}
	};
}

macro_rules! all_the_dependencies {
	($name:ident, [$($ext:ident),*]) => {
		$name!([$($ext),*], []);
		$name!([$($ext),*], [D1]);
		$name!([$($ext),*], [D1, D2]);
		$name!([$($ext),*], [D1, D2, D3]);
		$name!([$($ext),*], [D1, D2, D3, D4]);
		$name!([$($ext),*], [D1, D2, D3, D4, D5]);
		$name!([$($ext),*], [D1, D2, D3, D4, D5, D6]);
		$name!([$($ext),*], [D1, D2, D3, D4, D5, D6, D7]);
		$name!([$($ext),*], [D1, D2, D3, D4, D5, D6, D7, D8]);
	};
}

all_the_dependencies!(impl_inject_fn, []);
all_the_dependencies!(impl_inject_fn, [E1]);
all_the_dependencies!(impl_inject_fn, [E1, E2]);

/// What a route or exception handler produced, before rendering.
#[derive(Debug)]
pub enum Outcome {
	/// Sent as is.
	Response(Response),
	/// Rendered by the application's default response constructor.
	Payload(Value),
}

/// Return types accepted from route, exception and middleware handlers.
///
/// A [`Response`] is sent unchanged. Anything else becomes a payload for the
/// application's default response constructor (JSON unless configured
/// otherwise). `Result`s propagate their error into the pipeline.
pub trait IntoOutcome: Send {
	fn into_outcome(self) -> appunit_http::Result<Outcome>;
}

impl IntoOutcome for Outcome {
	fn into_outcome(self) -> appunit_http::Result<Outcome> {
		Ok(self)
	}
}

impl IntoOutcome for Response {
	fn into_outcome(self) -> appunit_http::Result<Outcome> {
		Ok(Outcome::Response(self))
	}
}

impl IntoOutcome for Value {
	fn into_outcome(self) -> appunit_http::Result<Outcome> {
		Ok(Outcome::Payload(self))
	}
}

impl IntoOutcome for String {
	fn into_outcome(self) -> appunit_http::Result<Outcome> {
		Ok(Outcome::Payload(Value::String(self)))
	}
}

impl IntoOutcome for &'static str {
	fn into_outcome(self) -> appunit_http::Result<Outcome> {
		Ok(Outcome::Payload(Value::String(self.to_string())))
	}
}

impl IntoOutcome for () {
	fn into_outcome(self) -> appunit_http::Result<Outcome> {
		Ok(Outcome::Payload(Value::Null))
	}
}

/// Any serializable value, rendered by the default response constructor.
#[derive(Debug, Clone)]
pub struct Payload<T>(pub T);

impl<T: Serialize + Send> IntoOutcome for Payload<T> {
	fn into_outcome(self) -> appunit_http::Result<Outcome> {
		Ok(Outcome::Payload(serde_json::to_value(self.0)?))
	}
}

impl<T, E> IntoOutcome for Result<T, E>
where
	T: IntoOutcome,
	E: Into<appunit_http::Error> + Send,
{
	fn into_outcome(self) -> appunit_http::Result<Outcome> {
		self.map_err(Into::into)?.into_outcome()
	}
}

/// Return types accepted from lifecycle hooks and commands. The value is
/// discarded; only failure matters.
pub trait IntoCompletion: Send {
	fn into_completion(self) -> Result<(), BoxError>;
}

impl IntoCompletion for () {
	fn into_completion(self) -> Result<(), BoxError> {
		Ok(())
	}
}

impl<T, E> IntoCompletion for Result<T, E>
where
	T: Send,
	E: Into<BoxError> + Send,
{
	fn into_completion(self) -> Result<(), BoxError> {
		self.map(drop).map_err(Into::into)
	}
}
