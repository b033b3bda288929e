//! The application object
//!
//! [`AppUnit`] owns the dependency container, the router, the middleware
//! layers, the exception handlers, the lifecycle hooks and the command group.
//! Registration methods wrap plain functions in the adapters of
//! [`crate::adapter`], so every registered callable has its dependencies
//! resolved from the container when it is invoked.

use appunit_commands::{Command, CommandGroup};
use appunit_conf::Settings;
use appunit_di::{
	Container, DiError, DiResult, Dependency, Injectable, Provide, Scope,
};
use appunit_http::{
	Error, ExceptionHandler, Handler, Method, Middleware, Next, Request, Response,
};
use appunit_middleware::ExceptionKey;
use async_trait::async_trait;
use clap::ArgMatches;
use std::ffi::OsString;
use std::future::Future;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use crate::adapter::{
	CommandAdapter, ExceptionEndpoint, FnMiddleware, HookAdapter, ResponseClass, RouteEndpoint,
	json_response_class,
};
use crate::error::AppResult;
use crate::handler::{InjectFn, IntoCompletion, IntoOutcome};
use crate::lifecycle::Lifecycle;
use crate::module::Module;
use crate::pipeline::{ExceptionHandlers, LayerId, MiddlewareLayer, build_middleware_stack};
use crate::routing::{Route, RouteOptions, Router};

pub(crate) struct AppInner {
	debug: AtomicBool,
	built: AtomicBool,
	next_layer: AtomicU64,
	settings: Settings,
	container: Container,
	router: Arc<Router>,
	lifecycle: Arc<Lifecycle>,
	response_class: ResponseClass,
	exception_handlers: RwLock<ExceptionHandlers>,
	middleware: RwLock<Vec<MiddlewareLayer>>,
	stack: RwLock<Arc<dyn Handler>>,
	commands: RwLock<CommandGroup>,
	modules: RwLock<Vec<Arc<dyn Module>>>,
}

/// An application: container, pipeline, hooks and commands.
///
/// Cloning is cheap; clones share everything. The application binds itself
/// in its container, so handlers may declare an `AppUnit` parameter.
///
/// ```rust
/// use appunit::AppUnit;
/// use appunit_di::{Injected, Provide};
/// use appunit_http::{Handler, Request};
/// use std::sync::Arc;
///
/// struct Greeter {
///     greeting: &'static str,
/// }
///
/// # tokio_test::block_on(async {
/// let app = AppUnit::new();
/// app.singleton::<Greeter>(Provide::instance(Arc::new(Greeter { greeting: "hello" })));
/// app.get("/", |greeter: Injected<Greeter>| async move { greeter.greeting });
///
/// let request = Request::builder().uri("/").build().unwrap();
/// let response = app.handle(request).await.unwrap();
/// assert_eq!(response.body_text(), r#""hello""#);
/// # });
/// ```
#[derive(Clone)]
pub struct AppUnit {
	inner: Arc<AppInner>,
}

/// Builder for [`AppUnit`].
#[derive(Default)]
pub struct AppUnitBuilder {
	settings: Settings,
	response_class: Option<ResponseClass>,
	middleware: Vec<(String, Arc<dyn Middleware>)>,
	modules: Vec<Arc<dyn Module>>,
}

impl AppUnitBuilder {
	/// Start from loaded settings. Later `debug` and `auto_bind` calls
	/// override the corresponding fields.
	pub fn settings(mut self, settings: Settings) -> Self {
		self.settings = settings;
		self
	}

	pub fn debug(mut self, debug: bool) -> Self {
		self.settings.debug = debug;
		self
	}

	pub fn auto_bind(mut self, auto_bind: bool) -> Self {
		self.settings.auto_bind = auto_bind;
		self
	}

	/// Renders route payloads that are not already responses. JSON by
	/// default.
	pub fn response_class(mut self, response_class: ResponseClass) -> Self {
		self.response_class = Some(response_class);
		self
	}

	/// A user layer installed before any module runs.
	pub fn middleware(mut self, name: impl Into<String>, middleware: Arc<dyn Middleware>) -> Self {
		self.middleware.push((name.into(), middleware));
		self
	}

	pub fn module(mut self, module: Arc<dyn Module>) -> Self {
		self.modules.push(module);
		self
	}

	/// Assemble the application, install its modules, then call every
	/// module's [`Module::register`].
	///
	/// # Errors
	///
	/// The first error raised by a module's `configure` or `register`.
	pub fn build(self) -> AppResult<AppUnit> {
		let app = AppUnit::assemble(
			self.settings,
			self.response_class.unwrap_or_else(json_response_class),
		);
		for (name, middleware) in self.middleware {
			app.add_middleware_layer(name, middleware);
		}
		for module in self.modules {
			app.install_module(module)?;
		}

		app.inner.built.store(true, Ordering::SeqCst);
		for module in app.modules() {
			tracing::debug!(module = module.name(), "registering module");
			module.register()?;
		}
		Ok(app)
	}
}

impl AppUnit {
	/// An application with default settings and no modules.
	pub fn new() -> Self {
		let app = Self::assemble(Settings::default(), json_response_class());
		app.inner.built.store(true, Ordering::SeqCst);
		app
	}

	pub fn builder() -> AppUnitBuilder {
		AppUnitBuilder::default()
	}

	fn assemble(settings: Settings, response_class: ResponseClass) -> Self {
		let container = Container::builder().auto_bind(settings.auto_bind).build();
		let router = Arc::new(Router::new());

		let inner = Arc::new_cyclic(|weak: &Weak<AppInner>| {
			// Bound weakly: the container lives inside the application
			let weak = weak.clone();
			container.bind::<AppUnit>(
				Provide::factory(move |_| {
					weak.upgrade()
						.map(|inner| Arc::new(AppUnit { inner }))
						.ok_or_else(|| DiError::provider::<AppUnit, _>("application was dropped"))
				}),
				Scope::Transient,
			);
			container.bind_instance(Arc::new(settings.clone()));

			AppInner {
				debug: AtomicBool::new(settings.debug),
				built: AtomicBool::new(false),
				next_layer: AtomicU64::new(1),
				settings,
				container,
				router: router.clone(),
				lifecycle: Arc::new(Lifecycle::new()),
				response_class,
				exception_handlers: RwLock::new(ExceptionHandlers::new()),
				middleware: RwLock::new(Vec::new()),
				stack: RwLock::new(router as Arc<dyn Handler>),
				commands: RwLock::new(CommandGroup::new(env!("CARGO_PKG_NAME"))),
				modules: RwLock::new(Vec::new()),
			}
		});

		let app = Self { inner };
		app.rebuild();
		app
	}

	pub(crate) fn from_inner(inner: Arc<AppInner>) -> Self {
		Self { inner }
	}

	pub(crate) fn downgrade(&self) -> Weak<AppInner> {
		Arc::downgrade(&self.inner)
	}

	/// Whether both handles refer to the same application.
	pub fn ptr_eq(&self, other: &AppUnit) -> bool {
		Arc::ptr_eq(&self.inner, &other.inner)
	}

	// Settings

	pub fn settings(&self) -> &Settings {
		&self.inner.settings
	}

	pub fn debug(&self) -> bool {
		self.inner.debug.load(Ordering::SeqCst)
	}

	/// Toggle debug error reports. Rebuilds the middleware stack.
	pub fn set_debug(&self, debug: bool) {
		self.inner.debug.store(debug, Ordering::SeqCst);
		self.rebuild();
	}

	// Modules

	/// Install a module: set its back-reference, run its
	/// [`Module::configure`], and on an already built application run its
	/// [`Module::register`] right away.
	pub fn add_module(&self, module: Arc<dyn Module>) -> AppResult<()> {
		self.install_module(module.clone())?;
		if self.inner.built.load(Ordering::SeqCst) {
			module.register()?;
		}
		Ok(())
	}

	fn install_module(&self, module: Arc<dyn Module>) -> AppResult<()> {
		tracing::debug!(module = module.name(), "installing module");
		module.app_ref().set(self);
		module.configure(self)?;
		self.inner
			.modules
			.write()
			.unwrap_or_else(PoisonError::into_inner)
			.push(module);
		Ok(())
	}

	pub fn modules(&self) -> Vec<Arc<dyn Module>> {
		self.inner
			.modules
			.read()
			.unwrap_or_else(PoisonError::into_inner)
			.clone()
	}

	// Dependency injection

	pub fn container(&self) -> &Container {
		&self.inner.container
	}

	pub fn bind<T>(&self, provide: Provide<T>, scope: Scope)
	where
		T: ?Sized + Send + Sync + 'static,
	{
		self.inner.container.bind(provide, scope);
	}

	pub fn singleton<T>(&self, provide: Provide<T>)
	where
		T: ?Sized + Send + Sync + 'static,
	{
		self.inner.container.singleton(provide);
	}

	/// Resolve `T` from the container.
	pub async fn lookup<T>(&self) -> AppResult<Arc<T>>
	where
		T: ?Sized + Send + Sync + 'static,
	{
		Ok(self.inner.container.resolve::<T>().await?)
	}

	/// Resolve `T`, overriding its bound scope.
	pub async fn lookup_with_scope<T>(&self, scope: Scope) -> AppResult<Arc<T>>
	where
		T: ?Sized + Send + Sync + 'static,
	{
		Ok(self.inner.container.resolve_with_scope::<T>(scope).await?)
	}

	/// Resolve an [`Injectable`], auto-binding it when enabled.
	pub async fn get_injectable<T: Injectable>(&self) -> AppResult<Arc<T>> {
		Ok(self.inner.container.get::<T>().await?)
	}

	// Lifecycle

	pub fn add_startup_event<F, M>(&self, hook: F)
	where
		F: InjectFn<(), M>,
		F::Output: IntoCompletion,
		M: 'static,
	{
		self.inner
			.lifecycle
			.add_startup(Arc::new(HookAdapter::new(hook, self.inner.container.clone())));
	}

	pub fn add_shutdown_event<F, M>(&self, hook: F)
	where
		F: InjectFn<(), M>,
		F::Output: IntoCompletion,
		M: 'static,
	{
		self.inner
			.lifecycle
			.add_shutdown(Arc::new(HookAdapter::new(hook, self.inner.container.clone())));
	}

	pub async fn startup(&self) -> AppResult<()> {
		self.inner.lifecycle.startup().await
	}

	pub async fn shutdown(&self) -> AppResult<()> {
		self.inner.lifecycle.shutdown().await
	}

	// Routing

	/// Register a route. The handler's dependencies, including the current
	/// `Request`, are resolved for every call.
	pub fn add_route<F, M>(&self, path: &str, handler: F, options: RouteOptions)
	where
		F: InjectFn<(), M>,
		F::Output: IntoOutcome,
		M: 'static,
	{
		let endpoint = RouteEndpoint::new(
			handler,
			self.inner.container.clone(),
			self.inner.response_class.clone(),
		);
		self.inner
			.router
			.add(Route::new(path, Arc::new(endpoint), options));
	}

	pub fn get<F, M>(&self, path: &str, handler: F)
	where
		F: InjectFn<(), M>,
		F::Output: IntoOutcome,
		M: 'static,
	{
		self.route_group("").get(path, handler);
	}

	pub fn post<F, M>(&self, path: &str, handler: F)
	where
		F: InjectFn<(), M>,
		F::Output: IntoOutcome,
		M: 'static,
	{
		self.route_group("").post(path, handler);
	}

	pub fn put<F, M>(&self, path: &str, handler: F)
	where
		F: InjectFn<(), M>,
		F::Output: IntoOutcome,
		M: 'static,
	{
		self.route_group("").put(path, handler);
	}

	pub fn patch<F, M>(&self, path: &str, handler: F)
	where
		F: InjectFn<(), M>,
		F::Output: IntoOutcome,
		M: 'static,
	{
		self.route_group("").patch(path, handler);
	}

	pub fn delete<F, M>(&self, path: &str, handler: F)
	where
		F: InjectFn<(), M>,
		F::Output: IntoOutcome,
		M: 'static,
	{
		self.route_group("").delete(path, handler);
	}

	pub fn head<F, M>(&self, path: &str, handler: F)
	where
		F: InjectFn<(), M>,
		F::Output: IntoOutcome,
		M: 'static,
	{
		self.route_group("").head(path, handler);
	}

	pub fn options<F, M>(&self, path: &str, handler: F)
	where
		F: InjectFn<(), M>,
		F::Output: IntoOutcome,
		M: 'static,
	{
		self.route_group("").options(path, handler);
	}

	pub fn trace<F, M>(&self, path: &str, handler: F)
	where
		F: InjectFn<(), M>,
		F::Output: IntoOutcome,
		M: 'static,
	{
		self.route_group("").trace(path, handler);
	}

	/// Routes registered through the group get `prefix` prepended.
	pub fn route_group(&self, prefix: impl Into<String>) -> RouteGroup<'_> {
		RouteGroup {
			app: self,
			prefix: prefix.into(),
		}
	}

	pub fn routes(&self) -> Vec<Route> {
		self.inner.router.routes()
	}

	/// Path of the route named `name`, with `params` substituted.
	pub fn url_path_for(&self, name: &str, params: &[(&str, &str)]) -> Option<String> {
		self.inner.router.url_path_for(name, params)
	}

	// Exception handlers

	/// Register an exception handler. Handlers under `500` or
	/// [`ExceptionKey::Any`] run in the outermost layer; all others in the
	/// innermost. Registering again under the same key replaces the handler
	/// and moves it to the end of the registration order.
	pub fn add_exception_handler<F, M>(&self, key: impl Into<ExceptionKey>, handler: F)
	where
		F: InjectFn<(Request, Error), M>,
		F::Output: IntoOutcome,
		M: 'static,
	{
		let handler: Arc<dyn ExceptionHandler> = Arc::new(ExceptionEndpoint::new(
			handler,
			self.inner.container.clone(),
			self.inner.response_class.clone(),
		));
		let key = key.into();
		tracing::debug!(?key, "adding exception handler");
		{
			let mut handlers = self
				.inner
				.exception_handlers
				.write()
				.unwrap_or_else(PoisonError::into_inner);
			handlers.shift_remove(&key);
			handlers.insert(key, handler);
		}
		self.rebuild();
	}

	/// Returns whether a handler was registered under `key`.
	pub fn remove_exception_handler(&self, key: impl Into<ExceptionKey>) -> bool {
		let removed = self
			.inner
			.exception_handlers
			.write()
			.unwrap_or_else(PoisonError::into_inner)
			.shift_remove(&key.into())
			.is_some();
		if removed {
			self.rebuild();
		}
		removed
	}

	// Middleware

	/// Register a middleware function taking `(Request, Next)` and then its
	/// dependencies. Layers run in registration order, the first registered
	/// being the outermost user layer.
	pub fn add_middleware<F, M>(&self, middleware: F) -> LayerId
	where
		F: InjectFn<(Request, Next), M>,
		F::Output: IntoOutcome,
		M: 'static,
	{
		let layer = FnMiddleware::new(
			middleware,
			self.inner.container.clone(),
			self.inner.response_class.clone(),
		);
		self.add_middleware_layer(std::any::type_name::<F>(), Arc::new(layer))
	}

	/// Register a [`Middleware`] implementation as a user layer.
	pub fn add_middleware_layer(&self, name: impl Into<String>, middleware: Arc<dyn Middleware>) -> LayerId {
		let id = LayerId(self.inner.next_layer.fetch_add(1, Ordering::Relaxed));
		let name = name.into();
		tracing::debug!(?id, name = %name, "adding middleware layer");
		self.inner
			.middleware
			.write()
			.unwrap_or_else(PoisonError::into_inner)
			.push(MiddlewareLayer {
				id,
				name,
				middleware,
			});
		self.rebuild();
		id
	}

	/// Returns whether the layer was registered.
	pub fn remove_middleware(&self, id: LayerId) -> bool {
		let removed = {
			let mut layers = self
				.inner
				.middleware
				.write()
				.unwrap_or_else(PoisonError::into_inner);
			let before = layers.len();
			layers.retain(|layer| layer.id != id);
			layers.len() != before
		};
		if removed {
			self.rebuild();
		}
		removed
	}

	pub fn middleware_layers(&self) -> Vec<MiddlewareLayer> {
		self.inner
			.middleware
			.read()
			.unwrap_or_else(PoisonError::into_inner)
			.clone()
	}

	fn rebuild(&self) {
		let stack = {
			let handlers = self
				.inner
				.exception_handlers
				.read()
				.unwrap_or_else(PoisonError::into_inner);
			let layers = self
				.inner
				.middleware
				.read()
				.unwrap_or_else(PoisonError::into_inner);
			build_middleware_stack(self.debug(), &handlers, &layers, self.inner.router.clone())
		};
		*self.inner.stack.write().unwrap_or_else(PoisonError::into_inner) = stack;
	}

	// Commands

	/// Register a command that runs inside the application lifespan.
	pub fn add_command<F, M>(&self, name: impl Into<String>, command: F)
	where
		F: InjectFn<(ArgMatches,), M>,
		F::Output: IntoCompletion,
		M: 'static,
	{
		self.add_command_with(name, command, CommandOptions::default());
	}

	pub fn add_command_with<F, M>(&self, name: impl Into<String>, command: F, options: CommandOptions)
	where
		F: InjectFn<(ArgMatches,), M>,
		F::Output: IntoCompletion,
		M: 'static,
	{
		let runner = CommandAdapter::new(
			command,
			self.inner.container.clone(),
			self.inner.lifecycle.clone(),
			options.lifespan,
		);
		let mut command = Command::new(name, Arc::new(runner));
		if let Some(about) = options.about {
			command = command.about(about);
		}
		for arg in options.args {
			command = command.arg(arg);
		}

		let mut commands = self
			.inner
			.commands
			.write()
			.unwrap_or_else(PoisonError::into_inner);
		match options.group {
			Some(group) => commands.group_mut(&group).add_command(command),
			None => commands.add_command(command),
		};
	}

	/// A snapshot of the registered commands.
	pub fn commands(&self) -> CommandGroup {
		self.inner
			.commands
			.read()
			.unwrap_or_else(PoisonError::into_inner)
			.clone()
	}

	/// Run the command named on the process command line. Builds its own
	/// runtime, so call it from a synchronous `main`.
	pub fn main(&self) -> ExitCode {
		self.commands().main()
	}

	/// Parse `args` (including the program name) and run the selected
	/// command on the current runtime.
	pub async fn execute<I, T>(&self, args: I) -> AppResult<()>
	where
		I: IntoIterator<Item = T>,
		T: Into<OsString> + Clone,
	{
		Ok(self.commands().execute(args).await?)
	}

	// Server

	/// Serve the application on `settings.server` until Ctrl-C. Startup
	/// hooks run before the listener binds; shutdown hooks run after it
	/// stops, even if serving failed.
	pub async fn run(&self) -> AppResult<()> {
		#[cfg(feature = "server")]
		{
			self.run_with_shutdown(appunit_server::shutdown_signal()).await
		}
		#[cfg(not(feature = "server"))]
		{
			Err(crate::error::AppError::OptionalDependencyMissing("appunit-server"))
		}
	}

	/// Like [`AppUnit::run`], stopping when `signal` completes.
	pub async fn run_with_shutdown(&self, signal: impl Future<Output = ()>) -> AppResult<()> {
		#[cfg(feature = "server")]
		{
			let addr = self.inner.settings.server.addr()?;
			self.startup().await?;
			let served = appunit_server::HttpServer::new(Arc::new(self.clone()))
				.listen_with_shutdown(addr, signal)
				.await;
			let shutdown = self.shutdown().await;
			served?;
			shutdown
		}
		#[cfg(not(feature = "server"))]
		{
			let _ = signal;
			Err(crate::error::AppError::OptionalDependencyMissing("appunit-server"))
		}
	}
}

impl Default for AppUnit {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl Handler for AppUnit {
	async fn handle(&self, request: Request) -> appunit_http::Result<Response> {
		let stack = self
			.inner
			.stack
			.read()
			.unwrap_or_else(PoisonError::into_inner)
			.clone();
		stack.handle(request).await
	}
}

#[async_trait]
impl Dependency for AppUnit {
	async fn resolve(container: &Container) -> DiResult<Self> {
		container
			.resolve::<AppUnit>()
			.await
			.map(Arc::unwrap_or_clone)
	}
}

impl std::fmt::Debug for AppUnit {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AppUnit")
			.field("debug", &self.debug())
			.field("container", &self.inner.container)
			.field("router", &self.inner.router)
			.field("lifecycle", &self.inner.lifecycle)
			.field("middleware", &self.middleware_layers())
			.finish_non_exhaustive()
	}
}

/// Routes registered under a common path prefix.
#[derive(Debug, Clone)]
pub struct RouteGroup<'a> {
	app: &'a AppUnit,
	prefix: String,
}

impl<'a> RouteGroup<'a> {
	pub fn prefix(&self) -> &str {
		&self.prefix
	}

	/// A nested group under this group's prefix.
	pub fn group(&self, prefix: &str) -> RouteGroup<'a> {
		RouteGroup {
			app: self.app,
			prefix: join(&self.prefix, prefix),
		}
	}

	pub fn add_route<F, M>(&self, path: &str, handler: F, options: RouteOptions)
	where
		F: InjectFn<(), M>,
		F::Output: IntoOutcome,
		M: 'static,
	{
		self.app.add_route(&join(&self.prefix, path), handler, options);
	}

	pub fn get<F, M>(&self, path: &str, handler: F)
	where
		F: InjectFn<(), M>,
		F::Output: IntoOutcome,
		M: 'static,
	{
		self.add_route(path, handler, RouteOptions::new());
	}

	pub fn post<F, M>(&self, path: &str, handler: F)
	where
		F: InjectFn<(), M>,
		F::Output: IntoOutcome,
		M: 'static,
	{
		self.add_route(path, handler, RouteOptions::new().methods([Method::POST]));
	}

	pub fn put<F, M>(&self, path: &str, handler: F)
	where
		F: InjectFn<(), M>,
		F::Output: IntoOutcome,
		M: 'static,
	{
		self.add_route(path, handler, RouteOptions::new().methods([Method::PUT]));
	}

	pub fn patch<F, M>(&self, path: &str, handler: F)
	where
		F: InjectFn<(), M>,
		F::Output: IntoOutcome,
		M: 'static,
	{
		self.add_route(path, handler, RouteOptions::new().methods([Method::PATCH]));
	}

	pub fn delete<F, M>(&self, path: &str, handler: F)
	where
		F: InjectFn<(), M>,
		F::Output: IntoOutcome,
		M: 'static,
	{
		self.add_route(path, handler, RouteOptions::new().methods([Method::DELETE]));
	}

	pub fn head<F, M>(&self, path: &str, handler: F)
	where
		F: InjectFn<(), M>,
		F::Output: IntoOutcome,
		M: 'static,
	{
		self.add_route(path, handler, RouteOptions::new().methods([Method::HEAD]));
	}

	pub fn options<F, M>(&self, path: &str, handler: F)
	where
		F: InjectFn<(), M>,
		F::Output: IntoOutcome,
		M: 'static,
	{
		self.add_route(path, handler, RouteOptions::new().methods([Method::OPTIONS]));
	}

	pub fn trace<F, M>(&self, path: &str, handler: F)
	where
		F: InjectFn<(), M>,
		F::Output: IntoOutcome,
		M: 'static,
	{
		self.add_route(path, handler, RouteOptions::new().methods([Method::TRACE]));
	}
}

fn join(prefix: &str, path: &str) -> String {
	match (prefix.trim_end_matches('/'), path) {
		("", path) => path.to_string(),
		(prefix, "" | "/") => prefix.to_string(),
		(prefix, path) if path.starts_with('/') => format!("{prefix}{path}"),
		(prefix, path) => format!("{prefix}/{path}"),
	}
}

/// How a command is registered.
#[derive(Debug, Clone)]
pub struct CommandOptions {
	pub(crate) lifespan: bool,
	pub(crate) group: Option<String>,
	pub(crate) about: Option<String>,
	pub(crate) args: Vec<clap::Arg>,
}

impl Default for CommandOptions {
	fn default() -> Self {
		Self {
			lifespan: true,
			group: None,
			about: None,
			args: Vec::new(),
		}
	}
}

impl CommandOptions {
	pub fn new() -> Self {
		Self::default()
	}

	/// Run startup hooks before the command and shutdown hooks after it.
	/// On by default.
	pub fn lifespan(mut self, lifespan: bool) -> Self {
		self.lifespan = lifespan;
		self
	}

	/// Register under a named subcommand group, created on first use.
	pub fn group(mut self, group: impl Into<String>) -> Self {
		self.group = Some(group.into());
		self
	}

	pub fn about(mut self, about: impl Into<String>) -> Self {
		self.about = Some(about.into());
		self
	}

	pub fn arg(mut self, arg: impl Into<clap::Arg>) -> Self {
		self.args.push(arg.into());
		self
	}
}
