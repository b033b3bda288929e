//! Binding, modules, auto-binding and cycle detection

use appunit_di::{
	Autowired, Container, Dependency, DiError, DiResult, Injectable, Injected, Provide, Scope,
};
use async_trait::async_trait;
use rstest::rstest;
use std::sync::Arc;

trait Greeter: Send + Sync {
	fn greet(&self) -> String;
}

struct English;
struct French;

impl Greeter for English {
	fn greet(&self) -> String {
		"hello".into()
	}
}

impl Greeter for French {
	fn greet(&self) -> String {
		"bonjour".into()
	}
}

#[rstest]
#[tokio::test]
async fn test_last_binding_wins() {
	// Arrange
	let container = Container::new();
	container
		.bind::<dyn Greeter>(Provide::instance(Arc::new(English) as Arc<dyn Greeter>), Scope::Singleton)
		.bind::<dyn Greeter>(Provide::instance(Arc::new(French) as Arc<dyn Greeter>), Scope::Singleton);

	// Act
	let greeter = container.resolve::<dyn Greeter>().await.unwrap();

	// Assert
	assert_eq!(greeter.greet(), "bonjour");
}

#[rstest]
#[tokio::test]
async fn test_provider_resolves_sub_dependencies() {
	// Arrange
	struct Welcome(String);
	let container = Container::new();
	container.bind_instance::<dyn Greeter>(Arc::new(English));
	container.bind::<Welcome>(
		Provide::async_factory(|c: Container| async move {
			let greeter = c.resolve::<dyn Greeter>().await?;
			Ok(Arc::new(Welcome(format!("{}, world", greeter.greet()))))
		}),
		Scope::Transient,
	);

	// Act
	let welcome = container.resolve::<Welcome>().await.unwrap();

	// Assert
	assert_eq!(welcome.0, "hello, world");
}

#[rstest]
#[tokio::test]
async fn test_install_nested_modules() {
	// Arrange
	let greeting_module = |c: &Container| -> DiResult<()> {
		c.bind_instance::<dyn Greeter>(Arc::new(French));
		Ok(())
	};
	let app_module = move |c: &Container| -> DiResult<()> {
		c.install(&greeting_module)?;
		c.singleton::<String>(Provide::factory(|_| Ok(Arc::new("configured".to_string()))));
		Ok(())
	};
	let container = Container::new();

	// Act
	container.install(&app_module).unwrap();

	// Assert
	assert!(container.is_bound::<dyn Greeter>());
	assert_eq!(*container.resolve::<String>().await.unwrap(), "configured");
}

#[rstest]
#[tokio::test]
async fn test_failing_module_propagates_error() {
	let container = Container::new();
	let broken = |_: &Container| -> DiResult<()> {
		Err(DiError::provider::<String, _>("missing configuration"))
	};

	let result = container.install(&broken);

	assert!(matches!(result, Err(DiError::Provider { .. })));
}

struct Clock;

#[async_trait]
impl Injectable for Clock {
	async fn inject(_container: &Container) -> DiResult<Self> {
		Ok(Clock)
	}

	fn scope() -> Scope {
		Scope::Singleton
	}
}

struct Scheduler {
	clock: Arc<Clock>,
}

#[async_trait]
impl Injectable for Scheduler {
	async fn inject(container: &Container) -> DiResult<Self> {
		Ok(Scheduler {
			clock: container.get::<Clock>().await?,
		})
	}
}

// Needs a greeter nobody binds
struct Mailer;

#[async_trait]
impl Injectable for Mailer {
	async fn inject(container: &Container) -> DiResult<Self> {
		container.resolve::<dyn Greeter>().await?;
		Ok(Mailer)
	}
}

#[rstest]
#[tokio::test]
async fn test_auto_bind_synthesizes_providers() {
	// Arrange
	let container = Container::builder().auto_bind(true).build();

	// Act
	let scheduler = container.get::<Scheduler>().await.unwrap();
	let clock = container.get::<Clock>().await.unwrap();

	// Assert: the nested Clock was auto-bound as a singleton
	assert!(Arc::ptr_eq(&scheduler.clock, &clock));
	assert!(container.is_bound::<Scheduler>());
}

#[rstest]
#[tokio::test]
async fn test_without_auto_bind_get_is_unbound() {
	let container = Container::new();

	let result = container.get::<Clock>().await;

	assert!(matches!(result, Err(DiError::UnboundInterface { .. })));
	assert!(!container.is_bound::<Clock>());
}

#[rstest]
#[tokio::test]
async fn test_auto_bind_without_concrete_chain_is_unresolvable() {
	let container = Container::builder().auto_bind(true).build();

	let result = container.get::<Mailer>().await;

	match result {
		Err(DiError::UnresolvableDependency { source, .. }) => {
			assert!(matches!(*source, DiError::UnboundInterface { .. }));
		}
		Err(other) => panic!("expected UnresolvableDependency, got {other}"),
		Ok(_) => panic!("expected UnresolvableDependency, got a Mailer"),
	}
}

#[rstest]
#[tokio::test]
async fn test_explicit_binding_takes_precedence_over_auto_bind() {
	// Arrange
	let container = Container::builder().auto_bind(true).build();
	let explicit = Arc::new(Clock);
	container.bind_instance::<Clock>(explicit.clone());

	// Act
	let clock = container.get::<Clock>().await.unwrap();

	// Assert
	assert!(Arc::ptr_eq(&clock, &explicit));
}

struct Chicken;
struct Egg;

#[rstest]
#[tokio::test]
async fn test_circular_dependency_is_detected() {
	// Arrange
	let container = Container::new();
	container.bind::<Chicken>(
		Provide::async_factory(|c: Container| async move {
			c.resolve::<Egg>().await?;
			Ok(Arc::new(Chicken))
		}),
		Scope::Transient,
	);
	container.bind::<Egg>(
		Provide::async_factory(|c: Container| async move {
			c.resolve::<Chicken>().await?;
			Ok(Arc::new(Egg))
		}),
		Scope::Transient,
	);

	// Act
	let result = container.resolve::<Chicken>().await;

	// Assert
	match result {
		Err(DiError::CircularDependency { path, .. }) => {
			assert!(path.contains("Chicken -> "));
			assert!(path.contains("Egg"));
		}
		Err(other) => panic!("expected a cycle, got {other}"),
		Ok(_) => panic!("expected a cycle"),
	}
}

#[rstest]
#[tokio::test]
async fn test_handler_dependencies() {
	// Arrange
	let container = Container::builder().auto_bind(true).build();
	container.bind_instance::<dyn Greeter>(Arc::new(English));

	// Act
	let greeter = <Injected<dyn Greeter>>::resolve(&container).await.unwrap();
	let clock = <Autowired<Clock>>::resolve(&container).await.unwrap();
	let missing = <Option<Injected<String>>>::resolve(&container).await.unwrap();
	let itself = <Container as Dependency>::resolve(&container).await.unwrap();

	// Assert
	assert_eq!(greeter.greet(), "hello");
	assert!(Arc::ptr_eq(&clock.into_inner(), &container.get::<Clock>().await.unwrap()));
	assert!(missing.is_none());
	assert_eq!(itself.id(), container.id());
}
