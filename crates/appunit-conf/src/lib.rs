//! # AppUnit Settings
//!
//! Application settings loaded from TOML and overridden by environment
//! variables, plus `tracing` subscriber initialisation.
//!
//! ```
//! use appunit_conf::Settings;
//!
//! let settings = Settings::from_toml_str(
//!     r#"
//!     debug = true
//!
//!     [server]
//!     port = 9000
//!     "#,
//! )
//! .unwrap();
//!
//! assert!(settings.debug);
//! assert_eq!(settings.server.port, 9000);
//! assert_eq!(settings.server.host, "127.0.0.1");
//! ```
//!
//! ## Environment overrides
//!
//! | Variable            | Setting         |
//! |---------------------|-----------------|
//! | `APPUNIT_DEBUG`     | `debug`         |
//! | `APPUNIT_AUTO_BIND` | `auto_bind`     |
//! | `APPUNIT_HOST`      | `server.host`   |
//! | `APPUNIT_PORT`      | `server.port`   |
//! | `APPUNIT_LOG_LEVEL` | `logging.level` |
//!
//! `APPUNIT_LOG` takes a full `tracing-subscriber` filter directive and wins
//! over `logging.level` when the subscriber is installed.

pub mod error;
pub mod logging;
pub mod settings;

pub use error::SettingsError;
pub use logging::init_logging;
pub use settings::{LoggingSettings, ServerSettings, Settings};
