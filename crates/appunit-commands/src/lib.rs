//! # AppUnit Commands
//!
//! Command-line entry points for an application, organised in nested
//! [`CommandGroup`]s and parsed with `clap`.
//!
//! ```
//! use appunit_commands::{BoxError, Command, CommandGroup, CommandRunner};
//! use async_trait::async_trait;
//! use clap::{Arg, ArgMatches};
//! use std::sync::Arc;
//!
//! struct Greet;
//!
//! #[async_trait]
//! impl CommandRunner for Greet {
//!     async fn run(&self, matches: ArgMatches) -> Result<(), BoxError> {
//!         let name = matches.get_one::<String>("name").cloned().unwrap_or_default();
//!         println!("hello, {name}");
//!         Ok(())
//!     }
//! }
//!
//! let mut cli = CommandGroup::new("manage");
//! cli.add_command(Command::new("greet", Arc::new(Greet)).arg(Arg::new("name")));
//!
//! let code = cli.main_from(["manage", "greet", "world"]);
//! assert_eq!(code, std::process::ExitCode::SUCCESS);
//! ```

pub mod error;
pub mod group;

pub use error::CommandError;
pub use group::{BoxError, Command, CommandGroup, CommandRunner};
