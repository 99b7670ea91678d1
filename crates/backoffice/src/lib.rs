//! SneakerShop back office library.
//!
//! Headless controllers for the shop's back-office forms (brands, customers,
//! inventory, sales, staff) and the dashboard, over a hosted `PostgREST`
//! table API. A UI shell renders the grid projections and chart models and
//! forwards user events to the controllers.
//!
//! # Startup
//!
//! 1. [`config::BackofficeConfig::from_env`] loads `.env` and the environment
//! 2. [`telemetry::init`] sets up Sentry and the tracing subscriber
//! 3. One [`remote::PostgrestClient`] is built and cloned into every form
//!
//! # Security
//!
//! The client holds the project API key. It is kept in a `SecretString` and
//! redacted from every `Debug` output.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod components;
pub mod config;
pub mod error;
pub mod forms;
pub mod models;
pub mod remote;
pub mod scope;
pub mod services;
pub mod telemetry;

pub use error::{AppError, AppResult, ValidationError};
pub use forms::{DeleteConfirmation, FormController, FormEntity, FormMode};
pub use remote::{PostgrestClient, RemoteError, RemoteStore};
pub use scope::ViewScope;
