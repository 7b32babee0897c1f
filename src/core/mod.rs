//! Core module - filter grammar, templates, configuration and queries

pub mod config;
pub mod entity;
pub mod filter;
pub mod logging;
pub mod query;
pub mod record;
pub mod template;

pub use config::{ConfigError, EffectiveOptions, FileConfig, Overrides};
pub use entity::EntityTypes;
pub use filter::{FilterClause, FilterParser, Operator, ParsedFilter};
pub use query::{QueryBuilder, QueryDescriptor};
pub use record::{EntityRecord, Value};
pub use template::{FieldTemplate, ValueFormat};
