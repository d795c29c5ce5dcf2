//! Boolean filter builder for trademark searches.
//!
//! A query is a [`FilterTree`]: AND/OR [`Group`]s over [`Condition`]s, edited by path and
//! serialized as the nested [`SearchRequest`] the search backend consumes. [`FlatQuery`] is
//! the older list form where each condition carries the operator joining it to everything
//! before it, evaluated strictly left to right.

pub mod display;
pub mod errors;
pub mod flat;
pub mod path;
pub mod payload;
pub mod registry;
pub mod script;
pub mod session;
pub mod tree;
pub mod types;

pub use display::{render_condition, render_node, render_tree};
pub use errors::QueryError;
pub use flat::{FlatCondition, FlatQuery};
pub use path::NodePath;
pub use payload::{
    parse_canonical, parse_request, serialize_flat, serialize_tree, AnyRequest,
    FlatSearchRequest, Pagination, SearchHit, SearchRequest, SearchResponse, DEFAULT_PAGE,
    DEFAULT_PER_PAGE,
};
pub use registry::{StrategyDef, StrategyRegistry, DATE_FORMAT};
pub use script::{apply, apply_all, parse_script, EditCommand};
pub use session::{BuilderSession, Flash, DEFAULT_STRATEGY};
pub use tree::FilterTree;
pub use types::{Condition, Group, Node, Operator, QueryValue, Section, StrategyKind};
