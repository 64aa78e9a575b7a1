//! OData request surface
//!
//! Path parsing for the containment route shapes and the small slice of
//! query options this fixture honors.

pub mod path;
pub mod query;

pub use path::ODataPath;
pub use query::QueryOptions;
