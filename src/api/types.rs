// API wire types
// OData-style JSON envelopes for collection and primitive results

use serde::Serialize;

/// Collection payload: `{"value": [...]}`
#[derive(Debug, Serialize)]
pub struct CollectionResponse<T> {
    pub value: Vec<T>,
}

/// Primitive payload, used by the `GetCount` bound function: `{"value": n}`
#[derive(Debug, Serialize)]
pub struct PrimitiveResponse<T> {
    pub value: T,
}
