use crate::{query::Instance, stmt::Value};

use std::{fmt, sync::Arc};

/// A user-defined property that takes the place of a schema-backed
/// attribute.
///
/// When a class declares a computed property under a key that would
/// otherwise be loaded from a column, the column is not loaded into that
/// key; reading the attribute evaluates the property instead.
#[derive(Clone)]
pub struct Computed {
    f: Arc<dyn Fn(&Instance) -> Value + Send + Sync>,
}

impl Computed {
    pub fn new(f: impl Fn(&Instance) -> Value + Send + Sync + 'static) -> Computed {
        Computed { f: Arc::new(f) }
    }

    /// A property that always evaluates to `value`.
    pub fn constant(value: impl Into<Value>) -> Computed {
        let value = value.into();
        Computed::new(move |_| value.clone())
    }

    pub fn eval(&self, instance: &Instance) -> Value {
        (self.f)(instance)
    }
}

impl fmt::Debug for Computed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Computed(..)")
    }
}
