//! Property access.
//!
//! The engine reads items only through a [`PropertyAccessor`]. Accessors are
//! registered under a (possibly dotted) path in a [`PropertyMap`], which the
//! caller builds once and owns. Queries resolve their paths against the map
//! when they are built, so an unknown path fails before any item is scanned
//! and no lookup happens per item.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{ConfigurationError, Result};
use crate::value::Value;

/// Reads one property value from an item.
///
/// Implemented for every `for<'a> Fn(&'a T) -> Value<'a>` closure or function,
/// so most callers never implement it by hand.
///
/// # Manual Implementation
///
/// ```
/// use standout_sieve::{PropertyAccessor, Value, Number};
///
/// struct Task {
///     tags: Vec<String>,
/// }
///
/// struct TagCount;
///
/// impl PropertyAccessor<Task> for TagCount {
///     fn get<'a>(&self, task: &'a Task) -> Value<'a> {
///         Value::Number(Number::from(task.tags.len()))
///     }
/// }
/// ```
pub trait PropertyAccessor<T>: Send + Sync {
    fn get<'a>(&self, item: &'a T) -> Value<'a>;
}

impl<T, F> PropertyAccessor<T> for F
where
    F: for<'a> Fn(&'a T) -> Value<'a> + Send + Sync,
{
    fn get<'a>(&self, item: &'a T) -> Value<'a> {
        self(item)
    }
}

/// A shared, type-erased accessor.
pub type Accessor<T> = Arc<dyn PropertyAccessor<T>>;

/// Accessors for one item type, keyed by property path.
///
/// The map is immutable once shared and can be used from any thread.
///
/// ```
/// use standout_sieve::{Number, PropertyMap, Value};
///
/// struct Address { city: String }
/// struct User { name: String, age: u32, address: Address }
///
/// let mut address = PropertyMap::<Address>::new();
/// address.register("city", |a| Value::String(&a.city)).unwrap();
///
/// let mut users = PropertyMap::<User>::new();
/// users
///     .register("name", |u| Value::String(&u.name)).unwrap()
///     .register("age", |u| Value::Number(Number::from(u.age))).unwrap()
///     .mount("address", &address, |u| &u.address).unwrap();
///
/// assert!(users.resolve("address.city").is_ok());
/// assert!(users.resolve("address.zip").is_err());
/// ```
pub struct PropertyMap<T> {
    accessors: HashMap<String, Accessor<T>>,
}

impl<T: 'static> PropertyMap<T> {
    pub fn new() -> Self {
        PropertyMap {
            accessors: HashMap::new(),
        }
    }

    /// Registers a closure or function under `path`.
    pub fn register<F>(&mut self, path: impl Into<String>, accessor: F) -> Result<&mut Self>
    where
        F: for<'a> Fn(&'a T) -> Value<'a> + Send + Sync + 'static,
    {
        self.register_accessor(path, Arc::new(accessor))
    }

    /// Registers an already shared accessor under `path`.
    pub fn register_accessor(
        &mut self,
        path: impl Into<String>,
        accessor: Accessor<T>,
    ) -> Result<&mut Self> {
        let path = path.into();
        if self.accessors.contains_key(&path) {
            return Err(ConfigurationError::DuplicateProperty { path }.into());
        }
        self.accessors.insert(path, accessor);
        Ok(self)
    }

    /// Registers every path of `child` as `prefix.path`, reading through
    /// `project`.
    pub fn mount<U, P>(
        &mut self,
        prefix: &str,
        child: &PropertyMap<U>,
        project: P,
    ) -> Result<&mut Self>
    where
        U: 'static,
        P: for<'a> Fn(&'a T) -> &'a U + Send + Sync + 'static,
    {
        let project = Arc::new(project);
        for (path, accessor) in &child.accessors {
            let accessor = Arc::clone(accessor);
            let project = Arc::clone(&project);
            self.register(format!("{prefix}.{path}"), move |item| {
                accessor.get((*project)(item))
            })?;
        }
        Ok(self)
    }
}

impl<T> PropertyMap<T> {
    /// Looks up the accessor for `path`.
    pub fn resolve(&self, path: &str) -> Result<Accessor<T>> {
        self.accessors.get(path).cloned().ok_or_else(|| {
            ConfigurationError::UnknownProperty {
                path: path.to_string(),
            }
            .into()
        })
    }

    pub fn contains(&self, path: &str) -> bool {
        self.accessors.contains_key(path)
    }

    /// Registered paths, in no particular order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.accessors.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.accessors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accessors.is_empty()
    }
}

impl<T: 'static> Default for PropertyMap<T> {
    fn default() -> Self {
        PropertyMap::new()
    }
}

impl<T> Clone for PropertyMap<T> {
    fn clone(&self) -> Self {
        PropertyMap {
            accessors: self.accessors.clone(),
        }
    }
}

impl<T> fmt::Debug for PropertyMap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut paths: Vec<&str> = self.paths().collect();
        paths.sort_unstable();
        f.debug_struct("PropertyMap").field("paths", &paths).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SieveError;
    use crate::value::Number;

    struct Inner {
        label: String,
    }

    struct TestItem {
        name: String,
        count: i32,
        inner: Inner,
    }

    fn item() -> TestItem {
        TestItem {
            name: "test".to_string(),
            count: 42,
            inner: Inner {
                label: "deep".to_string(),
            },
        }
    }

    fn map() -> PropertyMap<TestItem> {
        let mut inner = PropertyMap::<Inner>::new();
        inner.register("label", |i| Value::String(&i.label)).unwrap();

        let mut map = PropertyMap::<TestItem>::new();
        map.register("name", |t| Value::String(&t.name))
            .unwrap()
            .register("count", |t| Value::Number(Number::from(t.count)))
            .unwrap()
            .mount("inner", &inner, |t| &t.inner)
            .unwrap();
        map
    }

    #[test]
    fn resolves_registered_paths() {
        let map = map();
        let item = item();
        assert_eq!(map.resolve("name").unwrap().get(&item), Value::String("test"));
        assert_eq!(
            map.resolve("count").unwrap().get(&item),
            Value::Number(Number::I64(42))
        );
        assert_eq!(
            map.resolve("inner.label").unwrap().get(&item),
            Value::String("deep")
        );
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn unknown_path_is_configuration_error() {
        let err = map().resolve("nope").err().unwrap();
        assert!(matches!(
            err,
            SieveError::Configuration(ConfigurationError::UnknownProperty { ref path }) if path == "nope"
        ));
    }

    #[test]
    fn duplicate_path_is_rejected() {
        let mut map = map();
        let err = map
            .register("name", |t| Value::String(&t.name))
            .err()
            .unwrap();
        assert!(matches!(
            err,
            SieveError::Configuration(ConfigurationError::DuplicateProperty { .. })
        ));
    }

    #[test]
    fn debug_lists_sorted_paths() {
        assert_eq!(
            format!("{:?}", map()),
            r#"PropertyMap { paths: ["count", "inner.label", "name"] }"#
        );
    }
}
