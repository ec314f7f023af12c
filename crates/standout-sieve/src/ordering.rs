//! Sort keys for query results.
//!
//! Provides [`Dir`] for sort direction and [`Order`] for one sort key, either a
//! property read through an accessor or a whole-item comparator.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::accessor::Accessor;
use crate::compare::compare_values;
use crate::error::ComparisonError;

/// Sort direction; ascending unless stated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dir {
    #[default]
    Asc,
    Desc,
}

impl Dir {
    pub fn is_desc(self) -> bool {
        self == Dir::Desc
    }

    /// Orients a natural ordering.
    pub fn apply(self, natural: Ordering) -> Ordering {
        if self.is_desc() {
            natural.reverse()
        } else {
            natural
        }
    }
}

impl fmt::Display for Dir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.is_desc() { "desc" } else { "asc" })
    }
}

/// Whole-item comparator used by [`Order::by_comparator`].
pub type ItemComparator<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

enum OrderKey<T> {
    Property { path: String, accessor: Accessor<T> },
    Comparator(ItemComparator<T>),
}

/// A single sort key with its direction.
pub struct Order<T> {
    key: OrderKey<T>,
    dir: Dir,
}

impl<T> Order<T> {
    /// Orders by a property value under the default value comparator.
    pub fn by_property(path: impl Into<String>, accessor: Accessor<T>, dir: Dir) -> Self {
        Order {
            key: OrderKey::Property {
                path: path.into(),
                accessor,
            },
            dir,
        }
    }

    /// Orders by a comparator over whole items.
    pub fn by_comparator<F>(compare: F, dir: Dir) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        Order {
            key: OrderKey::Comparator(Arc::new(compare)),
            dir,
        }
    }

    pub fn dir(&self) -> Dir {
        self.dir
    }

    /// The property path, or `None` for comparator orders.
    pub fn path(&self) -> Option<&str> {
        match &self.key {
            OrderKey::Property { path, .. } => Some(path),
            OrderKey::Comparator(_) => None,
        }
    }

    /// Compares two items on this key.
    ///
    /// Missing values sort first in ascending order.
    pub fn compare(&self, a: &T, b: &T) -> Result<Ordering, ComparisonError> {
        let ordering = match &self.key {
            OrderKey::Property { accessor, .. } => {
                compare_values(&accessor.get(a), &accessor.get(b))?
            }
            OrderKey::Comparator(compare) => compare(a, b),
        };
        Ok(self.dir.apply(ordering))
    }
}

impl<T> Clone for Order<T> {
    fn clone(&self) -> Self {
        let key = match &self.key {
            OrderKey::Property { path, accessor } => OrderKey::Property {
                path: path.clone(),
                accessor: Arc::clone(accessor),
            },
            OrderKey::Comparator(compare) => OrderKey::Comparator(Arc::clone(compare)),
        };
        Order { key, dir: self.dir }
    }
}

impl<T> fmt::Debug for Order<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            OrderKey::Property { path, .. } => write!(f, "Order({path} {})", self.dir),
            OrderKey::Comparator(_) => write!(f, "Order(<comparator> {})", self.dir),
        }
    }
}

/// Compares two items using a list of orders.
///
/// Uses the first order as the primary sort key, the second to break ties,
/// etc. If all orders compare equal, returns `Equal`.
pub fn compare_by_orders<T>(a: &T, b: &T, orders: &[Order<T>]) -> Result<Ordering, ComparisonError> {
    for order in orders {
        let ordering = order.compare(a, b)?;
        if ordering != Ordering::Equal {
            return Ok(ordering);
        }
    }
    Ok(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::PropertyMap;
    use crate::value::{Number, Value};

    #[derive(Debug)]
    struct Item {
        name: String,
        priority: i64,
        done: Option<bool>,
    }

    fn props() -> PropertyMap<Item> {
        let mut map = PropertyMap::<Item>::new();
        map.register("name", |i| Value::String(&i.name))
            .unwrap()
            .register("priority", |i| Value::Number(Number::I64(i.priority)))
            .unwrap()
            .register("done", |i| i.done.map_or(Value::Missing, Value::Bool))
            .unwrap();
        map
    }

    fn order(path: &str, dir: Dir) -> Order<Item> {
        Order::by_property(path, props().resolve(path).unwrap(), dir)
    }

    fn item(name: &str, priority: i64) -> Item {
        Item {
            name: name.to_string(),
            priority,
            done: None,
        }
    }

    #[test]
    fn desc_flips_all_but_equal() {
        let natural = [Ordering::Less, Ordering::Equal, Ordering::Greater];
        assert_eq!(natural.map(|o| Dir::Asc.apply(o)), natural);
        assert_eq!(
            natural.map(|o| Dir::Desc.apply(o)),
            [Ordering::Greater, Ordering::Equal, Ordering::Less]
        );
        assert_eq!(format!("{}/{}", Dir::default(), Dir::Desc), "asc/desc");
    }

    #[test]
    fn property_order_ignores_case() {
        let asc = order("name", Dir::Asc);
        assert_eq!(asc.compare(&item("apple", 0), &item("Banana", 0)).unwrap(), Ordering::Less);
        assert_eq!(asc.compare(&item("APPLE", 0), &item("apple", 0)).unwrap(), Ordering::Equal);
        assert_eq!(asc.path(), Some("name"));
    }

    #[test]
    fn descending_reverses() {
        let desc = order("priority", Dir::Desc);
        assert_eq!(desc.compare(&item("a", 1), &item("b", 2)).unwrap(), Ordering::Greater);
        assert!(desc.dir().is_desc());
    }

    #[test]
    fn missing_sorts_first() {
        let asc = order("done", Dir::Asc);
        let mut done = item("a", 0);
        done.done = Some(false);
        assert_eq!(asc.compare(&item("b", 0), &done).unwrap(), Ordering::Less);
    }

    #[test]
    fn comparator_order() {
        let by_len = Order::<Item>::by_comparator(|a, b| a.name.len().cmp(&b.name.len()), Dir::Asc);
        assert_eq!(by_len.compare(&item("ccc", 0), &item("d", 0)).unwrap(), Ordering::Greater);
        assert_eq!(by_len.path(), None);
        assert_eq!(format!("{by_len:?}"), "Order(<comparator> asc)");
    }

    #[test]
    fn multiple_orders_break_ties() {
        let orders = vec![order("priority", Dir::Asc), order("name", Dir::Asc)];
        let items = [item("a", 1), item("b", 1), item("a", 2)];

        assert_eq!(
            compare_by_orders(&items[0], &items[1], &orders).unwrap(),
            Ordering::Less
        );
        assert_eq!(
            compare_by_orders(&items[0], &items[2], &orders).unwrap(),
            Ordering::Less
        );
        assert_eq!(
            compare_by_orders(&items[0], &items[0], &orders).unwrap(),
            Ordering::Equal
        );
    }
}
