//! Value object trait: equality by value, not identity.
//!
//! Value objects have **no identity**; they are defined entirely by their attribute
//! values. A variant's attribute map (`{Color: "Red", Size: "M"}`) is the canonical
//! example in this workspace: it is the join key used for reconciliation and for
//! diffing against stored rows.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// build a new one with the new values.
///
/// The trait requires:
/// - **Clone**: value objects are copied freely between the session and the store
/// - **PartialEq**: equality is the join key
/// - **Debug**: for logging and test output
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
