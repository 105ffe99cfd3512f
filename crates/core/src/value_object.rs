//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// build a new instance. Ledger transactions are both entities (they carry an
/// id) and value objects (a recorded transaction never changes afterwards).
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct FeeQuote {
///     gross: Decimal,
///     fee: Decimal,
/// }
///
/// impl ValueObject for FeeQuote {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
