/// LlrbError enumerates all validation failures for [`Llrb`] instances,
/// returned by its validate() API. Regular operations on the tree have
/// no failure modes.
///
/// [`Llrb`]: crate::Llrb
#[derive(Debug, PartialEq)]
pub enum LlrbError<T>
where
    T: Clone + Ord,
{
    /// Fatal case, root of the tree must always be black.
    RedRoot,
    /// Fatal case, two consecutive red nodes in a path.
    ConsecutiveReds,
    /// Fatal case, a red node hanging off a right link. Red links
    /// must always lean left.
    RightLeaningRed,
    /// Fatal case, number of black nodes differ between left path and
    /// right path. The String component can be used for debugging.
    UnbalancedBlacks(String),
    /// Fatal case, tree entries are not in sort-order.
    SortError(T, T),
}

/// ChainMapError enumerates all validation failures for [`ChainMap`]
/// instances, returned by its validate() API. Regular operations on the
/// map report duplicates and missing keys through return values.
///
/// [`ChainMap`]: crate::ChainMap
#[derive(Debug, PartialEq)]
pub enum ChainMapError {
    /// Fatal case, an entry is chained under a bucket its key does not
    /// hash to.
    MisplacedKey(i64),
    /// Fatal case, the same key occurs on more than one chain link.
    DuplicateKey(i64),
    /// Fatal case, the map's entry count does not match the number of
    /// live links, as (counted, live).
    CountMismatch(usize, usize),
}
