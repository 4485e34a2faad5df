use std::{mem, ops::Deref};

use crate::error::ChainMapError;
use crate::tally::Tally;

const DEFAULT_BUCKETS: usize = 16;

/// ChainMap manage a single instance of an in-memory associative store,
/// mapping signed integer keys to values. Entries hash into a fixed set
/// of buckets, each bucket holding one singly linked chain.
///
/// The bucket count is fixed at construction time and the table is never
/// rehashed, chains simply grow as the map fills up.
#[derive(Clone)]
pub struct ChainMap<V>
where
    V: Clone,
{
    name: String,
    buckets: Vec<Option<Box<Entry<V>>>>,
    n_count: usize, // number of entries in the map.
}

/// Different ways to construct a new ChainMap instance.
impl<V> ChainMap<V>
where
    V: Clone,
{
    /// Create an empty instance of ChainMap, identified by `name`, with
    /// the default sixteen buckets. Applications can choose unique names.
    pub fn new<S>(name: S) -> ChainMap<V>
    where
        S: AsRef<str>,
    {
        ChainMap::with_buckets(name, DEFAULT_BUCKETS)
    }

    /// Create an empty instance of ChainMap with `count` buckets. The
    /// bucket count stays fixed for the life of the instance.
    ///
    /// Panics if `count` is zero.
    pub fn with_buckets<S>(name: S, count: usize) -> ChainMap<V>
    where
        S: AsRef<str>,
    {
        if count == 0 {
            panic!("with_buckets(): a map needs at least one bucket");
        }
        ChainMap {
            name: name.as_ref().to_string(),
            buckets: vec![None; count],
            n_count: Default::default(),
        }
    }
}

/// Maintenance API.
impl<V> ChainMap<V>
where
    V: Clone,
{
    /// Identify this instance. Applications can choose unique names while
    /// creating ChainMap instances.
    #[inline]
    pub fn id(&self) -> String {
        self.name.clone()
    }

    /// Return number of entries in this instance.
    #[inline]
    pub fn len(&self) -> usize {
        self.n_count
    }

    /// Check whether this map is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_count == 0
    }

    /// Return the fixed number of buckets in this instance.
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Return quickly with basic statistics, only entries(), buckets()
    /// and entry_size() methods are valid with this statistics.
    pub fn stats(&self) -> ChainStats {
        let entry_size = mem::size_of::<Entry<V>>();
        ChainStats::new(self.n_count, self.buckets.len(), entry_size)
    }
}

/// Write operations on ChainMap instance.
impl<V> ChainMap<V>
where
    V: Clone,
{
    /// Map `key` to `value`. Returns true if a new entry was created,
    /// false if `key` is already present, in which case the stored value
    /// is left untouched.
    ///
    /// ```
    /// use mem_index::ChainMap;
    ///
    /// let mut map: ChainMap<i64> = ChainMap::new("myinstance");
    /// assert!(map.push(1, 10));
    /// assert!(map.push(2, 20));
    /// assert_eq!(map.find(1), Some(10));
    /// assert_eq!(map.find(2), Some(20));
    /// assert!(!map.push(1, 99));
    /// assert_eq!(map.find(1), Some(10));
    /// ```
    pub fn push(&mut self, key: i64, value: V) -> bool {
        let index = self.index_of(key);
        let mut slot = &mut self.buckets[index];
        loop {
            match slot {
                // end of the chain, the new entry joins at the tail.
                None => break,
                // key already chained, the stored value stays.
                Some(entry) if entry.key == key => return false,
                Some(entry) => slot = &mut entry.next,
            }
        }
        *slot = Some(Entry::new(key, value));
        self.n_count += 1;
        true
    }

    /// Remove `key` and the value mapped to it. Returns true if an entry
    /// existed and was removed, false otherwise.
    pub fn remove(&mut self, key: i64) -> bool {
        let index = self.index_of(key);
        let mut slot = &mut self.buckets[index];
        loop {
            match slot {
                None => return false,
                Some(entry) if entry.key == key => break,
                Some(entry) => slot = &mut entry.next,
            }
        }
        // unlink, the rest of the chain moves up.
        let entry = slot.take().unwrap();
        *slot = entry.next;
        self.n_count -= 1;
        true
    }

    /// Validate the bucket table with following rules:
    ///
    /// * Every entry must be chained under the bucket its key hashes to.
    /// * No key occurs on more than one link.
    /// * The entry count must match the number of live links.
    ///
    /// Additionally return full statistics on the table. Refer to
    /// [`ChainStats`] for more information.
    pub fn validate(&self) -> Result<ChainStats, ChainMapError> {
        let entry_size = mem::size_of::<Entry<V>>();
        let mut stats = ChainStats::new(self.n_count, self.buckets.len(), entry_size);
        let mut chains = Tally::new();
        let (mut live, mut occupied) = (0, 0);
        let mut keys = Vec::with_capacity(self.n_count);

        for (index, bucket) in self.buckets.iter().enumerate() {
            let mut length = 0;
            let mut entry = bucket.as_ref().map(Deref::deref);
            while let Some(e) = entry {
                if self.index_of(e.key) != index {
                    return Err(ChainMapError::MisplacedKey(e.key));
                }
                keys.push(e.key);
                length += 1;
                entry = e.next_deref();
            }
            if length > 0 {
                occupied += 1;
            }
            live += length;
            chains.sample(length);
        }

        keys.sort_unstable();
        for pair in keys.windows(2) {
            if pair[0] == pair[1] {
                return Err(ChainMapError::DuplicateKey(pair[0]));
            }
        }
        if live != self.n_count {
            return Err(ChainMapError::CountMismatch(self.n_count, live));
        }

        stats.set_occupied(occupied);
        stats.set_chains(chains);
        Ok(stats)
    }
}

/// Read operations on ChainMap instance.
impl<V> ChainMap<V>
where
    V: Clone,
{
    /// Look up `key`. On a hit return the mapped value, on a miss return
    /// None.
    pub fn find(&self, key: i64) -> Option<V> {
        let index = self.index_of(key);
        let mut entry = self.buckets[index].as_ref().map(Deref::deref);
        while let Some(e) = entry {
            if e.key == key {
                return Some(e.value.clone());
            }
            entry = e.next_deref();
        }
        None
    }
}

impl<V> ChainMap<V>
where
    V: Clone,
{
    // Bucket index for key. rem_euclid keeps negative keys inside the
    // table.
    #[inline]
    fn index_of(&self, key: i64) -> usize {
        key.rem_euclid(self.buckets.len() as i64) as usize
    }
}

// Chains are unlinked link by link, the default drop glue would recurse
// down them.
impl<V> Drop for ChainMap<V>
where
    V: Clone,
{
    fn drop(&mut self) {
        for bucket in self.buckets.iter_mut() {
            let mut entry = bucket.take();
            while let Some(mut e) = entry {
                entry = e.next.take();
            }
        }
    }
}

/// Entry corresponds to a single {key, value} pair in a ChainMap
/// instance, one link in its bucket's chain.
pub struct Entry<V>
where
    V: Clone,
{
    key: i64,
    value: V,
    next: Option<Box<Entry<V>>>, // empty or owns the rest of the chain
}

// Primary operations on a single chain link.
impl<V> Entry<V>
where
    V: Clone,
{
    // CREATE operation
    fn new(key: i64, value: V) -> Box<Entry<V>> {
        Box::new(Entry {
            key,
            value,
            next: None,
        })
    }

    #[inline]
    fn next_deref(&self) -> Option<&Entry<V>> {
        self.next.as_ref().map(Deref::deref)
    }
}

// Link-by-link clone, the derived one would recurse down the chain.
impl<V> Clone for Entry<V>
where
    V: Clone,
{
    fn clone(&self) -> Entry<V> {
        let mut links: Vec<Box<Entry<V>>> = vec![];
        let mut entry = self.next_deref();
        while let Some(e) = entry {
            links.push(Entry::new(e.key, e.value.clone()));
            entry = e.next_deref();
        }
        let mut next = None;
        while let Some(mut link) = links.pop() {
            link.next = next;
            next = Some(link);
        }
        Entry {
            key: self.key,
            value: self.value.clone(),
            next,
        }
    }
}

/// Statistics on [`ChainMap`] buckets. Serves two purposes:
///
/// * To get partial but quick statistics via [`ChainMap::stats`] method.
/// * To get full statistics via [`ChainMap::validate`] method.
#[derive(Debug, Default)]
pub struct ChainStats {
    entries: usize, // number of entries in the map.
    buckets: usize,
    entry_size: usize,
    occupied: Option<usize>,
    chains: Option<Tally>,
}

impl ChainStats {
    fn new(entries: usize, buckets: usize, entry_size: usize) -> ChainStats {
        ChainStats {
            entries,
            buckets,
            entry_size,
            occupied: Default::default(),
            chains: Default::default(),
        }
    }

    #[inline]
    fn set_occupied(&mut self, occupied: usize) {
        self.occupied = Some(occupied)
    }

    #[inline]
    fn set_chains(&mut self, chains: Tally) {
        self.chains = Some(chains)
    }

    /// Return number of entries in the [`ChainMap`] instance.
    #[inline]
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Return the fixed bucket count.
    #[inline]
    pub fn buckets(&self) -> usize {
        self.buckets
    }

    /// Return entry-size in bytes, including overhead for `Entry<V>`.
    /// The overhead is constant, the entry size varies with the value
    /// type.
    #[inline]
    pub fn entry_size(&self) -> usize {
        self.entry_size
    }

    /// Return number of buckets holding at least one entry, None unless
    /// this statistics was returned by [`ChainMap::validate`].
    #[inline]
    pub fn occupied(&self) -> Option<usize> {
        self.occupied
    }

    /// Return the [`Tally`] of chain lengths, None unless this
    /// statistics was returned by [`ChainMap::validate`].
    pub fn chains(&self) -> Option<Tally> {
        match &self.chains {
            Some(chains) if chains.samples() > 0 => Some(chains.clone()),
            _ => None,
        }
    }
}
