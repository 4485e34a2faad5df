use std::{
    borrow::Borrow,
    cmp::{Ord, Ordering},
    mem,
    ops::{Deref, DerefMut},
};

use rand::Rng;

use crate::error::LlrbError;
use crate::tally::Tally;

/// Llrb manage a single instance of an in-memory ordered set using
/// [left-leaning-red-black][llrb] tree.
///
/// [llrb]: https://en.wikipedia.org/wiki/Left-leaning_red-black_tree
#[derive(Clone)]
pub struct Llrb<T>
where
    T: Clone + Ord,
{
    name: String,
    root: Option<Box<Node<T>>>,
    n_count: usize, // number of values in the tree.
}

/// Different ways to construct a new Llrb instance.
impl<T> Llrb<T>
where
    T: Clone + Ord,
{
    /// Create an empty instance of Llrb, identified by `name`.
    /// Applications can choose unique names.
    pub fn new<S>(name: S) -> Llrb<T>
    where
        S: AsRef<str>,
    {
        Llrb {
            name: name.as_ref().to_string(),
            root: Default::default(),
            n_count: Default::default(),
        }
    }

    /// Create a new instance of Llrb and load it with values from
    /// `iter`. Duplicate values in the iterator end up as a single
    /// node in the tree.
    pub fn load_from<S, I>(name: S, iter: I) -> Llrb<T>
    where
        S: AsRef<str>,
        I: Iterator<Item = T>,
    {
        let mut llrb = Llrb::new(name);
        for value in iter {
            llrb.insert(value);
        }
        llrb
    }
}

/// Maintenance API.
impl<T> Llrb<T>
where
    T: Clone + Ord,
{
    /// Identify this instance. Applications can choose unique names while
    /// creating Llrb instances.
    #[inline]
    pub fn id(&self) -> String {
        self.name.clone()
    }

    /// Return number of values in this instance.
    #[inline]
    pub fn len(&self) -> usize {
        self.n_count
    }

    /// Check whether this index is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_count == 0
    }

    /// Return quickly with basic statistics, only entries() and
    /// node_size() methods are valid with this statistics.
    pub fn stats(&self) -> Stats {
        Stats::new(self.n_count, mem::size_of::<Node<T>>())
    }
}

// (possibly rotated subtree root, whether a new node was created)
type Insert<T> = (Box<Node<T>>, bool);

/// Write operations on Llrb instance.
impl<T> Llrb<T>
where
    T: Clone + Ord,
{
    /// Insert `value` into the index. Inserting a value that is already
    /// present is a silent no-op, the tree is left exactly as it was
    /// and nothing is reported.
    ///
    /// ```
    /// use mem_index::Llrb;
    ///
    /// let mut index: Llrb<i64> = Llrb::new("myinstance");
    /// index.insert(5);
    /// index.insert(5);
    /// assert_eq!(index.len(), 1);
    /// assert_eq!(index.find(&5), Some(5));
    /// assert_eq!(index.find(&4), None);
    /// ```
    pub fn insert(&mut self, value: T) {
        let (mut root, created) = Llrb::do_insert(self.root.take(), value);
        root.set_black(); // root is always black.
        self.root = Some(root);
        if created {
            self.n_count += 1;
        }
    }

    /// Validate LLRB tree with following rules:
    ///
    /// * Root node must be black.
    /// * Red nodes must hang off left links only.
    /// * From root to any leaf, no consecutive reds allowed in its path.
    /// * Number of blacks should be same under left child and right child.
    /// * Make sure values are in sort order.
    ///
    /// Additionally return full statistics on the tree. Refer to [`Stats`]
    /// for more information.
    pub fn validate(&self) -> Result<Stats, LlrbError<T>> {
        let root = self.root.as_ref().map(Deref::deref);
        if is_red(root) {
            return Err(LlrbError::RedRoot);
        }
        let mut stats = Stats::new(self.n_count, mem::size_of::<Node<T>>());
        stats.set_depths(Tally::new());
        let blacks = Llrb::validate_tree(root, false, 0, 0, &mut stats)?;
        stats.set_blacks(blacks);
        Ok(stats)
    }
}

/// Read operations on Llrb instance.
impl<T> Llrb<T>
where
    T: Clone + Ord,
{
    /// Look up `value` in the index. On a hit return the stored value,
    /// on a miss return None.
    pub fn find<Q>(&self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut node = self.root.as_ref().map(Deref::deref);
        while let Some(nref) = node {
            node = match nref.value.borrow().cmp(value) {
                Ordering::Less => nref.right_deref(),
                Ordering::Greater => nref.left_deref(),
                Ordering::Equal => return Some(nref.value.clone()),
            };
        }
        None
    }

    /// Return a random value from this index.
    pub fn random<R: Rng>(&self, rng: &mut R) -> Option<T> {
        let mut nref = self.root.as_ref().map(Deref::deref)?;

        let mut at_depth = rng.gen::<u8>() % 40;
        loop {
            let next = match rng.gen::<u8>() % 2 {
                0 => nref.left_deref(),
                1 => nref.right_deref(),
                _ => unreachable!(),
            };
            if at_depth == 0 || next.is_none() {
                break Some(nref.value.clone());
            }
            at_depth -= 1;
            nref = next.unwrap();
        }
    }
}

impl<T> Llrb<T>
where
    T: Clone + Ord,
{
    fn do_insert(node: Option<Box<Node<T>>>, value: T) -> Insert<T> {
        let mut node = match node {
            // fell off the tree, new nodes join as red leaves.
            None => return (Node::new(value), true),
            Some(node) => node,
        };

        let created = match node.value.cmp(&value) {
            Ordering::Greater => {
                let (left, created) = Llrb::do_insert(node.left.take(), value);
                node.left = Some(left);
                created
            }
            Ordering::Less => {
                let (right, created) = Llrb::do_insert(node.right.take(), value);
                node.right = Some(right);
                created
            }
            // value already present, the node is left as it is.
            Ordering::Equal => false,
        };

        (Llrb::walkuprot_23(node), created)
    }

    fn validate_tree(
        node: Option<&Node<T>>,
        fromred: bool,
        mut nb: usize,
        depth: usize,
        stats: &mut Stats,
    ) -> Result<usize, LlrbError<T>> {
        let node = match node {
            None => {
                stats.depths.as_mut().unwrap().sample(depth);
                return Ok(nb);
            }
            Some(node) => node,
        };

        let red = !node.is_black();
        if fromred && red {
            return Err(LlrbError::ConsecutiveReds);
        }
        if is_red(node.right_deref()) {
            return Err(LlrbError::RightLeaningRed);
        }
        if !red {
            nb += 1;
        }
        let (left, right) = (node.left_deref(), node.right_deref());
        let lblacks = Llrb::validate_tree(left, red, nb, depth + 1, stats)?;
        let rblacks = Llrb::validate_tree(right, red, nb, depth + 1, stats)?;
        if lblacks != rblacks {
            let err = format!("left: {} right: {}", lblacks, rblacks);
            return Err(LlrbError::UnbalancedBlacks(err));
        }
        if let Some(left) = left {
            if left.value.ge(&node.value) {
                let (value, parent) = (left.value.clone(), node.value.clone());
                return Err(LlrbError::SortError(value, parent));
            }
        }
        if let Some(right) = right {
            if right.value.le(&node.value) {
                let (value, parent) = (right.value.clone(), node.value.clone());
                return Err(LlrbError::SortError(value, parent));
            }
        }
        Ok(lblacks)
    }

    //--------- balance routines for 2-3 algorithm ----------------

    // Bottom-up repair after one insertion step, applied to every node
    // along the unwind path. The three checks must run in this order.
    fn walkuprot_23(mut node: Box<Node<T>>) -> Box<Node<T>> {
        if is_red(node.right_deref()) && !is_red(node.left_deref()) {
            node = Llrb::rotate_left(node);
        }
        let left = node.left_deref();
        if is_red(left) && is_red(left.unwrap().left_deref()) {
            node = Llrb::rotate_right(node);
        }
        if is_red(node.left_deref()) && is_red(node.right_deref()) {
            Llrb::flip(node.deref_mut());
        }
        node
    }

    //              (i)                       (i)
    //               |                         |
    //              node                       x
    //              /  \                      / \
    //             /    (r)                 (r)  \
    //            /       \                 /     \
    //          left       x             node      xr
    //                    / \            /  \
    //                  xl   xr       left   xl
    //
    fn rotate_left(mut node: Box<Node<T>>) -> Box<Node<T>> {
        if is_black(node.right_deref()) {
            panic!("rotate_left(): rotating a black link? call the programmer");
        }
        let mut x = node.right.take().unwrap();
        node.right = x.left.take();
        x.color = node.color;
        node.set_red();
        x.left = Some(node);
        x
    }

    //              (i)                       (i)
    //               |                         |
    //              node                       x
    //              /  \                      / \
    //            (r)   \                   (r)  \
    //           /       \                 /      \
    //          x       right             xl      node
    //         / \                                / \
    //       xl   xr                             xr  right
    //
    fn rotate_right(mut node: Box<Node<T>>) -> Box<Node<T>> {
        if is_black(node.left_deref()) {
            panic!("rotate_right(): rotating a black link? call the programmer");
        }
        let mut x = node.left.take().unwrap();
        node.left = x.right.take();
        x.color = node.color;
        node.set_red();
        x.right = Some(node);
        x
    }

    //        (b)                   (r)
    //         |                     |
    //        node                  node
    //        / \                   / \
    //      (r) (r)               (b) (b)
    //     /      \              /      \
    //   left    right         left    right
    //
    // Both children exist, the caller checked they are red.
    fn flip(node: &mut Node<T>) {
        node.set_red();
        node.left.as_mut().unwrap().set_black();
        node.right.as_mut().unwrap().set_black();
    }
}

fn is_red<T>(node: Option<&Node<T>>) -> bool
where
    T: Clone + Ord,
{
    node.map_or(false, |node| !node.is_black())
}

fn is_black<T>(node: Option<&Node<T>>) -> bool
where
    T: Clone + Ord,
{
    node.map_or(true, |node| node.is_black())
}

#[derive(Clone, Copy, PartialEq)]
enum Color {
    Red,
    Black,
}

/// Node corresponds to a single value in an Llrb instance.
#[derive(Clone)]
pub struct Node<T>
where
    T: Clone + Ord,
{
    value: T,
    color: Color,
    left: Option<Box<Node<T>>>,  // empty or owns the left child
    right: Option<Box<Node<T>>>, // empty or owns the right child
}

// Primary operations on a single node.
impl<T> Node<T>
where
    T: Clone + Ord,
{
    // CREATE operation, a node is born exactly once, as a red leaf.
    fn new(value: T) -> Box<Node<T>> {
        Box::new(Node {
            value,
            color: Color::Red,
            left: None,
            right: None,
        })
    }

    #[inline]
    fn left_deref(&self) -> Option<&Node<T>> {
        self.left.as_ref().map(Deref::deref)
    }

    #[inline]
    fn right_deref(&self) -> Option<&Node<T>> {
        self.right.as_ref().map(Deref::deref)
    }

    #[inline]
    fn set_red(&mut self) {
        self.color = Color::Red
    }

    #[inline]
    fn set_black(&mut self) {
        self.color = Color::Black
    }

    #[inline]
    fn is_black(&self) -> bool {
        self.color == Color::Black
    }
}

/// Statistics on [`Llrb`] tree. Serves two purposes:
///
/// * To get partial but quick statistics via [`Llrb::stats`] method.
/// * To get full statistics via [`Llrb::validate`] method.
#[derive(Debug, Default)]
pub struct Stats {
    entries: usize, // number of values in the tree.
    node_size: usize,
    blacks: Option<usize>,
    depths: Option<Tally>,
}

impl Stats {
    fn new(entries: usize, node_size: usize) -> Stats {
        Stats {
            entries,
            node_size,
            blacks: Default::default(),
            depths: Default::default(),
        }
    }

    #[inline]
    fn set_blacks(&mut self, blacks: usize) {
        self.blacks = Some(blacks)
    }

    #[inline]
    fn set_depths(&mut self, depths: Tally) {
        self.depths = Some(depths)
    }

    /// Return number of values in the [`Llrb`] instance.
    #[inline]
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Return node-size in bytes, including overhead for `Node<T>`.
    /// The overhead is constant, the node size varies with the value
    /// type.
    #[inline]
    pub fn node_size(&self) -> usize {
        self.node_size
    }

    /// Return number of black nodes from root to leaf, None unless
    /// this statistics was returned by [`Llrb::validate`].
    #[inline]
    pub fn blacks(&self) -> Option<usize> {
        self.blacks
    }

    /// Return the [`Tally`] of leaf-node depths, None unless this
    /// statistics was returned by [`Llrb::validate`].
    pub fn depths(&self) -> Option<Tally> {
        match &self.depths {
            Some(depths) if depths.samples() > 0 => Some(depths.clone()),
            _ => None,
        }
    }
}
