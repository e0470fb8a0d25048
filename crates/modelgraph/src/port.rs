//! Typed ports and the element references that wire nodes together.
//!
//! An output port produces a fixed-size sequence of values of one scalar
//! element type. Inputs never name a port directly; they consume a
//! [`PortElements`], an ordered concatenation of slices taken from one or
//! more upstream output ports. Ports are addressed through arena-indexed
//! handles ([`OutputPortRef`]) resolved against the owning model's tables,
//! so remapping a reference is an index lookup rather than a pointer rewrite.

use std::fmt;

use smallvec::{smallvec, SmallVec};

/// Enumerates scalar element types carried by output ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Bool,
    I32,
    I64,
    F32,
    F64,
}

impl ElementType {
    /// Returns `true` when the element type is a signed integer.
    pub fn is_integer(self) -> bool {
        matches!(self, ElementType::I32 | ElementType::I64)
    }

    /// Returns `true` when the element type is floating point.
    pub fn is_float(self) -> bool {
        matches!(self, ElementType::F32 | ElementType::F64)
    }

    /// Storage size of one element in bytes.
    pub fn size_in_bytes(self) -> usize {
        match self {
            ElementType::Bool => 1,
            ElementType::I32 | ElementType::F32 => 4,
            ElementType::I64 | ElementType::F64 => 8,
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementType::Bool => "bool",
            ElementType::I32 => "i32",
            ElementType::I64 => "i64",
            ElementType::F32 => "f32",
            ElementType::F64 => "f64",
        };
        f.write_str(name)
    }
}

/// Identifies a node within its owning [`Model`](crate::model::Model).
///
/// Ids are assigned at insertion time and are stable for the life of the
/// model; they are never reused, even after a node is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Returns the raw index.
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Arena-indexed handle to one output port: the owning node plus the port's
/// position in that node's output list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputPortRef {
    pub node: NodeId,
    pub port: u16,
}

impl OutputPortRef {
    pub fn new(node: NodeId, port: u16) -> Self {
        Self { node, port }
    }
}

impl fmt::Display for OutputPortRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node, self.port)
    }
}

/// Value sequence produced by a node. Created once at node construction and
/// immutable thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputPort {
    pub element_type: ElementType,
    pub size: usize,
}

impl OutputPort {
    pub fn new(element_type: ElementType, size: usize) -> Self {
        Self { element_type, size }
    }
}

impl fmt::Display for OutputPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.element_type, self.size)
    }
}

/// One contiguous slice of an output port's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortRange {
    pub port: OutputPortRef,
    pub start: usize,
    pub len: usize,
}

impl PortRange {
    pub fn new(port: OutputPortRef, start: usize, len: usize) -> Self {
        Self { port, start, len }
    }

    /// Exclusive end index of the slice.
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    fn extends(&self, next: &PortRange) -> bool {
        self.port == next.port && next.start == self.end()
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}..{}]", self.port, self.start, self.end())
    }
}

/// Ordered concatenation of output-port slices forming one logical input.
///
/// Most inputs read a single whole port, so the range list is inlined for
/// the one-range case.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PortElements {
    ranges: SmallVec<[PortRange; 1]>,
}

impl PortElements {
    /// Elements covering a single slice.
    pub fn from_range(range: PortRange) -> Self {
        Self {
            ranges: smallvec![range],
        }
    }

    /// Elements covering one whole output port of the given size.
    pub fn from_port(port: OutputPortRef, size: usize) -> Self {
        Self::from_range(PortRange::new(port, 0, size))
    }

    /// Concatenates several element lists in order.
    pub fn concat<I>(parts: I) -> Self
    where
        I: IntoIterator<Item = PortElements>,
    {
        let mut joined = PortElements::default();
        for part in parts {
            joined.append(part);
        }
        joined
    }

    /// Appends another element list, merging slices that are contiguous on
    /// the same port.
    pub fn append(&mut self, other: PortElements) {
        for range in other.ranges {
            self.push(range);
        }
    }

    /// Appends one slice, merging it into the tail when contiguous.
    pub fn push(&mut self, range: PortRange) {
        if let Some(last) = self.ranges.last_mut() {
            if last.extends(&range) {
                last.len += range.len;
                return;
            }
        }
        self.ranges.push(range);
    }

    /// Total number of elements across all slices.
    pub fn size(&self) -> usize {
        self.ranges.iter().map(|range| range.len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn ranges(&self) -> &[PortRange] {
        &self.ranges
    }

    /// The referenced port when the elements consist of exactly one slice.
    pub fn single_source(&self) -> Option<OutputPortRef> {
        match self.ranges.as_slice() {
            [only] => Some(only.port),
            _ => None,
        }
    }

    /// Re-slices the concatenated sequence, returning the ranges covering
    /// `start..start + len`. Returns `None` when the window exceeds the
    /// available elements.
    pub fn subrange(&self, start: usize, len: usize) -> Option<PortElements> {
        if start + len > self.size() {
            return None;
        }
        let mut taken = PortElements::default();
        let mut skip = start;
        let mut remaining = len;
        for range in &self.ranges {
            if remaining == 0 {
                break;
            }
            if skip >= range.len {
                skip -= range.len;
                continue;
            }
            let offset = range.start + skip;
            let available = range.len - skip;
            let take = available.min(remaining);
            taken.push(PortRange::new(range.port, offset, take));
            remaining -= take;
            skip = 0;
        }
        Some(taken)
    }
}

impl From<PortRange> for PortElements {
    fn from(range: PortRange) -> Self {
        PortElements::from_range(range)
    }
}

impl fmt::Display for PortElements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, range) in self.ranges.iter().enumerate() {
            if index > 0 {
                f.write_str(" ++ ")?;
            }
            write!(f, "{range}")?;
        }
        Ok(())
    }
}
