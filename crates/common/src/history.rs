use crate::point::Point2D;

pub const DEFAULT_MEMORY_LEN: usize = 1000;

/// Bounded ring of past agent positions.
///
/// Once `capacity` entries are stored, each push overwrites the oldest one.
/// Iteration always runs oldest to newest.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    slots: Vec<Point2D>,
    /// Index of the oldest entry. Only moves once the ring is full.
    head: usize,
    capacity: usize,
}

impl HistoryBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            head: 0,
            capacity,
        }
    }

    pub fn push(&mut self, p: Point2D) {
        if self.capacity == 0 {
            return;
        }
        if self.slots.len() < self.capacity {
            self.slots.push(p);
        } else {
            self.slots[self.head] = p;
            self.head = (self.head + 1) % self.capacity;
        }
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.head = 0;
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entry at logical index `i`, 0 being the oldest.
    pub fn get(&self, i: usize) -> Option<Point2D> {
        if i >= self.slots.len() {
            return None;
        }
        Some(self.slots[(self.head + i) % self.slots.len()])
    }

    pub fn latest(&self) -> Option<Point2D> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }

    /// `(most recent, second most recent)`, if two entries exist.
    pub fn last_two(&self) -> Option<(Point2D, Point2D)> {
        let n = self.len();
        if n < 2 {
            return None;
        }
        Some((self.get(n - 1)?, self.get(n - 2)?))
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            buffer: self,
            front: 0,
            back: self.len(),
        }
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_LEN)
    }
}

impl<'a> IntoIterator for &'a HistoryBuffer {
    type Item = Point2D;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

pub struct Iter<'a> {
    buffer: &'a HistoryBuffer,
    front: usize,
    back: usize,
}

impl Iterator for Iter<'_> {
    type Item = Point2D;

    fn next(&mut self) -> Option<Point2D> {
        if self.front >= self.back {
            return None;
        }
        let item = self.buffer.get(self.front);
        self.front += 1;
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Point2D> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        self.buffer.get(self.back)
    }
}

impl ExactSizeIterator for Iter<'_> {}
