/// Slot storage with vacant-slot reuse. Indices stay stable for as long as the
/// element lives; erased slots are handed out again by later inserts.
#[derive(Clone, Debug)]
pub struct List<T> {
    data: Vec<Option<T>>,
    elements: usize,
    vacant: Vec<usize>,
}

impl<T> Default for List<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> List<T> {
    pub fn new() -> Self {
        Self::with_capacity(128)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            elements: 0,
            vacant: Vec::new(),
        }
    }

    /// Number of live elements.
    pub fn size(&self) -> usize {
        self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements == 0
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.data.get(index).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.data.get_mut(index).and_then(Option::as_mut)
    }

    fn push(&mut self, element: T) -> usize {
        let index = self.data.len();
        self.data.push(Some(element));
        self.elements += 1;
        index
    }

    /// Stores `element`, reusing the most recently erased slot if there is one.
    pub fn insert(&mut self, element: T) -> usize {
        if let Some(index) = self.vacant.pop() {
            self.data[index] = Some(element);
            self.elements += 1;
            return index;
        }
        self.push(element)
    }

    /// Frees the slot at `index`, returning what was stored there.
    pub fn erase(&mut self, index: usize) -> Option<T> {
        let element = self.data.get_mut(index)?.take()?;
        self.elements -= 1;
        self.vacant.push(index);
        Some(element)
    }

    /// Live elements with their indices, in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.data
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|element| (index, element)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erased_slots_are_reused_last_in_first_out() {
        let mut list = List::new();
        let a = list.insert('a');
        let b = list.insert('b');
        let c = list.insert('c');
        assert_eq!((a, b, c), (0, 1, 2));

        assert_eq!(list.erase(a), Some('a'));
        assert_eq!(list.erase(c), Some('c'));
        assert_eq!(list.size(), 1);

        assert_eq!(list.insert('d'), c);
        assert_eq!(list.insert('e'), a);
        assert_eq!(list.insert('f'), 3);
        assert_eq!(list.size(), 4);
    }

    #[test]
    fn vacant_slots_read_as_none() {
        let mut list = List::with_capacity(4);
        let a = list.insert(1);
        list.erase(a);
        assert_eq!(list.get(a), None);
        assert_eq!(list.get_mut(a), None);
        assert_eq!(list.erase(a), None);
        assert_eq!(list.get(42), None);
        assert!(list.is_empty());
    }

    #[test]
    fn iter_skips_vacant_slots() {
        let mut list = List::new();
        list.insert(10);
        let b = list.insert(20);
        list.insert(30);
        list.erase(b);
        let live: Vec<_> = list.iter().map(|(i, v)| (i, *v)).collect();
        assert_eq!(live, vec![(0, 10), (2, 30)]);
    }
}
