/// Ordered focusable controls with a current index. Cycling wraps around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusCycler<T> {
    items: Vec<T>,
    current: Option<usize>,
}

impl<T: PartialEq> FocusCycler<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            current: None,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn current(&self) -> Option<&T> {
        self.current.and_then(|ix| self.items.get(ix))
    }

    pub fn is_focused(&self, item: &T) -> bool {
        self.current() == Some(item)
    }

    /// Focuses `item`; returns false when it is not one of the controls.
    pub fn focus(&mut self, item: &T) -> bool {
        match self.items.iter().position(|it| it == item) {
            Some(ix) => {
                self.current = Some(ix);
                true
            }
            None => false,
        }
    }

    pub fn focus_first(&mut self) -> Option<&T> {
        self.current = (!self.items.is_empty()).then_some(0);
        self.current()
    }

    pub fn blur(&mut self) {
        self.current = None;
    }

    pub fn next(&mut self) -> Option<&T> {
        self.step(1)
    }

    pub fn previous(&mut self) -> Option<&T> {
        self.step(-1)
    }

    fn step(&mut self, amount: isize) -> Option<&T> {
        if self.items.is_empty() {
            self.current = None;
            return None;
        }
        let len = self.items.len() as isize;
        let next = match self.current {
            Some(ix) => (ix as isize + amount).rem_euclid(len) as usize,
            // Entering the cycle lands on the first or last control.
            None if amount > 0 => 0,
            None => self.items.len() - 1,
        };
        self.current = Some(next);
        self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles_with_wraparound() {
        let mut focus = FocusCycler::new(vec!["a", "b", "c"]);
        assert_eq!(focus.current(), None);
        assert_eq!(focus.next(), Some(&"a"));
        assert_eq!(focus.previous(), Some(&"c"));
        assert_eq!(focus.next(), Some(&"a"));
        assert_eq!(focus.next(), Some(&"b"));
    }

    #[test]
    fn previous_from_nothing_lands_on_last() {
        let mut focus = FocusCycler::new(vec![1, 2, 3]);
        assert_eq!(focus.previous(), Some(&3));
    }

    #[test]
    fn empty_cycler_never_focuses() {
        let mut focus: FocusCycler<u8> = FocusCycler::new(Vec::new());
        assert_eq!(focus.next(), None);
        assert_eq!(focus.focus_first(), None);
        assert!(!focus.focus(&1));
    }
}
