use rand::{seq::SliceRandom, Rng};

/// Hands out every item once per round in random order. A fresh round never
/// opens with the item that closed the previous one.
#[derive(Debug, Clone)]
pub struct ShuffleBag<T> {
    items: Vec<T>,
    cursor: usize,
    last: Option<usize>,
    order: Vec<usize>,
}

impl<T: Clone> ShuffleBag<T> {
    /// The first round walks the items in their given order.
    pub fn new(items: Vec<T>) -> Self {
        let order = (0..items.len()).collect();
        Self {
            items,
            cursor: 0,
            last: None,
            order,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn next_item(&mut self) -> Option<T> {
        self.next_with(&mut rand::thread_rng())
    }

    pub fn next_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<T> {
        if self.items.is_empty() {
            return None;
        }

        if self.cursor >= self.order.len() {
            self.order.shuffle(rng);
            self.cursor = 0;

            if self.order.len() > 1 && Some(self.order[0]) == self.last {
                let swap = rng.gen_range(1..self.order.len());
                self.order.swap(0, swap);
            }
        }

        let index = self.order[self.cursor];
        self.cursor += 1;
        self.last = Some(index);
        Some(self.items[index].clone())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn first_round_follows_given_order() {
        let mut bag = ShuffleBag::new(vec![1, 2, 3, 4, 5]);
        let mut rng = StdRng::seed_from_u64(7);
        let round: Vec<_> = (0..5).filter_map(|_| bag.next_with(&mut rng)).collect();
        assert_eq!(round, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn each_round_covers_every_item_without_back_to_back_repeats() {
        let mut bag = ShuffleBag::new(vec!['a', 'b', 'c', 'd', 'e']);
        let mut rng = StdRng::seed_from_u64(42);
        let mut previous = None;

        for _ in 0..40 {
            let round: Vec<char> = (0..5).filter_map(|_| bag.next_with(&mut rng)).collect();
            let unique: HashSet<_> = round.iter().collect();
            assert_eq!(unique.len(), 5);

            if let Some(previous) = previous {
                assert_ne!(round[0], previous);
            }
            previous = round.last().copied();
        }
    }

    #[test]
    fn empty_and_single_bags() {
        let mut empty: ShuffleBag<u8> = ShuffleBag::new(Vec::new());
        assert_eq!(empty.next_item(), None);

        let mut single = ShuffleBag::new(vec!["only"]);
        assert_eq!(single.next_item(), Some("only"));
        assert_eq!(single.next_item(), Some("only"));
    }
}
