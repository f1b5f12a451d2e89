
const WORD_BITS: usize = u32::BITS as usize;

/// Growable set of non-negative integers, packed into 32 bit words.
///
/// Trailing zero words are never kept, so equal sets compare equal and
/// `words()` is the shortest encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitSet {
    words: Vec<u32>,
}
impl BitSet {
    pub fn from_words(mut words: Vec<u32>) -> Self {
        while words.last() == Some(&0) {
            words.pop();
        }
        Self { words }
    }
    pub fn words(&self) -> &[u32] {
        &self.words
    }
    pub fn get(&self, i: usize) -> bool {
        self.words
            .get(i / WORD_BITS)
            .map_or(false, |w| w & 1 << (i % WORD_BITS) != 0)
    }
    pub fn set(&mut self, i: usize) {
        let word = i / WORD_BITS;
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1 << (i % WORD_BITS);
    }
    pub fn unset(&mut self, i: usize) {
        if let Some(w) = self.words.get_mut(i / WORD_BITS) {
            *w &= !(1 << (i % WORD_BITS));
            while self.words.last() == Some(&0) {
                self.words.pop();
            }
        }
    }
    pub fn clear(&mut self) {
        self.words.clear();
    }
    /// Lowest index `>= from` that is not in the set.
    pub fn next_clear(&self, from: usize) -> usize {
        let mut word = from / WORD_BITS;
        let mut mask = (1u32 << (from % WORD_BITS)) - 1;
        while let Some(w) = self.words.get(word) {
            let taken = w | mask;
            if taken != u32::MAX {
                return word * WORD_BITS + (!taken).trailing_zeros() as usize;
            }
            word += 1;
            mask = 0;
        }
        from.max(self.words.len() * WORD_BITS)
    }
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &w)| {
            (0..WORD_BITS).filter(move |j| w & 1 << j != 0).map(move |j| i * WORD_BITS + j)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_clear_skips_runs() {
        let mut bits = BitSet::default();
        assert_eq!(bits.next_clear(0), 0);
        (0..40).for_each(|i| bits.set(i));
        bits.unset(33);
        assert_eq!(bits.next_clear(0), 33);
        assert_eq!(bits.next_clear(34), 40);
        assert_eq!(bits.next_clear(100), 100);
    }

    #[test]
    fn words_are_trimmed() {
        let mut bits = BitSet::default();
        bits.set(70);
        assert_eq!(bits.words().len(), 3);
        bits.unset(70);
        assert!(bits.words().is_empty());
        assert_eq!(bits, BitSet::from_words(vec![0, 0]));
    }

    #[test]
    fn high_bit_lands_in_its_word() {
        let mut bits = BitSet::default();
        bits.set(31);
        bits.set(32);
        assert_eq!(bits.words(), &[1 << 31, 1]);
        assert_eq!(bits.iter().collect::<Vec<_>>(), vec![31, 32]);
    }
}
