use hashbrown::HashMap;

pub trait Similarity {
    fn similarity(&self, other: &Self) -> f64;
}

impl<T: AsRef<str>> Similarity for T {
    fn similarity(&self, other: &Self) -> f64 {
        similarity(self.as_ref(), other.as_ref())
    }
}

/// Dice coefficient over character bigrams, ignoring spaces.
/// Used to match user given device names against what the host reports.
pub fn similarity(str1: &str, str2: &str) -> f64 {
    let a = str1.replace(' ', "").chars().collect::<Vec<_>>();
    let b = str2.replace(' ', "").chars().collect::<Vec<_>>();

    if a == b {
        return 1.0;
    }

    if a.len() < 2 || b.len() < 2 {
        return 0.0;
    }

    let mut first_bigrams = HashMap::<(char, char), u32>::new();
    for pair in a.windows(2) {
        *first_bigrams.entry((pair[0], pair[1])).or_default() += 1;
    }

    let mut intersection = 0;
    for pair in b.windows(2) {
        if let Some(count) = first_bigrams.get_mut(&(pair[0], pair[1])) {
            if *count > 0 {
                *count -= 1;
                intersection += 1;
            }
        }
    }

    (2.0 * intersection as f64) / (a.len() + b.len() - 2) as f64
}
