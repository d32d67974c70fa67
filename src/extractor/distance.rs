/// Levenshtein distance between two strings, counted in `char`s.
///
/// Case-sensitive; insertion, deletion and substitution all cost 1.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    // Keep the rolling rows as short as possible
    let (long, short) = if a_chars.len() >= b_chars.len() {
        (&a_chars, &b_chars)
    } else {
        (&b_chars, &a_chars)
    };

    if short.is_empty() {
        return long.len();
    }

    let mut prev: Vec<usize> = (0..=short.len()).collect();
    let mut curr = vec![0usize; short.len() + 1];

    for (i, &long_ch) in long.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &short_ch) in short.iter().enumerate() {
            let cost = usize::from(long_ch != short_ch);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[short.len()]
}
