//! Natural ordering for entry paths: digit runs compare numerically, so
//! "img2.png" sorts before "img10.png". Applied once at container open to
//! fix the page index → entry mapping.

use std::cmp::Ordering;

/// Total order over path strings with numeric digit runs.
///
/// Non-digit runs compare byte-wise (case-sensitive). Digit runs compare by
/// numeric value; leading-zero padding differences ("p2" vs "p02") are only
/// a final tiebreak, applied when the strings compare equal everywhere else,
/// shorter written run first, so the order stays total and deterministic.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let a = a.as_bytes();
    let b = b.as_bytes();
    let mut i = 0;
    let mut j = 0;
    // First run-length difference between numerically-equal digit runs.
    let mut padding = Ordering::Equal;

    while i < a.len() && j < b.len() {
        if a[i].is_ascii_digit() && b[j].is_ascii_digit() {
            let run_a = digit_run(a, i);
            let run_b = digit_run(b, j);
            let num_a = trim_leading_zeros(&a[i..run_a]);
            let num_b = trim_leading_zeros(&b[j..run_b]);
            // Longer trimmed run means larger number; equal lengths compare digit-wise.
            let ord = num_a
                .len()
                .cmp(&num_b.len())
                .then_with(|| num_a.cmp(num_b));
            if ord != Ordering::Equal {
                return ord;
            }
            if padding == Ordering::Equal {
                padding = (run_a - i).cmp(&(run_b - j));
            }
            i = run_a;
            j = run_b;
        } else {
            match a[i].cmp(&b[j]) {
                Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
                ord => return ord,
            }
        }
    }

    (a.len() - i).cmp(&(b.len() - j)).then(padding)
}

/// End of the digit run starting at `start`.
fn digit_run(s: &[u8], start: usize) -> usize {
    let mut end = start;
    while end < s.len() && s[end].is_ascii_digit() {
        end += 1;
    }
    end
}

fn trim_leading_zeros(run: &[u8]) -> &[u8] {
    let first = run.iter().position(|&c| c != b'0').unwrap_or(run.len() - 1);
    &run[first..]
}
