//!
//! Renumbering of positional `$N` placeholders.
//!
//! Caller-supplied SQL fragments number their own parameters from `$1`.
//! When such a fragment is spliced into a larger statement, its placeholders
//! must be shifted by the number of arguments already collected.
//!

use crate::{JaggError, JaggResult};

#[derive(Default)]
struct Parity {
    single: usize,
    double: usize,
}

impl Parity {
    fn observe(&mut self, c: char) {
        match c {
            '\'' => self.single += 1,
            '"' => self.double += 1,
            _ => {}
        }
    }

    fn outside_quotes(&self) -> bool {
        self.single % 2 == 0 && self.double % 2 == 0
    }
}

/// Rewrite every `$N` found outside of quoted spans into `$(N + offset)`.
///
/// Quoting is tracked by parity: each `'` and `"` toggles its own counter,
/// and a `$` only starts a placeholder while both counters are even.
/// A `$` not followed by a digit is kept as literal text.
pub fn renumber(text: &str, offset: usize) -> JaggResult<String> {
    let mut out = String::with_capacity(text.len());
    let mut parity = Parity::default();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        out.push(c);

        if c == '$' && parity.outside_quotes() {
            let mut digits = String::new();
            while let Some(digit) = chars.next_if(char::is_ascii_digit) {
                digits.push(digit);
            }

            if digits.is_empty() {
                continue;
            }

            let number = digits
                .parse::<usize>()
                .ok()
                .and_then(|number| number.checked_add(offset))
                .ok_or_else(|| JaggError::Tokenizer(digits.clone()))?;

            out.push_str(&number.to_string());
            continue;
        }

        parity.observe(c);
    }

    Ok(out)
}
