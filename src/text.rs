//! Small string helpers shared by the vehicle and map display code.

/// Title-cases `s`: a letter is upper-cased when the previous character is
/// not a letter, otherwise lower-cased. Digits and punctuation start a new
/// word, so `t-34` becomes `T-34` and `f3d` becomes `F3D`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;

    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }

    out
}

/// Replaces underscores with spaces and title-cases the result.
pub fn humanize(id: &str) -> String {
    title_case(&id.replace('_', " ")).trim().to_string()
}
