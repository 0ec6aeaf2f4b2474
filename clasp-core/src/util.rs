/// Longest prefix of `text` that fits the error message cap, cut back to a
/// char boundary so multibyte text never splits.
pub fn clip(text: &str) -> &str {
    let mut end = text.len().min(497);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].trim_end()
}

#[macro_export]
macro_rules! truncate_long {
    ($text:expr) => {
        format_args!(
            "{}{}",
            $crate::clip(&$text),
            if $text.len() > 497 { "..." } else { "" },
        )
    };
}
