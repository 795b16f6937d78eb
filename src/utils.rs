use unicode_segmentation::UnicodeSegmentation;

/// First line of `s`, cut to at most `max_len` grapheme clusters for log
/// output. Appends an ellipsis when anything was cut off.
pub fn preview(s: &str, max_len: usize) -> String {
    let line = s.lines().next().unwrap_or("");
    let graphemes: Vec<&str> = line.graphemes(true).collect();
    if graphemes.len() > max_len || line.len() < s.trim_end().len() {
        let mut out = graphemes.into_iter().take(max_len).collect::<String>();
        out.push('…');
        out
    } else {
        line.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_unchanged() {
        assert_eq!(preview("hello", 20), "hello");
    }

    #[test]
    fn long_text_is_cut_with_ellipsis() {
        assert_eq!(preview("abcdefghij", 4), "abcd…");
    }

    #[test]
    fn only_the_first_line_is_shown() {
        assert_eq!(preview("first\nsecond", 20), "first…");
    }

    #[test]
    fn hangul_is_cut_on_character_boundaries() {
        assert_eq!(preview("안녕하세요 반갑습니다", 4), "안녕하세…");
    }
}
