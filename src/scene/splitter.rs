//! 分镜文本切分与视频段落切分

use crate::error::SplitError;

const SENTENCE_ENDINGS: [char; 6] = ['。', '！', '？', '.', '!', '?'];
const PARAGRAPH_BREAKS: [char; 5] = ['\n', '。', '！', '？', '；'];

fn is_token_boundary(c: char) -> bool {
    SENTENCE_ENDINGS.contains(&c) || c.is_whitespace()
}

/// 没有分到文本的分镜使用的占位文字
pub fn placeholder_segment(index: usize) -> String {
    format!("segment {}", index + 1)
}

/// 将文本切分为恰好 `count` 段
///
/// 按句末标点或空白切出非空片段，依次每 `ceil(片段数 / count)` 个合为一段，
/// 段内以单个空格连接。分不到片段的段落使用 [`placeholder_segment`]。
pub fn split(text: &str, count: usize) -> Result<Vec<String>, SplitError> {
    if count == 0 {
        return Err(SplitError::ZeroCount);
    }
    if text.trim().is_empty() {
        return Err(SplitError::EmptyText);
    }

    let tokens: Vec<&str> = text
        .split(is_token_boundary)
        .filter(|token| !token.is_empty())
        .collect();
    let per_bucket = tokens.len().div_ceil(count);

    let segments = (0..count)
        .map(|i| {
            let start = (i * per_bucket).min(tokens.len());
            let end = ((i + 1) * per_bucket).min(tokens.len());
            if start == end {
                placeholder_segment(i)
            } else {
                tokens[start..end].join(" ")
            }
        })
        .collect();

    Ok(segments)
}

/// 按换行和中文句读切分段落
///
/// 不足两段时返回 [`SplitError::TooShort`]
pub fn split_paragraphs(text: &str) -> Result<Vec<String>, SplitError> {
    if text.trim().is_empty() {
        return Err(SplitError::EmptyText);
    }

    let paragraphs: Vec<String> = text
        .split(|c: char| PARAGRAPH_BREAKS.contains(&c))
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();

    if paragraphs.len() < 2 {
        return Err(SplitError::TooShort(paragraphs.len()));
    }
    Ok(paragraphs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_exactly_count_segments() {
        let text = "月光如水，洒在古老的石板街上。一位身着白衣的少女缓缓走来！她的长发在夜风中轻轻飘动？";
        for count in 1..=12 {
            assert_eq!(split(text, count).unwrap().len(), count);
        }
    }

    #[test]
    fn groups_tokens_sequentially() {
        assert_eq!(split("A. B. C. D.", 2).unwrap(), vec!["A B", "C D"]);
        assert_eq!(split("A. B. C. D. E.", 2).unwrap(), vec!["A B C", "D E"]);
        assert_eq!(split("one two three", 1).unwrap(), vec!["one two three"]);
    }

    #[test]
    fn short_text_fills_trailing_placeholders() {
        let segments = split("Only one sentence", 5).unwrap();
        assert_eq!(
            segments,
            vec!["Only", "one", "sentence", "segment 4", "segment 5"]
        );
    }

    #[test]
    fn uneven_grouping_can_leave_a_placeholder() {
        // ceil(5 / 4) = 2，第四段分不到片段
        let segments = split("a b c d e", 4).unwrap();
        assert_eq!(segments, vec!["a b", "c d", "e", "segment 4"]);
    }

    #[test]
    fn splits_on_cjk_sentence_marks() {
        let segments = split("天亮了。鸟儿在唱歌！你听见了吗？", 3).unwrap();
        assert_eq!(segments, vec!["天亮了", "鸟儿在唱歌", "你听见了吗"]);
    }

    #[test]
    fn rejects_invalid_input() {
        assert_eq!(split("text", 0), Err(SplitError::ZeroCount));
        assert_eq!(split("   \n", 3), Err(SplitError::EmptyText));
    }

    #[test]
    fn punctuation_only_text_is_all_placeholders() {
        assert_eq!(split("...!!!", 2).unwrap(), vec!["segment 1", "segment 2"]);
    }

    #[test]
    fn paragraphs_split_on_breaks_and_clause_marks() {
        let paragraphs = split_paragraphs("第一段；第二段\n\n第三段。").unwrap();
        assert_eq!(paragraphs, vec!["第一段", "第二段", "第三段"]);
    }

    #[test]
    fn single_paragraph_is_too_short() {
        assert_eq!(split_paragraphs("只有一句话。"), Err(SplitError::TooShort(1)));
        assert_eq!(split_paragraphs(""), Err(SplitError::EmptyText));
    }
}
