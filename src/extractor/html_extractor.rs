//! HTML正文提取器
//! 基于 html5ever 分词器，收集可见文本，丢弃脚本、样式等不可见内容

use std::cell::{Cell, RefCell};
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts
};
use markup5ever::LocalName;
use tendril::StrTendril;

/// 内容不可见、需整体跳过的标签
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template", "svg", "title"];

/// 需要换行分隔的块级标签
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

#[derive(Debug, Default)]
pub struct HtmlTextExtractor {
    text: RefCell<String>,
    skip_depth: Cell<usize>,
}

impl TokenSink for HtmlTextExtractor {
    type Handle = ();

    fn process_token(&self, token: Token, _line: u64) -> TokenSinkResult<()> {
        match token {
            Token::TagToken(Tag { kind, name, self_closing, .. }) => {
                return self.process_tag(kind, &name, self_closing);
            }
            Token::CharacterTokens(chars) => {
                if self.skip_depth.get() == 0 {
                    self.text.borrow_mut().push_str(&chars);
                }
            }
            _ => {}
        }
        TokenSinkResult::Continue
    }
}

impl HtmlTextExtractor {
    /// 创建新的提取器
    pub fn new() -> Self {
        Self::default()
    }

    /// 从HTML字符串提取纯文本
    pub fn extract(html: &str) -> String {
        let tokenizer = Tokenizer::new(Self::new(), TokenizerOpts::default());
        let queue = BufferQueue::default();
        queue.push_back(StrTendril::from(html));

        let _ = tokenizer.feed(&queue);
        tokenizer.end();

        let sink = tokenizer.sink;
        normalize_text(&sink.text.into_inner())
    }

    fn process_tag(&self, kind: TagKind, name: &LocalName, self_closing: bool) -> TokenSinkResult<()> {
        let tag: &str = name;

        // 进入 body 时丢弃 head 中未闭合的跳过状态
        if tag == "body" && kind == TagKind::StartTag {
            self.skip_depth.set(0);
        }

        if SKIPPED_TAGS.contains(&tag) {
            match kind {
                TagKind::StartTag if !self_closing => {
                    self.skip_depth.set(self.skip_depth.get() + 1);
                    // script/style 内容按原始文本分词，避免误判其中的 `<`
                    return match tag {
                        "script" => TokenSinkResult::RawData(RawKind::ScriptData),
                        "style" => TokenSinkResult::RawData(RawKind::Rawtext),
                        "title" => TokenSinkResult::RawData(RawKind::Rcdata),
                        _ => TokenSinkResult::Continue,
                    };
                }
                TagKind::EndTag => {
                    self.skip_depth.set(self.skip_depth.get().saturating_sub(1));
                }
                _ => {}
            }
            return TokenSinkResult::Continue;
        }

        if BLOCK_TAGS.contains(&tag) && self.skip_depth.get() == 0 {
            self.text.borrow_mut().push('\n');
        }
        TokenSinkResult::Continue
    }
}

/// 行内空白折叠为单个空格，去除空行
fn normalize_text(raw: &str) -> String {
    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_visible_text() {
        let html = r#"
            <html>
            <head><title>Ignored title</title><style>body { color: red; }</style></head>
            <body>
                <h1>Hello   World</h1>
                <p>I like to learn and I like to teach</p>
                <script>if (a < b) { document.write("<p>hidden</p>"); }</script>
                <p>Tom &amp; Jerry</p>
            </body>
            </html>
        "#;

        let text = HtmlTextExtractor::extract(html);
        assert_eq!(text, "Hello World\nI like to learn and I like to teach\nTom & Jerry");
    }

    #[test]
    fn test_extract_plain_text_input() {
        assert_eq!(HtmlTextExtractor::extract("This is an example"), "This is an example");
    }

    #[test]
    fn test_inline_tags_keep_words_together() {
        assert_eq!(
            HtmlTextExtractor::extract("<div>Rust is <b>fast</b> and <i>safe</i></div><br>done"),
            "Rust is fast and safe\ndone"
        );
    }

    #[test]
    fn test_unclosed_head_element() {
        assert_eq!(
            HtmlTextExtractor::extract("<head><noscript>x<body><p>still visible</p></body>"),
            "still visible"
        );
    }

    #[test]
    fn test_head_contributes_no_text() {
        assert_eq!(
            HtmlTextExtractor::extract(
                r#"<head><title>Site title</title><meta name="x" content="y"></head>after head"#
            ),
            "after head"
        );
    }

    #[test]
    fn test_noscript_skipped() {
        assert_eq!(
            HtmlTextExtractor::extract("<p>visible</p><noscript><p>enable js</p></noscript>"),
            "visible"
        );
    }
}
