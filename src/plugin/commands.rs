// The `sticker` command group: `sticker search <keyword>`, `sticker count`.

/// Usage text for the command group.
pub const HELP_TEXT: &str = "表情包管理指令：\n/sticker search <关键词> - 根据关键词搜索表情包\n/sticker count - 统计当前数据库中有多少表情包";

pub const SEARCH_USAGE: &str = "用法：/sticker search <关键词>";

/// A parsed `sticker` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StickerCommand {
    Search { keyword: String },
    Count,
    /// `sticker search` with nothing after it
    MissingKeyword,
    /// Bare `sticker` or an unknown subcommand
    Help,
}

/// Parse a chat line into a sticker command.
///
/// Accepts an optional leading `/`. Returns `None` when the line isn't
/// addressed to the `sticker` group at all.
pub fn parse_command(text: &str) -> Option<StickerCommand> {
    let text = text.trim();
    let text = text.strip_prefix('/').unwrap_or(text);

    let mut words = text.split_whitespace();
    if words.next()? != "sticker" {
        return None;
    }

    let command = match words.next() {
        Some("search") => {
            let keyword = words.collect::<Vec<_>>().join(" ");
            if keyword.is_empty() {
                StickerCommand::MissingKeyword
            } else {
                StickerCommand::Search { keyword }
            }
        }
        Some("count") => StickerCommand::Count,
        _ => StickerCommand::Help,
    };
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_search_and_count() {
        assert_eq!(
            parse_command("/sticker search 猫"),
            Some(StickerCommand::Search {
                keyword: "猫".to_string()
            })
        );
        assert_eq!(parse_command("sticker count"), Some(StickerCommand::Count));
        assert_eq!(parse_command("  /sticker   count  "), Some(StickerCommand::Count));
    }

    #[test]
    fn multi_word_keyword_is_joined() {
        assert_eq!(
            parse_command("/sticker search 黑人  问号"),
            Some(StickerCommand::Search {
                keyword: "黑人 问号".to_string()
            })
        );
    }

    #[test]
    fn missing_keyword_and_unknown_subcommand() {
        assert_eq!(
            parse_command("/sticker search"),
            Some(StickerCommand::MissingKeyword)
        );
        assert_eq!(parse_command("/sticker"), Some(StickerCommand::Help));
        assert_eq!(parse_command("/sticker delete 1"), Some(StickerCommand::Help));
    }

    #[test]
    fn other_text_is_not_a_command() {
        assert_eq!(parse_command("hello"), None);
        assert_eq!(parse_command("/stickers count"), None);
        assert_eq!(parse_command(""), None);
    }
}
