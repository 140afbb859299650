//! Console command parsing.

use crate::error::ConsoleError;

pub const HELP: &str = "\
commands:
  show                     redraw the grid
  edit <row> <column>      start editing a cell (row is 1-based on the page)
  type <value>             replace the edit buffer
  enter | tab | backtab    submit the buffer (tab keys move to the next cell)
  esc                      cancel the edit
  toggle <key>             toggle selection of a row key
  all                      toggle every row on the page
  page <n> | next | prev   change page (n is 1-based)
  first | last             jump to the first or last page
  size <n>                 set the page size
  hide <col> | unhide <col>
  resize <col> <px>        set a column width
  columns [query]          list columns matching query
  vars                     print column size variables
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Show,
    Edit { row: usize, column: String },
    Type(String),
    Enter,
    Tab,
    BackTab,
    Escape,
    Toggle(String),
    ToggleAll,
    Page(usize),
    Next,
    Prev,
    First,
    Last,
    PageSize(usize),
    Hide(String),
    Unhide(String),
    Resize { column: String, width: u32 },
    Columns(String),
    Variables,
    Help,
    Quit,
}

fn number<T: std::str::FromStr>(arg: Option<&str>, what: &str) -> Result<T, ConsoleError> {
    arg.and_then(|s| s.parse().ok())
        .ok_or_else(|| ConsoleError::usage(format!("expected {}", what)))
}

fn word(arg: Option<&str>, what: &str) -> Result<String, ConsoleError> {
    arg.map(str::to_string)
        .ok_or_else(|| ConsoleError::usage(format!("expected {}", what)))
}

impl Command {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, ConsoleError> {
        let line = line.trim();
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };
        let mut args = rest.split_whitespace();

        let command = match name {
            "" => return Ok(None),
            "show" | "s" => Self::Show,
            "edit" | "e" => {
                let row: usize = number(args.next(), "row number")?;
                if row == 0 {
                    return Err(ConsoleError::usage("rows are numbered from 1"));
                }
                Self::Edit {
                    row: row - 1,
                    column: word(args.next(), "column id")?,
                }
            }
            // Keeps inner whitespace so multi-word values survive.
            "type" | "t" => Self::Type(rest.to_string()),
            "enter" => Self::Enter,
            "tab" => Self::Tab,
            "backtab" => Self::BackTab,
            "esc" | "escape" => Self::Escape,
            "toggle" => Self::Toggle(word(args.next(), "row key")?),
            "all" => Self::ToggleAll,
            "page" | "p" => {
                let page: usize = number(args.next(), "page number")?;
                Self::Page(page.saturating_sub(1))
            }
            "next" | "n" => Self::Next,
            "prev" => Self::Prev,
            "first" => Self::First,
            "last" => Self::Last,
            "size" => Self::PageSize(number(args.next(), "page size")?),
            "hide" => Self::Hide(word(args.next(), "column id")?),
            "unhide" => Self::Unhide(word(args.next(), "column id")?),
            "resize" => Self::Resize {
                column: word(args.next(), "column id")?,
                width: number(args.next(), "width in px")?,
            },
            "columns" => Self::Columns(rest.to_string()),
            "vars" => Self::Variables,
            "help" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            other => return Err(ConsoleError::usage(format!("unknown command: {}", other))),
        };
        Ok(Some(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_edit_is_zero_based() {
        assert_eq!(
            Command::parse("edit 2 code").unwrap(),
            Some(Command::Edit { row: 1, column: "code".into() })
        );
        assert!(Command::parse("edit 0 code").is_err());
        assert!(Command::parse("edit x code").is_err());
    }

    #[test]
    fn test_type_keeps_spaces() {
        assert_eq!(
            Command::parse("type  Blue  widget ").unwrap(),
            Some(Command::Type("Blue  widget".into()))
        );
        assert_eq!(Command::parse("type").unwrap(), Some(Command::Type(String::new())));
    }

    #[test]
    fn test_misc() {
        assert_eq!(Command::parse("   ").unwrap(), None);
        assert_eq!(Command::parse("page 3").unwrap(), Some(Command::Page(2)));
        assert_eq!(
            Command::parse("resize qty 180").unwrap(),
            Some(Command::Resize { column: "qty".into(), width: 180 })
        );
        assert_eq!(Command::parse("columns").unwrap(), Some(Command::Columns(String::new())));
        assert!(matches!(Command::parse("fly"), Err(ConsoleError::Usage(_))));
    }
}
